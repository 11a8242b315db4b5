//! Game server registration and liveness routes

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{delete, patch, post},
};
use serde::{Deserialize, Serialize};
use serverlist_core::CachePatch;
use serverlist_db::NewServerRecord;
use std::net::IpAddr;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

use super::auth::RequireAuth;

/// Maximum allowed server name length
const MAX_NAME_LENGTH: usize = 64;

/// Register server request
#[derive(Debug, Deserialize)]
pub struct RegisterServerRequest {
    pub name: String,
    pub ip_address: String,
    pub port: i64,
    pub max_players: i64,
}

/// Register server response
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterServerResponse {
    pub id: String,
}

/// Registration fields after validation
#[derive(Debug, PartialEq, Eq)]
struct ValidRegistration {
    ip_address: IpAddr,
    port: u16,
    max_players: i32,
}

impl RegisterServerRequest {
    /// Check every field, collecting all problems
    fn validate(&self) -> Result<ValidRegistration, ApiError> {
        let mut errors = Vec::new();

        let name_len = self.name.trim().chars().count();
        if name_len == 0 {
            errors.push("name cannot be empty".to_string());
        } else if name_len > MAX_NAME_LENGTH {
            errors.push(format!(
                "name exceeds maximum length of {} characters",
                MAX_NAME_LENGTH
            ));
        }

        let ip_address = self.ip_address.trim().parse::<IpAddr>().ok();
        if ip_address.is_none() {
            errors.push(format!("ip_address '{}' is not a valid IP address", self.ip_address));
        }

        let port = u16::try_from(self.port).ok().filter(|p| *p != 0);
        if port.is_none() {
            errors.push(format!("port must be between 1 and {}", u16::MAX));
        }

        let max_players = i32::try_from(self.max_players).ok().filter(|n| *n >= 1);
        if max_players.is_none() {
            errors.push("max_players must be at least 1".to_string());
        }

        match (ip_address, port, max_players) {
            (Some(ip_address), Some(port), Some(max_players)) if errors.is_empty() => {
                Ok(ValidRegistration {
                    ip_address,
                    port,
                    max_players,
                })
            }
            _ => Err(ApiError::Validation(errors)),
        }
    }
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

/// POST /api/game-servers
async fn register_server(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    payload: Result<Json<RegisterServerRequest>, JsonRejection>,
) -> Result<Json<RegisterServerResponse>, ApiError> {
    let request = json_body(payload)?;

    let Some(role) = user.role.filter(|_| !user.id.trim().is_empty()) else {
        return Err(ApiError::BadRequest(
            "Unable to retrieve caller id or role from auth token".to_string(),
        ));
    };
    if !role.can_register() {
        return Err(ApiError::Forbidden(format!(
            "Role '{}' may not register game servers",
            role
        )));
    }

    let valid = request.validate()?;
    debug!(
        "Registering game server {} at {}:{} for {}",
        request.name, valid.ip_address, valid.port, user.id
    );

    let record = state
        .manager
        .add_server(NewServerRecord {
            id: None,
            name: request.name.trim().to_string(),
            // Canonical text form so one address has one spelling
            ip_address: valid.ip_address.to_string(),
            port: valid.port,
            max_players: valid.max_players,
            owner_id: user.id,
        })
        .await?;

    Ok(Json(RegisterServerResponse { id: record.id }))
}

/// DELETE /api/game-servers/{id}
async fn close_server(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let record = state
        .manager
        .get_if_authorized(&id, &user.id, user.role)
        .await?;

    state.manager.remove_server(&record).await?;

    info!("Game server {} closed by {}", record.id, user.id);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/game-servers/{id}/heartbeat
async fn heartbeat(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    // Authorized access refreshes the heartbeat
    state
        .manager
        .get_if_authorized(&id, &user.id, user.role)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/game-servers/{id}/cache
async fn update_cache(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    payload: Result<Json<CachePatch>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let record = state
        .manager
        .get_if_authorized(&id, &user.id, user.role)
        .await?;

    let patch = json_body(payload)?;
    state.manager.patch_cache(&record.id, &patch)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Create game server routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/game-servers", post(register_server))
        .route("/api/game-servers/{id}", delete(close_server))
        .route("/api/game-servers/{id}/heartbeat", post(heartbeat))
        .route("/api/game-servers/{id}/cache", patch(update_cache))
}
