//! Caller identity extracted from bearer tokens

use axum::http::{HeaderMap, header::AUTHORIZATION};
use serde::{Deserialize, Serialize};
use serverlist_db::Role;
use tracing::debug;

use crate::error::AuthError;
use crate::jwt::{Claims, JwtManager};

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    /// `None` when the token carried no role claim
    pub role: Option<Role>,
}

impl AuthUser {
    /// Create from JWT claims
    ///
    /// A role claim that is not recognised maps to [`Role::Player`], the
    /// least privileged role.
    pub fn from_claims(claims: &Claims) -> Self {
        let role = claims
            .role
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(|r| r.parse().unwrap_or(Role::Player));

        Self {
            id: claims.sub.clone(),
            role,
        }
    }

    /// Caller used when authentication is disabled
    pub fn anonymous_admin() -> Self {
        Self {
            id: "anonymous".to_string(),
            role: Some(Role::Admin),
        }
    }
}

/// Extract bearer token from authorization header
pub fn extract_bearer_token(header: &str) -> Result<&str, AuthError> {
    match header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AuthError::InvalidAuthHeader),
    }
}

/// Validate the request's bearer token and return the caller
pub fn authenticate(headers: &HeaderMap, jwt: &JwtManager) -> Result<AuthUser, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = extract_bearer_token(header)?;
    let claims = jwt.validate_token(token)?;
    let user = AuthUser::from_claims(&claims);

    debug!(
        "Authenticated caller: {} ({})",
        user.id,
        user.role.map(|r| r.as_str()).unwrap_or("no role")
    );
    Ok(user)
}
