//! Public server browser

use axum::{Json, Router, extract::State, routing::get};
use serverlist_core::ServerView;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/server-browser
async fn list_servers(State(state): State<AppState>) -> Result<Json<Vec<ServerView>>, ApiError> {
    let views = state.manager.list_all_views().await?;
    Ok(Json(views))
}

/// Create server browser routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/server-browser", get(list_servers))
}
