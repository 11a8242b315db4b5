//! Authentication extractors

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use serverlist_auth::{AuthUser, authenticate};

use crate::error::ApiError;
use crate::state::AppState;

/// Extractor for an authenticated caller (required)
pub struct RequireAuth(pub AuthUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        // Skip auth check if disabled
        if !app_state.auth_enabled {
            return Ok(RequireAuth(AuthUser::anonymous_admin()));
        }

        let user = authenticate(&parts.headers, &app_state.jwt)?;
        Ok(RequireAuth(user))
    }
}
