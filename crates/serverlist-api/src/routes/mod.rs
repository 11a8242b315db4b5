//! API routes

mod auth;
mod game_servers;
mod health;
pub mod metrics;
mod server_browser;

use axum::{Router, extract::DefaultBodyLimit};
use std::sync::Arc;

use crate::state::{AppState, MetricsHandle};

pub use auth::RequireAuth;
pub use game_servers::{RegisterServerRequest, RegisterServerResponse};

/// Request bodies are small JSON documents
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Create the main router
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let mut router = Router::new()
        // Health check
        .merge(health::routes())
        // Game server lifecycle
        .merge(game_servers::routes())
        // Public listing
        .merge(server_browser::routes())
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    // Add metrics endpoint if handle is provided
    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use chrono::{TimeDelta, Utc};
    use serde_json::{Value, json};
    use serverlist_auth::JwtManager;
    use serverlist_core::{CacheStore, RegistryManager, RegistrySettings, ServerView};
    use serverlist_db::{MemoryStore, Role};
    use tower::ServiceExt;

    const SECRET: &str = "router-test-secret";

    fn create_test_state(auth_enabled: bool) -> AppState {
        let manager = RegistryManager::new(
            Arc::new(MemoryStore::new()),
            Arc::new(CacheStore::new()),
            RegistrySettings {
                heartbeat_enabled: true,
                heartbeat_timeout_secs: 30,
                sweep_interval_secs: 10,
            },
        );
        AppState::new(
            Arc::new(manager),
            Arc::new(JwtManager::new(SECRET, 1)),
            auth_enabled,
        )
    }

    fn token(subject: &str, role: Option<Role>) -> String {
        JwtManager::new(SECRET, 1).generate_token(subject, role).unwrap()
    }

    fn json_request(method: &str, uri: &str, bearer: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn empty_request(method: &str, uri: &str, bearer: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn register(app: &Router, bearer: &str, ip: &str, port: u16) -> String {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/game-servers",
                Some(bearer),
                json!({ "name": "NA East", "ip_address": ip, "port": port, "max_players": 8 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let app = create_router(create_test_state(true), None);

        for path in ["/health", "/healthz"] {
            let response = app.clone().oneshot(empty_request("GET", path, None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let body = body_json(response).await;
            assert_eq!(body["status"], "healthy");
            assert_eq!(body["tracked_servers"], 0);
        }
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let handle = Arc::new(recorder.handle());
        let app = create_router(create_test_state(true), Some(handle));

        let response = app.oneshot(empty_request("GET", "/metrics", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response.headers()[header::CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/plain")
        );
    }

    #[tokio::test]
    async fn test_register_requires_bearer() {
        let app = create_router(create_test_state(true), None);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/game-servers",
                None,
                json!({ "name": "x", "ip_address": "10.0.0.1", "port": 7000, "max_players": 8 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/game-servers",
                Some("garbage"),
                json!({ "name": "x", "ip_address": "10.0.0.1", "port": 7000, "max_players": 8 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_register_and_browse() {
        let app = create_router(create_test_state(true), None);
        let server_token = token("owner-1", Some(Role::Server));

        let id = register(&app, &server_token, "10.0.0.1", 7000).await;

        let response = app
            .oneshot(empty_request("GET", "/api/server-browser", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let views: Vec<ServerView> = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].id, id);
        assert_eq!(views[0].player_count, 0);
        assert_eq!(views[0].max_players, 8);
    }

    #[tokio::test]
    async fn test_player_cannot_register() {
        let app = create_router(create_test_state(true), None);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/game-servers",
                Some(&token("player-1", Some(Role::Player))),
                json!({ "name": "x", "ip_address": "10.0.0.1", "port": 7000, "max_players": 8 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_register_without_role_is_bad_request() {
        let app = create_router(create_test_state(true), None);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/game-servers",
                Some(&token("someone", None)),
                json!({ "name": "x", "ip_address": "10.0.0.1", "port": 7000, "max_players": 8 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_validation_errors() {
        let app = create_router(create_test_state(true), None);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/game-servers",
                Some(&token("owner-1", Some(Role::Server))),
                json!({ "name": "", "ip_address": "nope", "port": 7000, "max_players": 0 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["code"], "VALIDATION_FAILED");
        assert_eq!(body["errors"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let app = create_router(create_test_state(true), None);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/game-servers",
                Some(&token("owner-1", Some(Role::Server))),
                json!({ "name": "missing fields" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_duplicate_address_conflicts() {
        let app = create_router(create_test_state(true), None);
        let server_token = token("owner-1", Some(Role::Server));

        register(&app, &server_token, "10.0.0.1", 7000).await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/game-servers",
                Some(&server_token),
                json!({ "name": "again", "ip_address": "10.0.0.1", "port": 7000, "max_players": 4 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_equivalent_ip_spellings_conflict() {
        let app = create_router(create_test_state(true), None);
        let server_token = token("owner-1", Some(Role::Server));

        for (first, second) in [("::1", "0:0:0:0:0:0:0:1"), ("FE80::1", "fe80::1")] {
            register(&app, &server_token, first, 7000).await;

            let response = app
                .clone()
                .oneshot(json_request(
                    "POST",
                    "/api/game-servers",
                    Some(&server_token),
                    json!({ "name": "again", "ip_address": second, "port": 7000, "max_players": 4 }),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CONFLICT);
        }

        let response = app
            .oneshot(empty_request("GET", "/api/server-browser", None))
            .await
            .unwrap();
        let views: Vec<ServerView> = serde_json::from_value(body_json(response).await).unwrap();
        let mut addresses: Vec<_> = views.iter().map(|v| v.ip_address.as_str()).collect();
        addresses.sort();
        assert_eq!(addresses, vec!["::1", "fe80::1"]);
    }

    #[tokio::test]
    async fn test_port_zero_is_rejected() {
        let app = create_router(create_test_state(true), None);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/game-servers",
                Some(&token("owner-1", Some(Role::Server))),
                json!({ "name": "x", "ip_address": "10.0.0.5", "port": 0, "max_players": 8 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn test_heartbeat_owner_and_stranger() {
        let state = create_test_state(true);
        let app = create_router(state.clone(), None);
        let owner = token("owner-1", Some(Role::Server));
        let id = register(&app, &owner, "10.0.0.1", 7000).await;

        state
            .manager
            .cache()
            .update(&id, |e| {
                e.last_heartbeat = Utc::now() - TimeDelta::seconds(20);
                Ok::<(), ()>(())
            })
            .unwrap();
        let before = state.manager.cache().get(&id).unwrap().last_heartbeat;

        let uri = format!("/api/game-servers/{}/heartbeat", id);
        let response = app
            .clone()
            .oneshot(empty_request("POST", &uri, Some(&token("owner-2", Some(Role::Server)))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(state.manager.cache().get(&id).unwrap().last_heartbeat, before);

        let response = app
            .oneshot(empty_request("POST", &uri, Some(&owner)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(state.manager.cache().get(&id).unwrap().last_heartbeat > before);
    }

    #[tokio::test]
    async fn test_unknown_server_is_forbidden() {
        let app = create_router(create_test_state(true), None);

        let response = app
            .oneshot(empty_request(
                "POST",
                "/api/game-servers/missing/heartbeat",
                Some(&token("admin", Some(Role::Admin))),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_patch_cache() {
        let state = create_test_state(true);
        let app = create_router(state.clone(), None);
        let owner = token("owner-1", Some(Role::Server));
        let id = register(&app, &owner, "10.0.0.1", 7000).await;
        let uri = format!("/api/game-servers/{}/cache", id);

        let response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                &uri,
                Some(&owner),
                json!([{ "op": "set_player_count", "value": 5 }]),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(state.manager.cache().get(&id).unwrap().player_count, 5);

        let response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                &uri,
                Some(&owner),
                json!([{ "op": "set_player_count", "value": -2 }]),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.manager.cache().get(&id).unwrap().player_count, 5);

        let response = app
            .oneshot(json_request("PATCH", &uri, Some(&owner), json!([])))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admin_closes_server() {
        let state = create_test_state(true);
        let app = create_router(state.clone(), None);
        let id = register(&app, &token("owner-1", Some(Role::Server)), "10.0.0.1", 7000).await;

        let response = app
            .clone()
            .oneshot(empty_request(
                "DELETE",
                &format!("/api/game-servers/{}", id),
                Some(&token("ops", Some(Role::Admin))),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(!state.manager.cache().contains(&id));

        let response = app
            .oneshot(empty_request("GET", "/api/server-browser", None))
            .await
            .unwrap();
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn test_auth_disabled_acts_as_admin() {
        let app = create_router(create_test_state(false), None);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/game-servers",
                None,
                json!({ "name": "dev", "ip_address": "127.0.0.1", "port": 7777, "max_players": 2 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
