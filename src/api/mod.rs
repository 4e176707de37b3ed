// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{AuthContext, LoginChallenge, Role, SessionClaims},
    cookies::cookie_layer,
    repository::{StoredFile, UserRecord, UserUpdate},
    state::AppState,
};

pub mod auth;
pub mod health;
pub mod users;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/auth/challenge", post(auth::create_challenge))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/session", get(auth::session))
        .route("/users/me", get(users::get_me).put(users::update_me))
        .route("/users/me/img", post(users::upload_img))
        .route("/users/{id}", delete(users::delete_user))
        .with_state(state);

    Router::new()
        .route("/health", get(health::health))
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(cookie_layer))
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::create_challenge,
        auth::login,
        auth::logout,
        auth::session,
        users::get_me,
        users::update_me,
        users::upload_img,
        users::delete_user
    ),
    components(
        schemas(
            health::HealthResponse,
            auth::ChallengeRequest,
            auth::LoginResponse,
            auth::SessionStatusResponse,
            users::UpdateMeRequest,
            users::UploadImageRequest,
            users::DeleteUserRequest,
            LoginChallenge,
            SessionClaims,
            AuthContext,
            Role,
            UserRecord,
            UserUpdate,
            StoredFile
        )
    ),
    tags(
        (name = "Health", description = "Liveness probes"),
        (name = "Auth", description = "Challenge, login and session lifecycle"),
        (name = "Users", description = "Profile management")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn test_state() -> AppState {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            auth_domain: "example.com".to_string(),
            auth_statement: "Sign in to continue.".to_string(),
            auth_uri: url::Url::parse("https://example.com").unwrap(),
            session_jwt_secret: "test-secret".to_string(),
            session_ttl_secs: 3600,
            challenge_ttl_secs: 600,
            wallet_verify_url: url::Url::parse("http://127.0.0.1:1/verify").unwrap(),
            backend_api_url: url::Url::parse("http://127.0.0.1:1/").unwrap(),
            storage_api_url: url::Url::parse("http://127.0.0.1:1/").unwrap(),
        };
        AppState::from_config(&config).expect("test state wires")
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(test_state());
        // Ensure the router can be converted into a service without panicking.
        let _ = app.into_make_service();
    }
}
