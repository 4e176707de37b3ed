// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::auth::{
    AccessGuard, ChallengeIssuer, HttpPayloadVerifier, LoginFlow, SessionService,
};
use crate::config::Config;
use crate::error::{DomainError, ErrorCode};
use crate::repository::{ApiUserRepository, FileStorage, HttpFileStorage, UserRepository};

/// Everything a request handler needs, wired once at startup.
#[derive(Clone)]
pub struct AppState {
    pub challenges: ChallengeIssuer,
    pub guard: AccessGuard,
    pub login: Arc<LoginFlow>,
    pub users: Arc<dyn UserRepository>,
    pub storage: Arc<dyn FileStorage>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self, DomainError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| {
                DomainError::new(ErrorCode::SharedAction)
                    .entity("http client")
                    .detail(format!("failed to build HTTP client: {e}"))
            })?;

        let verifier = Arc::new(HttpPayloadVerifier::new(
            http.clone(),
            config.wallet_verify_url.clone(),
            config.auth_domain.clone(),
        ));
        let session = Arc::new(SessionService::new(
            &config.session_jwt_secret,
            config.auth_domain.clone(),
            config.session_ttl_secs,
            verifier,
        ));
        let users: Arc<dyn UserRepository> = Arc::new(ApiUserRepository::new(
            http.clone(),
            config.backend_api_url.clone(),
        ));
        let storage: Arc<dyn FileStorage> =
            Arc::new(HttpFileStorage::new(http, config.storage_api_url.clone()));

        Ok(Self {
            challenges: ChallengeIssuer::new(
                config.auth_domain.clone(),
                config.auth_statement.clone(),
                config.auth_uri.as_str().trim_end_matches('/').to_string(),
                config.challenge_ttl_secs,
            ),
            guard: AccessGuard::new(session.clone()),
            login: Arc::new(LoginFlow::new(users.clone(), session)),
            users,
            storage,
        })
    }
}
