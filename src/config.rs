// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup. A missing or
//! invalid required variable is a `SET_ENV` domain error, the configuration
//! class of the failure taxonomy.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `AUTH_DOMAIN` | Domain embedded in login challenges | Required |
//! | `AUTH_STATEMENT` | Statement shown to the wallet at signing | `Sign in to continue.` |
//! | `AUTH_URI` | URI embedded in login challenges | `https://<AUTH_DOMAIN>` |
//! | `SESSION_JWT_SECRET` | HS256 signing secret for session tokens | Required |
//! | `SESSION_TTL_SECS` | Session token lifetime | `86400` |
//! | `CHALLENGE_TTL_SECS` | Login challenge validity window | `600` |
//! | `WALLET_VERIFY_URL` | External wallet-signature verification endpoint | Required |
//! | `BACKEND_API_URL` | Backend user-data API base URL | Required |
//! | `STORAGE_API_URL` | File-storage API base URL | Required |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;

use url::Url;

use crate::error::{DomainError, ErrorCode};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const AUTH_DOMAIN_ENV: &str = "AUTH_DOMAIN";
pub const AUTH_STATEMENT_ENV: &str = "AUTH_STATEMENT";
pub const AUTH_URI_ENV: &str = "AUTH_URI";
pub const SESSION_JWT_SECRET_ENV: &str = "SESSION_JWT_SECRET";
pub const SESSION_TTL_ENV: &str = "SESSION_TTL_SECS";
pub const CHALLENGE_TTL_ENV: &str = "CHALLENGE_TTL_SECS";
pub const WALLET_VERIFY_URL_ENV: &str = "WALLET_VERIFY_URL";
pub const BACKEND_API_URL_ENV: &str = "BACKEND_API_URL";
pub const STORAGE_API_URL_ENV: &str = "STORAGE_API_URL";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_STATEMENT: &str = "Sign in to continue.";
const DEFAULT_SESSION_TTL_SECS: i64 = 86_400;
const DEFAULT_CHALLENGE_TTL_SECS: i64 = 600;

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub auth_domain: String,
    pub auth_statement: String,
    pub auth_uri: Url,
    pub session_jwt_secret: String,
    pub session_ttl_secs: i64,
    pub challenge_ttl_secs: i64,
    pub wallet_verify_url: Url,
    pub backend_api_url: Url,
    pub storage_api_url: Url,
}

fn required(name: &'static str) -> Result<String, DomainError> {
    env::var(name).map_err(|_| {
        DomainError::new(ErrorCode::SetEnv)
            .entity(name)
            .detail(format!("missing required environment variable {name}"))
    })
}

fn required_url(name: &'static str) -> Result<Url, DomainError> {
    let raw = required(name)?;
    Url::parse(&raw).map_err(|e| {
        DomainError::new(ErrorCode::SetEnv)
            .entity(name)
            .detail(format!("invalid URL in {name}: {e}"))
    })
}

fn parsed_or<T: std::str::FromStr>(
    name: &'static str,
    default: T,
) -> Result<T, DomainError> {
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => raw.parse().map_err(|_| {
            DomainError::new(ErrorCode::SetEnv)
                .entity(name)
                .detail(format!("could not parse {name}: {raw:?}"))
        }),
    }
}

impl Config {
    /// Load the full configuration from the environment.
    pub fn from_env() -> Result<Self, DomainError> {
        let auth_domain = required(AUTH_DOMAIN_ENV)?;
        let auth_uri = match env::var(AUTH_URI_ENV) {
            Ok(raw) => Url::parse(&raw).map_err(|e| {
                DomainError::new(ErrorCode::SetEnv)
                    .entity(AUTH_URI_ENV)
                    .detail(format!("invalid URL in {AUTH_URI_ENV}: {e}"))
            })?,
            Err(_) => Url::parse(&format!("https://{auth_domain}")).map_err(|e| {
                DomainError::new(ErrorCode::SetEnv)
                    .entity(AUTH_DOMAIN_ENV)
                    .detail(format!("AUTH_DOMAIN does not form a valid URL: {e}"))
            })?,
        };

        Ok(Self {
            host: env::var(HOST_ENV).unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parsed_or(PORT_ENV, 8080)?,
            auth_domain,
            auth_statement: env::var(AUTH_STATEMENT_ENV)
                .unwrap_or_else(|_| DEFAULT_STATEMENT.to_string()),
            auth_uri,
            session_jwt_secret: required(SESSION_JWT_SECRET_ENV)?,
            session_ttl_secs: parsed_or(SESSION_TTL_ENV, DEFAULT_SESSION_TTL_SECS)?,
            challenge_ttl_secs: parsed_or(CHALLENGE_TTL_ENV, DEFAULT_CHALLENGE_TTL_SECS)?,
            wallet_verify_url: required_url(WALLET_VERIFY_URL_ENV)?,
            backend_api_url: required_url(BACKEND_API_URL_ENV)?,
            storage_api_url: required_url(STORAGE_API_URL_ENV)?,
        })
    }
}
