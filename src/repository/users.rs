// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User repository against the delegated backend API.
//!
//! Failure mapping is the load-bearing part. A connection failure means the
//! backend could not answer and surfaces as `DATABASE_FIND` with the
//! connection wording; a non-2xx on login means the backend answered and
//! rejected, which is `UNAUTHORIZED_ACTION` with the credentials hint. The
//! two must never collapse into one.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

use super::{connection_error, ApiResponse, Endpoint, SIGNED_PAYLOAD_HEADER};
use crate::auth::challenge::SignedChallenge;
use crate::auth::roles::Role;
use crate::error::{DomainError, ErrorCode, MessageKey};

/// User record as the backend stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub address: String,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub is_verified: bool,
}

/// Profile fields a user may change. `None` leaves a field untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserUpdate {
    pub id: String,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
struct DeleteBody<'a> {
    id: &'a str,
    address: &'a str,
}

/// Backend user operations. Signed operations prove wallet possession to the
/// backend via the signed-payload header; `token` is the current session
/// token, forwarded as a bearer credential when one exists.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Exchange a signed challenge for the user record. The envelope is
    /// returned as-is; interpreting `success: false` is the caller's job.
    async fn login(
        &self,
        signed: &SignedChallenge,
        token: Option<&str>,
    ) -> Result<ApiResponse<UserRecord>, DomainError>;

    async fn read_by_id(&self, id: &str, token: Option<&str>)
        -> Result<UserRecord, DomainError>;

    async fn update(
        &self,
        changes: &UserUpdate,
        signed: &SignedChallenge,
        token: Option<&str>,
    ) -> Result<UserRecord, DomainError>;

    async fn delete_by_id(
        &self,
        id: &str,
        address: &str,
        signed: &SignedChallenge,
        token: Option<&str>,
    ) -> Result<(), DomainError>;
}

/// Repository backed by the backend HTTP API.
pub struct ApiUserRepository {
    http: Client,
    base_url: Url,
}

impl ApiUserRepository {
    pub fn new(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    fn signed_header(signed: &SignedChallenge) -> Result<String, DomainError> {
        serde_json::to_string(signed).map_err(|e| {
            DomainError::new(ErrorCode::SharedAction)
                .entity("signed payload")
                .detail(format!("failed to serialize signed payload: {e}"))
        })
    }

    fn with_auth(builder: reqwest::RequestBuilder, token: Option<&str>) -> reqwest::RequestBuilder {
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

#[async_trait]
impl UserRepository for ApiUserRepository {
    async fn login(
        &self,
        signed: &SignedChallenge,
        token: Option<&str>,
    ) -> Result<ApiResponse<UserRecord>, DomainError> {
        let url = Endpoint::UserLogin.url(&self.base_url, None)?;
        let header = Self::signed_header(signed)?;

        let builder = self
            .http
            .request(Endpoint::UserLogin.method(), url)
            .header(SIGNED_PAYLOAD_HEADER, header);
        let response = Self::with_auth(builder, token)
            .send()
            .await
            .map_err(|e| connection_error("user login").detail(format!("login failed: {e}")))?;

        if !response.status().is_success() {
            return Err(DomainError::with_key(
                ErrorCode::UnauthorizedAction,
                MessageKey::Credentials,
            )
            .entity("user login")
            .detail(format!("login rejected with {}", response.status())));
        }

        response.json().await.map_err(|e| {
            connection_error("user login").detail(format!("invalid login response: {e}"))
        })
    }

    async fn read_by_id(
        &self,
        id: &str,
        token: Option<&str>,
    ) -> Result<UserRecord, DomainError> {
        let url = Endpoint::UserReadById.url(&self.base_url, Some(id))?;

        let builder = self.http.request(Endpoint::UserReadById.method(), url);
        let response = Self::with_auth(builder, token)
            .send()
            .await
            .map_err(|e| {
                DomainError::with_key(ErrorCode::DatabaseFind, MessageKey::TryAgainOrContact)
                    .entity("user")
                    .detail(format!("read by id failed: {e}"))
            })?;

        if !response.status().is_success() {
            return Err(DomainError::with_key(
                ErrorCode::DatabaseFind,
                MessageKey::TryAgainOrContact,
            )
            .entity("user")
            .detail(format!("read by id returned {}", response.status())));
        }

        let envelope: ApiResponse<UserRecord> = response.json().await.map_err(|e| {
            DomainError::with_key(ErrorCode::DatabaseFind, MessageKey::TryAgainOrContact)
                .entity("user")
                .detail(format!("invalid read response: {e}"))
        })?;
        envelope.data.ok_or_else(|| {
            DomainError::with_key(ErrorCode::DatabaseFind, MessageKey::TryAgainOrContact)
                .entity("user")
                .detail("read response carried no record")
        })
    }

    async fn update(
        &self,
        changes: &UserUpdate,
        signed: &SignedChallenge,
        token: Option<&str>,
    ) -> Result<UserRecord, DomainError> {
        let url = Endpoint::UserUpdate.url(&self.base_url, None)?;
        let header = Self::signed_header(signed)?;

        let builder = self
            .http
            .request(Endpoint::UserUpdate.method(), url)
            .header(SIGNED_PAYLOAD_HEADER, header)
            .json(changes);
        let response = Self::with_auth(builder, token)
            .send()
            .await
            .map_err(|e| {
                DomainError::with_key(ErrorCode::DatabaseAction, MessageKey::TryAgainOrContact)
                    .entity("user")
                    .detail(format!("update failed: {e}"))
            })?;

        if !response.status().is_success() {
            return Err(DomainError::with_key(
                ErrorCode::DatabaseAction,
                MessageKey::TryAgainOrContact,
            )
            .entity("user")
            .detail(format!("update returned {}", response.status())));
        }

        let envelope: ApiResponse<UserRecord> = response.json().await.map_err(|e| {
            DomainError::with_key(ErrorCode::DatabaseAction, MessageKey::TryAgainOrContact)
                .entity("user")
                .detail(format!("invalid update response: {e}"))
        })?;
        envelope.data.ok_or_else(|| {
            DomainError::with_key(ErrorCode::DatabaseAction, MessageKey::TryAgainOrContact)
                .entity("user")
                .detail("update response carried no record")
        })
    }

    async fn delete_by_id(
        &self,
        id: &str,
        address: &str,
        signed: &SignedChallenge,
        token: Option<&str>,
    ) -> Result<(), DomainError> {
        let url = Endpoint::UserDelete.url(&self.base_url, None)?;
        let header = Self::signed_header(signed)?;

        let builder = self
            .http
            .request(Endpoint::UserDelete.method(), url)
            .header(SIGNED_PAYLOAD_HEADER, header)
            .json(&DeleteBody { id, address });
        let response = Self::with_auth(builder, token)
            .send()
            .await
            .map_err(|e| {
                DomainError::with_key(ErrorCode::DatabaseAction, MessageKey::TryAgainOrContact)
                    .entity("user")
                    .detail(format!("delete failed: {e}"))
            })?;

        if !response.status().is_success() {
            return Err(DomainError::with_key(
                ErrorCode::DatabaseAction,
                MessageKey::TryAgainOrContact,
            )
            .entity("user")
            .detail(format!("delete returned {}", response.status())));
        }
        Ok(())
    }
}

/// Repository with a fixed outcome, for wiring tests.
#[cfg(test)]
pub struct StaticUserRepository {
    pub login_result: Result<ApiResponse<UserRecord>, DomainError>,
}

#[cfg(test)]
#[async_trait]
impl UserRepository for StaticUserRepository {
    async fn login(
        &self,
        _signed: &SignedChallenge,
        _token: Option<&str>,
    ) -> Result<ApiResponse<UserRecord>, DomainError> {
        self.login_result.clone()
    }

    async fn read_by_id(
        &self,
        id: &str,
        _token: Option<&str>,
    ) -> Result<UserRecord, DomainError> {
        match &self.login_result {
            Ok(ApiResponse {
                data: Some(record), ..
            }) if record.id == id => Ok(record.clone()),
            _ => Err(DomainError::with_key(
                ErrorCode::DatabaseFind,
                MessageKey::TryAgainOrContact,
            )
            .entity("user")),
        }
    }

    async fn update(
        &self,
        changes: &UserUpdate,
        _signed: &SignedChallenge,
        _token: Option<&str>,
    ) -> Result<UserRecord, DomainError> {
        let mut record = self.read_by_id(&changes.id, None).await?;
        record.nick = changes.nick.clone().or(record.nick);
        record.img = changes.img.clone().or(record.img);
        record.email = changes.email.clone().or(record.email);
        Ok(record)
    }

    async fn delete_by_id(
        &self,
        id: &str,
        _address: &str,
        _signed: &SignedChallenge,
        _token: Option<&str>,
    ) -> Result<(), DomainError> {
        self.read_by_id(id, None).await.map(|_| ())
    }
}
