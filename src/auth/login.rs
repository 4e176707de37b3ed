// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login orchestration.
//!
//! Order matters: the backend exchange runs first so its failure modes keep
//! their own identity. A backend that cannot be reached propagates as the
//! repository's lookup failure; a backend that answers `success: false` is an
//! authentication rejection. Only after a positive exchange is the session
//! minted, which re-verifies the signed challenge once more before the cookie
//! is written.

use std::sync::Arc;

use super::challenge::SignedChallenge;
use super::claims::{AuthContext, SessionClaims};
use super::session::SessionService;
use crate::cookies::{CookieStore, JWT_COOKIE};
use crate::error::{DomainError, ErrorCode, MessageKey};
use crate::repository::{ApiResponse, UserRecord, UserRepository};

/// A completed login: the active session plus the backend record it was
/// minted from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    pub claims: SessionClaims,
    pub user: UserRecord,
}

/// Runs the full login sequence for one signed challenge.
pub struct LoginFlow {
    users: Arc<dyn UserRepository>,
    session: Arc<SessionService>,
}

impl LoginFlow {
    pub fn new(users: Arc<dyn UserRepository>, session: Arc<SessionService>) -> Self {
        Self { users, session }
    }

    pub async fn login(
        &self,
        cookies: &dyn CookieStore,
        signed: &SignedChallenge,
    ) -> Result<LoginOutcome, DomainError> {
        // An earlier session, if any, rides along as a bearer credential.
        let stale_token = cookies.get(JWT_COOKIE);
        let envelope = self.users.login(signed, stale_token.as_deref()).await?;

        let user = match envelope {
            ApiResponse {
                success: true,
                data: Some(user),
            } => user,
            envelope => {
                return Err(DomainError::with_key(
                    ErrorCode::UnauthorizedAction,
                    MessageKey::Credentials,
                )
                .entity("user login")
                .detail(format!(
                    "backend rejected the login (success={}, data_present={})",
                    envelope.success,
                    envelope.data.is_some()
                )));
            }
        };

        let ctx = AuthContext {
            id: user.id.clone(),
            role: user.role,
            nick: user.nick.clone(),
            img: user.img.clone(),
        };
        let claims = self.session.issue(cookies, signed, ctx).await?;

        tracing::info!(user = %user.id, "login completed");
        Ok(LoginOutcome { claims, user })
    }

    /// Logout is unconditional; clearing an absent cookie is a no-op.
    pub fn logout(&self, cookies: &dyn CookieStore) {
        self.session.clear(cookies);
    }
}
