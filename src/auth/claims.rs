// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token claims and the embedded authorization context.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// The minimal identity/role payload embedded in a session token.
///
/// Set at issuance and immutable for the lifetime of the token; a profile
/// change requires re-issuing a new token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthContext {
    /// Stable backend user id; always present.
    pub id: String,
    /// Role used for privilege checks; `None` means no role assigned.
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub img: Option<String>,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        self.role.is_some_and(|role| role.is_admin())
    }
}

/// Claims carried by a session token: standard claims plus the authorization
/// context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SessionClaims {
    /// Subject, mirrors `ctx.id`
    pub sub: String,
    /// Issuer
    pub iss: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
    /// Authorization context
    pub ctx: AuthContext,
}

impl SessionClaims {
    /// Build fresh claims for a context.
    pub fn new(ctx: AuthContext, issuer: impl Into<String>, ttl_secs: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: ctx.id.clone(),
            iss: issuer.into(),
            iat: now,
            exp: now + ttl_secs,
            ctx,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.ctx.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_ctx(role: Option<Role>) -> AuthContext {
        AuthContext {
            id: "u1".to_string(),
            role,
            nick: Some("Ann".to_string()),
            img: None,
        }
    }

    #[test]
    fn new_claims_mirror_context_id() {
        let claims = SessionClaims::new(sample_ctx(Some(Role::Member)), "auth.example.com", 3600);
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.iss, "auth.example.com");
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn is_admin_requires_admin_role() {
        assert!(SessionClaims::new(sample_ctx(Some(Role::Admin)), "iss", 60).is_admin());
        assert!(!SessionClaims::new(sample_ctx(Some(Role::Member)), "iss", 60).is_admin());
        assert!(!SessionClaims::new(sample_ctx(Some(Role::Unknown)), "iss", 60).is_admin());
        assert!(!SessionClaims::new(sample_ctx(None), "iss", 60).is_admin());
    }

    #[test]
    fn context_round_trips_through_json() {
        let ctx = sample_ctx(Some(Role::Admin));
        let json = serde_json::to_string(&ctx).unwrap();
        let back: AuthContext = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ctx);
    }

    #[test]
    fn context_with_missing_optionals_deserializes() {
        let ctx: AuthContext = serde_json::from_str(r#"{"id":"u2"}"#).unwrap();
        assert_eq!(ctx.id, "u2");
        assert_eq!(ctx.role, None);
        assert!(!ctx.is_admin());
    }
}
