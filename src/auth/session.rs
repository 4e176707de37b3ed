// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying [`SessionClaims`], stored under the `jwt`
//! cookie. Issuance ends with a read-back self-check: a token that cannot be
//! re-verified through the same path the access guard uses must never be
//! considered active, so a failed round-trip raises instead of returning a
//! session the guard would reject.

use std::sync::Arc;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use super::challenge::SignedChallenge;
use super::claims::{AuthContext, SessionClaims};
use super::verifier::{PayloadValidity, PayloadVerifier};
use crate::cookies::{CookieStore, JWT_COOKIE};
use crate::error::{DomainError, ErrorCode, MessageKey};
use crate::i18n::IntlMessage;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Why a presented token failed verification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionTokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token has expired")]
    Expired,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token issuer is invalid")]
    InvalidIssuer,
    #[error("token is not yet valid")]
    NotYetValid,
}

fn internal_session_error() -> IntlMessage {
    IntlMessage::new(
        "Error interno de sesión. Vuelve a iniciar sesión.",
        "Internal session error. Please log in again.",
        "Error intern de sessió. Torna a iniciar sessió.",
        "Interner Sitzungsfehler. Bitte erneut anmelden.",
    )
}

/// Issues, reads and clears session tokens for one signing key.
///
/// Composed by constructor injection: the payload verifier seam is a trait so
/// the delegated signature check stays out of this module.
pub struct SessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl_secs: i64,
    verifier: Arc<dyn PayloadVerifier>,
}

impl SessionService {
    pub fn new(
        secret: &str,
        issuer: impl Into<String>,
        ttl_secs: i64,
        verifier: Arc<dyn PayloadVerifier>,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            ttl_secs,
            verifier,
        }
    }

    /// Verify a raw token through the same path used after issuance.
    pub fn verify_token(&self, token: &str) -> Result<SessionClaims, SessionTokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.set_issuer(&[&self.issuer]);
        validation.validate_aud = false;

        let data = decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionTokenError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    SessionTokenError::InvalidSignature
                }
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => SessionTokenError::InvalidIssuer,
                jsonwebtoken::errors::ErrorKind::ImmatureSignature => {
                    SessionTokenError::NotYetValid
                }
                _ => SessionTokenError::Malformed,
            },
        )?;
        Ok(data.claims)
    }

    /// Mint a session for a verified challenge and persist it.
    ///
    /// The challenge is re-verified even when the caller already did so; a
    /// rejection here is an authentication failure with the standard
    /// credentials wording. The final read-back failure carries a distinct
    /// internal-error message.
    pub async fn issue(
        &self,
        cookies: &dyn CookieStore,
        signed: &SignedChallenge,
        ctx: AuthContext,
    ) -> Result<SessionClaims, DomainError> {
        if let PayloadValidity::Invalid(reason) = self.verifier.verify(signed).await {
            return Err(DomainError::with_key(
                ErrorCode::UnauthorizedAction,
                MessageKey::Credentials,
            )
            .entity("login payload")
            .detail(format!("signed challenge rejected: {reason:?}")));
        }

        let claims = SessionClaims::new(ctx, self.issuer.clone(), self.ttl_secs);
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| {
                DomainError::with_intl(ErrorCode::UnauthorizedAction, internal_session_error())
                    .entity("session token")
                    .detail(format!("token encoding failed: {e}"))
            })?;

        cookies.set(JWT_COOKIE, token);

        // Round-trip self-check: the stored token must verify through the
        // exact path the access guard will use later.
        let stored = cookies.get(JWT_COOKIE).ok_or_else(|| {
            DomainError::with_intl(ErrorCode::UnauthorizedAction, internal_session_error())
                .entity("session token")
                .detail("token missing after write")
        })?;
        self.verify_token(&stored).map_err(|e| {
            DomainError::with_intl(ErrorCode::UnauthorizedAction, internal_session_error())
                .entity("session token")
                .detail(format!("round-trip self-check failed: {e}"))
        })
    }

    /// Current session, if a token is present and verifies. Any divergence is
    /// treated as absent, never partially trusted.
    pub fn read(&self, cookies: &dyn CookieStore) -> Option<SessionClaims> {
        let token = cookies.get(JWT_COOKIE)?;
        match self.verify_token(&token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                tracing::debug!(error = %e, "session token rejected");
                None
            }
        }
    }

    /// Logout: drop the session cookie.
    pub fn clear(&self, cookies: &dyn CookieStore) {
        cookies.delete(JWT_COOKIE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::challenge::ChallengeIssuer;
    use crate::auth::roles::Role;
    use crate::auth::verifier::StaticVerifier;
    use crate::cookies::MemoryCookieStore;
    use crate::error::FriendlyDesc;

    fn service(valid_signature: bool) -> SessionService {
        SessionService::new(
            "test-secret",
            "example.com",
            3600,
            Arc::new(StaticVerifier {
                valid: valid_signature,
            }),
        )
    }

    fn signed_challenge() -> SignedChallenge {
        let issuer =
            ChallengeIssuer::new("example.com", "statement", "https://example.com", 600);
        SignedChallenge {
            signature: "0xabc".to_string(),
            payload: issuer.generate("0x123"),
        }
    }

    fn ctx(role: Option<Role>) -> AuthContext {
        AuthContext {
            id: "u1".to_string(),
            role,
            nick: Some("Ann".to_string()),
            img: None,
        }
    }

    /// Cookie store whose writes vanish, to force the round-trip check.
    #[derive(Default)]
    struct BlackHoleCookieStore;

    impl CookieStore for BlackHoleCookieStore {
        fn get(&self, _name: &str) -> Option<String> {
            None
        }
        fn set(&self, _name: &str, _value: String) {}
        fn delete(&self, _name: &str) {}
    }

    #[tokio::test]
    async fn issue_then_read_returns_the_same_context() {
        let service = service(true);
        let cookies = MemoryCookieStore::default();

        let issued = service
            .issue(&cookies, &signed_challenge(), ctx(Some(Role::Admin)))
            .await
            .expect("issue succeeds");
        assert_eq!(issued.sub, "u1");

        let read = service.read(&cookies).expect("session present");
        assert_eq!(read.ctx, ctx(Some(Role::Admin)));
        assert!(read.is_admin());
    }

    #[tokio::test]
    async fn invalid_challenge_is_unauthorized_with_credentials_wording() {
        let service = service(false);
        let cookies = MemoryCookieStore::default();

        let err = service
            .issue(&cookies, &signed_challenge(), ctx(None))
            .await
            .expect_err("must reject");
        assert_eq!(err.code, ErrorCode::UnauthorizedAction);
        assert_eq!(err.friendly, Some(FriendlyDesc::Key(MessageKey::Credentials)));
        // Nothing was persisted.
        assert!(service.read(&cookies).is_none());
    }

    #[tokio::test]
    async fn failed_round_trip_is_fatal_with_internal_wording() {
        let service = service(true);
        let cookies = BlackHoleCookieStore;

        let err = service
            .issue(&cookies, &signed_challenge(), ctx(None))
            .await
            .expect_err("must fail the self-check");
        assert_eq!(err.code, ErrorCode::UnauthorizedAction);
        // Internal inconsistency, not the user-facing credentials message.
        assert_eq!(
            err.friendly,
            Some(FriendlyDesc::Intl(internal_session_error()))
        );
    }

    #[tokio::test]
    async fn tampered_token_reads_as_absent() {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

        let service = service(true);
        let cookies = MemoryCookieStore::default();
        service
            .issue(&cookies, &signed_challenge(), ctx(Some(Role::Member)))
            .await
            .unwrap();

        // Forge an elevated claims segment while keeping the original
        // signature. The signature no longer matches, so the token must
        // read as absent.
        let token = cookies.get(JWT_COOKIE).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let claims_json = URL_SAFE_NO_PAD.decode(parts[1]).unwrap();
        let forged_json =
            String::from_utf8(claims_json).unwrap().replace("MEMBER", "ADMIN");
        let forged_claims = URL_SAFE_NO_PAD.encode(forged_json.as_bytes());
        cookies.set(
            JWT_COOKIE,
            format!("{}.{}.{}", parts[0], forged_claims, parts[2]),
        );

        assert!(service.read(&cookies).is_none());
    }

    #[tokio::test]
    async fn token_from_a_different_key_reads_as_absent() {
        let issuing = service(true);
        let cookies = MemoryCookieStore::default();
        issuing
            .issue(&cookies, &signed_challenge(), ctx(None))
            .await
            .unwrap();

        let other = SessionService::new(
            "different-secret",
            "example.com",
            3600,
            Arc::new(StaticVerifier { valid: true }),
        );
        assert!(other.read(&cookies).is_none());
    }

    #[tokio::test]
    async fn clear_removes_the_session() {
        let service = service(true);
        let cookies = MemoryCookieStore::default();
        service
            .issue(&cookies, &signed_challenge(), ctx(None))
            .await
            .unwrap();
        assert!(service.read(&cookies).is_some());

        service.clear(&cookies);
        assert!(service.read(&cookies).is_none());
    }

    #[test]
    fn garbage_token_is_malformed() {
        let service = service(true);
        assert_eq!(
            service.verify_token("not-a-jwt"),
            Err(SessionTokenError::Malformed)
        );
    }
}
