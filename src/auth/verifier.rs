// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signed-challenge verification.
//!
//! The verifier is stateless and never throws a presentation-aware error; it
//! only answers valid/invalid. Turning a rejection into a `DomainError` is
//! the caller's job (session issuer, login flow). Signature validity and
//! nonce single-use are delegated to the external wallet verification
//! service; the local checks are structural (domain, time window).

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::challenge::{LoginChallenge, SignedChallenge};

/// Why a signed challenge was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// Challenge was issued for a different domain
    DomainMismatch,
    /// Outside the issued_at/expiration_time/invalid_before window
    OutsideWindow,
    /// The delegated service rejected the signature or nonce
    SignatureRejected,
    /// The delegated service could not be reached
    VerifierUnreachable,
}

/// Payload that passed verification.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedPayload {
    pub address: String,
    pub payload: LoginChallenge,
}

/// Outcome of one verification attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadValidity {
    Valid(VerifiedPayload),
    Invalid(InvalidReason),
}

impl PayloadValidity {
    pub fn is_valid(&self) -> bool {
        matches!(self, PayloadValidity::Valid(_))
    }
}

/// Stateless check that a signed login payload corresponds to its claimed
/// address and has not expired.
#[async_trait]
pub trait PayloadVerifier: Send + Sync {
    async fn verify(&self, signed: &SignedChallenge) -> PayloadValidity;
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    valid: bool,
}

/// Verifier backed by the external wallet verification endpoint.
pub struct HttpPayloadVerifier {
    http: reqwest::Client,
    verify_url: Url,
    domain: String,
}

impl HttpPayloadVerifier {
    pub fn new(http: reqwest::Client, verify_url: Url, domain: impl Into<String>) -> Self {
        Self {
            http,
            verify_url,
            domain: domain.into(),
        }
    }

    fn structural_check(&self, payload: &LoginChallenge) -> Option<InvalidReason> {
        if payload.domain != self.domain {
            return Some(InvalidReason::DomainMismatch);
        }
        if !payload.is_within_window(chrono::Utc::now()) {
            return Some(InvalidReason::OutsideWindow);
        }
        None
    }
}

#[async_trait]
impl PayloadVerifier for HttpPayloadVerifier {
    async fn verify(&self, signed: &SignedChallenge) -> PayloadValidity {
        if let Some(reason) = self.structural_check(&signed.payload) {
            return PayloadValidity::Invalid(reason);
        }

        let response = match self
            .http
            .post(self.verify_url.clone())
            .json(signed)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "wallet verifier unreachable");
                return PayloadValidity::Invalid(InvalidReason::VerifierUnreachable);
            }
        };

        match response.json::<VerifyResponse>().await {
            Ok(VerifyResponse { valid: true }) => PayloadValidity::Valid(VerifiedPayload {
                address: signed.payload.address.clone(),
                payload: signed.payload.clone(),
            }),
            Ok(VerifyResponse { valid: false }) => {
                PayloadValidity::Invalid(InvalidReason::SignatureRejected)
            }
            Err(e) => {
                tracing::warn!(error = %e, "wallet verifier returned malformed response");
                PayloadValidity::Invalid(InvalidReason::VerifierUnreachable)
            }
        }
    }
}

/// Fixed-outcome verifier for tests.
#[cfg(test)]
pub struct StaticVerifier {
    pub valid: bool,
}

#[cfg(test)]
#[async_trait]
impl PayloadVerifier for StaticVerifier {
    async fn verify(&self, signed: &SignedChallenge) -> PayloadValidity {
        if self.valid {
            PayloadValidity::Valid(VerifiedPayload {
                address: signed.payload.address.clone(),
                payload: signed.payload.clone(),
            })
        } else {
            PayloadValidity::Invalid(InvalidReason::SignatureRejected)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::challenge::ChallengeIssuer;
    use chrono::{Duration, Utc};

    fn signed_for(domain: &str) -> SignedChallenge {
        let issuer = ChallengeIssuer::new(domain, "statement", "https://example.com", 600);
        SignedChallenge {
            signature: "0xabc".to_string(),
            payload: issuer.generate("0x123"),
        }
    }

    fn unreachable_verifier(domain: &str) -> HttpPayloadVerifier {
        HttpPayloadVerifier::new(
            reqwest::Client::new(),
            Url::parse("http://127.0.0.1:1/verify").unwrap(),
            domain,
        )
    }

    #[tokio::test]
    async fn rejects_domain_mismatch_before_delegation() {
        let verifier = unreachable_verifier("example.com");
        let signed = signed_for("evil.example.org");
        assert_eq!(
            verifier.verify(&signed).await,
            PayloadValidity::Invalid(InvalidReason::DomainMismatch)
        );
    }

    #[tokio::test]
    async fn rejects_expired_challenge_before_delegation() {
        let verifier = unreachable_verifier("example.com");
        let mut signed = signed_for("example.com");
        signed.payload.expiration_time = Utc::now() - Duration::hours(2);
        assert_eq!(
            verifier.verify(&signed).await,
            PayloadValidity::Invalid(InvalidReason::OutsideWindow)
        );
    }

    #[tokio::test]
    async fn unreachable_service_is_a_rejection_not_a_panic() {
        let verifier = unreachable_verifier("example.com");
        let signed = signed_for("example.com");
        assert_eq!(
            verifier.verify(&signed).await,
            PayloadValidity::Invalid(InvalidReason::VerifierUnreachable)
        );
    }

    #[tokio::test]
    async fn static_verifier_mirrors_configured_outcome() {
        let signed = signed_for("example.com");
        let valid = StaticVerifier { valid: true }.verify(&signed).await;
        assert!(valid.is_valid());
        let invalid = StaticVerifier { valid: false }.verify(&signed).await;
        assert!(!invalid.is_valid());
    }
}
