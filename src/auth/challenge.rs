// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login challenges.
//!
//! A challenge is generated per login attempt, signed by the client's wallet
//! and consumed exactly once. It is time-boxed by `issued_at`,
//! `expiration_time` and `invalid_before`; single-use nonce bookkeeping is
//! enforced by the delegated verification service.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Tolerance applied around the challenge validity window.
const CLOCK_SKEW_LEEWAY_SECS: i64 = 60;

/// Challenge payload the wallet signs. Immutable once issued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LoginChallenge {
    pub domain: String,
    pub address: String,
    pub statement: String,
    pub uri: String,
    pub version: String,
    pub nonce: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expiration_time: DateTime<Utc>,
    pub invalid_before: DateTime<Utc>,
    #[serde(default)]
    pub resources: Vec<String>,
}

impl LoginChallenge {
    /// Whether `now` falls inside the challenge validity window, with clock
    /// skew tolerance on both ends.
    pub fn is_within_window(&self, now: DateTime<Utc>) -> bool {
        let leeway = Duration::seconds(CLOCK_SKEW_LEEWAY_SECS);
        now + leeway >= self.invalid_before && now - leeway <= self.expiration_time
    }
}

/// A challenge plus the wallet signature over it. Consumed exactly once by
/// the payload verifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SignedChallenge {
    pub signature: String,
    pub payload: LoginChallenge,
}

/// Issues time-boxed challenges for one auth domain.
#[derive(Debug, Clone)]
pub struct ChallengeIssuer {
    domain: String,
    statement: String,
    uri: String,
    ttl_secs: i64,
}

impl ChallengeIssuer {
    pub fn new(
        domain: impl Into<String>,
        statement: impl Into<String>,
        uri: impl Into<String>,
        ttl_secs: i64,
    ) -> Self {
        Self {
            domain: domain.into(),
            statement: statement.into(),
            uri: uri.into(),
            ttl_secs,
        }
    }

    /// Generate a fresh challenge for an address.
    pub fn generate(&self, address: impl Into<String>) -> LoginChallenge {
        let now = Utc::now();
        LoginChallenge {
            domain: self.domain.clone(),
            address: address.into(),
            statement: self.statement.clone(),
            uri: self.uri.clone(),
            version: "1".to_string(),
            nonce: Uuid::new_v4(),
            issued_at: now,
            expiration_time: now + Duration::seconds(self.ttl_secs),
            invalid_before: now,
            resources: Vec::new(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> ChallengeIssuer {
        ChallengeIssuer::new("example.com", "Sign in to continue.", "https://example.com", 600)
    }

    #[test]
    fn generate_fills_all_fields() {
        let challenge = issuer().generate("0x123");
        assert_eq!(challenge.domain, "example.com");
        assert_eq!(challenge.address, "0x123");
        assert_eq!(challenge.version, "1");
        assert_eq!(challenge.expiration_time - challenge.issued_at, Duration::seconds(600));
        assert_eq!(challenge.invalid_before, challenge.issued_at);
    }

    #[test]
    fn nonces_are_unique_per_attempt() {
        let issuer = issuer();
        assert_ne!(issuer.generate("0x123").nonce, issuer.generate("0x123").nonce);
    }

    #[test]
    fn window_accepts_current_time() {
        let challenge = issuer().generate("0x123");
        assert!(challenge.is_within_window(Utc::now()));
    }

    #[test]
    fn window_rejects_expired_challenge() {
        let mut challenge = issuer().generate("0x123");
        challenge.expiration_time = Utc::now() - Duration::seconds(3600);
        assert!(!challenge.is_within_window(Utc::now()));
    }

    #[test]
    fn window_rejects_not_yet_valid_challenge() {
        let mut challenge = issuer().generate("0x123");
        challenge.invalid_before = Utc::now() + Duration::seconds(3600);
        assert!(!challenge.is_within_window(Utc::now()));
    }

    #[test]
    fn window_tolerates_small_clock_skew() {
        let mut challenge = issuer().generate("0x123");
        challenge.invalid_before = Utc::now() + Duration::seconds(30);
        assert!(challenge.is_within_window(Utc::now()));
    }

    #[test]
    fn signed_challenge_round_trips_through_json() {
        let signed = SignedChallenge {
            signature: "0xabc".to_string(),
            payload: issuer().generate("0x123"),
        };
        let json = serde_json::to_string(&signed).unwrap();
        let back: SignedChallenge = serde_json::from_str(&json).unwrap();
        assert_eq!(back, signed);
    }
}
