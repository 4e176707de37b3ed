// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Wallet-signature authentication with server-minted sessions.
//!
//! ## Auth Flow
//!
//! 1. Client requests a login challenge for its wallet address
//! 2. The wallet signs the challenge and sends it back
//! 3. This server:
//!    - Exchanges the signed challenge with the backend for the user record
//!    - Re-verifies the signature through the delegated wallet verifier
//!    - Mints an HS256 session token carrying the authorization context
//!    - Persists it in the `jwt` cookie and re-reads it before answering
//!
//! ## Security
//!
//! - Challenges are single-use, time-boxed and domain-bound
//! - The session cookie is HttpOnly; the token is re-verified on every read
//! - Clock skew tolerance is 60 seconds
//! - A session that fails its post-issue read-back is never considered active

pub mod challenge;
pub mod claims;
pub mod guard;
pub mod login;
pub mod roles;
pub mod session;
pub mod verifier;

pub use challenge::{ChallengeIssuer, LoginChallenge, SignedChallenge};
pub use claims::{AuthContext, SessionClaims};
pub use guard::AccessGuard;
pub use login::{LoginFlow, LoginOutcome};
pub use roles::Role;
pub use session::SessionService;
pub use verifier::{HttpPayloadVerifier, PayloadVerifier};
