// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational Auth - Wallet-Signature Session Service
//!
//! This crate authenticates end users by wallet-signature challenge/response,
//! issues a signed session cookie carrying an authorization context, and
//! gates actions and routes on that context. Failures are classified for
//! presentation: thrown, silenced or rendered as a one-shot toast.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Challenges, session tokens, guards and the login flow
//! - `classify` - Error classification for presentation
//! - `cookies` - Cookie layer and the `jwt` session cookie
//! - `repository` - Clients for the delegated backend and file services
//! - `toast` - One-shot toast presentation gate

pub mod api;
pub mod auth;
pub mod classify;
pub mod config;
pub mod cookies;
pub mod error;
pub mod i18n;
pub mod repository;
pub mod state;
pub mod toast;
