// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access guard over the session cookie.
//!
//! Purely read-then-branch: every check re-reads the cookie store and
//! re-verifies the token signature, because the token may have expired or
//! been replaced between calls. Failures surface two ways by design: actions
//! raise a `DomainError`, routes redirect.

use std::sync::Arc;

use axum::response::Redirect;

use super::claims::SessionClaims;
use super::session::SessionService;
use crate::cookies::CookieStore;
use crate::error::{DomainError, ErrorCode, ErrorIcon};
use crate::i18n::IntlMessage;

fn must_log_in() -> IntlMessage {
    IntlMessage::new(
        "Debes iniciar sesión para continuar.",
        "You must log in to continue.",
        "Has d'iniciar sessió per continuar.",
        "Du musst dich anmelden, um fortzufahren.",
    )
}

fn admin_required() -> IntlMessage {
    IntlMessage::new(
        "Se requiere acceso de administrador.",
        "Admin access required.",
        "Es requereix accés d'administrador.",
        "Administratorzugriff erforderlich.",
    )
}

/// Pass/fail decisions for the logged-in and admin predicates.
#[derive(Clone)]
pub struct AccessGuard {
    session: Arc<SessionService>,
}

impl AccessGuard {
    pub fn new(session: Arc<SessionService>) -> Self {
        Self { session }
    }

    /// Token present and verifying.
    pub fn is_logged_in(&self, cookies: &dyn CookieStore) -> bool {
        self.session.read(cookies).is_some()
    }

    /// Token present, verifying, and carrying the admin role.
    pub fn is_admin(&self, cookies: &dyn CookieStore) -> bool {
        self.session
            .read(cookies)
            .is_some_and(|claims| claims.is_admin())
    }

    /// Action-style enforcement: the session or an `UNAUTHORIZED_ACTION`.
    pub fn require_logged_in_for_action(
        &self,
        cookies: &dyn CookieStore,
    ) -> Result<SessionClaims, DomainError> {
        self.session.read(cookies).ok_or_else(|| {
            DomainError::with_intl(ErrorCode::UnauthorizedAction, must_log_in())
                .icon(ErrorIcon::Credentials)
                .detail("action requires an active session")
        })
    }

    /// Action-style admin enforcement.
    pub fn require_admin_for_action(&self, cookies: &dyn CookieStore) -> Result<(), DomainError> {
        if self.is_admin(cookies) {
            Ok(())
        } else {
            Err(
                DomainError::with_intl(ErrorCode::UnauthorizedAction, admin_required())
                    .icon(ErrorIcon::Credentials)
                    .detail("action requires the admin role"),
            )
        }
    }

    /// Route-style enforcement: failure navigates instead of raising.
    pub fn require_logged_in_for_route(
        &self,
        cookies: &dyn CookieStore,
        path: &str,
    ) -> Result<SessionClaims, Redirect> {
        self.session
            .read(cookies)
            .ok_or_else(|| Redirect::temporary(path))
    }

    /// Route-style admin enforcement.
    pub fn require_admin_for_route(
        &self,
        cookies: &dyn CookieStore,
        path: &str,
    ) -> Result<SessionClaims, Redirect> {
        match self.session.read(cookies) {
            Some(claims) if claims.is_admin() => Ok(claims),
            _ => Err(Redirect::temporary(path)),
        }
    }
}
