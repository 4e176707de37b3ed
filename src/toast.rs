// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! One-shot toast presentation.
//!
//! A [`ToastGate`] is scoped to a single UI mount. The surrounding reactive
//! tree may push the same classified error through several re-renders; the
//! gate guarantees idempotent-per-mount presentation by latching after the
//! first non-silent bundle. Re-mounting means constructing a new gate.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use utoipa::ToSchema;

use crate::classify::ClassifiedError;
use crate::error::{ErrorCode, ErrorIcon};
use crate::i18n::Locale;

/// A toast resolved for one locale, ready to hand to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Toast {
    #[serde(rename = "type")]
    pub code: ErrorCode,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub icon: Option<ErrorIcon>,
}

/// Per-mount latch: the first non-silent bundle renders, everything after is
/// ignored for the lifetime of this instance.
#[derive(Debug, Default)]
pub struct ToastGate {
    shown: AtomicBool,
}

impl ToastGate {
    pub fn new() -> Self {
        Self {
            shown: AtomicBool::new(false),
        }
    }

    /// Consume one classified bundle.
    ///
    /// Returns the locale-resolved toast on the first non-silent call and
    /// `None` afterwards. Silent bundles are logged and never rendered; they
    /// do not consume the latch.
    pub fn present(&self, bundle: &ClassifiedError, locale: Locale) -> Option<Toast> {
        if bundle.meta.silent {
            tracing::warn!(code = %bundle.code, "silent error dropped from UI");
            return None;
        }

        if self
            .shown
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }

        Some(Toast {
            code: bundle.code,
            title: bundle.title.get(locale).to_string(),
            description: bundle.description.get(locale).to_string(),
            icon: bundle.icon,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify, Classification, Overrides, Raised};
    use crate::error::{DomainError, MessageKey};

    fn credentials_bundle() -> ClassifiedError {
        let raised = Raised::from(DomainError::with_key(
            ErrorCode::UnauthorizedAction,
            MessageKey::Credentials,
        ));
        match classify(&raised, &Overrides::default()) {
            Classification::Toast(bundle) => bundle,
            other => panic!("expected toast, got {other:?}"),
        }
    }

    fn silent_bundle() -> ClassifiedError {
        let raised = Raised::from(DomainError::silent(ErrorCode::DatabaseFind));
        match classify(&raised, &Overrides::default()) {
            Classification::Silent(bundle) => bundle,
            other => panic!("expected silent, got {other:?}"),
        }
    }

    #[test]
    fn first_bundle_renders_once() {
        let gate = ToastGate::new();
        let bundle = credentials_bundle();

        let toast = gate.present(&bundle, Locale::En).expect("first render");
        assert_eq!(toast.title, "Invalid credentials");
        assert_eq!(toast.description, "The provided credentials are incorrect.");
        assert_eq!(toast.icon, Some(ErrorIcon::Credentials));

        // Same bundle again: ignored.
        assert!(gate.present(&bundle, Locale::En).is_none());
    }

    #[test]
    fn different_bundle_is_still_ignored_after_latch() {
        let gate = ToastGate::new();
        let first = credentials_bundle();
        assert!(gate.present(&first, Locale::Es).is_some());

        let raised = Raised::from(DomainError::with_key(
            ErrorCode::SharedAction,
            MessageKey::TryAgainOrContact,
        ));
        let second = match classify(&raised, &Overrides::default()) {
            Classification::Toast(bundle) => bundle,
            other => panic!("expected toast, got {other:?}"),
        };
        assert!(gate.present(&second, Locale::Es).is_none());
    }

    #[test]
    fn new_gate_resets_the_latch() {
        let bundle = credentials_bundle();

        let gate = ToastGate::new();
        assert!(gate.present(&bundle, Locale::De).is_some());
        assert!(gate.present(&bundle, Locale::De).is_none());

        // Unmount + remount.
        let remounted = ToastGate::new();
        let toast = remounted.present(&bundle, Locale::De).expect("renders again");
        assert_eq!(toast.title, "Ungültige Anmeldedaten");
    }

    #[test]
    fn silent_bundles_never_render_and_never_latch() {
        let gate = ToastGate::new();
        assert!(gate.present(&silent_bundle(), Locale::En).is_none());

        // A later presentable bundle still renders.
        assert!(gate.present(&credentials_bundle(), Locale::En).is_some());
    }
}
