// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Error classification engine.
//!
//! [`classify`] is the single place where presentation is decided: every
//! raised value maps to exactly one of rethrow, silent, or toast. Call sites
//! never inspect `friendly` themselves; they hand the raised value over and
//! act on the returned [`Classification`].
//!
//! ## Decision table (first match wins)
//!
//! 1. Not a [`DomainError`] -> rethrow to the top-level boundary
//! 2. `friendly == None` -> rethrow
//! 3. `friendly == Silent` -> silent bundle with `meta.silent = true`
//! 4. `friendly` is a string key -> predefined wording (generic fallback for
//!    unrecognized keys)
//! 5. `friendly` is a locale map -> icon by explicit `meta.icon`, else the
//!    Spanish-prefix heuristic on `meta.desc`, else alert-circle
//!
//! Caller-supplied overrides always win over steps 4-5.

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{DomainError, ErrorCode, ErrorIcon, ErrorMeta, FriendlyDesc, MessageKey};
use crate::i18n::{generic_error_title, IntlMessage};

/// A value raised somewhere in the pipeline, discriminated up front instead
/// of duck-typed at the classification site.
#[derive(Debug)]
pub enum Raised {
    Domain(DomainError),
    /// Anything that is not a structured domain error.
    Other(String),
}

impl From<DomainError> for Raised {
    fn from(err: DomainError) -> Self {
        Raised::Domain(err)
    }
}

/// Fully resolved, locale-ready presentation bundle. Never persisted; lives
/// for the duration of one render.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ClassifiedError {
    #[serde(rename = "type")]
    pub code: ErrorCode,
    pub title: IntlMessage,
    pub description: IntlMessage,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub icon: Option<ErrorIcon>,
    pub meta: ErrorMeta,
    pub timestamp: i64,
}

/// What the caller must do with a raised value.
#[derive(Debug, PartialEq)]
pub enum Classification {
    /// Escalate to the top-level failure boundary, never swallow.
    Throw,
    /// Drop from the UI; the bundle exists for logging only.
    Silent(ClassifiedError),
    /// Render exactly once per mount.
    Toast(ClassifiedError),
}

/// Optional call-site wording, winning over predefined and embedded text.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub title: Option<IntlMessage>,
    pub description: Option<IntlMessage>,
}

struct PredefinedMessage {
    icon: ErrorIcon,
    title: IntlMessage,
    description: IntlMessage,
}

/// Fixed wording for the predefined message keys, complete in every locale.
fn predefined_message(key: MessageKey) -> PredefinedMessage {
    match key {
        MessageKey::TryAgainOrContact => PredefinedMessage {
            icon: ErrorIcon::TryAgainOrContact,
            title: IntlMessage::new(
                "Error del servidor",
                "Server error",
                "Error del servidor",
                "Serverfehler",
            ),
            description: IntlMessage::new(
                "Inténtalo de nuevo más tarde o contáctanos si persiste.",
                "Try again later or contact us if it persists.",
                "Torna-ho a provar més tard o contacta'ns si persisteix.",
                "Versuche es später erneut oder kontaktiere uns.",
            ),
        },
        MessageKey::Credentials => PredefinedMessage {
            icon: ErrorIcon::Credentials,
            title: IntlMessage::new(
                "Credenciales inválidas",
                "Invalid credentials",
                "Credencials invàlides",
                "Ungültige Anmeldedaten",
            ),
            description: IntlMessage::new(
                "Las credenciales proporcionadas no son correctas.",
                "The provided credentials are incorrect.",
                "Les credencials proporcionades no són correctes.",
                "Die angegebenen Anmeldedaten sind falsch.",
            ),
        },
        MessageKey::CredentialsMock => PredefinedMessage {
            icon: ErrorIcon::Credentials,
            title: IntlMessage::new(
                "Credenciales inválidas",
                "Invalid credentials",
                "Credencials invàlides",
                "Ungültige Anmeldedaten",
            ),
            description: IntlMessage::new(
                "Credenciales inválidas (modo demostración).",
                "Invalid credentials (demo mode).",
                "Credencials invàlides (mode demostració).",
                "Ungültige Anmeldedaten (Demomodus).",
            ),
        },
    }
}

/// Icon for a locale-map description: explicit `meta.icon` wins, then the
/// Spanish prefix of `meta.desc`, then the generic alert.
fn resolve_icon(meta: &ErrorMeta) -> ErrorIcon {
    if let Some(icon) = meta.icon {
        return icon;
    }
    if let Some(desc) = &meta.desc {
        let prefix = desc.es.to_lowercase();
        if prefix.starts_with("credencial") {
            return ErrorIcon::Credentials;
        }
        if prefix.starts_with("ups") {
            return ErrorIcon::TryAgainOrContact;
        }
    }
    ErrorIcon::AlertCircle
}

/// Map a raised value to its presentation fate.
pub fn classify(raised: &Raised, overrides: &Overrides) -> Classification {
    let err = match raised {
        Raised::Domain(err) => err,
        Raised::Other(detail) => {
            tracing::error!(detail, "unclassified error escalated");
            return Classification::Throw;
        }
    };

    let friendly = match &err.friendly {
        Some(friendly) => friendly,
        None => return Classification::Throw,
    };

    match friendly {
        FriendlyDesc::Silent => {
            let mut meta = err.meta.clone();
            meta.silent = true;
            tracing::debug!(code = %err.code, "silent error classified");
            Classification::Silent(ClassifiedError {
                code: err.code,
                title: IntlMessage::uniform(""),
                description: IntlMessage::uniform("d"),
                icon: None,
                meta,
                timestamp: err.timestamp,
            })
        }
        FriendlyDesc::Key(key) => {
            let predefined = predefined_message(*key);
            Classification::Toast(ClassifiedError {
                code: err.code,
                title: overrides.title.clone().unwrap_or(predefined.title),
                description: overrides
                    .description
                    .clone()
                    .unwrap_or(predefined.description),
                icon: Some(predefined.icon),
                meta: err.meta.clone(),
                timestamp: err.timestamp,
            })
        }
        FriendlyDesc::Raw(text) => Classification::Toast(ClassifiedError {
            code: err.code,
            title: overrides.title.clone().unwrap_or_else(generic_error_title),
            description: overrides
                .description
                .clone()
                .unwrap_or_else(|| IntlMessage::uniform(text.clone())),
            icon: Some(ErrorIcon::AlertCircle),
            meta: err.meta.clone(),
            timestamp: err.timestamp,
        }),
        FriendlyDesc::Intl(message) => Classification::Toast(ClassifiedError {
            code: err.code,
            title: overrides
                .title
                .clone()
                .or_else(|| err.meta.desc.clone())
                .unwrap_or_else(generic_error_title),
            description: overrides.description.clone().unwrap_or_else(|| message.clone()),
            icon: Some(resolve_icon(&err.meta)),
            meta: err.meta.clone(),
            timestamp: err.timestamp,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Locale;

    fn classify_plain(raised: &Raised) -> Classification {
        classify(raised, &Overrides::default())
    }

    #[test]
    fn non_domain_errors_escalate() {
        let raised = Raised::Other("connection reset by peer".to_string());
        assert_eq!(classify_plain(&raised), Classification::Throw);
    }

    #[test]
    fn missing_friendly_desc_escalates() {
        let raised = Raised::from(DomainError::new(ErrorCode::SharedAction));
        assert_eq!(classify_plain(&raised), Classification::Throw);
    }

    #[test]
    fn silent_marker_produces_silent_bundle() {
        let raised = Raised::from(DomainError::silent(ErrorCode::DatabaseFind));
        match classify_plain(&raised) {
            Classification::Silent(bundle) => {
                assert!(bundle.meta.silent);
                assert_eq!(bundle.code, ErrorCode::DatabaseFind);
            }
            other => panic!("expected silent, got {other:?}"),
        }
    }

    #[test]
    fn predefined_keys_resolve_full_table() {
        let cases = [
            (MessageKey::TryAgainOrContact, ErrorIcon::TryAgainOrContact),
            (MessageKey::Credentials, ErrorIcon::Credentials),
            (MessageKey::CredentialsMock, ErrorIcon::Credentials),
        ];
        for (key, expected_icon) in cases {
            let raised = Raised::from(DomainError::with_key(ErrorCode::UnauthorizedAction, key));
            match classify_plain(&raised) {
                Classification::Toast(bundle) => {
                    assert_eq!(bundle.icon, Some(expected_icon));
                    let expected = predefined_message(key);
                    for locale in Locale::ALL {
                        assert_eq!(bundle.title.get(locale), expected.title.get(locale));
                        assert_eq!(
                            bundle.description.get(locale),
                            expected.description.get(locale)
                        );
                        assert!(!bundle.title.get(locale).is_empty());
                    }
                }
                other => panic!("expected toast, got {other:?}"),
            }
        }
    }

    #[test]
    fn unrecognized_key_falls_back_to_generic_title() {
        let err = DomainError {
            friendly: Some(FriendlyDesc::Raw("backend exploded".to_string())),
            ..DomainError::new(ErrorCode::SharedAction)
        };
        match classify_plain(&Raised::from(err)) {
            Classification::Toast(bundle) => {
                assert_eq!(bundle.title, generic_error_title());
                assert_eq!(bundle.description, IntlMessage::uniform("backend exploded"));
                assert_eq!(bundle.icon, Some(ErrorIcon::AlertCircle));
            }
            other => panic!("expected toast, got {other:?}"),
        }
    }

    #[test]
    fn intl_desc_uses_meta_desc_as_title() {
        let description = IntlMessage::new("desc es", "desc en", "desc ca", "desc de");
        let title = IntlMessage::new("titulo", "title", "títol", "Titel");
        let err = DomainError::with_intl(ErrorCode::DatabaseFind, description.clone())
            .desc(title.clone());
        match classify_plain(&Raised::from(err)) {
            Classification::Toast(bundle) => {
                assert_eq!(bundle.title, title);
                assert_eq!(bundle.description, description);
                assert_eq!(bundle.icon, Some(ErrorIcon::AlertCircle));
            }
            other => panic!("expected toast, got {other:?}"),
        }
    }

    #[test]
    fn explicit_meta_icon_wins_over_heuristic() {
        let err = DomainError::with_intl(
            ErrorCode::DatabaseFind,
            IntlMessage::uniform("anything"),
        )
        .desc(IntlMessage::uniform("Credenciales inválidas"))
        .icon(ErrorIcon::TryAgainOrContact);
        match classify_plain(&Raised::from(err)) {
            Classification::Toast(bundle) => {
                assert_eq!(bundle.icon, Some(ErrorIcon::TryAgainOrContact));
            }
            other => panic!("expected toast, got {other:?}"),
        }
    }

    #[test]
    fn heuristic_matches_spanish_prefixes() {
        let credential_err = DomainError::with_intl(
            ErrorCode::UnauthorizedAction,
            IntlMessage::uniform("body"),
        )
        .desc(IntlMessage::uniform("Credencial caducada"));
        match classify_plain(&Raised::from(credential_err)) {
            Classification::Toast(bundle) => {
                assert_eq!(bundle.icon, Some(ErrorIcon::Credentials))
            }
            other => panic!("expected toast, got {other:?}"),
        }

        let server_err =
            DomainError::with_intl(ErrorCode::SharedAction, IntlMessage::uniform("body"))
                .desc(IntlMessage::uniform("Ups, ha ocurrido un error"));
        match classify_plain(&Raised::from(server_err)) {
            Classification::Toast(bundle) => {
                assert_eq!(bundle.icon, Some(ErrorIcon::TryAgainOrContact))
            }
            other => panic!("expected toast, got {other:?}"),
        }
    }

    #[test]
    fn overrides_win_over_predefined_wording() {
        let raised = Raised::from(DomainError::with_key(
            ErrorCode::UnauthorizedAction,
            MessageKey::Credentials,
        ));
        let overrides = Overrides {
            title: Some(IntlMessage::uniform("custom title")),
            description: Some(IntlMessage::uniform("custom description")),
        };
        match classify(&raised, &overrides) {
            Classification::Toast(bundle) => {
                assert_eq!(bundle.title, IntlMessage::uniform("custom title"));
                assert_eq!(bundle.description, IntlMessage::uniform("custom description"));
                // The icon still comes from the key.
                assert_eq!(bundle.icon, Some(ErrorIcon::Credentials));
            }
            other => panic!("expected toast, got {other:?}"),
        }
    }

    #[test]
    fn overrides_win_over_embedded_intl_text() {
        let err = DomainError::with_intl(
            ErrorCode::DatabaseFind,
            IntlMessage::uniform("embedded"),
        );
        let overrides = Overrides {
            title: None,
            description: Some(IntlMessage::uniform("call-site text")),
        };
        match classify(&Raised::from(err), &overrides) {
            Classification::Toast(bundle) => {
                assert_eq!(bundle.description, IntlMessage::uniform("call-site text"));
                assert_eq!(bundle.title, generic_error_title());
            }
            other => panic!("expected toast, got {other:?}"),
        }
    }
}
