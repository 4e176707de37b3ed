// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Locale set and localized message bundles.
//!
//! Every user-facing message carries all supported locales. Partial bundles
//! are a data-integrity bug, so [`IntlMessage`] makes completeness structural:
//! one required field per locale, no fallback chains.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Supported locales. Closed set; adding a locale means adding a field to
/// [`IntlMessage`] and fixing every construction site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Spanish
    Es,
    /// English
    En,
    /// Catalan
    Ca,
    /// German
    De,
}

impl Locale {
    /// Parse a locale code (case-insensitive).
    pub fn from_str(s: &str) -> Option<Locale> {
        match s.to_lowercase().as_str() {
            "es" => Some(Locale::Es),
            "en" => Some(Locale::En),
            "ca" => Some(Locale::Ca),
            "de" => Some(Locale::De),
            _ => None,
        }
    }

    /// All supported locales.
    pub const ALL: [Locale; 4] = [Locale::Es, Locale::En, Locale::Ca, Locale::De];
}

impl Default for Locale {
    /// The icon heuristic and default titles key off Spanish, so it is the
    /// default locale.
    fn default() -> Self {
        Locale::Es
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locale::Es => write!(f, "es"),
            Locale::En => write!(f, "en"),
            Locale::Ca => write!(f, "ca"),
            Locale::De => write!(f, "de"),
        }
    }
}

/// A display string in every supported locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IntlMessage {
    pub es: String,
    pub en: String,
    pub ca: String,
    pub de: String,
}

impl IntlMessage {
    pub fn new(
        es: impl Into<String>,
        en: impl Into<String>,
        ca: impl Into<String>,
        de: impl Into<String>,
    ) -> Self {
        Self {
            es: es.into(),
            en: en.into(),
            ca: ca.into(),
            de: de.into(),
        }
    }

    /// Wrap a single string into every locale. Used when a raw, non-localized
    /// description has to travel through locale-aware presentation.
    pub fn uniform(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            es: text.clone(),
            en: text.clone(),
            ca: text.clone(),
            de: text,
        }
    }

    /// Resolve the string for one locale.
    pub fn get(&self, locale: Locale) -> &str {
        match locale {
            Locale::Es => &self.es,
            Locale::En => &self.en,
            Locale::Ca => &self.ca,
            Locale::De => &self.de,
        }
    }
}

/// Generic "Error" title used when nothing more specific is available.
pub fn generic_error_title() -> IntlMessage {
    IntlMessage::new("Error", "Error", "Error", "Fehler")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_parses_all_codes() {
        assert_eq!(Locale::from_str("es"), Some(Locale::Es));
        assert_eq!(Locale::from_str("EN"), Some(Locale::En));
        assert_eq!(Locale::from_str("Ca"), Some(Locale::Ca));
        assert_eq!(Locale::from_str("de"), Some(Locale::De));
        assert_eq!(Locale::from_str("fr"), None);
    }

    #[test]
    fn uniform_fills_every_locale() {
        let msg = IntlMessage::uniform("same text");
        for locale in Locale::ALL {
            assert_eq!(msg.get(locale), "same text");
        }
    }

    #[test]
    fn get_resolves_per_locale() {
        let msg = IntlMessage::new("hola", "hello", "hola", "hallo");
        assert_eq!(msg.get(Locale::En), "hello");
        assert_eq!(msg.get(Locale::De), "hallo");
    }

    #[test]
    fn serde_round_trip() {
        let msg = generic_error_title();
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"es":"Error","en":"Error","ca":"Error","de":"Fehler"}"#);
        let back: IntlMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }
}
