// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Structured domain errors.
//!
//! Every failure raised in the request pipeline is wrapped into a
//! [`DomainError`]: a classification code plus a presentation hint
//! ([`FriendlyDesc`]). Low-level code never decides presentation; it only
//! attaches the code and the hint, and the classification engine in
//! [`crate::classify`] turns that into a rethrow/silent/toast decision.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

use crate::i18n::IntlMessage;

/// Wire-stable classification codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Authentication or authorization failure
    UnauthorizedAction,
    /// Upstream write/mutation failure
    DatabaseAction,
    /// Upstream lookup failure (network or not-found)
    DatabaseFind,
    /// Input could not be parsed into the expected shape
    InputParse,
    /// Missing or invalid environment configuration
    SetEnv,
    /// Anything else raised by shared actions
    SharedAction,
}

impl ErrorCode {
    /// HTTP status this code maps to at the API boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::UnauthorizedAction => StatusCode::UNAUTHORIZED,
            ErrorCode::InputParse => StatusCode::BAD_REQUEST,
            ErrorCode::DatabaseAction | ErrorCode::DatabaseFind => StatusCode::BAD_GATEWAY,
            ErrorCode::SetEnv | ErrorCode::SharedAction => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::UnauthorizedAction => "UNAUTHORIZED_ACTION",
            ErrorCode::DatabaseAction => "DATABASE_ACTION",
            ErrorCode::DatabaseFind => "DATABASE_FIND",
            ErrorCode::InputParse => "INPUT_PARSE",
            ErrorCode::SetEnv => "SET_ENV",
            ErrorCode::SharedAction => "SHARED_ACTION",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Predefined message keys with a fixed localized wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    /// "Server error, try again later or contact us"
    TryAgainOrContact,
    /// "Invalid credentials"
    Credentials,
    /// "Invalid credentials (demo mode)"
    CredentialsMock,
}

impl MessageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKey::TryAgainOrContact => "tryAgainOrContact",
            MessageKey::Credentials => "credentials",
            MessageKey::CredentialsMock => "credentials--mock",
        }
    }

    pub fn from_str(s: &str) -> Option<MessageKey> {
        match s {
            "tryAgainOrContact" => Some(MessageKey::TryAgainOrContact),
            "credentials" => Some(MessageKey::Credentials),
            "credentials--mock" => Some(MessageKey::CredentialsMock),
            _ => None,
        }
    }
}

/// Icon identifiers carried alongside toast-bound errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorIcon {
    /// Credentials/authentication failure
    Credentials,
    /// Server/network failure
    TryAgainOrContact,
    /// Generic alert
    AlertCircle,
}

impl ErrorIcon {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorIcon::Credentials => "credentials",
            ErrorIcon::TryAgainOrContact => "tryAgainOrContact",
            ErrorIcon::AlertCircle => "alert-circle",
        }
    }

    pub fn from_str(s: &str) -> Option<ErrorIcon> {
        match s {
            "credentials" => Some(ErrorIcon::Credentials),
            "tryAgainOrContact" => Some(ErrorIcon::TryAgainOrContact),
            "alert-circle" => Some(ErrorIcon::AlertCircle),
            _ => None,
        }
    }
}

impl Serialize for ErrorIcon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ErrorIcon {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ErrorIcon::from_str(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown error icon: {s}")))
    }
}

/// The presentation hint on a [`DomainError`].
///
/// Three tiers let code that cannot know the UI locale still express a
/// presentation intent:
/// - [`FriendlyDesc::Silent`] (wire `"d"`): suppress the toast, log only
/// - [`FriendlyDesc::Key`]: use the standard wording for a predefined key
/// - [`FriendlyDesc::Intl`]: here is the exact multi-locale text
///
/// Strings that are not `"d"` and not a recognized key survive as
/// [`FriendlyDesc::Raw`]; classification falls back to a generic title around
/// them.
#[derive(Debug, Clone, PartialEq)]
pub enum FriendlyDesc {
    Silent,
    Key(MessageKey),
    Raw(String),
    Intl(IntlMessage),
}

impl FriendlyDesc {
    fn from_text(text: String) -> FriendlyDesc {
        if text == "d" {
            FriendlyDesc::Silent
        } else if let Some(key) = MessageKey::from_str(&text) {
            FriendlyDesc::Key(key)
        } else {
            FriendlyDesc::Raw(text)
        }
    }
}

impl Serialize for FriendlyDesc {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FriendlyDesc::Silent => serializer.serialize_str("d"),
            FriendlyDesc::Key(key) => serializer.serialize_str(key.as_str()),
            FriendlyDesc::Raw(text) => serializer.serialize_str(text),
            FriendlyDesc::Intl(msg) => msg.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for FriendlyDesc {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Text(String),
            Intl(IntlMessage),
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::Text(text) => FriendlyDesc::from_text(text),
            Wire::Intl(msg) => FriendlyDesc::Intl(msg),
        })
    }
}

/// Supplemental context attached at the point of failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorMeta {
    /// Entity the failing operation was acting on (for logs)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    /// Localized title override used by classification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<IntlMessage>,
    /// Free-form server-side detail, never shown to users
    #[serde(rename = "optionalMessage", skip_serializing_if = "Option::is_none")]
    pub optional_message: Option<String>,
    /// Explicit icon, wins over the text heuristic
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub icon: Option<ErrorIcon>,
    /// Set by classification for silent errors
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub silent: bool,
}

/// Structured failure carrying a classification code and a presentation hint.
///
/// Immutable once created. `friendly == None` always escalates to the
/// top-level failure boundary; it is never silenced and never shown as a
/// toast.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainError {
    pub code: ErrorCode,
    pub friendly: Option<FriendlyDesc>,
    pub meta: ErrorMeta,
    /// Milliseconds since the Unix epoch, set at creation.
    pub timestamp: i64,
}

impl DomainError {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            friendly: None,
            meta: ErrorMeta::default(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn with_key(code: ErrorCode, key: MessageKey) -> Self {
        Self {
            friendly: Some(FriendlyDesc::Key(key)),
            ..Self::new(code)
        }
    }

    pub fn with_intl(code: ErrorCode, message: IntlMessage) -> Self {
        Self {
            friendly: Some(FriendlyDesc::Intl(message)),
            ..Self::new(code)
        }
    }

    /// Error that must be logged but never surfaced to the user.
    pub fn silent(code: ErrorCode) -> Self {
        Self {
            friendly: Some(FriendlyDesc::Silent),
            ..Self::new(code)
        }
    }

    pub fn entity(mut self, entity: impl Into<String>) -> Self {
        self.meta.entity = Some(entity.into());
        self
    }

    pub fn desc(mut self, desc: IntlMessage) -> Self {
        self.meta.desc = Some(desc);
        self
    }

    pub fn detail(mut self, message: impl Into<String>) -> Self {
        self.meta.optional_message = Some(message.into());
        self
    }

    pub fn icon(mut self, icon: ErrorIcon) -> Self {
        self.meta.icon = Some(icon);
        self
    }

    /// Serialize into the server-to-client wire form.
    pub fn to_wire(&self) -> WireError {
        WireError {
            code: self.code,
            friendly: self.friendly.clone(),
            meta: if self.meta == ErrorMeta::default() {
                None
            } else {
                Some(self.meta.clone())
            },
            timestamp: self.timestamp,
        }
    }

    /// Reconstruct from the wire form. The result carries enough information
    /// for classification; server-side-only context does not survive the
    /// trip.
    pub fn from_wire(wire: WireError) -> Self {
        Self {
            code: wire.code,
            friendly: wire.friendly,
            meta: wire.meta.unwrap_or_default(),
            timestamp: wire.timestamp,
        }
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.meta.entity, &self.meta.optional_message) {
            (Some(entity), Some(msg)) => write!(f, "{} [{entity}]: {msg}", self.code),
            (None, Some(msg)) => write!(f, "{}: {msg}", self.code),
            (Some(entity), None) => write!(f, "{} [{entity}]", self.code),
            (None, None) => write!(f, "{}", self.code),
        }
    }
}

impl std::error::Error for DomainError {}

/// JSON-serializable form of a [`DomainError`].
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WireError {
    #[serde(rename = "type")]
    pub code: ErrorCode,
    #[serde(rename = "friendlyDesc", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<serde_json::Value>)]
    pub friendly: Option<FriendlyDesc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ErrorMeta>,
    pub timestamp: i64,
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let status = self.code.status_code();
        // Silent and escalating errors still have to be observable in logs.
        if status.is_server_error() {
            tracing::error!(code = %self.code, error = %self, "request failed");
        } else {
            tracing::warn!(code = %self.code, error = %self, "request rejected");
        }
        (status, Json(self.to_wire())).into_response()
    }
}
