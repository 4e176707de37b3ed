// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Clients for the delegated backend services.
//!
//! Every endpoint the backend exposes is listed in a static table here; a
//! request can only target an endpoint this module names. Signed operations
//! carry the wallet-signed challenge in the `x-signed-payload` header so the
//! backend can re-check authorization independently of this service.

pub mod files;
pub mod users;

pub use files::{FileStorage, HttpFileStorage, StoredFile};
pub use users::{ApiUserRepository, UserRecord, UserRepository, UserUpdate};

use reqwest::Method;
use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

use crate::error::{DomainError, ErrorCode};
use crate::i18n::IntlMessage;

/// Header carrying the JSON-serialized signed challenge.
pub const SIGNED_PAYLOAD_HEADER: &str = "x-signed-payload";

/// Backend endpoints this service is allowed to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    UserLogin,
    UserReadById,
    UserUpdate,
    UserDelete,
    FileUpload,
    FileDelete,
}

impl Endpoint {
    pub fn method(self) -> Method {
        match self {
            Endpoint::UserLogin | Endpoint::FileUpload => Method::POST,
            Endpoint::UserReadById => Method::GET,
            Endpoint::UserUpdate => Method::PUT,
            Endpoint::UserDelete | Endpoint::FileDelete => Method::DELETE,
        }
    }

    fn path(self) -> &'static str {
        match self {
            Endpoint::UserLogin | Endpoint::UserUpdate | Endpoint::UserDelete => "user",
            Endpoint::UserReadById => "user/{id}",
            Endpoint::FileUpload => "file",
            Endpoint::FileDelete => "file/{id}",
        }
    }

    /// Resolve against a base URL, substituting `{id}` when a parameter is
    /// given. Endpoints without a placeholder reject a parameter.
    pub fn url(self, base: &Url, param: Option<&str>) -> Result<Url, DomainError> {
        let path = match (self.path().contains("{id}"), param) {
            (true, Some(param)) => self.path().replace("{id}", param),
            (false, None) => self.path().to_string(),
            (true, None) => {
                return Err(DomainError::new(ErrorCode::SharedAction)
                    .entity("endpoint table")
                    .detail(format!("endpoint {self:?} requires a parameter")))
            }
            (false, Some(_)) => {
                return Err(DomainError::new(ErrorCode::SharedAction)
                    .entity("endpoint table")
                    .detail(format!("endpoint {self:?} takes no parameter")))
            }
        };
        base.join(&path).map_err(|e| {
            DomainError::new(ErrorCode::SharedAction)
                .entity("endpoint table")
                .detail(format!("invalid endpoint URL for {self:?}: {e}"))
        })
    }
}

/// Envelope the backend wraps every payload in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

/// The backend could not be reached at all. Distinct wording from an
/// authentication rejection so callers can keep the two failure modes apart.
pub(crate) fn connection_error(entity: &str) -> DomainError {
    DomainError::with_intl(
        ErrorCode::DatabaseFind,
        IntlMessage::new(
            "No se pudo conectar con el servidor de autenticación.",
            "Could not connect to authentication server.",
            "No s'ha pogut connectar amb el servidor d'autenticació.",
            "Verbindung zum Authentifizierungsserver fehlgeschlagen.",
        ),
    )
    .entity(entity)
    .desc(IntlMessage::new(
        "Error de conexión",
        "Connection error",
        "Error de connexió",
        "Verbindungsfehler",
    ))
}
