// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Profile image storage against the delegated file service.

use async_trait::async_trait;
use base64ct::{Base64, Encoding};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

use super::{ApiResponse, Endpoint};
use crate::error::{DomainError, ErrorCode, MessageKey};

/// A stored file: the key to delete it by and the public URL to serve it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StoredFile {
    pub key: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
struct UploadBody<'a> {
    file_name: &'a str,
    content: String,
}

/// Remote file storage. Uploads return the stored key/URL pair; deletes
/// report whether the key existed.
#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn upload(&self, file_name: &str, bytes: &[u8]) -> Result<StoredFile, DomainError>;

    async fn delete(&self, key: &str) -> Result<bool, DomainError>;
}

/// Storage backed by the file service HTTP API. File content travels
/// base64-encoded in a JSON body.
pub struct HttpFileStorage {
    http: Client,
    base_url: Url,
}

impl HttpFileStorage {
    pub fn new(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }
}

#[async_trait]
impl FileStorage for HttpFileStorage {
    async fn upload(&self, file_name: &str, bytes: &[u8]) -> Result<StoredFile, DomainError> {
        if file_name.trim().is_empty() || bytes.is_empty() {
            return Err(DomainError::new(ErrorCode::InputParse)
                .entity("file")
                .detail("upload requires a file name and non-empty content"));
        }

        let url = Endpoint::FileUpload.url(&self.base_url, None)?;
        let body = UploadBody {
            file_name,
            content: Base64::encode_string(bytes),
        };

        let response = self
            .http
            .request(Endpoint::FileUpload.method(), url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                DomainError::with_key(ErrorCode::DatabaseAction, MessageKey::TryAgainOrContact)
                    .entity("file")
                    .detail(format!("upload failed: {e}"))
            })?;

        if !response.status().is_success() {
            return Err(DomainError::with_key(
                ErrorCode::DatabaseAction,
                MessageKey::TryAgainOrContact,
            )
            .entity("file")
            .detail(format!("upload returned {}", response.status())));
        }

        let envelope: ApiResponse<StoredFile> = response.json().await.map_err(|e| {
            DomainError::with_key(ErrorCode::DatabaseAction, MessageKey::TryAgainOrContact)
                .entity("file")
                .detail(format!("invalid upload response: {e}"))
        })?;
        envelope.data.ok_or_else(|| {
            DomainError::with_key(ErrorCode::DatabaseAction, MessageKey::TryAgainOrContact)
                .entity("file")
                .detail("upload response carried no file")
        })
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let url = Endpoint::FileDelete.url(&self.base_url, Some(key))?;

        let response = self
            .http
            .request(Endpoint::FileDelete.method(), url)
            .send()
            .await
            .map_err(|e| {
                DomainError::with_key(ErrorCode::DatabaseAction, MessageKey::TryAgainOrContact)
                    .entity("file")
                    .detail(format!("delete failed: {e}"))
            })?;

        match response.status() {
            status if status.is_success() => Ok(true),
            reqwest::StatusCode::NOT_FOUND => Ok(false),
            status => Err(DomainError::with_key(
                ErrorCode::DatabaseAction,
                MessageKey::TryAgainOrContact,
            )
            .entity("file")
            .detail(format!("delete returned {status}"))),
        }
    }
}

/// In-memory storage for wiring tests.
#[cfg(test)]
pub struct MemoryFileStorage {
    pub files: std::sync::Mutex<std::collections::HashMap<String, Vec<u8>>>,
}

#[cfg(test)]
impl Default for MemoryFileStorage {
    fn default() -> Self {
        Self {
            files: std::sync::Mutex::new(std::collections::HashMap::new()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl FileStorage for MemoryFileStorage {
    async fn upload(&self, file_name: &str, bytes: &[u8]) -> Result<StoredFile, DomainError> {
        if file_name.trim().is_empty() || bytes.is_empty() {
            return Err(DomainError::new(ErrorCode::InputParse).entity("file"));
        }
        let key = format!("mem-{file_name}");
        self.files
            .lock()
            .unwrap()
            .insert(key.clone(), bytes.to_vec());
        Ok(StoredFile {
            url: format!("https://files.test/{key}"),
            key,
        })
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.files.lock().unwrap().remove(key).is_some())
    }
}
