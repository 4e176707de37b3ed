// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints. All of them are guarded actions: a missing or invalid
//! session raises, it never redirects here.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use base64ct::{Base64, Encoding};
use serde::Deserialize;
use utoipa::ToSchema;

use super::auth::signed_payload_from_headers;
use crate::auth::SignedChallenge;
use crate::cookies::{CookieStore, Cookies, JWT_COOKIE};
use crate::error::{DomainError, ErrorCode};
use crate::repository::{FileStorage, StoredFile, UserRecord, UserRepository, UserUpdate};
use crate::state::AppState;

/// Request for PUT /v1/users/me. Absent fields are left untouched.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMeRequest {
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Request for POST /v1/users/me/img.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadImageRequest {
    pub file_name: String,
    /// Base64-encoded file content
    pub content: String,
}

/// Request for DELETE /v1/users/{id}.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteUserRequest {
    /// Wallet address of the account being removed
    pub address: String,
}

/// Storage key of a previously stored file, derived from its public URL.
fn file_key_from_url(url: &str) -> Option<&str> {
    url.rsplit('/').next().filter(|key| !key.is_empty())
}

/// Store a new profile image and persist its URL on the user record.
///
/// If persisting fails, the freshly uploaded file would be unreachable, so it
/// is deleted best-effort before the error propagates. The replaced file is
/// only dropped once the new URL is persisted.
async fn replace_profile_image(
    users: &dyn UserRepository,
    storage: &dyn FileStorage,
    user_id: &str,
    file_name: &str,
    bytes: &[u8],
    signed: &SignedChallenge,
    token: Option<&str>,
) -> Result<StoredFile, DomainError> {
    let previous = users.read_by_id(user_id, token).await?;
    let stored = storage.upload(file_name, bytes).await?;

    let changes = UserUpdate {
        id: user_id.to_string(),
        nick: None,
        img: Some(stored.url.clone()),
        email: None,
    };
    if let Err(update_err) = users.update(&changes, signed, token).await {
        if let Err(e) = storage.delete(&stored.key).await {
            tracing::warn!(key = %stored.key, error = %e, "failed to delete unpersisted upload");
        }
        return Err(update_err);
    }

    // The old file is unreferenced now; losing it is not worth failing the
    // upload over.
    if let Some(key) = previous.img.as_deref().and_then(file_key_from_url) {
        if let Err(e) = storage.delete(key).await {
            tracing::warn!(key, error = %e, "failed to delete replaced image");
        }
    }

    Ok(stored)
}

/// Current user's backend record.
#[utoipa::path(
    get,
    path = "/v1/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "User record", body = UserRecord),
        (status = 401, description = "No active session"),
        (status = 502, description = "Backend unreachable"),
    )
)]
pub async fn get_me(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Json<UserRecord>, DomainError> {
    let claims = state.guard.require_logged_in_for_action(&cookies)?;
    let token = cookies.get(JWT_COOKIE);
    let record = state
        .users
        .read_by_id(&claims.ctx.id, token.as_deref())
        .await?;
    Ok(Json(record))
}

/// Update the current user's profile. The changes are re-authorized by the
/// backend via the signed payload header.
#[utoipa::path(
    put,
    path = "/v1/users/me",
    tag = "Users",
    request_body = UpdateMeRequest,
    responses(
        (status = 200, description = "Updated record", body = UserRecord),
        (status = 400, description = "Malformed signed payload"),
        (status = 401, description = "No active session"),
        (status = 502, description = "Backend rejected or unreachable"),
    )
)]
pub async fn update_me(
    State(state): State<AppState>,
    cookies: Cookies,
    headers: HeaderMap,
    Json(request): Json<UpdateMeRequest>,
) -> Result<Json<UserRecord>, DomainError> {
    let claims = state.guard.require_logged_in_for_action(&cookies)?;
    let signed = signed_payload_from_headers(&headers)?;
    let token = cookies.get(JWT_COOKIE);

    // The target id always comes from the session, never from the body.
    let changes = UserUpdate {
        id: claims.ctx.id,
        nick: request.nick,
        img: request.img,
        email: request.email,
    };
    let record = state.users.update(&changes, &signed, token.as_deref()).await?;
    Ok(Json(record))
}

/// Upload a new profile image, persist its URL and drop the replaced file.
#[utoipa::path(
    post,
    path = "/v1/users/me/img",
    tag = "Users",
    request_body = UploadImageRequest,
    responses(
        (status = 200, description = "Stored file", body = StoredFile),
        (status = 400, description = "Malformed content or signed payload"),
        (status = 401, description = "No active session"),
        (status = 502, description = "Storage or backend failure"),
    )
)]
pub async fn upload_img(
    State(state): State<AppState>,
    cookies: Cookies,
    headers: HeaderMap,
    Json(request): Json<UploadImageRequest>,
) -> Result<Json<StoredFile>, DomainError> {
    let claims = state.guard.require_logged_in_for_action(&cookies)?;
    let signed = signed_payload_from_headers(&headers)?;
    let token = cookies.get(JWT_COOKIE);

    let bytes = Base64::decode_vec(&request.content).map_err(|e| {
        DomainError::new(ErrorCode::InputParse)
            .entity("file")
            .detail(format!("content is not valid base64: {e}"))
    })?;

    let stored = replace_profile_image(
        state.users.as_ref(),
        state.storage.as_ref(),
        &claims.ctx.id,
        &request.file_name,
        &bytes,
        &signed,
        token.as_deref(),
    )
    .await?;

    Ok(Json(stored))
}

/// Remove a user account. Admin only.
#[utoipa::path(
    delete,
    path = "/v1/users/{id}",
    tag = "Users",
    request_body = DeleteUserRequest,
    params(
        ("id" = String, Path, description = "Backend user id")
    ),
    responses(
        (status = 204, description = "User removed"),
        (status = 400, description = "Malformed signed payload"),
        (status = 401, description = "Not an admin session"),
        (status = 502, description = "Backend rejected or unreachable"),
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    cookies: Cookies,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<DeleteUserRequest>,
) -> Result<StatusCode, DomainError> {
    state.guard.require_admin_for_action(&cookies)?;
    let signed = signed_payload_from_headers(&headers)?;
    let token = cookies.get(JWT_COOKIE);
    state
        .users
        .delete_by_id(&id, &request.address, &signed, token.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
