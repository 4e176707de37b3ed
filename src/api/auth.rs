// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication endpoints: challenge, login, logout, session.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{LoginChallenge, SessionClaims, SignedChallenge};
use crate::cookies::Cookies;
use crate::error::{DomainError, ErrorCode};
use crate::repository::{UserRecord, SIGNED_PAYLOAD_HEADER};
use crate::state::AppState;

/// Request for POST /v1/auth/challenge
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChallengeRequest {
    /// Wallet address that will sign the challenge
    pub address: String,
}

/// Response for POST /v1/auth/login
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub user: UserRecord,
    pub session: SessionClaims,
}

/// Response for GET /v1/auth/session
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionStatusResponse {
    pub logged_in: bool,
    pub is_admin: bool,
}

/// Pull the signed challenge out of the request headers. A missing header or
/// a header that does not parse as the challenge JSON is a client input
/// error, never an authentication failure.
pub(crate) fn signed_payload_from_headers(
    headers: &HeaderMap,
) -> Result<SignedChallenge, DomainError> {
    let raw = headers
        .get(SIGNED_PAYLOAD_HEADER)
        .ok_or_else(|| {
            DomainError::new(ErrorCode::InputParse)
                .entity("signed payload")
                .detail(format!("missing {SIGNED_PAYLOAD_HEADER} header"))
        })?
        .to_str()
        .map_err(|_| {
            DomainError::new(ErrorCode::InputParse)
                .entity("signed payload")
                .detail(format!("{SIGNED_PAYLOAD_HEADER} header is not valid UTF-8"))
        })?;

    serde_json::from_str(raw).map_err(|e| {
        DomainError::new(ErrorCode::InputParse)
            .entity("signed payload")
            .detail(format!("{SIGNED_PAYLOAD_HEADER} header is not a signed challenge: {e}"))
    })
}

/// Issue a fresh login challenge for a wallet address.
#[utoipa::path(
    post,
    path = "/v1/auth/challenge",
    tag = "Auth",
    request_body = ChallengeRequest,
    responses(
        (status = 200, description = "Challenge to sign", body = LoginChallenge),
        (status = 400, description = "Missing or empty address"),
    )
)]
pub async fn create_challenge(
    State(state): State<AppState>,
    Json(request): Json<ChallengeRequest>,
) -> Result<Json<LoginChallenge>, DomainError> {
    if request.address.trim().is_empty() {
        return Err(DomainError::new(ErrorCode::InputParse)
            .entity("challenge")
            .detail("address must not be empty"));
    }
    Ok(Json(state.challenges.generate(request.address)))
}

/// Exchange a signed challenge for a session.
///
/// The signed challenge travels in the `x-signed-payload` header. On success
/// the session token is set in the `jwt` cookie and the response carries the
/// user record plus the minted claims.
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    tag = "Auth",
    responses(
        (status = 200, description = "Session established", body = LoginResponse),
        (status = 400, description = "Malformed signed payload"),
        (status = 401, description = "Signature or credentials rejected"),
        (status = 502, description = "Backend unreachable"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    headers: HeaderMap,
) -> Result<Json<LoginResponse>, DomainError> {
    let signed = signed_payload_from_headers(&headers)?;
    let outcome = state.login.login(&cookies, &signed).await?;
    Ok(Json(LoginResponse {
        user: outcome.user,
        session: outcome.claims,
    }))
}

/// Drop the session cookie.
#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    tag = "Auth",
    responses(
        (status = 204, description = "Session cleared"),
    )
)]
pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> StatusCode {
    state.login.logout(&cookies);
    StatusCode::NO_CONTENT
}

/// Report whether the caller holds an active session and whether it is an
/// admin one. Never fails; an absent or invalid token reads as logged out.
#[utoipa::path(
    get,
    path = "/v1/auth/session",
    tag = "Auth",
    responses(
        (status = 200, description = "Session status", body = SessionStatusResponse),
    )
)]
pub async fn session(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Json<SessionStatusResponse> {
    Json(SessionStatusResponse {
        logged_in: state.guard.is_logged_in(&cookies),
        is_admin: state.guard.is_admin(&cookies),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::ChallengeIssuer;
    use axum::http::HeaderValue;

    fn signed() -> SignedChallenge {
        let issuer =
            ChallengeIssuer::new("example.com", "statement", "https://example.com", 600);
        SignedChallenge {
            signature: "0xabc".to_string(),
            payload: issuer.generate("0x123"),
        }
    }

    #[test]
    fn signed_payload_parses_from_the_header() {
        let signed = signed();
        let mut headers = HeaderMap::new();
        headers.insert(
            SIGNED_PAYLOAD_HEADER,
            HeaderValue::from_str(&serde_json::to_string(&signed).unwrap()).unwrap(),
        );
        assert_eq!(signed_payload_from_headers(&headers).unwrap(), signed);
    }

    #[test]
    fn missing_header_is_an_input_error() {
        let err = signed_payload_from_headers(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InputParse);
    }

    #[test]
    fn malformed_header_is_an_input_error() {
        let mut headers = HeaderMap::new();
        headers.insert(SIGNED_PAYLOAD_HEADER, HeaderValue::from_static("{broken"));
        let err = signed_payload_from_headers(&headers).unwrap_err();
        assert_eq!(err.code, ErrorCode::InputParse);
        assert_eq!(err.code.status_code(), StatusCode::BAD_REQUEST);
    }
}
