// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-request cookie store.
//!
//! The session subsystem only needs one primitive: a key/value store scoped
//! to a single request/response cycle. [`CookieStore`] is that contract;
//! [`Cookies`] is the axum-backed implementation, populated from the `Cookie`
//! header by [`cookie_layer`] and flushed as `Set-Cookie` headers when the
//! response leaves the middleware.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRequestParts, Request},
    http::{
        header::{COOKIE, SET_COOKIE},
        request::Parts,
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::Response,
};

use crate::error::{DomainError, ErrorCode};

/// The only cookie key owned by this service.
pub const JWT_COOKIE: &str = "jwt";

/// Request-scoped string key/value store.
pub trait CookieStore: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&self, name: &str, value: String);
    fn delete(&self, name: &str);
}

#[derive(Debug)]
enum Pending {
    Set { name: String, value: String },
    Delete { name: String },
}

#[derive(Debug, Default)]
struct Inner {
    values: HashMap<String, String>,
    pending: Vec<Pending>,
}

/// Cookie store backing one HTTP request.
///
/// Reads observe writes made earlier in the same request, which is what the
/// session issuer's read-after-write self-check relies on.
#[derive(Debug, Clone, Default)]
pub struct Cookies {
    inner: Arc<Mutex<Inner>>,
}

impl Cookies {
    /// Parse the incoming `Cookie` header(s).
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut values = HashMap::new();
        for header in headers.get_all(COOKIE) {
            let Ok(raw) = header.to_str() else { continue };
            for pair in raw.split(';') {
                if let Some((name, value)) = pair.trim().split_once('=') {
                    values.insert(name.trim().to_string(), value.trim().to_string());
                }
            }
        }
        Self {
            inner: Arc::new(Mutex::new(Inner {
                values,
                pending: Vec::new(),
            })),
        }
    }

    /// Flush queued writes as `Set-Cookie` response headers.
    pub fn apply(&self, headers: &mut HeaderMap) {
        let mut inner = self.inner.lock().expect("cookie store poisoned");
        for op in inner.pending.drain(..) {
            let cookie = match op {
                Pending::Set { name, value } => {
                    format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax")
                }
                Pending::Delete { name } => {
                    format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
                }
            };
            if let Ok(header) = HeaderValue::from_str(&cookie) {
                headers.append(SET_COOKIE, header);
            }
        }
    }
}

impl CookieStore for Cookies {
    fn get(&self, name: &str) -> Option<String> {
        self.inner
            .lock()
            .expect("cookie store poisoned")
            .values
            .get(name)
            .cloned()
    }

    fn set(&self, name: &str, value: String) {
        let mut inner = self.inner.lock().expect("cookie store poisoned");
        inner.values.insert(name.to_string(), value.clone());
        inner.pending.push(Pending::Set {
            name: name.to_string(),
            value,
        });
    }

    fn delete(&self, name: &str) {
        let mut inner = self.inner.lock().expect("cookie store poisoned");
        inner.values.remove(name);
        inner.pending.push(Pending::Delete {
            name: name.to_string(),
        });
    }
}

/// Middleware that installs a [`Cookies`] store into request extensions and
/// applies its queued writes to the outgoing response.
pub async fn cookie_layer(mut request: Request, next: Next) -> Response {
    let cookies = Cookies::from_headers(request.headers());
    request.extensions_mut().insert(cookies.clone());
    let mut response = next.run(request).await;
    cookies.apply(response.headers_mut());
    response
}

impl<S: Send + Sync> FromRequestParts<S> for Cookies {
    type Rejection = DomainError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Cookies>().cloned().ok_or_else(|| {
            DomainError::new(ErrorCode::SharedAction).detail("cookie layer not installed")
        })
    }
}

/// In-memory store for tests; same semantics, no HTTP attached.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryCookieStore {
    values: Mutex<HashMap<String, String>>,
}

#[cfg(test)]
impl CookieStore for MemoryCookieStore {
    fn get(&self, name: &str) -> Option<String> {
        self.values.lock().unwrap().get(name).cloned()
    }

    fn set(&self, name: &str, value: String) {
        self.values.lock().unwrap().insert(name.to_string(), value);
    }

    fn delete(&self, name: &str) {
        self.values.lock().unwrap().remove(name);
    }
}
