// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User roles carried inside the session token.
///
/// Only `Admin` grants privilege elevation; everything else is an ordinary
/// authenticated user. Arbitrary strings arriving from the backend
/// deserialize to `Unknown` instead of failing the whole token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Full administrative access
    Admin,
    /// Normal registered user
    Member,
    /// Unrecognized role string, never privileged
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Parse a role from its wire string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Role> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Some(Role::Admin),
            "MEMBER" => Some(Role::Member),
            _ => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "ADMIN"),
            Role::Member => write!(f, "MEMBER"),
            Role::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admin_is_privileged() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::Member.is_admin());
        assert!(!Role::Unknown.is_admin());
    }

    #[test]
    fn from_str_parses_case_insensitively() {
        assert_eq!(Role::from_str("admin"), Some(Role::Admin));
        assert_eq!(Role::from_str("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::from_str("Member"), Some(Role::Member));
        assert_eq!(Role::from_str("superuser"), None);
    }

    #[test]
    fn arbitrary_wire_strings_deserialize_to_unknown() {
        let role: Role = serde_json::from_str(r#""ADMIN""#).unwrap();
        assert_eq!(role, Role::Admin);
        let role: Role = serde_json::from_str(r#""TOTALLY_MADE_UP""#).unwrap();
        assert_eq!(role, Role::Unknown);
    }
}
