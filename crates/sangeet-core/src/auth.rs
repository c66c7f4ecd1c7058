//! Authentication state as seen by the client.
//!
//! The user record and its role come from the hosted authentication
//! service. This module only reads them; nothing here mutates a role.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The role attribute stored on a user profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Student,
    Doctor,
    Astrologer,
    Admin,
    /// Any role this client does not know about.
    Other(String),
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Student => "student",
            Self::Doctor => "doctor",
            Self::Astrologer => "astrologer",
            Self::Admin => "admin",
            Self::Other(name) => name,
        }
    }

    /// Landing page of the role's own dashboard.
    #[must_use]
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Self::Student => "/student",
            Self::Doctor => "/doctor",
            Self::Astrologer => "/astrologer",
            Self::Admin => "/admin",
            Self::Other(_) => "/dashboard",
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        match value {
            "student" => Self::Student,
            "doctor" => Self::Doctor,
            "astrologer" => Self::Astrologer,
            "admin" => Self::Admin,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub role: Role,
}

impl AuthenticatedUser {
    #[must_use]
    pub fn new(uid: impl Into<String>, role: Role) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
            role,
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// Snapshot of the authentication context.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    pub user: Option<AuthenticatedUser>,
    pub is_loading: bool,
}

impl AuthStatus {
    /// Authentication has not resolved yet.
    #[must_use]
    pub const fn loading() -> Self {
        Self {
            user: None,
            is_loading: true,
        }
    }

    #[must_use]
    pub const fn signed_out() -> Self {
        Self {
            user: None,
            is_loading: false,
        }
    }

    #[must_use]
    pub const fn signed_in(user: AuthenticatedUser) -> Self {
        Self {
            user: Some(user),
            is_loading: false,
        }
    }

    #[must_use]
    pub fn role(&self) -> Option<&Role> {
        self.user.as_ref().map(|user| &user.role)
    }
}

/// Source of the current authentication status.
///
/// Hosts pass an implementation to the route guard explicitly instead of
/// the guard reaching for global state.
pub trait AuthContext {
    fn status(&self) -> AuthStatus;
}

impl AuthContext for AuthStatus {
    fn status(&self) -> AuthStatus {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_str() {
        assert_eq!(Role::from("student"), Role::Student);
        assert_eq!(Role::from("admin"), Role::Admin);
        assert_eq!(Role::from("nurse"), Role::Other("nurse".to_string()));
    }

    #[test]
    fn test_role_serde_round_trip() {
        let json = serde_json::to_string(&Role::Astrologer).unwrap();
        assert_eq!(json, "\"astrologer\"");

        let other: Role = serde_json::from_str("\"counsellor\"").unwrap();
        assert_eq!(other, Role::Other("counsellor".to_string()));
        assert_eq!(serde_json::to_string(&other).unwrap(), "\"counsellor\"");
    }

    #[test]
    fn test_dashboard_paths() {
        assert_eq!(Role::Doctor.dashboard_path(), "/doctor");
        assert_eq!(Role::Other("x".to_string()).dashboard_path(), "/dashboard");
    }

    #[test]
    fn test_status_constructors() {
        assert!(AuthStatus::loading().is_loading);
        assert!(AuthStatus::signed_out().user.is_none());

        let status = AuthStatus::signed_in(AuthenticatedUser::new("u1", Role::Student));
        assert_eq!(status.role(), Some(&Role::Student));
        assert!(!status.is_loading);
    }

    #[test]
    fn test_status_deserializes_context_shape() {
        let status: AuthStatus =
            serde_json::from_str(r#"{"user":{"uid":"u1","role":"doctor"},"isLoading":false}"#).unwrap();
        assert_eq!(status.role(), Some(&Role::Doctor));
    }
}
