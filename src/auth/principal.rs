use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Access role carried by every user account and every token.
///
/// Serialized in upper case (`"USER"`, `"ADMIN"`) both in JWT claims and in
/// the `role` column of the `users` table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Returned when a stored or transmitted role string is not recognised.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown role `{0}`")]
pub struct UnknownRole(pub String);

/// An authenticated identity derived from a verified token.
///
/// # Overview
///
/// `Principal` is the *result of authentication*. It is rebuilt from the
/// token on every request and never stored server-side; the user row it was
/// issued for may have changed since.
///
/// The authorization gate inserts it into request extensions, and handlers
/// receive it through the extractors in [`crate::web::extract`].
///
/// ```rust
/// use khanom_shop::auth::{Principal, Role};
///
/// let p = Principal::new("u1", "u1@example.com", Role::User);
/// assert!(!p.is_admin());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub email: String,
    pub role: Role,
}

impl Principal {
    pub fn new(id: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"USER\"").unwrap(),
            Role::User
        );
    }

    #[test]
    fn role_parses_from_column_value() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(
            "admin".parse::<Role>().unwrap_err(),
            UnknownRole("admin".into())
        );
    }

    #[test]
    fn principal_reports_admin_role() {
        let admin = Principal::new("a", "a@example.com", Role::Admin);
        let user = Principal::new("u", "u@example.com", Role::User);

        assert!(admin.is_admin());
        assert!(!user.is_admin());
    }

    #[test]
    fn principal_is_cloneable() {
        let p = Principal::new(String::from("42"), "x@example.com", Role::User);

        assert_eq!(p.clone(), p);
    }
}
