use chrono::NaiveDateTime;
use serde::Serialize;

use crate::auth::{Principal, Role};

/// A registered account.
///
/// `password_hash` never leaves the server: it is skipped when serializing.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: NaiveDateTime,
}

impl User {
    pub fn principal(&self) -> Principal {
        Principal::new(self.id.clone(), self.email.clone(), self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn user() -> User {
        User {
            id: "u-1".into(),
            name: "Test User".into(),
            email: "user@example.com".into(),
            password_hash: "$2b$10$abcdefghijklmnopqrstuv".into(),
            role: Role::User,
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap().naive_utc(),
        }
    }

    #[test]
    fn serialization_omits_password_hash() {
        let json = serde_json::to_value(user()).unwrap();

        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["email"], "user@example.com");
        assert_eq!(json["role"], "USER");
    }

    #[test]
    fn principal_carries_identity() {
        let p = user().principal();

        assert_eq!(p.id, "u-1");
        assert_eq!(p.email, "user@example.com");
        assert_eq!(p.role, Role::User);
    }
}
