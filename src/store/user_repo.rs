use std::sync::Arc;

use anyhow::{Context, Result};

use crate::auth::Role;
use crate::db::{Db, Row};
use crate::model::{User, db_timestamp};
use crate::params;
use crate::store::UserRepository;

const SELECT_USER: &str = "SELECT id, name, email, password_hash, role, created_at FROM users";

pub struct MySqlUserRepository {
    db: Arc<dyn Db>,
}

impl MySqlUserRepository {
    pub fn new(db: Arc<dyn Db>) -> Self {
        Self { db }
    }
}

fn user_from_row(row: &Row) -> Result<User> {
    let role: Role = row.get_string("role")?.parse()?;
    Ok(User {
        id: row.get_string("id")?,
        name: row.get_string("name")?,
        email: row.get_string("email")?,
        password_hash: row.get_string("password_hash")?,
        role,
        created_at: row.get_datetime("created_at")?,
    })
}

impl UserRepository for MySqlUserRepository {
    fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("{SELECT_USER} WHERE email = ?");
        self.db
            .fetch_one(&sql, &params![email])?
            .as_ref()
            .map(user_from_row)
            .transpose()
            .context("users.find_by_email")
    }

    fn insert(&self, user: &User) -> Result<()> {
        self.db
            .exec(
                "INSERT INTO users (id, name, email, password_hash, role, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?)",
                &params![
                    &user.id,
                    &user.name,
                    &user.email,
                    &user.password_hash,
                    user.role.as_str(),
                    db_timestamp(user.created_at)
                ],
            )
            .context("users.insert")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Value;
    use crate::store::testing::RecordingDb;
    use chrono::DateTime;

    fn user_row() -> Row {
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap().naive_utc();
        Row::default()
            .with("id", Value::Str("u-1".into()))
            .with("name", Value::Str("Admin User".into()))
            .with("email", Value::Str("admin@example.com".into()))
            .with("password_hash", Value::Str("$2b$10$hash".into()))
            .with("role", Value::Str("ADMIN".into()))
            .with("created_at", Value::DateTime(at))
    }

    #[test]
    fn find_by_email_maps_row() {
        let db = Arc::new(RecordingDb::new().push_rows(vec![user_row()]));
        let repo = MySqlUserRepository::new(db.clone());

        let user = repo.find_by_email("admin@example.com").unwrap().unwrap();

        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.password_hash, "$2b$10$hash");
        let calls = db.calls();
        assert!(calls[0].sql.ends_with("WHERE email = ?"));
        assert_eq!(calls[0].params, vec![r#"Str("admin@example.com")"#]);
    }

    #[test]
    fn find_by_email_returns_none_when_missing() {
        let repo = MySqlUserRepository::new(Arc::new(RecordingDb::new()));

        assert!(repo.find_by_email("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn unknown_role_is_an_error() {
        let row = user_row().with("role", Value::Str("ROOT".into()));
        let repo = MySqlUserRepository::new(Arc::new(RecordingDb::new().push_rows(vec![row])));

        assert!(repo.find_by_email("admin@example.com").is_err());
    }

    #[test]
    fn insert_binds_role_as_text() {
        let db = Arc::new(RecordingDb::new());
        let repo = MySqlUserRepository::new(db.clone());
        let user = user_from_row(&user_row()).unwrap();

        repo.insert(&user).unwrap();

        let calls = db.calls();
        assert!(calls[0].sql.starts_with("INSERT INTO users"));
        assert_eq!(calls[0].params[4], r#"Str("ADMIN")"#);
    }
}
