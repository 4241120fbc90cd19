use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// Stored per user rather than inferred from a magic row id. Exactly one
/// admin exists in practice: the first account ever registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Insert a new user. The role is decided inside the statement so that
    /// "first registration becomes admin" holds without a read-then-write
    /// window. Unique violations (email, username) surface as database
    /// errors; callers do not pre-check.
    pub async fn create(
        db: &SqlitePool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, role)
            VALUES ($1, $2, $3,
                    CASE WHEN EXISTS (SELECT 1 FROM users) THEN 'user' ELSE 'admin' END)
            RETURNING id, username, email, password_hash, role
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await
    }

    /// Lookup by exact email match.
    pub async fn find_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::test_pool, error::ApiError};

    #[tokio::test]
    async fn first_user_becomes_admin_later_ones_do_not() {
        let db = test_pool().await;
        let alice = User::create(&db, "alice", "alice@x.com", "hash-a")
            .await
            .unwrap();
        let bob = User::create(&db, "bob", "bob@x.com", "hash-b").await.unwrap();
        assert_eq!(alice.id, 1);
        assert_eq!(alice.role, Role::Admin);
        assert!(alice.is_admin());
        assert_eq!(bob.role, Role::User);
        assert!(!bob.is_admin());
    }

    #[tokio::test]
    async fn duplicate_email_maps_to_conflict() {
        let db = test_pool().await;
        User::create(&db, "alice", "alice@x.com", "hash").await.unwrap();
        let err = User::create(&db, "other", "alice@x.com", "hash")
            .await
            .unwrap_err();
        match ApiError::from(err) {
            ApiError::Conflict(msg) => assert_eq!(msg, "Email already registered"),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn duplicate_username_maps_to_conflict() {
        let db = test_pool().await;
        User::create(&db, "alice", "alice@x.com", "hash").await.unwrap();
        let err = User::create(&db, "alice", "second@x.com", "hash")
            .await
            .unwrap_err();
        match ApiError::from(err) {
            ApiError::Conflict(msg) => assert_eq!(msg, "Username already taken"),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn email_lookup_is_exact() {
        let db = test_pool().await;
        User::create(&db, "alice", "alice@x.com", "hash").await.unwrap();
        assert!(User::find_by_email(&db, "alice@x.com").await.unwrap().is_some());
        assert!(User::find_by_email(&db, "Alice@x.com").await.unwrap().is_none());
        assert!(User::find_by_email(&db, "missing@x.com").await.unwrap().is_none());
    }
}
