use std::str::FromStr;

use anyhow::Context;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

// The store is created in place on first start; there is no migration
// mechanism. AUTOINCREMENT keeps row ids monotonic and never reused.
const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT NOT NULL UNIQUE,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role          TEXT NOT NULL DEFAULT 'user'
)
"#;

const CREATE_BLOG_POSTS: &str = r#"
CREATE TABLE IF NOT EXISTS blog_posts (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    title     TEXT NOT NULL UNIQUE,
    subtitle  TEXT NOT NULL,
    date      TEXT NOT NULL,
    body      TEXT NOT NULL,
    img_url   TEXT NOT NULL,
    author_id INTEGER NOT NULL REFERENCES users(id) ON DELETE RESTRICT
)
"#;

const CREATE_COMMENTS: &str = r#"
CREATE TABLE IF NOT EXISTS comments (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    text      TEXT NOT NULL,
    author_id INTEGER NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
    post_id   INTEGER NOT NULL REFERENCES blog_posts(id) ON DELETE CASCADE
)
"#;

pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    let opts = SqliteConnectOptions::from_str(database_url)
        .context("parse DATABASE_URL")?
        .create_if_missing(true)
        .foreign_keys(true);
    let db = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(opts)
        .await
        .context("connect to database")?;
    Ok(db)
}

pub async fn ensure_schema(db: &SqlitePool) -> anyhow::Result<()> {
    for ddl in [CREATE_USERS, CREATE_BLOG_POSTS, CREATE_COMMENTS] {
        sqlx::query(ddl).execute(db).await.context("create table")?;
    }
    Ok(())
}

/// In-memory pool for tests. A single connection is mandatory: every pooled
/// `sqlite::memory:` connection is its own database.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    ensure_schema(&db).await.expect("schema");
    db
}
