use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub author_id: i64,
    pub post_id: i64,
}

/// Comment joined with its author's username, the shape the post page shows.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CommentWithAuthor {
    pub id: i64,
    pub text: String,
    pub author_id: i64,
    pub author_name: String,
}

/// Insert a comment under a post. Both foreign keys are enforced by the
/// store; callers look the post up first so a missing post is a 404 rather
/// than a constraint error.
pub async fn insert(
    db: &SqlitePool,
    post_id: i64,
    author_id: i64,
    text: &str,
) -> Result<Comment, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (text, author_id, post_id)
        VALUES ($1, $2, $3)
        RETURNING id, text, author_id, post_id
        "#,
    )
    .bind(text)
    .bind(author_id)
    .bind(post_id)
    .fetch_one(db)
    .await
}

/// All comments under a post, oldest first.
pub async fn list_for_post(
    db: &SqlitePool,
    post_id: i64,
) -> Result<Vec<CommentWithAuthor>, sqlx::Error> {
    sqlx::query_as::<_, CommentWithAuthor>(
        r#"
        SELECT c.id, c.text, c.author_id, u.username AS author_name
          FROM comments c
          JOIN users u ON u.id = c.author_id
         WHERE c.post_id = $1
         ORDER BY c.id ASC
        "#,
    )
    .bind(post_id)
    .fetch_all(db)
    .await
}
