use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    pub subtitle: String,
    pub date: String,
    pub body: String,
    pub img_url: String,
    pub author_id: i64,
}

/// Post row joined with the author's username.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PostWithAuthor {
    pub id: i64,
    pub title: String,
    pub subtitle: String,
    pub date: String,
    pub body: String,
    pub img_url: String,
    pub author_id: i64,
    pub author_name: String,
}

pub struct NewPost {
    pub title: String,
    pub subtitle: String,
    pub date: String,
    pub body: String,
    pub img_url: String,
    pub author_id: i64,
}

/// Insert a post. The title carries a unique constraint; violations surface
/// as database errors.
pub async fn create(db: &SqlitePool, post: &NewPost) -> Result<BlogPost, sqlx::Error> {
    sqlx::query_as::<_, BlogPost>(
        r#"
        INSERT INTO blog_posts (title, subtitle, date, body, img_url, author_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, title, subtitle, date, body, img_url, author_id
        "#,
    )
    .bind(&post.title)
    .bind(&post.subtitle)
    .bind(&post.date)
    .bind(&post.body)
    .bind(&post.img_url)
    .bind(post.author_id)
    .fetch_one(db)
    .await
}

/// Every post, oldest first, with author usernames for the index page.
pub async fn list_with_authors(db: &SqlitePool) -> Result<Vec<PostWithAuthor>, sqlx::Error> {
    sqlx::query_as::<_, PostWithAuthor>(
        r#"
        SELECT p.id, p.title, p.subtitle, p.date, p.body, p.img_url,
               p.author_id, u.username AS author_name
          FROM blog_posts p
          JOIN users u ON u.id = p.author_id
         ORDER BY p.id ASC
        "#,
    )
    .fetch_all(db)
    .await
}

pub async fn find_with_author(
    db: &SqlitePool,
    id: i64,
) -> Result<Option<PostWithAuthor>, sqlx::Error> {
    sqlx::query_as::<_, PostWithAuthor>(
        r#"
        SELECT p.id, p.title, p.subtitle, p.date, p.body, p.img_url,
               p.author_id, u.username AS author_name
          FROM blog_posts p
          JOIN users u ON u.id = p.author_id
         WHERE p.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn find(db: &SqlitePool, id: i64) -> Result<Option<BlogPost>, sqlx::Error> {
    sqlx::query_as::<_, BlogPost>(
        r#"
        SELECT id, title, subtitle, date, body, img_url, author_id
        FROM blog_posts
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

/// Rewrite the editable fields. Author and creation date stay as they were
/// written at creation time.
pub async fn update(
    db: &SqlitePool,
    id: i64,
    title: &str,
    subtitle: &str,
    body: &str,
    img_url: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE blog_posts
        SET title = $1, subtitle = $2, body = $3, img_url = $4
        WHERE id = $5
        "#,
    )
    .bind(title)
    .bind(subtitle)
    .bind(body)
    .bind(img_url)
    .bind(id)
    .execute(db)
    .await?;
    Ok(result.rows_affected())
}

/// Delete a post; its comments go with it (ON DELETE CASCADE).
pub async fn delete(db: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::repo::User, comments, db::test_pool, error::ApiError};

    fn draft(title: &str, author_id: i64) -> NewPost {
        NewPost {
            title: title.into(),
            subtitle: "A subtitle".into(),
            date: "August 25, 2026".into(),
            body: "Body text".into(),
            img_url: "https://img.example/cover.png".into(),
            author_id,
        }
    }

    #[tokio::test]
    async fn posts_list_oldest_first_with_author_names() {
        let db = test_pool().await;
        let alice = User::create(&db, "alice", "alice@x.com", "h").await.unwrap();
        create(&db, &draft("First", alice.id)).await.unwrap();
        create(&db, &draft("Second", alice.id)).await.unwrap();

        let posts = list_with_authors(&db).await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].title, "First");
        assert_eq!(posts[1].title, "Second");
        assert_eq!(posts[0].author_name, "alice");
    }

    #[tokio::test]
    async fn duplicate_title_maps_to_conflict() {
        let db = test_pool().await;
        let alice = User::create(&db, "alice", "alice@x.com", "h").await.unwrap();
        create(&db, &draft("Hello", alice.id)).await.unwrap();
        let err = create(&db, &draft("Hello", alice.id)).await.unwrap_err();
        match ApiError::from(err) {
            ApiError::Conflict(msg) => assert_eq!(msg, "A post with this title already exists"),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn update_keeps_author_and_date() {
        let db = test_pool().await;
        let alice = User::create(&db, "alice", "alice@x.com", "h").await.unwrap();
        let post = create(&db, &draft("Hello", alice.id)).await.unwrap();

        let rows = update(&db, post.id, "New title", "New sub", "New body", "https://img.example/new.png")
            .await
            .unwrap();
        assert_eq!(rows, 1);

        let edited = find(&db, post.id).await.unwrap().unwrap();
        assert_eq!(edited.title, "New title");
        assert_eq!(edited.author_id, alice.id);
        assert_eq!(edited.date, "August 25, 2026");
    }

    #[tokio::test]
    async fn update_of_a_missing_post_touches_no_rows() {
        let db = test_pool().await;
        let rows = update(&db, 42, "t", "s", "b", "https://img.example/i.png")
            .await
            .unwrap();
        assert_eq!(rows, 0);
    }

    #[tokio::test]
    async fn deleting_a_post_cascades_to_its_comments() {
        let db = test_pool().await;
        let alice = User::create(&db, "alice", "alice@x.com", "h").await.unwrap();
        let post = create(&db, &draft("Hello", alice.id)).await.unwrap();
        comments::repo::insert(&db, post.id, alice.id, "nice post").await.unwrap();

        assert_eq!(delete(&db, post.id).await.unwrap(), 1);

        let left: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments")
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(left.0, 0);
    }
}
