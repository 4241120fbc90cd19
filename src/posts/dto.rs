use serde::{Deserialize, Serialize};

use super::repo::{BlogPost, PostWithAuthor};
use crate::comments::repo::CommentWithAuthor;

/// Shared form body for creating and editing posts.
#[derive(Debug, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub img_url: String,
    #[serde(default)]
    pub body: String,
}

/// A single post page: the post plus its comment thread.
#[derive(Debug, Serialize)]
pub struct PostDetail {
    pub id: i64,
    pub title: String,
    pub subtitle: String,
    pub date: String,
    pub body: String,
    pub img_url: String,
    pub author_id: i64,
    pub author_name: String,
    pub comments: Vec<CommentWithAuthor>,
}

impl PostDetail {
    pub fn new(post: PostWithAuthor, comments: Vec<CommentWithAuthor>) -> Self {
        Self {
            id: post.id,
            title: post.title,
            subtitle: post.subtitle,
            date: post.date,
            body: post.body,
            img_url: post.img_url,
            author_id: post.author_id,
            author_name: post.author_name,
            comments,
        }
    }
}

/// Prefill payload for the edit form. Date and author are not editable and
/// are left out on purpose.
#[derive(Debug, Serialize)]
pub struct EditPostData {
    pub id: i64,
    pub title: String,
    pub subtitle: String,
    pub img_url: String,
    pub body: String,
}

impl From<&BlogPost> for EditPostData {
    fn from(post: &BlogPost) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            img_url: post.img_url.clone(),
            body: post.body.clone(),
        }
    }
}
