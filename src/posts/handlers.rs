use axum::{
    extract::{Path, State},
    response::Redirect,
    routing::get,
    Form, Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use time::{macros::format_description, OffsetDateTime};
use tracing::{info, instrument};

use super::{
    dto::{EditPostData, PostDetail, PostForm},
    repo::{self, NewPost, PostWithAuthor},
};
use crate::{
    auth::{
        dto::PageContext,
        extractors::{AdminUser, CurrentUser},
    },
    comments::{self, dto::CommentForm},
    error::ApiError,
    state::AppState,
};

lazy_static! {
    static ref IMG_URL: Regex =
        Regex::new(r"(?i)^https?://[^\s/$.?#][^\s]*$").unwrap();
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts))
        .route("/post/:id", get(show_post).post(add_comment))
        .route("/new-post", get(new_post_page).post(new_post))
        .route("/edit-post/:id", get(edit_post_page).post(edit_post))
        .route("/delete/:id", get(delete_post))
}

#[instrument(skip(state))]
async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<PostWithAuthor>>, ApiError> {
    let posts = repo::list_with_authors(&state.db).await?;
    Ok(Json(posts))
}

#[instrument(skip(state))]
async fn show_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PostDetail>, ApiError> {
    let post = repo::find_with_author(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Post not found"))?;
    let comments = comments::repo::list_for_post(&state.db, id).await?;
    Ok(Json(PostDetail::new(post, comments)))
}

#[instrument(skip(state, user, form))]
async fn add_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Form(form): Form<CommentForm>,
) -> Result<Json<PostDetail>, ApiError> {
    let text = form.comment.trim();
    if text.is_empty() {
        return Err(ApiError::validation("Comment text is required"));
    }

    let post = repo::find_with_author(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Post not found"))?;
    comments::repo::insert(&state.db, id, user.id, text).await?;
    info!(post_id = id, user_id = user.id, "comment added");

    let comments = comments::repo::list_for_post(&state.db, id).await?;
    Ok(Json(PostDetail::new(post, comments)))
}

async fn new_post_page(AdminUser(admin): AdminUser) -> Json<PageContext> {
    Json(PageContext::new("new-post", Some(&admin)))
}

#[instrument(skip(state, admin, form))]
async fn new_post(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Form(form): Form<PostForm>,
) -> Result<Redirect, ApiError> {
    validate_post(&form)?;
    let date = today_string()?;
    let post = repo::create(
        &state.db,
        &NewPost {
            title: form.title,
            subtitle: form.subtitle,
            date,
            body: form.body,
            img_url: form.img_url,
            author_id: admin.id,
        },
    )
    .await?;
    info!(post_id = post.id, author_id = admin.id, "post created");
    Ok(Redirect::to("/"))
}

#[instrument(skip(state, _admin))]
async fn edit_post_page(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<EditPostData>, ApiError> {
    let post = repo::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Post not found"))?;
    Ok(Json(EditPostData::from(&post)))
}

#[instrument(skip(state, _admin, form))]
async fn edit_post(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<i64>,
    Form(form): Form<PostForm>,
) -> Result<Redirect, ApiError> {
    validate_post(&form)?;
    let rows = repo::update(
        &state.db,
        id,
        &form.title,
        &form.subtitle,
        &form.body,
        &form.img_url,
    )
    .await?;
    if rows == 0 {
        return Err(ApiError::NotFound("Post not found"));
    }
    info!(post_id = id, "post updated");
    Ok(Redirect::to(&format!("/post/{id}")))
}

#[instrument(skip(state, _admin))]
async fn delete_post(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<i64>,
) -> Result<Redirect, ApiError> {
    let rows = repo::delete(&state.db, id).await?;
    if rows == 0 {
        return Err(ApiError::NotFound("Post not found"));
    }
    info!(post_id = id, "post deleted");
    Ok(Redirect::to("/"))
}

fn validate_post(form: &PostForm) -> Result<(), ApiError> {
    if form.title.trim().is_empty() {
        return Err(ApiError::validation("Title is required"));
    }
    if form.subtitle.trim().is_empty() {
        return Err(ApiError::validation("Subtitle is required"));
    }
    if form.img_url.trim().is_empty() {
        return Err(ApiError::validation("Image URL is required"));
    }
    if !IMG_URL.is_match(form.img_url.trim()) {
        return Err(ApiError::validation("Image URL must be a valid URL"));
    }
    if form.body.trim().is_empty() {
        return Err(ApiError::validation("Body is required"));
    }
    Ok(())
}

/// Creation date rendered the way post pages show it, e.g. "August 25, 2026".
fn today_string() -> anyhow::Result<String> {
    let format = format_description!("[month repr:long] [day], [year]");
    Ok(OffsetDateTime::now_utc().date().format(&format)?)
}

#[cfg(test)]
mod validation_tests {
    use super::*;

    fn form(title: &str, subtitle: &str, img_url: &str, body: &str) -> PostForm {
        PostForm {
            title: title.into(),
            subtitle: subtitle.into(),
            img_url: img_url.into(),
            body: body.into(),
        }
    }

    #[test]
    fn complete_form_passes() {
        let ok = form("Title", "Sub", "https://img.example/a.png", "Body");
        assert!(validate_post(&ok).is_ok());
    }

    #[test]
    fn blank_fields_are_rejected_in_order() {
        let err = validate_post(&form(" ", "s", "https://x.y/z", "b")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg == "Title is required"));

        let err = validate_post(&form("t", "", "https://x.y/z", "b")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg == "Subtitle is required"));

        let err = validate_post(&form("t", "s", "https://x.y/z", "")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg == "Body is required"));
    }

    #[test]
    fn img_url_must_look_like_a_url() {
        let err = validate_post(&form("t", "s", "not a url", "b")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg == "Image URL must be a valid URL"));

        assert!(validate_post(&form("t", "s", "http://img.example/a.jpg", "b")).is_ok());
        assert!(validate_post(&form("t", "s", "HTTPS://img.example/a.jpg", "b")).is_ok());
    }

    #[test]
    fn date_renders_with_long_month_name() {
        let date = today_string().unwrap();
        let re = Regex::new(
            r"^(January|February|March|April|May|June|July|August|September|October|November|December) \d{2}, \d{4}$",
        )
        .unwrap();
        assert!(re.is_match(&date), "unexpected date format: {date}");
    }
}
