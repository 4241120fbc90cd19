use axum::{
    extract::{FromRef, State},
    response::Redirect,
    routing::get,
    Form, Json, Router,
};
use axum_extra::extract::CookieJar;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginForm, PageContext, RegisterForm},
        extractors::MaybeUser,
        password,
        repo::User,
        session::{self, SessionKeys},
    },
    error::ApiError,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_page).post(register))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
}

async fn register_page(MaybeUser(user): MaybeUser) -> Json<PageContext> {
    Json(PageContext::new("register", user.as_ref()))
}

async fn login_page(MaybeUser(user): MaybeUser) -> Json<PageContext> {
    Json(PageContext::new("login", user.as_ref()))
}

/// Creates the user and signs them in right away. There is no duplicate
/// pre-check: the unique constraints on email and username decide, and a
/// violation comes back as a 409.
#[instrument(skip(state, jar, form))]
async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<(CookieJar, Redirect), ApiError> {
    validate_register(&form)?;

    let hash = password::hash_password(&form.password, state.config.pbkdf2_rounds)?;
    let user = User::create(&state.db, &form.username, &form.email, &hash).await?;

    let keys = SessionKeys::from_ref(&state);
    let token = keys.sign(user.id)?;
    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((jar.add(session::session_cookie(token)), Redirect::to("/")))
}

#[instrument(skip(state, jar, form))]
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Redirect), ApiError> {
    if form.email.trim().is_empty() || form.password.trim().is_empty() {
        return Err(ApiError::validation("Email and password are required"));
    }

    // A store failure here is a 500; it is not folded into "no such user".
    let user = match User::find_by_email(&state.db, &form.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %form.email, "login unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    let ok = password::verify_password(&form.password, &user.password_hash)?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = SessionKeys::from_ref(&state);
    let token = keys.sign(user.id)?;
    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok((jar.add(session::session_cookie(token)), Redirect::to("/")))
}

/// Clearing the cookie is the whole logout; anonymous visitors land on the
/// same redirect.
async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    (jar.remove(session::removal_cookie()), Redirect::to("/"))
}

fn validate_register(form: &RegisterForm) -> Result<(), ApiError> {
    if form.username.trim().is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if form.email.trim().is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if form.password.trim().is_empty() {
        return Err(ApiError::validation("Password is required"));
    }
    Ok(())
}

#[cfg(test)]
mod validation_tests {
    use super::*;

    fn form(username: &str, email: &str, password: &str) -> RegisterForm {
        RegisterForm {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn register_requires_every_field() {
        assert!(validate_register(&form("alice", "alice@x.com", "pw123")).is_ok());
        assert!(validate_register(&form("", "alice@x.com", "pw123")).is_err());
        assert!(validate_register(&form("alice", "", "pw123")).is_err());
        assert!(validate_register(&form("alice", "alice@x.com", "")).is_err());
    }

    #[test]
    fn blank_fields_do_not_pass_as_present() {
        let err = validate_register(&form("   ", "alice@x.com", "pw123")).unwrap_err();
        assert_eq!(err.to_string(), "Username is required");
    }
}
