use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use tracing::{error, warn};

use crate::{
    auth::{
        repo::User,
        session::{SessionKeys, SESSION_COOKIE},
    },
    error::ApiError,
    state::AppState,
};

/// Current identity or anonymous. Never rejects; handlers that tolerate
/// anonymous visitors take this instead of reading ambient state.
pub struct MaybeUser(pub Option<User>);

/// Any signed-in identity. Anonymous requests are sent to the login page
/// instead of getting a bare error.
pub struct CurrentUser(pub User);

/// The admin gate: admits exactly the admin role. Anonymous and ordinary
/// users both get 403; there is no login redirect on this path.
pub struct AdminUser(pub User);

/// The session cookie is the primary carrier; a bearer header is accepted
/// for non-browser clients.
fn token_from_parts(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer ").or_else(|| h.strip_prefix("bearer ")))
        .map(|t| t.to_string())
}

/// Resolve the request's token to a user row. An absent, invalid or expired
/// token resolves to anonymous; only a store failure is an error.
async fn resolve_user(parts: &Parts, state: &AppState) -> Result<Option<User>, ApiError> {
    let Some(token) = token_from_parts(parts) else {
        return Ok(None);
    };
    let keys = SessionKeys::from_ref(state);
    let claims = match keys.verify(&token) {
        Ok(c) => c,
        Err(_) => {
            warn!("invalid or expired session token");
            return Ok(None);
        }
    };
    let user = User::find_by_id(&state.db, claims.sub).await?;
    Ok(user)
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match resolve_user(parts, state).await {
            Ok(user) => Ok(MaybeUser(user)),
            Err(e) => {
                error!(error = %e, "identity resolution failed");
                Ok(MaybeUser(None))
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match resolve_user(parts, state).await {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => Err(Redirect::to("/login").into_response()),
            Err(e) => Err(e.into_response()),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match resolve_user(parts, state).await {
            Ok(Some(user)) if user.is_admin() => Ok(AdminUser(user)),
            Ok(Some(user)) => {
                warn!(user_id = %user.id, "admin route refused");
                Err(ApiError::Forbidden.into_response())
            }
            Ok(None) => Err(ApiError::Forbidden.into_response()),
            Err(e) => Err(e.into_response()),
        }
    }
}
