use axum::{extract::State, routing::get, Form, Json, Router};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};
use tracing::{error, info, instrument};

use super::dto::ContactForm;
use crate::{
    auth::{dto::PageContext, extractors::MaybeUser},
    error::ApiError,
    mailer::MailError,
    state::AppState,
};

pub const CONTACT_SUBJECT: &str = "Contact from Blog";

lazy_static! {
    static ref PHONE: Regex = Regex::new(r"^[+0-9-]+$").unwrap();
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/about", get(about_page))
        .route("/contact", get(contact_page).post(contact))
}

async fn about_page(MaybeUser(user): MaybeUser) -> Json<PageContext> {
    Json(PageContext::new("about", user.as_ref()))
}

async fn contact_page(MaybeUser(user): MaybeUser) -> Json<PageContext> {
    Json(PageContext::new("contact", user.as_ref()))
}

/// Validates the form and hands the message to the mailer. Delivery problems
/// are logged but never turned into a request error, so the caller always
/// sees the message as accepted once it validates.
#[instrument(skip(state, form))]
async fn contact(
    State(state): State<AppState>,
    Form(form): Form<ContactForm>,
) -> Result<Json<Value>, ApiError> {
    validate_contact(&form)?;

    let body = format_contact_body(&form);
    match dispatch(&state, &body).await {
        Ok(()) => info!(from = %form.email, "contact message sent"),
        Err(e) => error!(error = %e, from = %form.email, "contact mail dispatch failed"),
    }
    Ok(Json(json!({ "message": "Message sent" })))
}

async fn dispatch(state: &AppState, body: &str) -> Result<(), MailError> {
    let mail = &state.config.mail;
    let sender = mail
        .sender
        .as_deref()
        .ok_or(MailError::Config("MAIL_SENDER"))?;
    let recipient = mail
        .recipient
        .as_deref()
        .ok_or(MailError::Config("MAIL_RECIPIENT"))?;
    let app_password = mail
        .app_password
        .as_deref()
        .ok_or(MailError::Config("MAIL_APP_PASSWORD"))?;
    state
        .mailer
        .send(sender, recipient, app_password, CONTACT_SUBJECT, body)
        .await
}

fn format_contact_body(form: &ContactForm) -> String {
    let mut body = format!("{}\n\nKind Regards\nName: {}", form.message, form.name);
    if !form.company.trim().is_empty() {
        body.push_str(&format!("\nCompany: {}", form.company));
    }
    if !form.phone_number.trim().is_empty() {
        body.push_str(&format!("\nPhone: {}", form.phone_number));
    }
    body
}

fn validate_contact(form: &ContactForm) -> Result<(), ApiError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(ApiError::validation("Name is required"));
    }
    if name.chars().count() > 40 {
        return Err(ApiError::validation("Name must be at most 40 characters"));
    }

    let company = form.company.trim();
    if !company.is_empty() && company.chars().count() > 40 {
        return Err(ApiError::validation("Company must be at most 40 characters"));
    }

    let email = form.email.trim();
    if email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if email.chars().count() > 40 {
        return Err(ApiError::validation("Email must be at most 40 characters"));
    }

    let phone = form.phone_number.trim();
    if !phone.is_empty() {
        let len = phone.chars().count();
        if !(10..=14).contains(&len) {
            return Err(ApiError::validation(
                "Phone number must be between 10 and 14 characters",
            ));
        }
        if !PHONE.is_match(phone) {
            return Err(ApiError::validation("Invalid phone number format"));
        }
    }

    let message = form.message.trim();
    if message.is_empty() {
        return Err(ApiError::validation("Message is required"));
    }
    if message.chars().count() > 1000 {
        return Err(ApiError::validation("Message must be at most 1000 characters"));
    }

    Ok(())
}
