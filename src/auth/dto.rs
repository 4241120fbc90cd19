use serde::{Deserialize, Serialize};

use crate::auth::repo::{Role, User};

// Absent form fields deserialize to empty strings so that "missing" and
// "blank" fail validation the same way.

/// Form body for `POST /register`.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Form body for `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Public part of a user, embedded in page and post payloads. The role lets
/// the renderer decide whether to draw the admin controls.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

/// What a form-page GET returns in place of the template the external
/// renderer owns: the page name plus the current identity.
#[derive(Debug, Serialize)]
pub struct PageContext {
    pub page: &'static str,
    pub user: Option<PublicUser>,
}

impl PageContext {
    pub fn new(page: &'static str, user: Option<&User>) -> Self {
        Self {
            page,
            user: user.map(PublicUser::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_serializes_role_lowercase() {
        let user = User {
            id: 1,
            username: "alice".into(),
            email: "alice@x.com".into(),
            password_hash: "hash".into(),
            role: Role::Admin,
        };
        let json = serde_json::to_string(&PublicUser::from(&user)).unwrap();
        assert!(json.contains(r#""role":"admin""#));
        assert!(json.contains(r#""username":"alice""#));
    }

    #[test]
    fn user_never_serializes_its_password_hash() {
        let user = User {
            id: 1,
            username: "alice".into(),
            email: "alice@x.com".into(),
            password_hash: "secret-hash".into(),
            role: Role::User,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
    }

    #[test]
    fn missing_form_fields_default_to_empty() {
        let form: RegisterForm = serde_urlencoded::from_str("username=alice").unwrap();
        assert_eq!(form.username, "alice");
        assert!(form.email.is_empty());
        assert!(form.password.is_empty());
    }
}
