use serde::Deserialize;

/// Form body for commenting on a post. The single field is named after the
/// form control it comes from.
#[derive(Debug, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub comment: String,
}
