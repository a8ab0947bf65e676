//! Reader comments.

use serde::{Deserialize, Serialize};

use super::id::{ArticleId, CommentId};
use super::status::CommentStatus;
use super::timestamp::Timestamp;
use crate::feed::Identified;
use crate::validation::{ValidationError, is_blank};

/// A comment as returned by the API.
///
/// Approved comments carry `id`; the moderation queue sends `comment_id`
/// instead. [`Comment::id`] reads whichever is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<CommentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    comment_id: Option<CommentId>,
    #[serde(default)]
    pub article_id: Option<ArticleId>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub status: Option<CommentStatus>,
}

impl Comment {
    #[must_use]
    pub fn id(&self) -> Option<CommentId> {
        self.comment_id.or(self.id)
    }

    #[must_use]
    pub fn author(&self) -> &str {
        self.user_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("Anonymous")
    }

    #[must_use]
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    /// Commenter address, if the API sent one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.user_email
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// `January 5, 2024 at 03:04 PM`, or "Recently" when the API sent no time.
    #[must_use]
    pub fn posted(&self) -> String {
        self.created_at
            .as_ref()
            .filter(|ts| !ts.as_str().trim().is_empty())
            .map_or_else(|| "Recently".to_owned(), Timestamp::long_date_time)
    }
}

impl Identified for Comment {
    type Id = Option<CommentId>;

    fn key(&self) -> Option<CommentId> {
        self.id()
    }
}

/// Comment form as submitted by a reader.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub content: String,
}

/// A validated comment ready to send.
///
/// The address is only required, not checked: the API decides what it
/// accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewComment {
    pub article_id: ArticleId,
    pub user_name: String,
    pub user_email: String,
    pub content: String,
}

impl NewComment {
    /// # Errors
    ///
    /// [`ValidationError::MissingCommentFields`] when any field is blank.
    pub fn from_form(article_id: ArticleId, form: &CommentForm) -> Result<Self, ValidationError> {
        if is_blank(&form.user_name) || is_blank(&form.user_email) || is_blank(&form.content) {
            return Err(ValidationError::MissingCommentFields);
        }
        Ok(Self {
            article_id,
            user_name: form.user_name.trim().to_owned(),
            user_email: form.user_email.trim().to_owned(),
            content: form.content.trim().to_owned(),
        })
    }
}
