//! Articles and categories.

use serde::{Deserialize, Serialize};

use super::id::{ArticleId, CategoryId};
use super::status::ArticleStatus;
use super::timestamp::Timestamp;
use crate::feed::Identified;

/// Characters kept in a card excerpt.
pub const EXCERPT_LENGTH: usize = 150;

/// A news article.
///
/// The scraper fills fields unevenly, so everything except the id may be
/// missing or `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub status: Option<ArticleStatus>,
    #[serde(default)]
    pub published_at: Option<Timestamp>,
    #[serde(default)]
    pub views_count: Option<u64>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl Article {
    #[must_use]
    pub fn title(&self) -> &str {
        non_empty(self.title.as_ref()).unwrap_or("Untitled")
    }

    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        non_empty(self.featured_image.as_ref())
    }

    #[must_use]
    pub fn source_url(&self) -> Option<&str> {
        non_empty(self.source_url.as_ref())
    }

    /// Body for the reading view: content, else summary, else a placeholder.
    #[must_use]
    pub fn body(&self) -> &str {
        non_empty(self.content.as_ref())
            .or_else(|| non_empty(self.summary.as_ref()))
            .unwrap_or("No content available.")
    }

    /// Card text: the summary (or content) cut to 150 characters.
    #[must_use]
    pub fn excerpt(&self) -> String {
        let text = non_empty(self.summary.as_ref())
            .or_else(|| non_empty(self.content.as_ref()))
            .unwrap_or_default();
        if text.chars().count() > EXCERPT_LENGTH {
            let cut: String = text.chars().take(EXCERPT_LENGTH).collect();
            format!("{cut}...")
        } else {
            text.to_owned()
        }
    }

    #[must_use]
    pub fn views(&self) -> u64 {
        self.views_count.unwrap_or(0)
    }

    /// The read counter was bumped on the server.
    pub fn record_view(&mut self) {
        self.views_count = Some(self.views().saturating_add(1));
    }

    /// Publication time, falling back to creation time.
    #[must_use]
    pub fn published(&self) -> Option<&Timestamp> {
        self.published_at.as_ref().or(self.created_at.as_ref())
    }

    #[must_use]
    pub fn is_draft(&self) -> bool {
        self.status == Some(ArticleStatus::Draft)
    }
}

impl Identified for Article {
    type Id = ArticleId;

    fn key(&self) -> ArticleId {
        self.id
    }
}

/// A news category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

impl Category {
    /// Name of `id` in `categories`, if known.
    #[must_use]
    pub fn name_of(categories: &[Self], id: CategoryId) -> Option<&str> {
        categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
    }
}
