//! Home feed state.

use brief_bulletin_core::{Article, ArticleId, Feed, InFlight};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The reader's loaded feed.
///
/// There is no "get article by id" endpoint, so the article page reads from
/// this list too.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HomeState {
    pub feed: Feed<Article>,
    /// Article currently being moved to draft.
    #[serde(default)]
    pub drafting: Option<InFlight<ArticleId>>,
    /// Set by feed actions that redirect to `/home`, so that visit shows the
    /// list as the action left it instead of reloading page 1.
    #[serde(default)]
    pub keep_loaded: bool,
}

impl HomeState {
    /// Whether a move-to-draft request still holds its guard at `now`.
    #[must_use]
    pub fn is_drafting(&self, now: DateTime<Utc>) -> bool {
        self.drafting.is_some_and(|draft| draft.is_active(now))
    }

    /// Consume the `keep_loaded` mark.
    pub fn take_keep_loaded(&mut self) -> bool {
        std::mem::take(&mut self.keep_loaded)
    }
}
