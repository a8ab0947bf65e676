//! Admin panel state.

use brief_bulletin_core::{AdminForm, Article, Comment};
use serde::{Deserialize, Serialize};

/// Lists held while the admin works through a tab.
///
/// Successful mutations remove the item here instead of reloading the tab.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminPanel {
    #[serde(default)]
    pub drafts: Vec<Article>,
    #[serde(default)]
    pub pending_comments: Vec<Comment>,
    #[serde(default)]
    pub form: AdminForm,
}
