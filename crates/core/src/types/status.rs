//! Status and classification enums.
//!
//! The API is loose about casing (`ADMIN`, `editor`, `published`), so every
//! enum here parses case-insensitively and falls back to a safe variant
//! instead of failing the whole payload.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Account role as reported by the login endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", from = "String")]
pub enum Role {
    /// Full moderation access and the admin panel.
    Admin,
    /// Moderation rights on the API; no admin panel in the portal.
    Editor,
    /// Regular reader.
    #[default]
    User,
}

impl Role {
    /// Whether the role may open the admin panel and move articles to draft.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Editor => "EDITOR",
            Self::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "EDITOR" => Ok(Self::Editor),
            "USER" => Ok(Self::User),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// News language served by the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Bn,
}

impl Language {
    /// All languages, in the order the switcher shows them.
    pub const ALL: [Self; 2] = [Self::En, Self::Bn];

    /// Code sent as the `lang` query parameter.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Bn => "bn",
        }
    }

    /// Label shown in the language switcher.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Bn => "বাংলা",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "bn" => Ok(Self::Bn),
            _ => Err(format!("unsupported language: {s}")),
        }
    }
}

/// Publication state of an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ArticleStatus {
    Draft,
    #[default]
    Published,
}

impl From<String> for ArticleStatus {
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("draft") {
            Self::Draft
        } else {
            Self::Published
        }
    }
}

/// Moderation state of a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum CommentStatus {
    /// Waiting for an admin.
    #[default]
    Pending,
    /// Visible under the article.
    Approved,
    /// Archived by an admin.
    Disabled,
}

impl From<String> for CommentStatus {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "approved" | "active" => Self::Approved,
            "disabled" | "archived" | "inactive" => Self::Disabled,
            _ => Self::Pending,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parses_any_case() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("editor".parse::<Role>().unwrap(), Role::Editor);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_unknown_falls_back_to_user() {
        let role: Role = serde_json::from_str("\"superuser\"").unwrap();
        assert_eq!(role, Role::User);
        assert!(!role.is_admin());
    }

    #[test]
    fn test_role_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        let role: Role = serde_json::from_str("\"ADMIN\"").unwrap();
        assert!(role.is_admin());
    }

    #[test]
    fn test_only_admin_is_admin() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::Editor.is_admin());
        assert!(!Role::User.is_admin());
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::default(), Language::En);
        assert_eq!("BN".parse::<Language>().unwrap(), Language::Bn);
        assert_eq!(Language::Bn.code(), "bn");
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn test_statuses_are_lenient() {
        let draft: ArticleStatus = serde_json::from_str("\"DRAFT\"").unwrap();
        assert_eq!(draft, ArticleStatus::Draft);
        let other: ArticleStatus = serde_json::from_str("\"approved\"").unwrap();
        assert_eq!(other, ArticleStatus::Published);

        let active: CommentStatus = serde_json::from_str("\"active\"").unwrap();
        assert_eq!(active, CommentStatus::Approved);
        let archived: CommentStatus = serde_json::from_str("\"archived\"").unwrap();
        assert_eq!(archived, CommentStatus::Disabled);
    }
}
