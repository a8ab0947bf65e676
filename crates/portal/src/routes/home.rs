//! Home feed route handlers.
//!
//! The loaded feed is kept in the session ([`HomeState`]). Every visit to
//! `/home` reloads page 1. "Load more" and the language switch are form
//! posts that update the feed and redirect back, marking the feed so that
//! redirect shows it as it is.

use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use brief_bulletin_core::{Article, ArticleId, Category, Language, PageRequest};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::Chrome;
use crate::api::ApiError;
use crate::error::Result;
use crate::filters;
use crate::middleware::{RequireSession, expire_session};
use crate::models::{CurrentSession, HomeState, Notice, session_keys};
use crate::state::AppState;

/// Language switch form.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LanguageForm {
    pub lang: String,
}

/// One article card on the feed.
#[derive(Debug, Clone)]
pub struct ArticleCard {
    pub id: ArticleId,
    pub title: String,
    pub excerpt: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub published: Option<String>,
    pub views: u64,
}

impl ArticleCard {
    #[must_use]
    pub fn new(article: &Article, categories: &[Category]) -> Self {
        Self {
            id: article.id,
            title: article.title().to_owned(),
            excerpt: article.excerpt(),
            image_url: article.image_url().map(str::to_owned),
            category: article
                .category_id
                .and_then(|id| Category::name_of(categories, id))
                .map(str::to_owned),
            published: article.published().map(|ts| ts.long_date()),
            views: article.views(),
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub chrome: Chrome,
    pub articles: Vec<ArticleCard>,
    pub language: Language,
    pub languages: &'static [Language],
    pub has_more: bool,
    pub loading: bool,
}

pub(super) async fn load_home(session: &Session) -> Result<HomeState> {
    Ok(session
        .get::<HomeState>(session_keys::HOME_FEED)
        .await?
        .unwrap_or_default())
}

pub(super) async fn store_home(session: &Session, home: &HomeState) -> Result<()> {
    session.insert(session_keys::HOME_FEED, home).await?;
    Ok(())
}

/// How a page load ended.
enum PageLoad {
    Loaded,
    /// Feed stopped; `Some` carries the dialog to show.
    Failed(Option<Notice>),
    /// The API rejected the token.
    Expired,
}

/// Fetch one page into the feed.
///
/// The in-flight guard is written to the store before the API call so a
/// second submission arriving meanwhile is refused by the feed. If this
/// handler is dropped mid-call the guard lapses after the API timeout.
async fn load_page(
    state: &AppState,
    session: &Session,
    current: &CurrentSession,
    home: &mut HomeState,
    request: PageRequest,
) -> Result<PageLoad> {
    store_home(session, home).await?;
    session.save().await?;

    let outcome = match state.api().articles(current.token(), &request).await {
        Ok(articles) => {
            tracing::debug!(page = request.page, count = articles.len(), "Loaded articles");
            home.feed.complete(request, articles);
            PageLoad::Loaded
        }
        Err(e) if e.is_unauthorized() => return Ok(PageLoad::Expired),
        Err(e @ ApiError::Rejected { .. }) => {
            tracing::info!(error = %e, page = request.page, "Articles request rejected");
            home.feed.fail();
            PageLoad::Failed(None)
        }
        Err(e) => {
            tracing::warn!(error = %e, page = request.page, "Failed to load articles");
            home.feed.fail();
            PageLoad::Failed(Some(Notice::error("Error", "Failed to load articles")))
        }
    };

    store_home(session, home).await?;
    Ok(outcome)
}

async fn categories(state: &AppState) -> Arc<Vec<Category>> {
    match state.api().categories().await {
        Ok(categories) => categories,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load categories");
            Arc::default()
        }
    }
}

/// Display the feed with a fresh first page.
///
/// Right after "load more", a language switch or a draft move the list is
/// shown as those left it. A load still in flight is not repeated.
#[instrument(skip_all, fields(user_name = %current.user_name))]
pub async fn home(
    State(state): State<AppState>,
    RequireSession(current): RequireSession,
    session: Session,
) -> Result<Response> {
    let mut home = load_home(&session).await?;
    let mut chrome = Chrome::load(&session, Some(&current)).await;
    let now = Utc::now();

    if home.take_keep_loaded() {
        store_home(&session, &home).await?;
    } else if let Some(request) = home
        .feed
        .first_page_request(now, state.config().in_flight_hold())
    {
        match load_page(&state, &session, &current, &mut home, request).await? {
            PageLoad::Expired => return Ok(expire_session(&session).await),
            PageLoad::Failed(Some(notice)) => chrome = chrome.with_notice(notice),
            PageLoad::Loaded | PageLoad::Failed(None) => {}
        }
    }

    let categories = categories(&state).await;
    let articles = home
        .feed
        .items()
        .iter()
        .map(|article| ArticleCard::new(article, &categories))
        .collect();

    Ok(HomeTemplate {
        chrome,
        articles,
        language: home.feed.language(),
        languages: &Language::ALL,
        has_more: home.feed.has_more(),
        loading: home.feed.is_loading(Utc::now()),
    }
    .into_response())
}

/// Go back to `/home` showing the feed as it is now.
pub(super) async fn back_to_feed(session: &Session, home: &mut HomeState) -> Result<Response> {
    home.keep_loaded = true;
    store_home(session, home).await?;
    Ok(Redirect::to("/home").into_response())
}

/// "Load more": fetch the next page. Ignored while a load is running or
/// once the feed has ended.
#[instrument(skip_all, fields(user_name = %current.user_name))]
pub async fn load_more(
    State(state): State<AppState>,
    RequireSession(current): RequireSession,
    session: Session,
) -> Result<Response> {
    let mut home = load_home(&session).await?;
    let hold = state.config().in_flight_hold();
    if let Some(request) = home.feed.next_page_request(Utc::now(), hold) {
        match load_page(&state, &session, &current, &mut home, request).await? {
            PageLoad::Expired => return Ok(expire_session(&session).await),
            PageLoad::Failed(Some(notice)) => notice.flash(&session).await?,
            PageLoad::Loaded | PageLoad::Failed(None) => {}
        }
    }
    back_to_feed(&session, &mut home).await
}

/// Switch the news language and reload from page 1. Selecting the current
/// language changes nothing.
#[instrument(skip_all, fields(user_name = %current.user_name, lang = %form.lang))]
pub async fn switch_language(
    State(state): State<AppState>,
    RequireSession(current): RequireSession,
    session: Session,
    Form(form): Form<LanguageForm>,
) -> Result<Response> {
    let mut home = load_home(&session).await?;
    let hold = state.config().in_flight_hold();
    if let Ok(language) = form.lang.parse::<Language>()
        && let Some(request) = home.feed.switch_language(language, Utc::now(), hold)
    {
        match load_page(&state, &session, &current, &mut home, request).await? {
            PageLoad::Expired => return Ok(expire_session(&session).await),
            PageLoad::Failed(Some(notice)) => notice.flash(&session).await?,
            PageLoad::Loaded | PageLoad::Failed(None) => {}
        }
    }
    back_to_feed(&session, &mut home).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use brief_bulletin_core::CategoryId;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_card_resolves_category_and_truncates() {
        let article: Article = serde_json::from_value(json!({
            "id": 7,
            "title": "Budget passed",
            "summary": "x".repeat(200),
            "category_id": 2,
            "published_at": "2024-01-05T15:04:00Z",
            "views_count": 12
        }))
        .unwrap();
        let categories = vec![Category {
            id: CategoryId::new(2),
            name: "Politics".into(),
            slug: None,
        }];

        let card = ArticleCard::new(&article, &categories);
        assert_eq!(card.category.as_deref(), Some("Politics"));
        assert_eq!(card.published.as_deref(), Some("January 5, 2024"));
        assert_eq!(card.excerpt.chars().count(), 153);
        assert!(card.excerpt.ends_with("..."));
        assert_eq!(card.views, 12);
    }

    #[test]
    fn test_card_with_unknown_category() {
        let article: Article = serde_json::from_value(json!({ "id": 1, "category_id": 9 })).unwrap();
        let card = ArticleCard::new(&article, &[]);
        assert_eq!(card.title, "Untitled");
        assert!(card.category.is_none());
        assert!(card.published.is_none());
    }
}
