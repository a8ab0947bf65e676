//! Article reading view, comments and the admin "move to draft" action.
//!
//! There is no endpoint for a single article, so every handler looks the
//! article up in the reader's loaded feed and goes back to `/home` when it
//! is not there.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use brief_bulletin_core::{Article, ArticleId, Comment, CommentForm, InFlight, NewComment};
use chrono::Utc;
use tower_sessions::Session;
use tracing::instrument;

use super::{Chrome, ConfirmTemplate};
use super::home::{back_to_feed, load_home, store_home};
use crate::api::ApiError;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{RequireAdmin, RequireSession, expire_session};
use crate::models::{CurrentSession, Notice};
use crate::state::AppState;

/// Article page template.
#[derive(Template, WebTemplate)]
#[template(path = "article.html")]
pub struct ArticleTemplate {
    pub chrome: Chrome,
    pub article: Article,
    pub comments: Vec<Comment>,
    pub form: CommentForm,
    pub can_draft: bool,
}

/// Approved comments, or `None` when the token was rejected.
async fn load_comments(
    state: &AppState,
    current: &CurrentSession,
    id: ArticleId,
) -> Option<Vec<Comment>> {
    match state.api().comments(current.token(), id).await {
        Ok(comments) => Some(comments),
        Err(e) if e.is_unauthorized() => None,
        Err(e) => {
            tracing::warn!(error = %e, article_id = %id, "Failed to load comments");
            Some(Vec::new())
        }
    }
}

/// Render the article with freshly loaded comments.
async fn render_article(
    state: &AppState,
    session: &Session,
    current: &CurrentSession,
    article: Article,
    form: CommentForm,
    notice: Option<Notice>,
) -> Result<Response> {
    let Some(comments) = load_comments(state, current, article.id).await else {
        return Ok(expire_session(session).await);
    };

    let mut chrome = Chrome::load(session, Some(current)).await;
    if let Some(notice) = notice {
        chrome = chrome.with_notice(notice);
    }

    Ok(ArticleTemplate {
        chrome,
        article,
        comments,
        form,
        can_draft: current.is_admin(),
    }
    .into_response())
}

/// Display an article from the feed and bump its read counter.
#[instrument(skip_all, fields(article_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    RequireSession(current): RequireSession,
    session: Session,
    Path(id): Path<ArticleId>,
) -> Result<Response> {
    let mut home = load_home(&session).await?;
    if home.feed.find(id).is_none() {
        return Ok(Redirect::to("/home").into_response());
    }

    match state.api().read_news(current.token(), id).await {
        Ok(()) => {
            if let Some(article) = home.feed.find_mut(id) {
                article.record_view();
            }
            store_home(&session, &home).await?;
        }
        Err(e) if e.is_unauthorized() => return Ok(expire_session(&session).await),
        Err(e) => tracing::debug!(error = %e, "Read counter not updated"),
    }

    let Some(article) = home.feed.find(id).cloned() else {
        return Ok(Redirect::to("/home").into_response());
    };
    render_article(&state, &session, &current, article, CommentForm::default(), None).await
}

/// Post a comment. New comments wait for moderation before they show up.
#[instrument(skip_all, fields(article_id = %id))]
pub async fn post_comment(
    State(state): State<AppState>,
    RequireSession(current): RequireSession,
    session: Session,
    Path(id): Path<ArticleId>,
    Form(form): Form<CommentForm>,
) -> Result<Response> {
    let home = load_home(&session).await?;
    let Some(article) = home.feed.find(id).cloned() else {
        return Ok(Redirect::to("/home").into_response());
    };

    let comment = match NewComment::from_form(id, &form) {
        Ok(comment) => comment,
        Err(e) => {
            let notice = Notice::error("Validation Error", e.to_string());
            return render_article(&state, &session, &current, article, form, Some(notice)).await;
        }
    };

    match state.api().create_comment(current.token(), &comment).await {
        Ok(_) => {
            tracing::info!("Comment posted");
            render_article(&state, &session, &current, article, CommentForm::default(), None).await
        }
        Err(e) if e.is_unauthorized() => Ok(expire_session(&session).await),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to post comment");
            let notice = Notice::error("Error", e.user_message("Failed to post comment"));
            render_article(&state, &session, &current, article, form, Some(notice)).await
        }
    }
}

/// "Move to Draft?" confirmation.
#[instrument(skip_all, fields(article_id = %id))]
pub async fn confirm_draft(
    RequireAdmin(current): RequireAdmin,
    session: Session,
    Path(id): Path<ArticleId>,
) -> Result<Response> {
    let home = load_home(&session).await?;
    if home.feed.find(id).is_none() {
        return Ok(Redirect::to("/home").into_response());
    }

    Ok(ConfirmTemplate {
        chrome: Chrome::load(&session, Some(&current)).await,
        title: "Move to Draft?",
        message: "This article will be moved to draft and removed from the public view.",
        action: format!("/articles/{id}/draft"),
        confirm_label: "Yes, move to draft",
        cancel_href: format!("/articles/{id}"),
    }
    .into_response())
}

/// Move a published article back to draft and drop it from the feed.
///
/// Only one draft request runs at a time per reader; a second submission
/// while one is in flight is ignored. The guard lapses after the API
/// timeout if this handler never finishes.
#[instrument(skip_all, fields(article_id = %id))]
pub async fn move_to_draft(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    session: Session,
    Path(id): Path<ArticleId>,
) -> Result<Response> {
    let mut home = load_home(&session).await?;
    let now = Utc::now();
    if home.is_drafting(now) || home.feed.find(id).is_none() {
        return Ok(Redirect::to("/home").into_response());
    }

    home.drafting = Some(InFlight::start(id, now, state.config().in_flight_hold()));
    store_home(&session, &home).await?;
    session.save().await?;

    let result = state.api().draft_article(current.token(), id).await;
    home.drafting = None;

    let notice = match result {
        Ok(_) => {
            home.feed.remove(id);
            add_breadcrumb("moderation", "Moved article to draft", None);
            tracing::info!("Article moved to draft");
            Notice::success("Moved to Draft!", "The article has been successfully moved to draft.")
        }
        Err(e) if e.is_unauthorized() => return Ok(expire_session(&session).await),
        Err(e @ ApiError::Rejected { .. }) => {
            tracing::warn!(error = %e, "Draft request rejected");
            Notice::error("Error", e.user_message("Failed to move article to draft"))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Draft request failed");
            Notice::error("Error", "An error occurred while moving the article to draft")
        }
    };

    notice.flash(&session).await?;
    back_to_feed(&session, &mut home).await
}
