//! Admin panel route handlers.
//!
//! Three tabs: drafts awaiting approval, comments awaiting approval and the
//! "create admin" form. Opening a tab (GET) reloads its data. Mutations
//! (POST) drop the item from the list held in the session and render the tab
//! straight away with an inline banner, without reloading from the API.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use brief_bulletin_core::{AdminForm, Article, ArticleId, Comment, CommentId, Role};
use tower_sessions::Session;
use tracing::instrument;

use super::{Chrome, ConfirmTemplate};
use crate::api::NewUser;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{RequireAdmin, expire_session};
use crate::models::{AdminPanel, CurrentSession, session_keys};
use crate::state::AppState;

/// Admin panel tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminTab {
    Drafts,
    Comments,
    CreateAdmin,
}

impl AdminTab {
    pub const ALL: [Self; 3] = [Self::Drafts, Self::Comments, Self::CreateAdmin];

    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Drafts => "/admin/drafts",
            Self::Comments => "/admin/comments",
            Self::CreateAdmin => "/admin/create-admin",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Drafts => "Approve Articles",
            Self::Comments => "Activate Comments",
            Self::CreateAdmin => "Create Admin",
        }
    }
}

/// Inline error/success messages above the tab content.
#[derive(Debug, Clone, Default)]
pub struct Banner {
    pub error: Option<String>,
    pub success: Option<String>,
}

impl Banner {
    fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            success: None,
        }
    }

    fn success(message: impl Into<String>) -> Self {
        Self {
            error: None,
            success: Some(message.into()),
        }
    }
}

/// Admin panel template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/panel.html")]
pub struct AdminTemplate {
    pub chrome: Chrome,
    pub tab: AdminTab,
    pub tabs: &'static [AdminTab],
    pub banner: Banner,
    pub drafts: Vec<Article>,
    pub comments: Vec<Comment>,
    pub form: AdminForm,
}

async fn load_panel(session: &Session) -> Result<AdminPanel> {
    Ok(session
        .get::<AdminPanel>(session_keys::ADMIN_PANEL)
        .await?
        .unwrap_or_default())
}

async fn store_panel(session: &Session, panel: &AdminPanel) -> Result<()> {
    session.insert(session_keys::ADMIN_PANEL, panel).await?;
    Ok(())
}

/// Store the panel and render `tab`.
async fn render(
    session: &Session,
    current: &CurrentSession,
    tab: AdminTab,
    panel: AdminPanel,
    banner: Banner,
) -> Result<Response> {
    store_panel(session, &panel).await?;
    Ok(AdminTemplate {
        chrome: Chrome::load(session, Some(current)).await,
        tab,
        tabs: &AdminTab::ALL,
        banner,
        drafts: panel.drafts,
        comments: panel.pending_comments,
        form: panel.form,
    }
    .into_response())
}

// =============================================================================
// Drafts
// =============================================================================

/// Open the drafts tab: load page 1 of the drafts awaiting approval.
#[instrument(skip_all)]
pub async fn drafts(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    session: Session,
) -> Result<Response> {
    let mut panel = load_panel(&session).await?;
    let banner = match state.api().drafts(current.token(), 1).await {
        Ok(drafts) => {
            panel.drafts = drafts;
            Banner::default()
        }
        Err(e) if e.is_unauthorized() => return Ok(expire_session(&session).await),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load drafts");
            panel.drafts.clear();
            Banner::error("Failed to load drafts")
        }
    };
    render(&session, &current, AdminTab::Drafts, panel, banner).await
}

/// Approve (publish) a draft.
#[instrument(skip_all, fields(article_id = %id))]
pub async fn publish_draft(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    session: Session,
    Path(id): Path<ArticleId>,
) -> Result<Response> {
    let mut panel = load_panel(&session).await?;
    let banner = match state.api().publish_article(current.token(), id).await {
        Ok(_) => {
            panel.drafts.retain(|draft| draft.id != id);
            add_breadcrumb("moderation", "Approved draft", None);
            tracing::info!("Draft approved");
            Banner::success("Article approved successfully!")
        }
        Err(e) if e.is_unauthorized() => return Ok(expire_session(&session).await),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to approve article");
            Banner::error("Failed to approve article")
        }
    };
    render(&session, &current, AdminTab::Drafts, panel, banner).await
}

// =============================================================================
// Comments
// =============================================================================

/// Open the comments tab: load the comments awaiting approval.
#[instrument(skip_all)]
pub async fn comments(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    session: Session,
) -> Result<Response> {
    let mut panel = load_panel(&session).await?;
    let banner = match state.api().approval_due_comments(current.token()).await {
        Ok(comments) => {
            panel.pending_comments = comments;
            Banner::default()
        }
        Err(e) if e.is_unauthorized() => return Ok(expire_session(&session).await),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load comments");
            panel.pending_comments.clear();
            Banner::error("Failed to load comments")
        }
    };
    render(&session, &current, AdminTab::Comments, panel, banner).await
}

/// Approve a pending comment.
#[instrument(skip_all, fields(comment_id = %id))]
pub async fn activate_comment(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    session: Session,
    Path(id): Path<CommentId>,
) -> Result<Response> {
    let mut panel = load_panel(&session).await?;
    let banner = match state.api().activate_comment(current.token(), id).await {
        Ok(_) => {
            panel.pending_comments.retain(|c| c.id() != Some(id));
            add_breadcrumb("moderation", "Activated comment", None);
            Banner::success("Comment activated!")
        }
        Err(e) if e.is_unauthorized() => return Ok(expire_session(&session).await),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to activate comment");
            Banner::error("Failed to activate comment")
        }
    };
    render(&session, &current, AdminTab::Comments, panel, banner).await
}

/// "Archive comment?" confirmation.
#[instrument(skip_all, fields(comment_id = %id))]
pub async fn confirm_archive(
    RequireAdmin(current): RequireAdmin,
    session: Session,
    Path(id): Path<CommentId>,
) -> Result<Response> {
    Ok(ConfirmTemplate {
        chrome: Chrome::load(&session, Some(&current)).await,
        title: "Archive comment?",
        message: "This will archive (disable) the comment and remove it from the pending list.",
        action: format!("/admin/comments/{id}/archive"),
        confirm_label: "Yes, archive it",
        cancel_href: AdminTab::Comments.path().to_owned(),
    }
    .into_response())
}

/// Archive (disable) a comment.
#[instrument(skip_all, fields(comment_id = %id))]
pub async fn archive_comment(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    session: Session,
    Path(id): Path<CommentId>,
) -> Result<Response> {
    let mut panel = load_panel(&session).await?;
    let banner = match state.api().disable_comment(current.token(), id).await {
        Ok(_) => {
            panel.pending_comments.retain(|c| c.id() != Some(id));
            add_breadcrumb("moderation", "Archived comment", None);
            Banner::success("Comment archived!")
        }
        Err(e) if e.is_unauthorized() => return Ok(expire_session(&session).await),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to archive comment");
            Banner::error("Failed to archive comment")
        }
    };
    render(&session, &current, AdminTab::Comments, panel, banner).await
}

// =============================================================================
// Create Admin
// =============================================================================

/// Open the "create admin" tab.
#[instrument(skip_all)]
pub async fn create_admin_page(
    RequireAdmin(current): RequireAdmin,
    session: Session,
) -> Result<Response> {
    let panel = load_panel(&session).await?;
    render(&session, &current, AdminTab::CreateAdmin, panel, Banner::default()).await
}

/// Create an account with role ADMIN.
#[instrument(skip_all)]
pub async fn create_admin(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    session: Session,
    Form(form): Form<AdminForm>,
) -> Result<Response> {
    let mut panel = load_panel(&session).await?;

    if let Err(e) = form.validate() {
        panel.form = form;
        let banner = Banner::error(e.to_string());
        return render(&session, &current, AdminTab::CreateAdmin, panel, banner).await;
    }

    let user = NewUser {
        email: form.email.trim().to_owned(),
        password: form.password.clone(),
        phone: form.phone.trim().to_owned(),
        user_name: form.name.trim().to_owned(),
        role: Some(Role::Admin),
    };

    let banner = match state.api().create_user(&user).await {
        Ok(_) => {
            panel.form = AdminForm::default();
            add_breadcrumb("admin", "Created admin account", None);
            tracing::info!(email = %user.email, "Admin account created");
            Banner::success("Admin user created successfully!")
        }
        Err(e) if e.is_unauthorized() => return Ok(expire_session(&session).await),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to create admin user");
            panel.form = form;
            Banner::error(e.user_message("Failed to create admin user"))
        }
    };
    render(&session, &current, AdminTab::CreateAdmin, panel, banner).await
}

/// Clear the "create admin" form and its messages.
#[instrument(skip_all)]
pub async fn reset_admin_form(
    RequireAdmin(current): RequireAdmin,
    session: Session,
) -> Result<Response> {
    let mut panel = load_panel(&session).await?;
    panel.form = AdminForm::default();
    render(&session, &current, AdminTab::CreateAdmin, panel, Banner::default()).await
}
