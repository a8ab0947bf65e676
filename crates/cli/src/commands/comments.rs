//! Comment moderation commands.

use brief_bulletin_core::CommentId;

use super::{AdminSession, CliError};

/// Print the comments awaiting approval.
#[allow(clippy::print_stdout)]
pub async fn pending(session: &AdminSession) -> Result<(), CliError> {
    let comments = session.api.approval_due_comments(&session.token).await?;

    if comments.is_empty() {
        tracing::info!("No pending comments");
        return Ok(());
    }

    for comment in &comments {
        let id = comment.id().map(|id| id.to_string()).unwrap_or_default();
        println!("{id:>6}  {}  {}", comment.author(), comment.text());
    }
    tracing::info!("{} comment(s) awaiting approval", comments.len());
    Ok(())
}

/// Approve a pending comment.
pub async fn approve(session: &AdminSession, id: CommentId) -> Result<(), CliError> {
    session.api.activate_comment(&session.token, id).await?;
    tracing::info!("Comment {id} activated");
    Ok(())
}

/// Archive (disable) a comment.
pub async fn archive(session: &AdminSession, id: CommentId) -> Result<(), CliError> {
    session.api.disable_comment(&session.token, id).await?;
    tracing::info!("Comment {id} archived");
    Ok(())
}
