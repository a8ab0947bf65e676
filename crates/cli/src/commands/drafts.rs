//! Draft review commands.

use brief_bulletin_core::ArticleId;

use super::{AdminSession, CliError};

/// Print one page of drafts awaiting approval.
#[allow(clippy::print_stdout)]
pub async fn list(session: &AdminSession, page: u32) -> Result<(), CliError> {
    let drafts = session.api.drafts(&session.token, page).await?;

    if drafts.is_empty() {
        tracing::info!("No drafts on page {page}");
        return Ok(());
    }

    for draft in &drafts {
        let created = draft
            .created_at
            .as_ref()
            .map(|ts| ts.short_date_time())
            .unwrap_or_default();
        println!("{:>6}  {:<16}  {}", draft.id, created, draft.title());
    }
    tracing::info!("{} draft(s) on page {page}", drafts.len());
    Ok(())
}

/// Publish a draft.
pub async fn publish(session: &AdminSession, id: ArticleId) -> Result<(), CliError> {
    session.api.publish_article(&session.token, id).await?;
    tracing::info!("Article {id} approved");
    Ok(())
}
