//! Brief Bulletin CLI - admin provisioning and moderation tools.
//!
//! # Usage
//!
//! ```bash
//! # Create an admin account
//! bb-cli admin create -n "Editor" -e editor@example.com -p 's3cret'
//!
//! # Drafts awaiting approval
//! bb-cli drafts list
//! bb-cli drafts publish 42
//!
//! # Comments awaiting approval
//! bb-cli comments pending
//! bb-cli comments approve 7
//! bb-cli comments archive 8
//! ```
//!
//! # Environment Variables
//!
//! - `BRIEF_API_URL` - REST API base URL (required)
//! - `BRIEF_ADMIN_LOGIN` / `BRIEF_ADMIN_PASSWORD` - Admin account used by the
//!   moderation commands

#![cfg_attr(not(test), forbid(unsafe_code))]

use brief_bulletin_core::{AdminForm, ArticleId, CommentId};
use clap::{Parser, Subcommand};

mod commands;

use commands::AdminSession;

#[derive(Parser)]
#[command(name = "bb-cli")]
#[command(author, version, about = "Brief Bulletin CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Review draft articles
    Drafts {
        #[command(subcommand)]
        action: DraftAction,
    },
    /// Moderate reader comments
    Comments {
        #[command(subcommand)]
        action: CommentAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// E-mail address
        #[arg(short, long)]
        email: String,

        /// Initial password
        #[arg(short, long)]
        password: String,

        /// Phone number
        #[arg(long, default_value = "")]
        phone: String,
    },
}

#[derive(Subcommand)]
enum DraftAction {
    /// List drafts awaiting approval
    List {
        /// Page to fetch
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Publish a draft
    Publish {
        /// Article ID
        id: ArticleId,
    },
}

#[derive(Subcommand)]
enum CommentAction {
    /// List comments awaiting approval
    Pending,
    /// Approve a comment
    Approve {
        /// Comment ID
        id: CommentId,
    },
    /// Archive (disable) a comment
    Archive {
        /// Comment ID
        id: CommentId,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    dotenvy::dotenv().ok();

    match cli.command {
        Commands::Admin { action } => match action {
            AdminAction::Create {
                name,
                email,
                password,
                phone,
            } => {
                let form = AdminForm {
                    name,
                    email,
                    password,
                    phone,
                };
                commands::admin::create(&commands::client()?, form).await
            }
        },
        Commands::Drafts { action } => {
            let session = AdminSession::from_env().await?;
            match action {
                DraftAction::List { page } => commands::drafts::list(&session, page).await,
                DraftAction::Publish { id } => commands::drafts::publish(&session, id).await,
            }
        }
        Commands::Comments { action } => {
            let session = AdminSession::from_env().await?;
            match action {
                CommentAction::Pending => commands::comments::pending(&session).await,
                CommentAction::Approve { id } => commands::comments::approve(&session, id).await,
                CommentAction::Archive { id } => commands::comments::archive(&session, id).await,
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_admin_create() {
        let cli = Cli::try_parse_from([
            "bb-cli", "admin", "create", "-n", "Editor", "-e", "ed@example.com", "-p", "s3cret",
        ])
        .unwrap();
        let Commands::Admin {
            action: AdminAction::Create { name, phone, .. },
        } = cli.command
        else {
            panic!("expected admin create");
        };
        assert_eq!(name, "Editor");
        assert!(phone.is_empty());
    }

    #[test]
    fn test_parse_moderation_ids() {
        let cli = Cli::try_parse_from(["bb-cli", "comments", "archive", "8"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Comments { action: CommentAction::Archive { id } } if id == CommentId::new(8)
        ));

        assert!(Cli::try_parse_from(["bb-cli", "drafts", "publish", "abc"]).is_err());
    }
}
