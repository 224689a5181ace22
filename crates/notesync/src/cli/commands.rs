//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::note::{NoteDraft, NotePatch};

/// `list` arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// `new` arguments.
#[derive(Debug, Args)]
pub struct NewCommand {
    /// Note title (defaults to "Untitled")
    #[arg(short, long)]
    pub title: Option<String>,

    /// Note body
    #[arg(short = 'b', long)]
    pub content: Option<String>,
}

impl NewCommand {
    /// The draft described by these arguments.
    #[must_use]
    pub fn to_draft(&self) -> NoteDraft {
        NoteDraft {
            title: self.title.clone(),
            content: self.content.clone(),
        }
    }
}

/// `show` arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Note id
    pub id: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// `edit` arguments.
#[derive(Debug, Args)]
pub struct EditCommand {
    /// Note id
    pub id: String,

    /// Replacement title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Replacement body
    #[arg(short = 'b', long)]
    pub content: Option<String>,
}

impl EditCommand {
    /// The patch described by these arguments.
    #[must_use]
    pub fn to_patch(&self) -> NotePatch {
        NotePatch {
            title: self.title.clone(),
            content: self.content.clone(),
        }
    }
}

/// `rm` arguments.
#[derive(Debug, Args)]
pub struct RemoveCommand {
    /// Note id
    pub id: String,
}

/// `search` arguments.
#[derive(Debug, Args)]
pub struct SearchCommand {
    /// Text to look for in titles and bodies, ignoring case
    pub query: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// `status` arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration (the access key is redacted)
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
