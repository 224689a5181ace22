//! Command-line interface for notesync.
//!
//! This module provides the CLI structure for the `notes` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::Verbosity;

pub use commands::{
    ConfigCommand, EditCommand, ListCommand, NewCommand, RemoveCommand, SearchCommand,
    ShowCommand, StatusCommand,
};

/// notes - Keep notes locally or in a remote table
///
/// Notes are stored in a remote PostgREST table when an endpoint URL and
/// access key are configured, and in a local slot otherwise. When the remote
/// is unreachable, reads and writes fall back to the local slot.
#[derive(Debug, Parser)]
#[command(name = "notes")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    #[command(flatten)]
    Notes(NoteCommand),
}

/// Commands that open note storage.
#[derive(Debug, Subcommand)]
pub enum NoteCommand {
    /// List notes, most recently updated first
    List(ListCommand),

    /// Create a note
    New(NewCommand),

    /// Show one note
    Show(ShowCommand),

    /// Change the title or body of a note
    Edit(EditCommand),

    /// Delete a note
    Rm(RemoveCommand),

    /// Search titles and bodies
    Search(SearchCommand),

    /// Show which storage is active
    Status(StatusCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Notes(NoteCommand::Status(StatusCommand { json: false })),
        }
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "notes");
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(cli(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_list_json() {
        let cli = Cli::try_parse_from(["notes", "list", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Notes(NoteCommand::List(ListCommand { json: true }))
        ));
    }

    #[test]
    fn test_parse_new() {
        let cli =
            Cli::try_parse_from(["notes", "new", "--title", "Shopping", "-b", "milk"]).unwrap();
        let Command::Notes(NoteCommand::New(cmd)) = cli.command else {
            panic!("expected new");
        };
        assert_eq!(cmd.title.as_deref(), Some("Shopping"));
        assert_eq!(cmd.content.as_deref(), Some("milk"));
    }

    #[test]
    fn test_parse_new_without_fields() {
        let cli = Cli::try_parse_from(["notes", "new"]).unwrap();
        let Command::Notes(NoteCommand::New(cmd)) = cli.command else {
            panic!("expected new");
        };
        assert!(cmd.title.is_none());
        assert!(cmd.content.is_none());
    }

    #[test]
    fn test_parse_edit() {
        let cli = Cli::try_parse_from(["notes", "edit", "abc", "--content", "x"]).unwrap();
        let Command::Notes(NoteCommand::Edit(cmd)) = cli.command else {
            panic!("expected edit");
        };
        assert_eq!(cmd.id, "abc");
        assert!(cmd.title.is_none());
        assert_eq!(cmd.content.as_deref(), Some("x"));
    }

    #[test]
    fn test_parse_rm_requires_id() {
        assert!(Cli::try_parse_from(["notes", "rm"]).is_err());
        let cli = Cli::try_parse_from(["notes", "rm", "abc"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Notes(NoteCommand::Rm(RemoveCommand { ref id })) if id == "abc"
        ));
    }

    #[test]
    fn test_parse_search() {
        let cli = Cli::try_parse_from(["notes", "search", "milk"]).unwrap();
        assert!(matches!(cli.command, Command::Notes(NoteCommand::Search(_))));
    }

    #[test]
    fn test_parse_config_validate() {
        let cli = Cli::try_parse_from(["notes", "config", "validate", "-f", "x.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }

    #[test]
    fn test_note_commands_sit_at_top_level() {
        let cli = Cli::try_parse_from(["notes", "status", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Notes(NoteCommand::Status(StatusCommand { json: true }))
        ));
        assert!(Cli::try_parse_from(["notes", "notes", "status"]).is_err());
    }

    #[test]
    fn test_parse_with_config() {
        let cli = Cli::try_parse_from(["notes", "-c", "/custom/config.toml", "status"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_verbose() {
        let cli = Cli::try_parse_from(["notes", "-vv", "list"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_parse_with_quiet() {
        let cli = Cli::try_parse_from(["notes", "-q", "status"]).unwrap();
        assert!(cli.quiet);
    }
}
