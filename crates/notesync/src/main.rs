//! `notes` - CLI for notesync
//!
//! Lists, creates, edits, deletes and searches notes in whichever storage the
//! configuration selects.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::Parser;

use notesync::cli::{Cli, Command, ConfigCommand, NoteCommand};
use notesync::provider::{self, Provider};
use notesync::{init_logging, Config, Note, NoteProvider, NotesService};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    match cli.command {
        Command::Config(cmd) => handle_config(&config, cmd),
        Command::Notes(cmd) => handle_notes(&config, cmd).await,
    }
}

async fn handle_notes(config: &Config, cmd: NoteCommand) -> Result<()> {
    let provider = provider::select(config).with_context(|| {
        format!(
            "failed to open note storage at {}",
            config.slot_path().display()
        )
    })?;
    let service = NotesService::new(provider);

    match cmd {
        NoteCommand::List(cmd) => {
            let notes = service.list().await?;
            print_notes(&notes, cmd.json)?;
        }
        NoteCommand::New(cmd) => {
            let note = service.create(cmd.to_draft()).await?;
            println!("{}", note.id);
        }
        NoteCommand::Show(cmd) => {
            let note = service
                .get(&cmd.id)
                .await?
                .with_context(|| format!("no note with id {}", cmd.id))?;
            if cmd.json {
                println!("{}", serde_json::to_string_pretty(&note)?);
            } else {
                print_note(&note);
            }
        }
        NoteCommand::Edit(cmd) => {
            let patch = cmd.to_patch();
            if patch.is_empty() {
                anyhow::bail!("nothing to change; pass --title and/or --content");
            }
            let note = service
                .update(&cmd.id, &patch)
                .await?
                .with_context(|| format!("no note with id {}", cmd.id))?;
            println!("{}", note.id);
        }
        NoteCommand::Rm(cmd) => {
            if !service.delete(&cmd.id).await? {
                anyhow::bail!("no note with id {}", cmd.id);
            }
        }
        NoteCommand::Search(cmd) => {
            let notes = service.search(&cmd.query).await?;
            print_notes(&notes, cmd.json)?;
        }
        NoteCommand::Status(cmd) => handle_status(config, &service, cmd.json).await?,
    }
    Ok(())
}

async fn handle_status(
    config: &Config,
    service: &NotesService<Provider>,
    json: bool,
) -> Result<()> {
    let mode = service.provider().mode();
    let listed = service.list_with_origin().await?;
    let degraded = listed.is_degraded();
    let count = listed.value().len();

    if json {
        let status = serde_json::json!({
            "mode": mode.to_string(),
            "storage": service.storage_info(),
            "degraded": degraded,
            "notes": count,
            "slot_path": config.slot_path(),
            "slot_key": config.storage.slot_key,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("notes status");
        println!("------------");
        println!("Mode:          {mode}");
        println!("Storage:       {}", service.storage_info());
        if degraded {
            println!("Remote:        unreachable, serving local fallback");
        }
        println!("Notes:         {count}");
        println!("Slot:          {}", config.slot_path().display());
        println!("Slot key:      {}", config.storage.slot_key);
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let shown = config.redacted();
            if json {
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Slot path:          {}", shown.slot_path().display());
                println!("  Slot key:           {}", shown.storage.slot_key);
                println!();
                println!("[Remote]");
                println!("  Mode:               {}", provider::mode_for(&shown));
                println!(
                    "  URL:                {}",
                    shown.remote.url.as_deref().unwrap_or("(not set)")
                );
                println!(
                    "  Key:                {}",
                    shown.remote.key.as_deref().unwrap_or("(not set)")
                );
                println!("  Table:              {}", shown.remote.table);
                println!("  Timeout (secs):     {}", shown.remote.timeout_secs);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

fn print_notes(notes: &[Note], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(notes)?);
        return Ok(());
    }
    if notes.is_empty() {
        println!("No notes.");
        return Ok(());
    }
    for note in notes {
        println!(
            "{}  {:<16}  {}",
            note.id,
            format_millis(note.updated_at),
            note.title
        );
    }
    Ok(())
}

fn print_note(note: &Note) {
    println!("{}", note.title);
    println!("id:      {}", note.id);
    println!("created: {}", format_millis(note.created_at));
    println!("updated: {}", format_millis(note.updated_at));
    if !note.content.is_empty() {
        println!();
        println!("{}", note.content);
    }
}

fn format_millis(ms: Option<i64>) -> String {
    ms.and_then(DateTime::from_timestamp_millis)
        .map_or_else(
            || "-".to_string(),
            |t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        )
}
