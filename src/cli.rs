//! CLI interface for Pathway.
//!
//! Each subcommand is non-interactive: arguments in, text out. Commands
//! split into two groups:
//!
//! - `pathway project new|list`: project lifecycle, no project context needed.
//! - `pathway --project <id> <command>`: everything else, operating on one
//!   project's workflow.
//!
//! The `--project` flag takes a full UUID or unambiguous prefix. Every
//! command that changes the workflow saves a snapshot afterwards.

mod format;
mod project;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::machine::Preserve;
use crate::model::Stage;
use crate::session::Session;
use crate::snapshot;
use crate::storage::Storage;

use format::{format_history, format_status};
use project::ProjectCommand;

/// Pathway: design a project-based learning unit, one stage at a time.
#[derive(Debug, Parser)]
#[command(name = "pathway", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Project ID: full UUID or unambiguous prefix (e.g. `a3b`).
    /// Required for everything except `project`.
    #[arg(long, global = true)]
    project: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r#"Workflow: designing a project
  1. pathway project new "River Guardians"
     → prints a project ID (e.g. a3b0fc12)
  2. pathway --project a3b say "Rivers connect every community downstream."
  3. pathway --project a3b advance
  4. pathway --project a3b input "1. Discover - explore the river
     2. Create - design a clean-up plan"
  5. pathway --project a3b status

Revising:
  pathway --project a3b edit phases
  pathway --project a3b reset --keep-phases
  pathway --project a3b export --out river.json"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage projects: create new ones, list existing.
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },

    /// Show the current stage, progress, and everything captured so far.
    Status,

    /// Enter text for the current stage. It is parsed into phases,
    /// activities, and so on, depending on the stage.
    ///
    /// Pass `-` to read the text from stdin.
    Input {
        text: String,
    },

    /// Move to the next stage if the current one is complete.
    Advance,

    /// Skip an optional stage.
    Skip,

    /// Go back to a stage already visited, keeping all data.
    Edit {
        /// Stage name, e.g. `phases`, `journey-review`, `DELIVERABLE_RUBRIC`.
        stage: Stage,
    },

    /// Start the workflow over.
    Reset {
        /// Keep the learning phases and reflections; clear everything else.
        #[arg(long)]
        keep_phases: bool,
    },

    /// Add a free-text note. Never parsed.
    Reflect {
        text: String,
    },

    /// Talk to the guide: the utterance is classified and acted on.
    Say {
        utterance: String,
    },

    /// Write the workflow snapshot as JSON.
    Export {
        /// Write to this file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Replace the workflow with a snapshot read from a JSON file.
    ///
    /// Older snapshot versions are migrated. Repairs made while reading
    /// are listed on stderr.
    Import {
        file: PathBuf,
    },

    /// List saved snapshots, oldest first.
    History,
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config, storage: &Storage) -> Result<(), String> {
    let cli = Cli::parse();

    if let Command::Project { command } = &cli.command {
        return match command {
            ProjectCommand::New { title } => project::cmd_new(storage, title),
            ProjectCommand::List => project::cmd_list(storage),
        };
    }

    let mut session = open_session(config, storage, cli.project.as_deref())?;

    match cli.command {
        Command::Project { .. } => Ok(()),
        Command::Status => {
            print!("{}", format_status(&session));
            Ok(())
        }
        Command::Input { text } => cmd_input(storage, &mut session, &read_text(&text)?),
        Command::Advance => {
            let stage = session
                .workflow_mut()
                .advance()
                .map_err(|e| e.to_string())?;
            save(storage, &session)?;
            announce(&session, stage);
            Ok(())
        }
        Command::Skip => {
            let stage = session.workflow_mut().skip().map_err(|e| e.to_string())?;
            save(storage, &session)?;
            announce(&session, stage);
            Ok(())
        }
        Command::Edit { stage } => {
            session
                .workflow_mut()
                .edit(stage)
                .map_err(|e| e.to_string())?;
            save(storage, &session)?;
            announce(&session, stage);
            Ok(())
        }
        Command::Reset { keep_phases } => {
            session
                .workflow_mut()
                .reset(Preserve::phases_if(keep_phases));
            save(storage, &session)?;
            eprintln!("Workflow reset");
            println!("{}", session.prompt());
            Ok(())
        }
        Command::Reflect { text } => {
            session.workflow_mut().add_reflection(read_text(&text)?.trim());
            save(storage, &session)?;
            eprintln!("Reflection added");
            Ok(())
        }
        Command::Say { utterance } => cmd_say(storage, &mut session, &utterance),
        Command::Export { out } => cmd_export(&session, out.as_deref()),
        Command::Import { file } => cmd_import(storage, &mut session, &file),
        Command::History => {
            let records = storage
                .list_snapshots(session.project().id)
                .map_err(|e| format!("failed to read history: {e}"))?;
            print!("{}", format_history(&records));
            Ok(())
        }
    }
}

/// Require that `--project` was provided and open its session.
fn open_session(
    config: &Config,
    storage: &Storage,
    project_ref: Option<&str>,
) -> Result<Session, String> {
    let project_ref = project_ref.ok_or("this command requires --project <id>")?;
    let project = storage
        .resolve_project(project_ref)
        .map_err(|e| e.to_string())?;
    Session::open(project, storage, config.policy())
        .map_err(|e| format!("failed to load project: {e}"))
}

/// Persists the project record and the workflow snapshot.
fn save(storage: &Storage, session: &Session) -> Result<(), String> {
    storage
        .update_project(session.project())
        .map_err(|e| format!("failed to save project: {e}"))?;
    session
        .save(storage)
        .map_err(|e| format!("failed to save snapshot: {e}"))
}

fn announce(session: &Session, stage: Stage) {
    let progress = session.workflow().progress();
    eprintln!("→ {stage} ({}%)", progress.percentage);
    println!("{}", session.workflow().transition_message());
}

/// The argument itself, or stdin when it is `-`.
fn read_text(arg: &str) -> Result<String, String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .map_err(|e| format!("failed to read stdin: {e}"))?;
    Ok(text)
}

fn cmd_input(storage: &Storage, session: &mut Session, text: &str) -> Result<(), String> {
    let outcome = session
        .workflow_mut()
        .process_input(text)
        .map_err(|e| e.to_string())?;
    save(storage, session)?;

    let stage = session.workflow().stage();
    eprintln!("Captured {} item(s) for {stage}", outcome.extracted);
    if stage != Stage::Complete {
        match session.workflow().gate() {
            Ok(()) => println!("Ready to advance."),
            Err(gate) => println!("{gate}"),
        }
    }
    Ok(())
}

fn cmd_say(storage: &Storage, session: &mut Session, utterance: &str) -> Result<(), String> {
    let turn = session.respond(&read_text(utterance)?);
    save(storage, session)?;

    if let Some(notice) = &turn.notice {
        eprintln!("! {notice}");
    }
    println!("{}", turn.prompt);
    Ok(())
}

fn cmd_export(session: &Session, out: Option<&Path>) -> Result<(), String> {
    let json = session
        .workflow()
        .export_state()
        .to_json()
        .map_err(|e| format!("failed to serialize snapshot: {e}"))?;

    match out {
        Some(path) => {
            fs::write(path, &json)
                .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
            eprintln!("Exported {} → {}", session.project().title, path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_import(storage: &Storage, session: &mut Session, file: &Path) -> Result<(), String> {
    let json = fs::read_to_string(file)
        .map_err(|e| format!("failed to read {}: {e}", file.display()))?;
    let decoded = snapshot::decode(&json).map_err(|e| e.to_string())?;
    for repair in &decoded.repairs {
        eprintln!("repaired: {repair}");
    }

    session
        .workflow_mut()
        .import_state(decoded.snapshot)
        .map_err(|e| e.to_string())?;
    save(storage, session)?;

    let stage = session.workflow().stage();
    eprintln!("Imported {} at {stage}", file.display());
    Ok(())
}
