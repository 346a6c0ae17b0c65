//! Project lifecycle commands: new, list.

use clap::Subcommand;

use crate::model::Project;
use crate::snapshot::SnapshotStore;
use crate::storage::Storage;

#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    /// Create a new project. Prints the project ID.
    New {
        /// Working title, e.g. "River Guardians".
        title: String,
    },

    /// List projects.
    List,
}

pub(super) fn cmd_new(storage: &Storage, title: &str) -> Result<(), String> {
    let title = title.trim();
    if title.is_empty() {
        return Err("a project needs a title".to_string());
    }
    let project = Project::new(title);

    storage
        .create_project(&project)
        .map_err(|e| format!("failed to create project: {e}"))?;

    println!("{}", project.id);
    Ok(())
}

pub(super) fn cmd_list(storage: &Storage) -> Result<(), String> {
    let projects = storage
        .list_projects()
        .map_err(|e| format!("failed to list projects: {e}"))?;

    if projects.is_empty() {
        println!("No projects");
        return Ok(());
    }

    for p in &projects {
        let stage = match storage.load(p.id) {
            Ok(Some(snapshot)) => snapshot.state.to_string(),
            Ok(None) => "not started".to_string(),
            Err(e) => format!("unreadable: {e}"),
        };
        println!("{}  [{stage}]  {}", p.short_id(), p.title);
    }

    Ok(())
}
