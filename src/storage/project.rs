//! Project storage: create, load, update, list, and resolve projects.

use std::{fs, io};

use rusqlite::Connection;
use uuid::Uuid;

use crate::model::{Ideation, Pending, Project};

use super::{Result, Storage, StorageError};

impl Storage {
    /// Creates a new project, writing its record to a new `SQLite` file.
    pub fn create_project(&self, project: &Project) -> Result<()> {
        let conn = self.create_db(project.id)?;
        conn.execute(
            "INSERT INTO project (id, title, created_at, ideation, pending)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                project.id.to_string(),
                &project.title,
                project.created_at.to_string(),
                serde_json::to_string(&project.ideation)?,
                pending_json(project)?,
            ],
        )?;
        tracing::info!(project = %project.id, title = %project.title, "created project");
        Ok(())
    }

    /// Updates a project's record.
    pub fn update_project(&self, project: &Project) -> Result<()> {
        let conn = self.open_db(project.id)?;
        let rows = conn.execute(
            "UPDATE project SET title = ?1, ideation = ?2, pending = ?3 WHERE id = ?4",
            rusqlite::params![
                &project.title,
                serde_json::to_string(&project.ideation)?,
                pending_json(project)?,
                project.id.to_string(),
            ],
        )?;
        if rows == 0 {
            return Err(StorageError::ProjectNotFound(project.id));
        }
        Ok(())
    }

    /// Loads a single project's record.
    pub fn load_project(&self, id: Uuid) -> Result<Project> {
        let conn = self.open_db(id)?;
        load_project_row(&conn)
    }

    /// Lists all projects, oldest first.
    ///
    /// Unreadable or malformed files are skipped.
    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let mut projects = Vec::new();
        let entries = match fs::read_dir(&self.root) {
            Ok(e) => e,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(projects),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("sqlite") {
                continue;
            }
            let Ok(conn) = Connection::open(&path) else {
                continue;
            };
            match load_project_row(&conn) {
                Ok(p) => projects.push(p),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping project file"),
            }
        }
        projects.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(projects)
    }

    /// Finds the one project whose id starts with `prefix`.
    pub fn resolve_project(&self, prefix: &str) -> Result<Project> {
        let prefix = prefix.trim().to_lowercase();
        let mut matches: Vec<Project> = self
            .list_projects()?
            .into_iter()
            .filter(|p| p.id.to_string().starts_with(&prefix))
            .collect();

        match matches.len() {
            0 => Err(StorageError::NoMatch(prefix)),
            1 => Ok(matches.remove(0)),
            count => Err(StorageError::Ambiguous { prefix, count }),
        }
    }
}

fn pending_json(project: &Project) -> Result<Option<String>> {
    Ok(project
        .pending
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?)
}

/// Reads the single project row from an open connection.
fn load_project_row(conn: &Connection) -> Result<Project> {
    let (id_str, title, created_at_str, ideation_json, pending) = conn.query_row(
        "SELECT id, title, created_at, ideation, pending FROM project LIMIT 1",
        [],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
            ))
        },
    )?;

    let id = id_str
        .parse::<Uuid>()
        .map_err(|e| StorageError::Corrupt(format!("invalid project id: {e}")))?;
    let created_at = created_at_str
        .parse::<jiff::Timestamp>()
        .map_err(|e| StorageError::Corrupt(format!("invalid created_at: {e}")))?;
    let ideation: Ideation = serde_json::from_str(&ideation_json)?;
    let pending = pending.and_then(|json| match serde_json::from_str::<Pending>(&json) {
        Ok(pending) => Some(pending),
        Err(e) => {
            tracing::warn!(project = %id, error = %e, "dropping unreadable pending candidate");
            None
        }
    });

    Ok(Project {
        id,
        title,
        created_at,
        ideation,
        pending,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;

    use crate::model::{FlowStage, IdeationField};
    use crate::storage::tests::test_storage;

    fn sample_project() -> Project {
        Project::new("River Guardians")
    }

    #[test]
    fn create_and_load_project() {
        let (_dir, storage) = test_storage();
        let project = sample_project();

        storage.create_project(&project).unwrap();
        let loaded = storage.load_project(project.id).unwrap();

        assert_eq!(loaded.id, project.id);
        assert_eq!(loaded.title, "River Guardians");
        assert_eq!(loaded.created_at, project.created_at);
    }

    #[test]
    fn create_duplicate_project_fails() {
        let (_dir, storage) = test_storage();
        let project = sample_project();

        storage.create_project(&project).unwrap();
        let err = storage.create_project(&project).unwrap_err();

        assert!(matches!(err, StorageError::ProjectAlreadyExists(_)));
    }

    #[test]
    fn load_nonexistent_project_fails() {
        let (_dir, storage) = test_storage();
        let err = storage.load_project(Uuid::new_v4()).unwrap_err();

        assert!(matches!(err, StorageError::ProjectNotFound(_)));
    }

    #[test]
    fn update_keeps_ideation_and_pending() {
        let (_dir, storage) = test_storage();
        let mut project = sample_project();
        storage.create_project(&project).unwrap();

        project.ideation.big_idea = Some("Rivers connect communities.".into());
        project.pending = Some(Pending::new(
            FlowStage::Ideation(IdeationField::EssentialQuestion),
            "How can we protect our river?",
        ));
        storage.update_project(&project).unwrap();

        let loaded = storage.load_project(project.id).unwrap();
        assert_eq!(loaded.ideation, project.ideation);
        assert_eq!(loaded.pending, project.pending);
    }

    #[test]
    fn update_nonexistent_project_fails() {
        let (_dir, storage) = test_storage();
        let err = storage.update_project(&sample_project()).unwrap_err();

        assert!(matches!(err, StorageError::ProjectNotFound(_)));
    }

    #[test]
    fn list_projects_sorted_by_created_at() {
        let (_dir, storage) = test_storage();

        let mut first = sample_project();
        first.title = "First".into();
        first.created_at = Timestamp::new(1_000_000_000, 0).unwrap();

        let mut second = sample_project();
        second.title = "Second".into();
        second.created_at = Timestamp::new(2_000_000_000, 0).unwrap();

        storage.create_project(&second).unwrap();
        storage.create_project(&first).unwrap();
        fs::write(storage.root.join("notes.txt"), "not a project").unwrap();

        let projects = storage.list_projects().unwrap();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].title, "First");
        assert_eq!(projects[1].title, "Second");
    }

    #[test]
    fn resolve_by_prefix() {
        let (_dir, storage) = test_storage();
        let project = sample_project();
        storage.create_project(&project).unwrap();

        let id = project.id.to_string();
        let found = storage.resolve_project(&id[..6].to_uppercase()).unwrap();
        assert_eq!(found.id, project.id);

        let err = storage.resolve_project("zzzz").unwrap_err();
        assert!(matches!(err, StorageError::NoMatch(_)));
    }

    #[test]
    fn resolve_empty_prefix_is_ambiguous_with_many_projects() {
        let (_dir, storage) = test_storage();
        storage.create_project(&sample_project()).unwrap();
        storage.create_project(&sample_project()).unwrap();

        let err = storage.resolve_project("").unwrap_err();
        assert!(matches!(err, StorageError::Ambiguous { count: 2, .. }));
    }
}
