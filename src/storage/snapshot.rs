//! Snapshot storage: the append-only workflow history of each project.

use jiff::Timestamp;
use rusqlite::{Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::model::Stage;
use crate::snapshot::{self, Snapshot, SnapshotStore};

use super::{Result, Storage, StorageError};

/// One saved snapshot, without its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRecord {
    pub seq: i64,
    pub saved_at: Timestamp,
    pub state: Stage,
    pub digest: String,
}

impl Storage {
    /// Every saved snapshot for a project, oldest first.
    pub fn list_snapshots(&self, project: Uuid) -> Result<Vec<SnapshotRecord>> {
        let conn = self.open_db(project)?;
        let mut stmt =
            conn.prepare("SELECT seq, saved_at, state, digest FROM snapshot ORDER BY seq")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (seq, saved_at, state, digest) = row?;
            records.push(SnapshotRecord {
                seq,
                saved_at: saved_at
                    .parse()
                    .map_err(|e| StorageError::Corrupt(format!("invalid saved_at: {e}")))?,
                state: state
                    .parse()
                    .map_err(|e| StorageError::Corrupt(format!("invalid state: {e}")))?,
                digest,
            });
        }
        Ok(records)
    }
}

impl SnapshotStore for Storage {
    type Error = StorageError;

    fn load(&self, project: Uuid) -> Result<Option<Snapshot>> {
        let conn = self.open_db(project)?;
        let Some(body) = latest(&conn, "body")? else {
            return Ok(None);
        };
        let decoded = snapshot::decode(&body)?;
        Ok(Some(decoded.snapshot))
    }

    /// Appends the snapshot unless it matches the latest one byte for byte.
    fn save(&self, project: Uuid, snapshot: &Snapshot) -> Result<()> {
        let conn = self.open_db(project)?;
        let body = serde_json::to_string(snapshot)?;
        let digest = hex::encode(Sha256::digest(body.as_bytes()));

        if latest(&conn, "digest")?.as_deref() == Some(digest.as_str()) {
            tracing::debug!(%project, "snapshot unchanged; not saved");
            return Ok(());
        }

        conn.execute(
            "INSERT INTO snapshot (saved_at, state, digest, body) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                Timestamp::now().to_string(),
                snapshot.state.as_str(),
                &digest,
                &body,
            ],
        )?;
        tracing::debug!(%project, state = snapshot.state.as_str(), "snapshot saved");
        Ok(())
    }
}

/// A column of the newest snapshot row.
fn latest(conn: &Connection, column: &str) -> Result<Option<String>> {
    let sql = format!("SELECT {column} FROM snapshot ORDER BY seq DESC LIMIT 1");
    Ok(conn
        .query_row(&sql, [], |row| row.get::<_, String>(0))
        .optional()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::machine::Workflow;
    use crate::model::Project;
    use crate::storage::tests::test_storage;

    fn stored_project(storage: &Storage) -> Project {
        let project = Project::new("River Guardians");
        storage.create_project(&project).unwrap();
        project
    }

    #[test]
    fn load_without_snapshots_is_none() {
        let (_dir, storage) = test_storage();
        let project = stored_project(&storage);
        assert!(storage.load(project.id).unwrap().is_none());
    }

    #[test]
    fn save_then_load_latest() {
        let (_dir, storage) = test_storage();
        let project = stored_project(&storage);

        let mut workflow = Workflow::default();
        storage.save(project.id, &workflow.export_state()).unwrap();
        workflow.advance().unwrap();
        workflow.process_input("1. Discover\n2. Build").unwrap();
        storage.save(project.id, &workflow.export_state()).unwrap();

        let loaded = storage.load(project.id).unwrap().unwrap();
        assert_eq!(loaded, workflow.export_state());
    }

    #[test]
    fn saving_the_same_snapshot_twice_writes_once() {
        let (_dir, storage) = test_storage();
        let project = stored_project(&storage);
        let snapshot = Workflow::default().export_state();

        storage.save(project.id, &snapshot).unwrap();
        storage.save(project.id, &snapshot).unwrap();

        let history = storage.list_snapshots(project.id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].state, Stage::Overview);
        assert_eq!(history[0].digest.len(), 64);
    }

    #[test]
    fn history_keeps_every_distinct_snapshot() {
        let (_dir, storage) = test_storage();
        let project = stored_project(&storage);
        let mut workflow = Workflow::default();

        storage.save(project.id, &workflow.export_state()).unwrap();
        workflow.advance().unwrap();
        storage.save(project.id, &workflow.export_state()).unwrap();
        workflow.edit(Stage::Overview).unwrap();
        storage.save(project.id, &workflow.export_state()).unwrap();

        let states: Vec<Stage> = storage
            .list_snapshots(project.id)
            .unwrap()
            .into_iter()
            .map(|r| r.state)
            .collect();
        assert_eq!(states, [Stage::Overview, Stage::Phases, Stage::Overview]);
    }

    #[test]
    fn save_for_unknown_project_fails() {
        let (_dir, storage) = test_storage();
        let err = storage
            .save(Uuid::new_v4(), &Workflow::default().export_state())
            .unwrap_err();
        assert!(matches!(err, StorageError::ProjectNotFound(_)));
    }
}
