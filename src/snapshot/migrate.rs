//! Version migrations, applied to the raw JSON before it is decoded.
//!
//! Each entry upgrades a snapshot from one version to the next. Decoding
//! walks the table until it reaches the current version.

use serde_json::{Map, Value};

use super::{CURRENT_VERSION, SnapshotError};

/// Version assumed for snapshots written before versions were recorded.
pub const LEGACY_VERSION: &str = "0";

type Migration = fn(&mut Map<String, Value>, &mut Vec<String>);

/// `(from, to, migration)`, in upgrade order.
const MIGRATIONS: &[(&str, &str, Migration)] = &[(LEGACY_VERSION, "1", from_legacy)];

/// Brings `root` up to [`CURRENT_VERSION`].
pub fn upgrade(
    version: &str,
    root: &mut Map<String, Value>,
    repairs: &mut Vec<String>,
) -> Result<(), SnapshotError> {
    let mut version = version;
    while version != CURRENT_VERSION {
        let Some((from, to, migrate)) = MIGRATIONS.iter().find(|(from, _, _)| *from == version)
        else {
            return Err(SnapshotError::UnsupportedVersion(version.to_string()));
        };
        migrate(root, repairs);
        tracing::info!(from = *from, to = *to, "migrated snapshot");
        version = *to;
    }
    Ok(())
}

/// Unversioned snapshots named the stage `currentState` and kept the
/// deliverables flat, either beside `data` or inside it.
fn from_legacy(root: &mut Map<String, Value>, repairs: &mut Vec<String>) {
    if !root.contains_key("state")
        && let Some(state) = root.remove("currentState")
    {
        root.insert("state".to_string(), state);
    }

    let mut moved = Map::new();
    for key in ["milestones", "rubric", "impact"] {
        let value = root.remove(key).or_else(|| {
            root.get_mut("data")
                .and_then(Value::as_object_mut)
                .and_then(|data| data.remove(key))
        });
        if let Some(value) = value {
            moved.insert(key.to_string(), value);
        }
    }
    if let Some(rubric) = moved.get_mut("rubric")
        && rubric.is_array()
    {
        let criteria = rubric.take();
        *rubric = Value::Object(Map::from_iter([("criteria".to_string(), criteria)]));
    }
    if moved.is_empty() {
        return;
    }

    let data = root
        .entry("data")
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(data) = data.as_object_mut() else {
        repairs.push("legacy deliverables dropped: data is not an object".to_string());
        return;
    };
    let deliverables = data
        .entry("deliverables")
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(deliverables) = deliverables.as_object_mut() else {
        repairs.push("legacy deliverables dropped: deliverables is not an object".to_string());
        return;
    };
    for (key, value) in moved {
        deliverables.entry(key).or_insert(value);
    }
}

#[cfg(test)]
mod tests {
    use crate::model::Stage;
    use crate::snapshot::decode;

    #[test]
    fn legacy_snapshot_is_migrated() {
        let decoded = decode(
            r#"{
                "currentState": "DELIVERABLE_RUBRIC",
                "data": {
                    "phases": [],
                    "milestones": [{"id": "6f1c1d7e-3f55-4a8e-9a43-2f4b6a0c1e11", "name": "Pitch"}]
                },
                "rubric": [{"id": "0b7b3a4c-2a4e-4d11-8f7a-9a0f8d2c6b01", "name": "Voice", "description": ""}],
                "impact": {"audience": "Parents"}
            }"#,
        )
        .unwrap();

        let snapshot = decoded.snapshot;
        assert_eq!(snapshot.version, "1");
        assert_eq!(snapshot.state, Stage::Rubric);
        assert_eq!(snapshot.data.deliverables.milestones[0].name, "Pitch");
        assert_eq!(snapshot.data.deliverables.rubric.criteria[0].name, "Voice");
        assert_eq!(
            snapshot.data.deliverables.impact.audience.as_deref(),
            Some("Parents")
        );
        assert!(decoded.repairs.is_empty(), "{:?}", decoded.repairs);
    }

    #[test]
    fn explicit_version_zero_takes_the_same_path() {
        let decoded = decode(r#"{"version":"0","currentState":"COMPLETE","data":{}}"#).unwrap();
        assert_eq!(decoded.snapshot.state, Stage::Complete);
    }
}
