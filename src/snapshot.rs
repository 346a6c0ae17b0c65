//! Snapshot codec: the versioned, persisted form of a workflow.
//!
//! `{ version, state, data }` is the only durable wire format the engine
//! owns. Encoding is plain serde. Decoding is lenient: a snapshot that is
//! partly corrupt still yields a usable workflow, and every repair made on
//! the way is reported back to the caller.

mod migrate;

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::model::{Deliverables, Impact, JourneyData, Rubric, Stage};

/// The version written by this build.
pub const CURRENT_VERSION: &str = "1";

/// A workflow's persisted state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: String,
    pub state: Stage,
    pub data: JourneyData,

    /// Furthest stage reached. Absent in older snapshots, where it is
    /// assumed to be `state`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub furthest: Option<Stage>,

    /// Optional stages the educator skipped explicitly.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub skipped: BTreeSet<Stage>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot must be a JSON object")]
    NotAnObject,

    #[error("unsupported snapshot version '{0}'")]
    UnsupportedVersion(String),
}

/// A decoded snapshot and the repairs needed to read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub snapshot: Snapshot,

    /// Human-readable notes, one per defaulted field or dropped element.
    pub repairs: Vec<String>,
}

/// Decodes a snapshot, migrating older versions to [`CURRENT_VERSION`].
///
/// Only input that is not a JSON object, or that carries a version with no
/// migration path, is refused. Missing or malformed fields fall back to
/// their empty defaults and malformed array elements are dropped.
pub fn decode(json: &str) -> Result<Decoded, SnapshotError> {
    let Value::Object(mut root) = serde_json::from_str::<Value>(json)? else {
        return Err(SnapshotError::NotAnObject);
    };
    let mut repairs = Vec::new();

    let version = match root.remove("version") {
        Some(Value::String(v)) => v,
        Some(Value::Number(n)) => n.to_string(),
        None => migrate::LEGACY_VERSION.to_string(),
        Some(other) => {
            repairs.push(format!("ignored non-text version {other}"));
            migrate::LEGACY_VERSION.to_string()
        }
    };
    migrate::upgrade(&version, &mut root, &mut repairs)?;

    let state = match root.get("state") {
        Some(value) => lenient(value, "state", &mut repairs).unwrap_or(Stage::INITIAL),
        None => {
            repairs.push("missing state; starting from the beginning".to_string());
            Stage::INITIAL
        }
    };
    let furthest = root
        .get("furthest")
        .and_then(|value| lenient(value, "furthest", &mut repairs));
    let skipped = lenient_vec::<Stage>(root.get("skipped"), "skipped", &mut repairs)
        .into_iter()
        .collect();
    let data = decode_data(root.get("data"), &mut repairs);

    for repair in &repairs {
        tracing::warn!(repair = repair.as_str(), "snapshot repaired");
    }

    Ok(Decoded {
        snapshot: Snapshot {
            version: CURRENT_VERSION.to_string(),
            state,
            data,
            furthest,
            skipped,
        },
        repairs,
    })
}

fn decode_data(value: Option<&Value>, repairs: &mut Vec<String>) -> JourneyData {
    let empty = Map::new();
    let data = match value {
        Some(Value::Object(map)) => map,
        Some(_) => {
            repairs.push("data is not an object; starting empty".to_string());
            &empty
        }
        None => {
            repairs.push("missing data; starting empty".to_string());
            &empty
        }
    };

    let deliverables = match data.get("deliverables") {
        Some(Value::Object(map)) => map,
        Some(_) => {
            repairs.push("deliverables is not an object; starting empty".to_string());
            &empty
        }
        None => &empty,
    };
    let criteria = match deliverables.get("rubric") {
        Some(Value::Object(rubric)) => rubric.get("criteria"),
        Some(_) => {
            repairs.push("rubric is not an object; starting empty".to_string());
            None
        }
        None => None,
    };
    let impact: Impact = deliverables
        .get("impact")
        .and_then(|value| lenient(value, "impact", repairs))
        .unwrap_or_default();

    JourneyData {
        phases: lenient_vec(data.get("phases"), "phases", repairs),
        activities: lenient_vec(data.get("activities"), "activities", repairs),
        resources: lenient_vec(data.get("resources"), "resources", repairs),
        deliverables: Deliverables {
            milestones: lenient_vec(deliverables.get("milestones"), "milestones", repairs),
            rubric: Rubric {
                criteria: lenient_vec(criteria, "rubric criteria", repairs),
            },
            impact,
        },
        reflections: lenient_vec(data.get("reflections"), "reflections", repairs),
    }
}

fn lenient<T: DeserializeOwned>(
    value: &Value,
    field: &str,
    repairs: &mut Vec<String>,
) -> Option<T> {
    match T::deserialize(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            repairs.push(format!("ignored malformed {field}: {e}"));
            None
        }
    }
}

/// Parses an array element by element, dropping the ones that don't fit.
fn lenient_vec<T: DeserializeOwned>(
    value: Option<&Value>,
    field: &str,
    repairs: &mut Vec<String>,
) -> Vec<T> {
    let items = match value {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => {
            repairs.push(format!("{field} is not a list; starting empty"));
            return Vec::new();
        }
    };

    let parsed: Vec<T> = items.iter().filter_map(|v| T::deserialize(v).ok()).collect();
    let dropped = items.len() - parsed.len();
    if dropped > 0 {
        repairs.push(format!("dropped {dropped} malformed {field}"));
    }
    parsed
}

/// Where workflow snapshots are kept between sessions.
///
/// `save` may be called repeatedly with the same snapshot; implementations
/// treat it as idempotent.
pub trait SnapshotStore {
    type Error: std::error::Error;

    /// The latest snapshot for `project`, or `None` if none was saved.
    fn load(&self, project: Uuid) -> Result<Option<Snapshot>, Self::Error>;

    fn save(&self, project: Uuid, snapshot: &Snapshot) -> Result<(), Self::Error>;
}

/// An in-process store holding encoded snapshots.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshots: RefCell<HashMap<Uuid, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    type Error = SnapshotError;

    fn load(&self, project: Uuid) -> Result<Option<Snapshot>, SnapshotError> {
        self.snapshots
            .borrow()
            .get(&project)
            .map(|json| decode(json).map(|d| d.snapshot))
            .transpose()
    }

    fn save(&self, project: Uuid, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let json = snapshot.to_json()?;
        self.snapshots.borrow_mut().insert(project, json);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::machine::Workflow;
    use crate::model::Phase;

    fn sample_snapshot() -> Snapshot {
        let mut data = JourneyData::default();
        data.phases.push(Phase::new("Discover", "explore"));
        data.phases.push(Phase::new("Create", "build"));
        data.reflections.push("Start with a walk.".into());
        Snapshot {
            version: CURRENT_VERSION.into(),
            state: Stage::Activities,
            data,
            furthest: Some(Stage::Resources),
            skipped: BTreeSet::from([Stage::Overview]),
        }
    }

    #[test]
    fn wire_format_uses_stage_names() {
        let json = sample_snapshot().to_json().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], "1");
        assert_eq!(value["state"], "JOURNEY_ACTIVITIES");
        assert_eq!(value["furthest"], "JOURNEY_RESOURCES");
        assert_eq!(value["skipped"][0], "JOURNEY_OVERVIEW");
        assert!(value["data"]["deliverables"]["rubric"]["criteria"].is_array());
    }

    #[test]
    fn encode_then_decode_needs_no_repairs() {
        let snapshot = sample_snapshot();
        let decoded = decode(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(decoded.snapshot, snapshot);
        assert!(decoded.repairs.is_empty(), "{:?}", decoded.repairs);
    }

    #[test]
    fn minimal_current_snapshot_omits_optional_fields() {
        let json = Workflow::default().export_state().to_json().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["furthest"], "JOURNEY_OVERVIEW");
        assert!(value.get("skipped").is_none());
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let decoded = decode(r#"{"version":"1"}"#).unwrap();
        assert_eq!(decoded.snapshot.state, Stage::Overview);
        assert_eq!(decoded.snapshot.data, JourneyData::default());
        assert_eq!(decoded.repairs.len(), 2);
    }

    #[test]
    fn malformed_elements_are_dropped_not_fatal() {
        let id = Uuid::new_v4();
        let json = format!(
            r#"{{
                "version": "1",
                "state": "NOT_A_STAGE",
                "data": {{
                    "phases": [{{"id": "{id}", "name": "Discover"}}, {{"name": 7}}, "junk"],
                    "activities": "nope",
                    "deliverables": {{"impact": {{"audience": "Parents"}}}}
                }}
            }}"#
        );
        let decoded = decode(&json).unwrap();

        assert_eq!(decoded.snapshot.state, Stage::Overview);
        assert_eq!(decoded.snapshot.data.phases.len(), 1);
        assert_eq!(decoded.snapshot.data.phases[0].id, id);
        assert!(decoded.snapshot.data.activities.is_empty());
        assert_eq!(
            decoded.snapshot.data.deliverables.impact.audience.as_deref(),
            Some("Parents")
        );
        assert!(decoded.repairs.iter().any(|r| r.contains("dropped 2 malformed phases")));
        assert!(decoded.repairs.iter().any(|r| r.contains("activities is not a list")));
    }

    #[test]
    fn short_stage_names_are_accepted() {
        let decoded = decode(r#"{"version":"1","state":"RUBRIC","data":{}}"#).unwrap();
        assert_eq!(decoded.snapshot.state, Stage::Rubric);
    }

    #[test]
    fn numeric_version_is_read_as_text() {
        let decoded = decode(r#"{"version":1,"state":"COMPLETE","data":{}}"#).unwrap();
        assert_eq!(decoded.snapshot.version, CURRENT_VERSION);
        assert_eq!(decoded.snapshot.state, Stage::Complete);
    }

    #[test]
    fn non_objects_and_unknown_versions_are_refused() {
        assert!(matches!(decode("[1, 2]"), Err(SnapshotError::NotAnObject)));
        assert!(matches!(decode("{oops"), Err(SnapshotError::Json(_))));
        assert!(matches!(
            decode(r#"{"version":"9","state":"COMPLETE","data":{}}"#),
            Err(SnapshotError::UnsupportedVersion(v)) if v == "9"
        ));
    }

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        assert!(store.load(id).unwrap().is_none());

        let snapshot = sample_snapshot();
        store.save(id, &snapshot).unwrap();
        store.save(id, &snapshot).unwrap();
        assert_eq!(store.load(id).unwrap(), Some(snapshot));
    }
}
