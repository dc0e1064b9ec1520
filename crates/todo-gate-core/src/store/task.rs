/*
[INPUT]:  Task text, existing collection (for id allocation)
[OUTPUT]: Task record, default seed collection, JSON codec for the collection
[POS]:    Store data model
[UPDATE]: When changing task fields or the persisted record format
*/

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::storage::KeyValueStore;

pub type TaskId = i64;

/// Storage key for the whole task collection
pub const TASKS_KEY: &str = "tasks";

/// A single to-do entry. Persisted as `{id, text, completed}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
}

impl Task {
    pub fn new(id: TaskId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
        }
    }
}

/// Collection used when nothing usable is persisted
pub fn default_seed() -> Vec<Task> {
    vec![
        Task::new(1, "Review the weekly plan"),
        Task::new(2, "Water the plants"),
        Task {
            id: 3,
            text: "Set up the to-do list".to_string(),
            completed: true,
        },
    ]
}

/// Timestamp-derived id, bumped past the current maximum on collision.
///
/// A collection already holding `i64::MAX` gets an id below its minimum, or
/// the first free id counting up from zero.
pub fn next_id(tasks: &[Task]) -> TaskId {
    let now = chrono::Utc::now().timestamp_millis();
    let Some(max) = tasks.iter().map(|task| task.id).max() else {
        return now;
    };
    if max < now {
        return now;
    }
    if let Some(id) = max.checked_add(1) {
        return id;
    }
    let below_min = tasks
        .iter()
        .map(|task| task.id)
        .min()
        .and_then(|min| min.checked_sub(1));
    below_min.unwrap_or_else(|| {
        let used: HashSet<TaskId> = tasks.iter().map(|task| task.id).collect();
        (0..).find(|id| !used.contains(id)).unwrap_or_default()
    })
}

/// Trimmed text, or `None` when nothing is left
pub fn normalize_text(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

pub fn encode_collection(tasks: &[Task]) -> Result<String, StorageError> {
    Ok(serde_json::to_string(tasks)?)
}

/// Parse a persisted collection. Duplicate ids count as corruption.
pub fn decode_collection(raw: &str) -> Result<Vec<Task>, StorageError> {
    let tasks: Vec<Task> =
        serde_json::from_str(raw).map_err(|err| StorageError::Corrupt(err.to_string()))?;
    let mut seen = HashSet::with_capacity(tasks.len());
    if let Some(dup) = tasks.iter().find(|task| !seen.insert(task.id)) {
        return Err(StorageError::Corrupt(format!("duplicate task id {}", dup.id)));
    }
    Ok(tasks)
}

/// Read the collection stored under [`TASKS_KEY`]; `Ok(None)` when absent
pub fn load_collection(storage: &dyn KeyValueStore) -> Result<Option<Vec<Task>>, StorageError> {
    match storage.get(TASKS_KEY)? {
        Some(raw) => decode_collection(&raw).map(Some),
        None => Ok(None),
    }
}

/// Write the whole collection under [`TASKS_KEY`]
pub fn save_collection(storage: &dyn KeyValueStore, tasks: &[Task]) -> Result<(), StorageError> {
    let raw = encode_collection(tasks)?;
    storage.set(TASKS_KEY, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use rstest::rstest;

    #[test]
    fn test_seed_shape() {
        let seed = default_seed();
        assert_eq!(seed.len(), 3);
        assert_eq!(seed.iter().filter(|task| task.completed).count(), 1);
        assert_eq!(seed.iter().filter(|task| !task.completed).count(), 2);
    }

    #[test]
    fn test_json_field_names() {
        let json = encode_collection(&[Task::new(7, "Buy milk")]).unwrap();
        assert_eq!(json, r#"[{"id":7,"text":"Buy milk","completed":false}]"#);
    }

    #[test]
    fn test_round_trip_preserves_order_and_fields() {
        let storage = MemoryStore::new();
        let mut tasks = default_seed();
        tasks.insert(0, Task::new(99, "Buy milk"));

        save_collection(&storage, &tasks).unwrap();
        let loaded = load_collection(&storage).unwrap();
        assert_eq!(loaded, Some(tasks));
    }

    #[test]
    fn test_next_id_at_max_id_stays_unique() {
        let tasks = vec![Task::new(i64::MAX, "far future"), Task::new(5, "old")];
        assert_eq!(next_id(&tasks), 4);

        let extremes = vec![Task::new(i64::MAX, "max"), Task::new(i64::MIN, "min")];
        assert_eq!(next_id(&extremes), 0);
    }

    #[rstest]
    #[case("not json")]
    #[case(r#"{"id":1}"#)]
    #[case(r#"[{"id":1,"text":"a"}]"#)]
    #[case(r#"[{"id":1,"text":"a","completed":false},{"id":1,"text":"b","completed":true}]"#)]
    fn test_decode_rejects_malformed(#[case] raw: &str) {
        let err = decode_collection(raw).unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn test_next_id_is_unique_and_monotonic() {
        let far_future = Task::new(i64::MAX - 1, "future");
        assert_eq!(next_id(&[far_future]), i64::MAX);

        let tasks = default_seed();
        let id = next_id(&tasks);
        assert!(tasks.iter().all(|task| task.id < id));
    }

    #[rstest]
    #[case("", None)]
    #[case("   ", None)]
    #[case("\t\n", None)]
    #[case("  Buy milk ", Some("Buy milk"))]
    fn test_normalize_text(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(normalize_text(input), expected);
    }
}
