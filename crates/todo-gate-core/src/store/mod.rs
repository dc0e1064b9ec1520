/*
[INPUT]:  add/delete/toggle/edit commands, durable KeyValueStore
[OUTPUT]: Immutable task collection snapshots, best-effort persistence after each change
[POS]:    Store module root - TaskStore command handlers
[UPDATE]: When adding task commands or changing persistence policy
*/

mod task;

pub use task::{
    Task, TaskId, TASKS_KEY, decode_collection, default_seed, encode_collection,
    load_collection, next_id, normalize_text, save_collection,
};

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::storage::KeyValueStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskCounts {
    pub total: usize,
    pub completed: usize,
}

/// Owns the task collection for one session.
///
/// Every effective command swaps in a new collection value and then writes
/// the whole collection to storage. Storage failures are logged and never
/// undo the in-memory change.
pub struct TaskStore {
    storage: Arc<dyn KeyValueStore>,
    tasks: Arc<[Task]>,
    revision: u64,
}

impl TaskStore {
    /// Load the persisted collection, falling back to the default seed
    pub fn initialize(storage: Arc<dyn KeyValueStore>) -> Self {
        let tasks = match load_collection(storage.as_ref()) {
            Ok(Some(tasks)) => {
                info!(count = tasks.len(), "loaded persisted tasks");
                tasks
            }
            Ok(None) => {
                info!("no persisted tasks found; using default seed");
                default_seed()
            }
            Err(err) => {
                warn!(error = %err, "failed to read persisted tasks; using default seed");
                default_seed()
            }
        };

        Self {
            storage,
            tasks: tasks.into(),
            revision: 0,
        }
    }

    /// Shared handle to the current collection value
    pub fn snapshot(&self) -> Arc<[Task]> {
        self.tasks.clone()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Bumped on every effective change
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn counts(&self) -> TaskCounts {
        TaskCounts {
            total: self.tasks.len(),
            completed: self.tasks.iter().filter(|task| task.completed).count(),
        }
    }

    /// Prepend a new task. Returns its id, or `None` for blank text.
    pub fn add(&mut self, text: &str) -> Option<TaskId> {
        let Some(text) = normalize_text(text) else {
            debug!("add ignored: blank text");
            return None;
        };

        let id = next_id(&self.tasks);
        let mut next = Vec::with_capacity(self.tasks.len() + 1);
        next.push(Task::new(id, text));
        next.extend(self.tasks.iter().cloned());
        self.commit(next);
        info!(task_id = id, "task added");
        Some(id)
    }

    pub fn delete(&mut self, id: TaskId) -> bool {
        if self.get(id).is_none() {
            debug!(task_id = id, "delete ignored: unknown task");
            return false;
        }
        let next = self
            .tasks
            .iter()
            .filter(|task| task.id != id)
            .cloned()
            .collect();
        self.commit(next);
        info!(task_id = id, "task deleted");
        true
    }

    pub fn toggle(&mut self, id: TaskId) -> bool {
        self.replace_with(id, |task| Task {
            completed: !task.completed,
            ..task.clone()
        })
    }

    /// Replace the text of a task. Blank text keeps the existing value.
    pub fn edit(&mut self, id: TaskId, new_text: &str) -> bool {
        let Some(text) = normalize_text(new_text) else {
            debug!(task_id = id, "edit ignored: blank text");
            return false;
        };
        self.replace_with(id, |task| Task {
            text: text.to_string(),
            ..task.clone()
        })
    }

    fn replace_with(&mut self, id: TaskId, f: impl Fn(&Task) -> Task) -> bool {
        if self.get(id).is_none() {
            debug!(task_id = id, "update ignored: unknown task");
            return false;
        }
        let next = self
            .tasks
            .iter()
            .map(|task| if task.id == id { f(task) } else { task.clone() })
            .collect();
        self.commit(next);
        debug!(task_id = id, "task updated");
        true
    }

    fn commit(&mut self, next: Vec<Task>) {
        self.tasks = next.into();
        self.revision += 1;
        self.persist();
    }

    fn persist(&self) {
        if let Err(err) = save_collection(self.storage.as_ref(), &self.tasks) {
            warn!(error = %err, count = self.tasks.len(), "failed to persist tasks");
        }
    }
}
