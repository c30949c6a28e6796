use parking_lot::Mutex;
use std::sync::Arc;

use crate::task::Task;

/// Newest tasks beyond this are dropped from the tail.
const MAX_TASKS: usize = 50;

/// In-memory task store shared between the pipeline and its observers.
///
/// Updates are atomic at the granularity of one task's fields; the pipeline
/// itself never runs jobs concurrently, so no finer locking is needed.
#[derive(Default)]
pub struct TaskStore {
    inner: Mutex<Vec<Task>>,
}

impl TaskStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Insert a task at the front, evicting the oldest entry past the cap.
    pub fn insert(&self, task: Task) {
        let mut tasks = self.inner.lock();
        tasks.insert(0, task);
        if tasks.len() > MAX_TASKS {
            tasks.pop();
        }
    }

    /// Apply `apply` to the task with the given id. Returns false when the
    /// task is no longer present (e.g. deleted by the user mid-flight).
    pub fn update<F>(&self, id: &str, apply: F) -> bool
    where
        F: FnOnce(&mut Task),
    {
        let mut tasks = self.inner.lock();
        match tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                apply(task);
                true
            }
            None => {
                tracing::debug!(target: "tasks", "update for unknown task {id}");
                false
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<Task> {
        self.inner.lock().iter().find(|t| t.id == id).cloned()
    }

    /// Snapshot of all tasks, newest first.
    pub fn list(&self) -> Vec<Task> {
        self.inner.lock().clone()
    }

    pub fn delete(&self, id: &str) -> bool {
        let mut tasks = self.inner.lock();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        tasks.len() != before
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{TaskOptions, TaskStatus, VendorKind};

    fn task(prompt: &str) -> Task {
        Task::new(prompt, VendorKind::Veo, TaskOptions::default())
    }

    #[test]
    fn test_insert_and_update() {
        let store = TaskStore::new();
        let t = task("city street in the rain");
        let id = t.id.clone();
        store.insert(t);

        assert!(store.update(&id, |t| t.status = TaskStatus::Processing));
        assert_eq!(store.get(&id).unwrap().status, TaskStatus::Processing);
        assert!(!store.update("missing", |t| t.status = TaskStatus::Failed));
    }

    #[test]
    fn test_newest_first_ordering() {
        let store = TaskStore::new();
        store.insert(task("first"));
        store.insert(task("second"));
        let listed = store.list();
        assert_eq!(listed[0].prompt, "second");
        assert_eq!(listed[1].prompt, "first");
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let store = TaskStore::new();
        for i in 0..(MAX_TASKS + 5) {
            store.insert(task(&format!("prompt {i}")));
        }
        let listed = store.list();
        assert_eq!(listed.len(), MAX_TASKS);
        // The earliest inserts fell off the tail.
        assert_eq!(listed.last().unwrap().prompt, "prompt 5");
    }

    #[test]
    fn test_delete() {
        let store = TaskStore::new();
        let t = task("to be removed");
        let id = t.id.clone();
        store.insert(t);
        assert!(store.delete(&id));
        assert!(!store.delete(&id));
        assert!(store.is_empty());
    }
}
