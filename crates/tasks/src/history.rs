use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::task::{Task, TaskOptions, VendorKind};

const MAX_HISTORY: usize = 100;

/// Write-once snapshot of a successfully completed generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: String,
    pub prompt: String,
    pub model: VendorKind,
    pub created_at: DateTime<Utc>,
    pub video_url: Option<String>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub duration_secs: Option<u32>,
    pub options: TaskOptions,
}

impl HistoryRecord {
    /// Snapshot a completed task. The record shares the task's id.
    pub fn from_task(task: &Task, duration_secs: Option<u32>) -> Self {
        Self {
            id: task.id.clone(),
            prompt: task.prompt.clone(),
            model: task.model,
            created_at: Utc::now(),
            video_url: task.video_url.clone(),
            image_url: task.image_url.clone(),
            thumbnail_url: task.thumbnail_url.clone(),
            duration_secs,
            options: task.options.clone(),
        }
    }
}

/// Append-only history of successful generations, newest first.
#[derive(Default)]
pub struct HistoryStore {
    inner: Mutex<Vec<HistoryRecord>>,
}

impl HistoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Append a record. Embedded-binary (`data:`) media references are
    /// blanked first so history never holds raw image/video bytes.
    pub fn add(&self, mut record: HistoryRecord) {
        blank_if_data_uri(&mut record.video_url);
        blank_if_data_uri(&mut record.image_url);
        blank_if_data_uri(&mut record.thumbnail_url);

        let mut records = self.inner.lock();
        records.insert(0, record);
        if records.len() > MAX_HISTORY {
            records.pop();
        }
    }

    pub fn list(&self) -> Vec<HistoryRecord> {
        self.inner.lock().clone()
    }

    pub fn get(&self, id: &str) -> Option<HistoryRecord> {
        self.inner.lock().iter().find(|r| r.id == id).cloned()
    }

    pub fn delete(&self, id: &str) -> bool {
        let mut records = self.inner.lock();
        let before = records.len();
        records.retain(|r| r.id != id);
        records.len() != before
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Case-insensitive substring search over prompt and model name.
    pub fn search(&self, query: &str) -> Vec<HistoryRecord> {
        let needle = query.to_lowercase();
        self.inner
            .lock()
            .iter()
            .filter(|r| {
                r.prompt.to_lowercase().contains(&needle)
                    || r.model.as_str().contains(&needle)
            })
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

fn blank_if_data_uri(url: &mut Option<String>) {
    if url.as_deref().is_some_and(|u| u.starts_with("data:")) {
        *url = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;

    fn completed_task(prompt: &str, video_url: &str) -> Task {
        let mut task = Task::new(prompt, VendorKind::Sora, TaskOptions::default());
        task.status = TaskStatus::Completed;
        task.video_url = Some(video_url.to_string());
        task
    }

    #[test]
    fn test_add_and_search() {
        let store = HistoryStore::new();
        let task = completed_task("foggy mountain pass", "https://cdn.example/a.mp4");
        store.add(HistoryRecord::from_task(&task, Some(10)));

        assert_eq!(store.len(), 1);
        assert_eq!(store.search("mountain").len(), 1);
        assert_eq!(store.search("sora").len(), 1);
        assert!(store.search("ocean").is_empty());
    }

    #[test]
    fn test_data_uri_media_is_blanked() {
        let store = HistoryStore::new();
        let task = completed_task("inline video", "data:video/mp4;base64,AAAA");
        store.add(HistoryRecord::from_task(&task, None));

        let record = &store.list()[0];
        assert!(record.video_url.is_none());
    }

    #[test]
    fn test_remote_urls_survive() {
        let store = HistoryStore::new();
        let task = completed_task("hosted video", "https://cdn.example/b.mp4");
        store.add(HistoryRecord::from_task(&task, None));

        let record = &store.list()[0];
        assert_eq!(record.video_url.as_deref(), Some("https://cdn.example/b.mp4"));
    }

    #[test]
    fn test_history_cap() {
        let store = HistoryStore::new();
        for i in 0..(MAX_HISTORY + 3) {
            let task = completed_task(&format!("p{i}"), "https://cdn.example/v.mp4");
            store.add(HistoryRecord::from_task(&task, None));
        }
        assert_eq!(store.len(), MAX_HISTORY);
        assert_eq!(store.list().last().unwrap().prompt, "p3");
    }
}
