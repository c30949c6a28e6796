/// Scripted adapter for tests and offline demos
///
/// Create and query outcomes are queued up front and consumed in order;
/// when a queue runs dry the adapter answers with a neutral default (a
/// pending handle, a processing snapshot), which makes "never finishes"
/// scenarios trivial to script.
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tasks::{new_task_id, TaskOptions, TaskStatus, VendorKind};

use super::{JobHandle, JobSnapshot, VendorAdapter, VendorError};

#[derive(Default)]
pub struct MockAdapter {
    kind: Option<VendorKind>,
    creates: Mutex<VecDeque<Result<JobHandle, VendorError>>>,
    queries: Mutex<VecDeque<Result<JobSnapshot, VendorError>>>,
    create_calls: AtomicUsize,
    query_calls: AtomicUsize,
}

impl MockAdapter {
    pub fn new(kind: VendorKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn push_create(&self, result: Result<JobHandle, VendorError>) {
        self.creates.lock().push_back(result);
    }

    pub fn push_query(&self, result: Result<JobSnapshot, VendorError>) {
        self.queries.lock().push_back(result);
    }

    /// Queue `count` processing snapshots followed by one completed snapshot
    /// with the given video URL.
    pub fn script_completion_after(&self, count: usize, video_url: &str) {
        for _ in 0..count {
            self.push_query(Ok(JobSnapshot::with_status(TaskStatus::Processing)));
        }
        let mut done = JobSnapshot::with_status(TaskStatus::Completed);
        done.video_url = Some(video_url.to_string());
        self.push_query(Ok(done));
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    fn next_create(&self) -> Result<JobHandle, VendorError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.creates.lock().pop_front().unwrap_or_else(|| {
            Ok(JobHandle {
                task_id: new_task_id(),
                status: TaskStatus::Pending,
                result_url: None,
            })
        })
    }
}

#[async_trait]
impl VendorAdapter for MockAdapter {
    fn name(&self) -> &str {
        "Mock"
    }

    fn kind(&self) -> VendorKind {
        self.kind.unwrap_or(VendorKind::Sora)
    }

    async fn create(
        &self,
        _prompt: &str,
        _sub_model: &str,
        _options: &TaskOptions,
    ) -> Result<JobHandle, VendorError> {
        self.next_create()
    }

    async fn create_with_image(
        &self,
        _prompt: &str,
        _image_data: &str,
        _sub_model: &str,
        _options: &TaskOptions,
    ) -> Result<JobHandle, VendorError> {
        self.next_create()
    }

    async fn query(&self, _task_id: &str, _sub_model: &str) -> Result<JobSnapshot, VendorError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        self.queries
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(JobSnapshot::with_status(TaskStatus::Processing)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_order_then_default() {
        let adapter = MockAdapter::new(VendorKind::Veo);
        adapter.push_query(Ok(JobSnapshot::with_status(TaskStatus::Pending)));

        let first = adapter.query("t", "m").await.unwrap();
        assert_eq!(first.status, TaskStatus::Pending);
        let second = adapter.query("t", "m").await.unwrap();
        assert_eq!(second.status, TaskStatus::Processing);
        assert_eq!(adapter.query_calls(), 2);
    }

    #[tokio::test]
    async fn test_scripted_create_failure() {
        let adapter = MockAdapter::new(VendorKind::Veo);
        adapter.push_create(Err(VendorError::Api("boom".to_string())));
        assert!(adapter.create("p", "m", &TaskOptions::default()).await.is_err());
        assert!(adapter.create("p", "m", &TaskOptions::default()).await.is_ok());
    }
}
