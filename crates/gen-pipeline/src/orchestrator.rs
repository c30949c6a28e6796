/// Batch orchestration
///
/// Expands a generation request into an ordered prompt list and runs each
/// prompt to a terminal outcome, one job fully resolved (including all of
/// its polling) before the next create call. The task store is mutated in
/// create → progress → terminal order per job; per-prompt failures are
/// recorded on their task and never abort the remaining batch.
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use tasks::{
    catalog, GenerationKind, HistoryRecord, HistoryStore, Task, TaskStatus, TaskStore,
};

use crate::config::GenerationConfig;
use crate::poller::{poll_task, PollConfig};
use crate::request::GenerationRequest;
use crate::vendors::{AdapterFactory, HttpAdapterFactory, JobHandle, VendorError};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("an API key is required before generating")]
    MissingApiKey,
    #[error("at least one non-empty prompt is required")]
    NoPrompts,
    #[error(transparent)]
    Vendor(#[from] VendorError),
}

pub struct Orchestrator {
    tasks: Arc<TaskStore>,
    history: Arc<HistoryStore>,
    factory: Box<dyn AdapterFactory>,
    poll: PollConfig,
}

impl Orchestrator {
    pub fn new(tasks: Arc<TaskStore>, history: Arc<HistoryStore>) -> Self {
        Self {
            tasks,
            history,
            factory: Box::new(HttpAdapterFactory),
            poll: PollConfig::default(),
        }
    }

    /// With a custom adapter factory
    pub fn with_factory(mut self, factory: Box<dyn AdapterFactory>) -> Self {
        self.factory = factory;
        self
    }

    /// With custom polling parameters
    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn task_store(&self) -> &Arc<TaskStore> {
        &self.tasks
    }

    pub fn history_store(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    /// Run a request without cancellation or batch-progress observation.
    pub async fn generate(
        &self,
        config: &GenerationConfig,
        request: GenerationRequest,
    ) -> Result<(), GenerateError> {
        self.generate_with_progress(config, request, &CancellationToken::new(), |_| {})
            .await
    }

    /// Run a request, reporting combined batch progress (0-100 across all
    /// prompts) after every poll tick.
    ///
    /// Input validation failures are returned before any task exists; every
    /// later error is recorded on the affected task instead of propagating.
    pub async fn generate_with_progress(
        &self,
        config: &GenerationConfig,
        request: GenerationRequest,
        cancel: &CancellationToken,
        mut on_batch_progress: impl FnMut(f32),
    ) -> Result<(), GenerateError> {
        if config.api_key.trim().is_empty() {
            return Err(GenerateError::MissingApiKey);
        }
        let prompts = request.expand_prompts();
        if prompts.is_empty() {
            return Err(GenerateError::NoPrompts);
        }

        let adapter = self.factory.build(request.model, config)?;
        let mut options = request.task_options(catalog::default_duration(request.model));
        if options.aspect_ratio.is_none() {
            options.aspect_ratio = Some(config.default_aspect_ratio);
        }
        let sub_model = options
            .sub_model
            .clone()
            .unwrap_or_else(|| request.model.default_sub_model().to_string());
        let total = prompts.len();

        tracing::info!(
            target: "orchestrator",
            "batch start: {total} prompt(s), vendor {}, sub-model {sub_model}",
            request.model
        );

        for (index, entry) in prompts.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::info!(target: "orchestrator", "batch cancelled before prompt {}", index + 1);
                break;
            }

            let mut task = Task::new(&entry.prompt, request.model, options.clone());
            if let Some(image) = &entry.image {
                task = task.with_image_data(image.clone());
            }
            let task_id = task.id.clone();
            self.tasks.insert(task);

            let created = match &entry.image {
                Some(image) => {
                    adapter
                        .create_with_image(&entry.prompt, image, &sub_model, &options)
                        .await
                }
                None => adapter.create(&entry.prompt, &sub_model, &options).await,
            };

            let handle = match created {
                Ok(handle) => handle,
                Err(err) => {
                    tracing::warn!(
                        target: "orchestrator",
                        "create failed for prompt {}/{total}: {err}",
                        index + 1
                    );
                    let message = err.to_string();
                    self.tasks.update(&task_id, |t| t.mark_failed(message.clone()));
                    on_batch_progress((index as f32 + 1.0) * 100.0 / total as f32);
                    continue;
                }
            };

            // Synchronous vendors (image generation) are done at create time.
            if handle.status == TaskStatus::Completed {
                self.finish_task(&task_id, request.model.generation_kind(), &handle, None);
                on_batch_progress((index as f32 + 1.0) * 100.0 / total as f32);
                continue;
            }

            let outcome = poll_task(
                adapter.as_ref(),
                &handle.task_id,
                &sub_model,
                &self.poll,
                cancel,
                |status, progress| {
                    self.tasks.update(&task_id, |t| {
                        t.status = status;
                        t.progress = t.progress.max(progress);
                    });
                    // Completed prompts contribute a full share; the current
                    // one its fraction, so batch progress never resets.
                    let combined = (index as f32 * 100.0 + progress) / total as f32;
                    on_batch_progress(combined);
                },
            )
            .await;

            match outcome {
                Ok(outcome) if outcome.status == TaskStatus::Completed => {
                    self.tasks.update(&task_id, |t| {
                        t.mark_completed(
                            outcome.video_url.clone(),
                            None,
                            outcome.thumbnail_url.clone(),
                        );
                    });
                    if outcome.video_url.is_some() {
                        if let Some(task) = self.tasks.get(&task_id) {
                            let duration = outcome.duration_secs.or(options.duration_secs);
                            self.history.add(HistoryRecord::from_task(&task, duration));
                        }
                    }
                }
                Ok(outcome) => {
                    let message = outcome
                        .error_message
                        .unwrap_or_else(|| "generation failed".to_string());
                    self.tasks.update(&task_id, |t| t.mark_failed(message.clone()));
                }
                Err(err) => {
                    let message = err.to_string();
                    self.tasks.update(&task_id, |t| t.mark_failed(message.clone()));
                }
            }

            on_batch_progress((index as f32 + 1.0) * 100.0 / total as f32);
        }

        Ok(())
    }

    /// Terminal bookkeeping for a job that completed without polling.
    fn finish_task(
        &self,
        task_id: &str,
        kind: GenerationKind,
        handle: &JobHandle,
        duration_secs: Option<u32>,
    ) {
        let result_url = handle.result_url.clone();
        self.tasks.update(task_id, |t| match kind {
            GenerationKind::Image => t.mark_completed(None, result_url.clone(), None),
            GenerationKind::Video => t.mark_completed(result_url.clone(), None, None),
        });
        if handle.result_url.is_some() {
            if let Some(task) = self.tasks.get(task_id) {
                self.history.add(HistoryRecord::from_task(&task, duration_secs));
            }
        }
    }
}
