/// Generative-media client pipeline
///
/// Everything between a generation request and a terminal task outcome:
/// per-vendor HTTP adapters, status normalization, polling with backoff,
/// and sequential batch orchestration over the task and history stores.
pub mod config;
pub mod orchestrator;
pub mod poller;
pub mod prompt;
pub mod request;
pub mod status;
pub mod vendors;

pub use config::{GenerationConfig, DEFAULT_API_BASE};
pub use orchestrator::{GenerateError, Orchestrator};
pub use poller::{poll_task, PollConfig, PollOutcome, CANCELLED_MESSAGE, TIMEOUT_MESSAGE};
pub use request::{decode_data_uri, BatchPrompt, GenerationRequest};
pub use status::normalize_status;
pub use vendors::{
    AdapterFactory, GeminiAdapter, GrokAdapter, HttpAdapterFactory, JobHandle, JobSnapshot,
    MockAdapter, SoraAdapter, VendorAdapter, VendorError, VeoAdapter,
};
