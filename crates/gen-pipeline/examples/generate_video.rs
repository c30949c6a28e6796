/// Minimal end-to-end run against the configured gateway.
///
/// Usage: ALLAPI_KEY=sk-... cargo run --example generate_video
use gen_pipeline::{GenerationConfig, GenerationRequest, Orchestrator};
use tasks::{HistoryStore, TaskStore, VendorKind};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let api_key = std::env::var("ALLAPI_KEY").unwrap_or_default();
    let config = GenerationConfig::new(api_key);

    let tasks = TaskStore::new();
    let history = HistoryStore::new();
    let orchestrator = Orchestrator::new(tasks.clone(), history.clone());

    let request = GenerationRequest::single(
        VendorKind::Sora,
        "a paper boat drifting down a rainy gutter, macro lens",
    )
    .with_duration(10);

    orchestrator.generate(&config, request).await?;

    for task in tasks.list() {
        println!(
            "{} [{}] {}",
            task.prompt,
            task.status,
            task.video_url
                .or(task.error_message)
                .unwrap_or_else(|| "-".to_string())
        );
    }
    Ok(())
}
