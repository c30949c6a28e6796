/// Prompt refinement over the gateway's chat endpoint
///
/// Turns a short user description into a production-ready generation prompt,
/// or fans it out into several styled variations for batch runs. Failures
/// here are never fatal to a generation flow: callers fall back to the
/// original prompt text.
use serde::Deserialize;
use serde_json::json;

use crate::config::GenerationConfig;
use crate::vendors::{api_error, VendorError};

pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

const BATCH_VARIATIONS: usize = 5;

const OPTIMIZE_SYSTEM_PROMPT: &str = "You are an expert at refining prompts for AI video \
generation. Rewrite the user's description into a detailed, vivid, production-ready prompt: \
keep the core subject and elements, add concrete detail (color, light, atmosphere, motion), \
and improve composition and camera language. Return only the refined prompt, with no \
explanation or extra content.";

const BATCH_SYSTEM_PROMPT: &str = "You are an expert at writing prompts for AI image \
generation. The user wants several renditions of one scene: produce five variation prompts \
that keep the core subject but differ in framing (close-up/medium/wide), lighting and time \
of day, artistic style, color palette, or mood. Each prompt must be detailed and complete. \
Return exactly five prompts separated by \"---\", with no other text.";

/// Refine a single prompt. An empty reply falls back to the input unchanged.
pub async fn optimize_prompt(
    config: &GenerationConfig,
    prompt: &str,
    model: &str,
) -> Result<String, VendorError> {
    let user = format!("Refine this video generation prompt: {prompt}");
    let content = execute_chat(config, model, OPTIMIZE_SYSTEM_PROMPT, &user, 0.7, 500).await?;
    if content.trim().is_empty() {
        return Ok(prompt.to_string());
    }
    Ok(content)
}

/// Produce up to five variations of `prompt` for a batch run. Never fails:
/// on any error the caller gets five copies of the original prompt.
pub async fn batch_optimize_prompts(
    config: &GenerationConfig,
    prompt: &str,
    model: &str,
) -> Vec<String> {
    let user = format!("Write five variation prompts for this scene: {prompt}");
    match execute_chat(config, model, BATCH_SYSTEM_PROMPT, &user, 0.9, 2000).await {
        Ok(content) => split_variations(&content, prompt),
        Err(err) => {
            tracing::warn!(target: "prompt", "batch prompt optimization failed: {err}");
            vec![prompt.to_string(); BATCH_VARIATIONS]
        }
    }
}

/// Probe whether the key is accepted at all; only a 401 disqualifies it.
pub async fn validate_api_key(config: &GenerationConfig) -> bool {
    let client = reqwest::Client::new();
    let url = config.endpoint("video/create?limit=1");
    match client
        .get(&url)
        .header("Authorization", format!("Bearer {}", config.api_key))
        .send()
        .await
    {
        Ok(response) => response.status() != reqwest::StatusCode::UNAUTHORIZED,
        Err(_) => false,
    }
}

/// Split a model reply into variation prompts: `---` separators first, then
/// non-trivial lines, then the reply plus copies of the original prompt.
fn split_variations(content: &str, fallback: &str) -> Vec<String> {
    let prompts: Vec<String> = content
        .split("---")
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    if prompts.len() >= 2 {
        return prompts.into_iter().take(BATCH_VARIATIONS).collect();
    }

    let lines: Vec<String> = content
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| l.len() > 10)
        .collect();
    if lines.len() >= 2 {
        return lines.into_iter().take(BATCH_VARIATIONS).collect();
    }

    let mut out = vec![content.trim().to_string()];
    while out.len() < BATCH_VARIATIONS {
        out.push(fallback.to_string());
    }
    out
}

async fn execute_chat(
    config: &GenerationConfig,
    model: &str,
    system: &str,
    user: &str,
    temperature: f32,
    max_tokens: u32,
) -> Result<String, VendorError> {
    let client = reqwest::Client::new();
    let url = config.endpoint("chat/completions");
    let payload = json!({
        "model": model,
        "messages": [
            { "role": "system", "content": system },
            { "role": "user", "content": user },
        ],
        "temperature": temperature,
        "max_tokens": max_tokens,
    });
    tracing::info!(target: "prompt", "chat request start: model={model}");

    let response = client
        .post(&url)
        .header("Accept", "application/json")
        .header("Authorization", format!("Bearer {}", config.api_key))
        .json(&payload)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(api_error(response).await);
    }

    let parsed: ChatCompletionResponse = response
        .json()
        .await
        .map_err(|err| VendorError::InvalidResponse(err.to_string()))?;
    Ok(parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .unwrap_or_default())
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: Option<ChatCompletionMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    content: Option<String>,
}
