use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::ModelConfig;
use crate::ollama::{ChatRequest, OllamaClient};

/// Typed interpretation of a free-text user message.
///
/// Produced once per request and consumed only by the dispatch branch.
/// Fields absent from the model output default to the empty string.
#[derive(Debug, Clone, Deserialize)]
pub struct NoteIntent {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Maps user text to a [`NoteIntent`] with one JSON-constrained model call.
///
/// No retries and no validation beyond the JSON parse: a malformed reply is
/// a remote-call failure and propagates to the caller.
pub struct IntentExtractor {
    ollama: OllamaClient,
    temperature: f32,
    top_p: f32,
}

impl IntentExtractor {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            ollama: config.client(),
            temperature: config.temperature,
            top_p: config.top_p,
        }
    }

    pub async fn extract(&self, user_input: &str) -> Result<NoteIntent> {
        log::info!("IntentExtractor: extracting intent with LLM...");

        let reply = self
            .ollama
            .chat(ChatRequest {
                system_prompt: Self::system_prompt().to_string(),
                user_prompt: user_input.to_string(),
                temperature: self.temperature,
                top_p: self.top_p,
                json_format: true,
            })
            .await
            .context("IntentExtractor: model call failed")?;

        let intent: NoteIntent = serde_json::from_str(&reply)
            .context("IntentExtractor: failed to parse intent JSON from model")?;

        log::info!(
            "IntentExtractor: action={:?} title={:?}",
            intent.action,
            intent.title
        );

        Ok(intent)
    }

    fn system_prompt() -> &'static str {
        r#"You are an intent extraction assistant. Your task is to understand the user's intent (e.g., create, retrieve, list) and extract relevant details from their input.

Your output must be a JSON object of the form:
{"action": "<the user's intent>", "title": "<a concise summary or headline>", "description": "<main topic of the user's intent>"}

- Action: extract the primary action or intent from the user's input (e.g., create, retrieve, list).
- Title: extract a concise and specific summary or headline.
- Description: extract any details that identify the main topic of the user's input.

Examples:
Input: 'Create a note about my Monday meeting with Guillermo about launching Kubernetes.'
Output: {"action": "create", "title": "Monday meeting with Guillermo", "description": "about launching Kubernetes"}
Input: 'List my notes about project deadlines.'
Output: {"action": "list", "title": "", "description": "project deadlines"}
Input: 'Retrieve details about the quarterly earnings report for Q3 2023.'
Output: {"action": "retrieve", "title": "quarterly earnings report for Q3 2023", "description": "quarterly earnings report for Q3 2023"}

Ensure that:
- You always extract the `action`, `title` and `description`.
- If no specific `title` or `description` is provided in the input, leave them as an empty string ("").

Respond ONLY with the JSON object, no extra text before or after."#
    }
}
