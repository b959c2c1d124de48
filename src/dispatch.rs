use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::intent::NoteIntent;
use crate::ollama::{ChatRequest, OllamaClient};
use crate::storage::{Note, NoteStore, TitleEntry};
use crate::tools::note_tools;

/// Terminal response envelope returned to the caller. Never mutated after
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteResponse {
    pub message: String,
    pub note: Option<Note>,
    pub titles: Option<Vec<TitleEntry>>,
}

impl NoteResponse {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            note: None,
            titles: None,
        }
    }
}

/// Turns a typed intent into a natural-language instruction for a
/// tool-bound model call and projects the chosen tool's result into a
/// [`NoteResponse`].
///
/// Which tool actually runs is the model's decision; the dispatcher only
/// supplies the tool set and the rendered instruction. The one locally
/// designed recovery path is the unrecognized action, which short-circuits
/// without a second remote call.
pub struct ActionDispatcher {
    ollama: OllamaClient,
    temperature: f32,
    top_p: f32,
}

impl ActionDispatcher {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            ollama: config.client(),
            temperature: config.temperature,
            top_p: config.top_p,
        }
    }

    pub async fn dispatch(
        &self,
        intent: &NoteIntent,
        store: &dyn NoteStore,
    ) -> Result<NoteResponse> {
        let Some(instruction) = render_instruction(intent) else {
            log::info!("Dispatcher: unrecognized action {:?}", intent.action);
            return Ok(NoteResponse::with_message("Action not recognized."));
        };

        let tools = note_tools();
        let specs: Vec<serde_json::Value> = tools.iter().map(|t| t.spec()).collect();

        log::info!("Dispatcher: running action model for {:?}", intent.action);
        let reply = self
            .ollama
            .chat_with_tools(
                ChatRequest {
                    system_prompt: Self::system_prompt().to_string(),
                    user_prompt: instruction,
                    temperature: self.temperature,
                    top_p: self.top_p,
                    json_format: false,
                },
                &specs,
            )
            .await
            .context("Dispatcher: action model call failed")?;

        // First tool call wins; the tool result is the response envelope.
        let call = reply
            .tool_calls
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Dispatcher: action model returned no tool call"))?;

        let tool = tools
            .iter()
            .find(|t| t.name() == call.function.name)
            .ok_or_else(|| {
                anyhow!(
                    "Dispatcher: action model called unknown tool {:?}",
                    call.function.name
                )
            })?;

        tool.run(call.function.arguments, store).await
    }

    fn system_prompt() -> &'static str {
        "Based on the identified user intent, carry out the requested action on the note storage. \
         Actions can include: 'create' (add note), 'retrieve' (get note), or 'list' (list all notes)."
    }
}

/// Render the instruction for the action model, or `None` when the action
/// is not one of the three known values.
pub fn render_instruction(intent: &NoteIntent) -> Option<String> {
    match intent.action.as_str() {
        "create" => Some(format!(
            "Create a note named '{}' with the description '{}'.",
            intent.title, intent.description
        )),
        "retrieve" => Some(format!("Retrieve the note titled '{}'.", intent.title)),
        "list" => Some("'list' the titles of all notes.".to_string()),
        _ => None,
    }
}
