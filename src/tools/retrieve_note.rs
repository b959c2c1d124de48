use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use super::Tool;
use crate::dispatch::NoteResponse;
use crate::storage::NoteStore;

/// Fetches a note by exact title.
pub struct RetrieveNote;

#[derive(Debug, Deserialize)]
struct RetrieveNoteArgs {
    title: String,
}

#[async_trait::async_trait]
impl Tool for RetrieveNote {
    fn name(&self) -> &str {
        "retrieve_note_tool"
    }

    fn spec(&self) -> Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": "retrieve_note_tool",
                "description": "Get the note with the given title.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "title": {
                            "type": "string",
                            "description": "Title of the note to retrieve"
                        }
                    },
                    "required": ["title"]
                }
            }
        })
    }

    async fn run(&self, arguments: Value, store: &dyn NoteStore) -> Result<NoteResponse> {
        let args: RetrieveNoteArgs = serde_json::from_value(arguments)
            .context("RetrieveNote: invalid tool arguments")?;

        let note = store.get_note_by_title(&args.title).await?;
        log::info!("RetrieveNote: title={:?} found={}", args.title, note.is_some());

        Ok(match note {
            Some(note) => NoteResponse {
                message: "GET:SUCCESS".to_string(),
                note: Some(note),
                titles: None,
            },
            None => NoteResponse::with_message("GET:FAILED"),
        })
    }
}
