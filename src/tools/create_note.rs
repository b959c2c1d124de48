use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use super::Tool;
use crate::dispatch::NoteResponse;
use crate::storage::NoteStore;

/// Adds a note through the store; insert-or-ignore on duplicate titles.
pub struct CreateNote;

#[derive(Debug, Deserialize)]
struct CreateNoteArgs {
    title: String,
    #[serde(default)]
    description: String,
}

#[async_trait::async_trait]
impl Tool for CreateNote {
    fn name(&self) -> &str {
        "create_note_tool"
    }

    fn spec(&self) -> Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": "create_note_tool",
                "description": "Add a note with the given title and description.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "title": {
                            "type": "string",
                            "description": "Unique title of the note"
                        },
                        "description": {
                            "type": "string",
                            "description": "Body text of the note"
                        }
                    },
                    "required": ["title", "description"]
                }
            }
        })
    }

    async fn run(&self, arguments: Value, store: &dyn NoteStore) -> Result<NoteResponse> {
        let args: CreateNoteArgs = serde_json::from_value(arguments)
            .context("CreateNote: invalid tool arguments")?;

        let success = store.add_note(&args.title, &args.description).await?;
        log::info!("CreateNote: title={:?} success={}", args.title, success);

        Ok(NoteResponse::with_message(if success {
            "CREATED:SUCCESS"
        } else {
            "CREATED:FAILED"
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryNoteStore;

    #[tokio::test]
    async fn test_create_reports_success() {
        let store = MemoryNoteStore::new();
        let response = CreateNote
            .run(
                serde_json::json!({ "title": "Groceries", "description": "milk and eggs" }),
                &store,
            )
            .await
            .unwrap();

        assert_eq!(response.message, "CREATED:SUCCESS");
        let note = store.get_note_by_title("Groceries").await.unwrap().unwrap();
        assert_eq!(note.text, "milk and eggs");
    }

    #[tokio::test]
    async fn test_duplicate_title_reports_failed() {
        let store = MemoryNoteStore::new();
        store.add_note("Groceries", "milk and eggs").await.unwrap();

        let response = CreateNote
            .run(
                serde_json::json!({ "title": "Groceries", "description": "bread" }),
                &store,
            )
            .await
            .unwrap();

        assert_eq!(response.message, "CREATED:FAILED");
        // No overwrite
        let note = store.get_note_by_title("Groceries").await.unwrap().unwrap();
        assert_eq!(note.text, "milk and eggs");
    }

    #[tokio::test]
    async fn test_missing_title_is_an_error() {
        let store = MemoryNoteStore::new();
        let result = CreateNote
            .run(serde_json::json!({ "description": "no title" }), &store)
            .await;
        assert!(result.is_err());
    }
}
