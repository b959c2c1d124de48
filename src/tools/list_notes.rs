use anyhow::Result;
use serde_json::Value;

use super::Tool;
use crate::dispatch::NoteResponse;
use crate::storage::NoteStore;

/// Lists every stored note title in lexical order.
pub struct ListNotes;

#[async_trait::async_trait]
impl Tool for ListNotes {
    fn name(&self) -> &str {
        "list_notes_tool"
    }

    fn spec(&self) -> Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": "list_notes_tool",
                "description": "List the titles of all stored notes.",
                "parameters": {
                    "type": "object",
                    "properties": {}
                }
            }
        })
    }

    async fn run(&self, _arguments: Value, store: &dyn NoteStore) -> Result<NoteResponse> {
        let titles = store.list_all_titles().await?;
        log::info!("ListNotes: {} title(s)", titles.len());

        Ok(NoteResponse {
            message: "LIST:SUCCESS".to_string(),
            note: None,
            titles: Some(titles),
        })
    }
}
