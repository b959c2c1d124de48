pub mod create_note;
pub mod list_notes;
pub mod retrieve_note;

pub use create_note::CreateNote;
pub use list_notes::ListNotes;
pub use retrieve_note::RetrieveNote;

use anyhow::Result;
use serde_json::Value;

use crate::dispatch::NoteResponse;
use crate::storage::NoteStore;

/// A callable capability advertised to the action model.
///
/// Object-safe on purpose: the model picks tools by name at runtime, so the
/// dispatcher holds them as `Box<dyn Tool>` and routes raw JSON arguments.
/// Each tool is a direct passthrough to the note store.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    /// OpenAI-style function schema sent with the chat request.
    fn spec(&self) -> Value;
    async fn run(&self, arguments: Value, store: &dyn NoteStore) -> Result<NoteResponse>;
}

/// The fixed tool set bound to every action-agent call.
pub fn note_tools() -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(CreateNote),
        Box::new(RetrieveNote),
        Box::new(ListNotes),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_set_names() {
        let names: Vec<String> = note_tools().iter().map(|t| t.name().to_string()).collect();
        assert_eq!(
            names,
            vec!["create_note_tool", "retrieve_note_tool", "list_notes_tool"]
        );
    }

    #[test]
    fn test_specs_are_function_schemas() {
        for tool in note_tools() {
            let spec = tool.spec();
            assert_eq!(spec["type"], "function");
            assert_eq!(spec["function"]["name"], tool.name());
            assert!(spec["function"]["parameters"].is_object());
        }
    }
}
