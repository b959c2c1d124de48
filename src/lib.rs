//! dot-notes: an intent-driven notes agent behind a small HTTP API.
//!
//! A user message goes through two sequential model calls: the intent
//! extractor turns free text into a typed [`intent::NoteIntent`], and the
//! action dispatcher renders that intent into an instruction for a
//! tool-bound model call whose chosen tool runs against the note store.

pub mod config;
pub mod dispatch;
pub mod intent;
pub mod ollama;
pub mod server;
pub mod storage;
pub mod tools;
