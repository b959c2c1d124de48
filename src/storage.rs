use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::{Connection, PgConnection, Row};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// A stored note. Titles are unique at the storage boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub title: String,
    pub text: String,
}

/// A note title with its storage id, as listed by `list_all_titles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleEntry {
    pub id: i64,
    pub title: String,
}

/// Capability set the note tools run against.
///
/// `add_note` is insert-or-ignore: creating a title that already exists is a
/// no-op returning `false`, never an overwrite and never an error. Under
/// concurrent calls with the same title at most one succeeds, guaranteed by
/// the storage layer's uniqueness constraint rather than local locking.
#[async_trait::async_trait]
pub trait NoteStore: Send + Sync {
    async fn add_note(&self, title: &str, text: &str) -> Result<bool>;
    async fn get_note_by_title(&self, title: &str) -> Result<Option<Note>>;
    /// All titles in ascending lexical order.
    async fn list_all_titles(&self) -> Result<Vec<TitleEntry>>;
}

/// Postgres-backed note store. Opens and closes one connection per call.
pub struct PgNoteStore {
    dsn: String,
}

impl PgNoteStore {
    pub fn new(dsn: impl Into<String>) -> Self {
        Self { dsn: dsn.into() }
    }

    async fn connect(&self) -> Result<PgConnection> {
        PgConnection::connect(&self.dsn)
            .await
            .context("Failed to connect to Postgres")
    }

    /// Establish the 'notes' table if it doesn't exist. Failures are logged
    /// and swallowed; a broken database surfaces on the first real query.
    pub async fn ensure_schema(&self) {
        match self.create_notes_table().await {
            Ok(()) => log::info!("Storage: 'notes' table created or verified"),
            Err(e) => log::error!("Storage: error while creating 'notes' table: {e:#}"),
        }
    }

    async fn create_notes_table(&self) -> Result<()> {
        let mut conn = self.connect().await?;
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS notes (
                id SERIAL PRIMARY KEY,
                title VARCHAR(200) UNIQUE NOT NULL,
                text TEXT NOT NULL
            );
            "#,
        )
        .execute(&mut conn)
        .await
        .context("Failed to create 'notes' table")?;
        conn.close().await.ok();
        Ok(())
    }

    /// Check whether a table is present in the public schema.
    pub async fn table_exists(&self, table_name: &str) -> Result<bool> {
        let mut conn = self.connect().await?;
        let row = sqlx::query(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM information_schema.tables
                WHERE table_schema = 'public'
                AND table_name = $1
            ) AS present;
            "#,
        )
        .bind(table_name)
        .fetch_one(&mut conn)
        .await
        .context("Failed to check table existence")?;
        conn.close().await.ok();
        Ok(row.get::<bool, _>("present"))
    }
}

#[async_trait::async_trait]
impl NoteStore for PgNoteStore {
    async fn add_note(&self, title: &str, text: &str) -> Result<bool> {
        let mut conn = self.connect().await?;
        let result = sqlx::query(
            r#"
            INSERT INTO notes (title, text)
            VALUES ($1, $2)
            ON CONFLICT (title) DO NOTHING;
            "#,
        )
        .bind(title)
        .bind(text)
        .execute(&mut conn)
        .await
        .context("Failed to insert note")?;
        conn.close().await.ok();
        Ok(result.rows_affected() == 1)
    }

    async fn get_note_by_title(&self, title: &str) -> Result<Option<Note>> {
        let mut conn = self.connect().await?;
        let row = sqlx::query("SELECT title, text FROM notes WHERE title = $1;")
            .bind(title)
            .fetch_optional(&mut conn)
            .await
            .context("Failed to fetch note")?;
        conn.close().await.ok();
        Ok(row.map(|r| Note {
            title: r.get("title"),
            text: r.get("text"),
        }))
    }

    async fn list_all_titles(&self) -> Result<Vec<TitleEntry>> {
        let mut conn = self.connect().await?;
        let rows = sqlx::query("SELECT id, title FROM notes ORDER BY title;")
            .fetch_all(&mut conn)
            .await
            .context("Failed to list note titles")?;
        conn.close().await.ok();
        Ok(rows
            .iter()
            .map(|r| TitleEntry {
                id: i64::from(r.get::<i32, _>("id")),
                title: r.get("title"),
            })
            .collect())
    }
}

/// In-memory note store with the same contract as [`PgNoteStore`].
/// Used by tests and toy backends.
#[derive(Default)]
pub struct MemoryNoteStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    notes: BTreeMap<String, StoredNote>,
    next_id: i64,
}

struct StoredNote {
    id: i64,
    text: String,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl NoteStore for MemoryNoteStore {
    async fn add_note(&self, title: &str, text: &str) -> Result<bool> {
        let mut inner = self.inner.lock().expect("note store mutex poisoned");
        if inner.notes.contains_key(title) {
            return Ok(false);
        }
        inner.next_id += 1;
        let id = inner.next_id;
        inner.notes.insert(
            title.to_string(),
            StoredNote {
                id,
                text: text.to_string(),
            },
        );
        Ok(true)
    }

    async fn get_note_by_title(&self, title: &str) -> Result<Option<Note>> {
        let inner = self.inner.lock().expect("note store mutex poisoned");
        Ok(inner.notes.get(title).map(|stored| Note {
            title: title.to_string(),
            text: stored.text.clone(),
        }))
    }

    async fn list_all_titles(&self) -> Result<Vec<TitleEntry>> {
        let inner = self.inner.lock().expect("note store mutex poisoned");
        // BTreeMap iteration gives ascending lexical title order
        Ok(inner
            .notes
            .iter()
            .map(|(title, stored)| TitleEntry {
                id: stored.id,
                title: title.clone(),
            })
            .collect())
    }
}
