//! SQLite storage backend

use super::traits::{DocumentStore, OpenStore, StorageError, StorageResult, StoredDocument};
use crate::document::{DocumentId, OwnerId};
use crate::import::{ContentWrite, PlaceholderWrite};
use crate::resolve::{IdAllocator, UuidAllocator};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

/// SQLite-backed document store
///
/// One `documents` table with a unique `(owner_id, title)` key. Content trees
/// are stored as JSON. Thread-safe via internal mutex on the connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    allocator: Arc<dyn IdAllocator>,
}

/// Raw column values of one `documents` row
type DocumentRow = (String, String, String, Option<String>, String);

impl SqliteStore {
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                title TEXT NOT NULL,
                content_json TEXT,
                updated_at TEXT NOT NULL,
                UNIQUE (owner_id, title)
            );

            CREATE INDEX IF NOT EXISTS idx_documents_owner
                ON documents(owner_id);

            PRAGMA journal_mode = WAL;
            "#,
        )?;
        Ok(())
    }

    fn from_connection(conn: Connection) -> StorageResult<Self> {
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            allocator: Arc::new(UuidAllocator),
        })
    }

    /// Use `allocator` for identifiers of documents first created by content
    pub fn with_allocator(mut self, allocator: Arc<dyn IdAllocator>) -> Self {
        self.allocator = allocator;
        self
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    fn fetch(conn: &Connection, owner: &OwnerId, title: &str) -> StorageResult<Option<StoredDocument>> {
        let row: Option<DocumentRow> = conn
            .query_row(
                "SELECT id, owner_id, title, content_json, updated_at
                 FROM documents WHERE owner_id = ?1 AND title = ?2",
                params![owner.as_str(), title],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
            )
            .optional()?;
        row.map(Self::row_to_document).transpose()
    }

    fn row_to_document(
        (id, owner, title, content_json, updated_at): DocumentRow,
    ) -> StorageResult<StoredDocument> {
        let content = match content_json {
            Some(json) => Some(serde_json::from_str(&json)?),
            None => None,
        };
        Ok(StoredDocument {
            id: DocumentId::from_string(id),
            owner: OwnerId::new(owner),
            title,
            content,
            updated_at: DateTime::parse_from_rfc3339(&updated_at)
                .map_err(|e| StorageError::DateParse(e.to_string()))?
                .with_timezone(&Utc),
        })
    }

    fn insert_placeholder(conn: &Connection, record: &PlaceholderWrite) -> StorageResult<StoredDocument> {
        conn.execute(
            r#"
            INSERT INTO documents (id, owner_id, title, content_json, updated_at)
            VALUES (?1, ?2, ?3, NULL, ?4)
            ON CONFLICT(owner_id, title) DO NOTHING
            "#,
            params![
                record.id.as_str(),
                record.owner.as_str(),
                record.title,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Self::fetch(conn, &record.owner, &record.title)?
            .ok_or(StorageError::Database(rusqlite::Error::QueryReturnedNoRows))
    }

    fn upsert_one(&self, conn: &Connection, record: &ContentWrite) -> StorageResult<StoredDocument> {
        let content_json = serde_json::to_string(&record.content)?;
        conn.execute(
            r#"
            INSERT INTO documents (id, owner_id, title, content_json, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(owner_id, title) DO UPDATE SET
                content_json = excluded.content_json,
                updated_at = excluded.updated_at
            "#,
            params![
                self.allocator.allocate().as_str(),
                record.owner.as_str(),
                record.title,
                content_json,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Self::fetch(conn, &record.owner, &record.title)?
            .ok_or(StorageError::Database(rusqlite::Error::QueryReturnedNoRows))
    }
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::from_connection(Connection::open(path)?)
    }

    fn open_in_memory() -> StorageResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn upsert_placeholders(
        &self,
        records: &[PlaceholderWrite],
    ) -> StorageResult<Vec<StoredDocument>> {
        let conn = self.lock()?;
        let mut committed = Vec::with_capacity(records.len());
        for record in records {
            match Self::insert_placeholder(&conn, record) {
                Ok(doc) => committed.push(doc),
                Err(e) => warn!(title = %record.title, error = %e, "placeholder write failed"),
            }
        }
        Ok(committed)
    }

    async fn upsert_content(&self, records: &[ContentWrite]) -> StorageResult<Vec<StoredDocument>> {
        let conn = self.lock()?;
        let mut committed = Vec::with_capacity(records.len());
        for record in records {
            match self.upsert_one(&conn, record) {
                Ok(doc) => committed.push(doc),
                Err(e) => warn!(title = %record.title, error = %e, "content write failed"),
            }
        }
        Ok(committed)
    }

    async fn list_documents(&self, owner: &OwnerId) -> StorageResult<Vec<StoredDocument>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, owner_id, title, content_json, updated_at
             FROM documents WHERE owner_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt
            .query_map(params![owner.as_str()], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
            })?
            .collect::<Result<Vec<DocumentRow>, _>>()?;
        rows.into_iter().map(Self::row_to_document).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Tree;
    use crate::parse::parse;
    use crate::resolve::{DocumentIndex, SequentialAllocator};

    fn owner() -> OwnerId {
        OwnerId::new("user-1")
    }

    fn content(title: &str, text: &str) -> ContentWrite {
        ContentWrite {
            owner: owner(),
            title: title.into(),
            content: parse(text),
        }
    }

    #[tokio::test]
    async fn placeholder_then_content_share_identity() {
        let store = SqliteStore::open_in_memory().unwrap();
        let placeholder = PlaceholderWrite {
            id: DocumentId::from("p1"),
            owner: owner(),
            title: "B".into(),
        };
        let committed = store.upsert_placeholders(&[placeholder]).await.unwrap();
        assert_eq!(committed.len(), 1);
        assert!(committed[0].is_placeholder());

        let committed = store.upsert_content(&[content("B", "hello")]).await.unwrap();
        assert_eq!(committed[0].id, DocumentId::from("p1"));
        assert_eq!(committed[0].content, Some(parse("hello")));

        assert_eq!(store.list_documents(&owner()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn content_upsert_replaces_content_and_keeps_id() {
        let store = SqliteStore::open_in_memory()
            .unwrap()
            .with_allocator(Arc::new(SequentialAllocator::new("n")));

        let first = store.upsert_content(&[content("A", "one")]).await.unwrap();
        let second = store.upsert_content(&[content("A", "two")]).await.unwrap();
        assert_eq!(first[0].id, DocumentId::from("n-1"));
        assert_eq!(second[0].id, first[0].id);
        assert_eq!(second[0].content, Some(parse("two")));
    }

    #[tokio::test]
    async fn placeholder_does_not_clobber_existing() {
        let store = SqliteStore::open_in_memory().unwrap();
        let existing = store.upsert_content(&[content("A", "body")]).await.unwrap();

        let placeholder = PlaceholderWrite {
            id: DocumentId::from("other"),
            owner: owner(),
            title: "A".into(),
        };
        let committed = store.upsert_placeholders(&[placeholder]).await.unwrap();
        assert_eq!(committed[0].id, existing[0].id);
        assert_eq!(committed[0].content, Some(parse("body")));
    }

    #[tokio::test]
    async fn failing_record_is_omitted() {
        let store = SqliteStore::open_in_memory().unwrap();
        // Same id under a different title violates the primary key
        let records = vec![
            PlaceholderWrite {
                id: DocumentId::from("dup"),
                owner: owner(),
                title: "One".into(),
            },
            PlaceholderWrite {
                id: DocumentId::from("dup"),
                owner: owner(),
                title: "Two".into(),
            },
        ];
        let committed = store.upsert_placeholders(&records).await.unwrap();
        assert_eq!(committed.len(), 1);
        assert_eq!(committed[0].title, "One");
    }

    #[tokio::test]
    async fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("notes.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .upsert_content(&[ContentWrite {
                    owner: owner(),
                    title: "Kept".into(),
                    content: Tree::default_content(),
                }])
                .await
                .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let index = store.load_index(&owner()).await.unwrap();
        assert!(index.lookup("kept").is_some());
        let docs = store.list_documents(&owner()).await.unwrap();
        assert_eq!(docs[0].content, Some(Tree::default_content()));
    }

    #[tokio::test]
    async fn empty_input_is_noop() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.upsert_placeholders(&[]).await.unwrap().is_empty());
        assert!(store.upsert_content(&[]).await.unwrap().is_empty());
        assert!(store.list_documents(&owner()).await.unwrap().is_empty());
    }
}
