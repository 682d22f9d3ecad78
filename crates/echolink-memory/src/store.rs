use async_trait::async_trait;
use chrono::{DateTime, Utc};
use echolink_core::{EchoLinkError, EchoLinkResult, Speaker};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::RwLock;
use uuid::Uuid;

/// One observation in the memory stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub id: Uuid,
    pub content: String,
    #[serde(default)]
    pub speaker: Option<Speaker>,
    pub session_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl MemoryEntry {
    pub fn new(content: impl Into<String>, speaker: Option<Speaker>, session_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            speaker,
            session_id,
            created_at: Utc::now(),
        }
    }
}

/// Trait for memory stream backends.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Insert a memory entry.
    async fn insert(&self, entry: MemoryEntry) -> EchoLinkResult<()>;

    /// List entries in insertion order (optionally filtered by session).
    async fn list(&self, session_filter: Option<Uuid>) -> EchoLinkResult<Vec<MemoryEntry>>;

    /// Count entries.
    async fn count(&self) -> EchoLinkResult<usize>;

    /// The stream as one document, one entry per line.
    async fn render(&self, session_filter: Option<Uuid>) -> EchoLinkResult<String> {
        let entries = self.list(session_filter).await?;
        Ok(entries
            .iter()
            .map(|e| e.content.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Memory stream held in process memory.
pub struct InMemoryMemoryStore {
    entries: RwLock<Vec<MemoryEntry>>,
}

impl InMemoryMemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemoryStore for InMemoryMemoryStore {
    async fn insert(&self, entry: MemoryEntry) -> EchoLinkResult<()> {
        let mut entries = self.entries.write().await;
        entries.push(entry);
        Ok(())
    }

    async fn list(&self, session_filter: Option<Uuid>) -> EchoLinkResult<Vec<MemoryEntry>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|e| session_filter.is_none() || e.session_id == session_filter)
            .cloned()
            .collect())
    }

    async fn count(&self) -> EchoLinkResult<usize> {
        let entries = self.entries.read().await;
        Ok(entries.len())
    }
}

/// File-backed memory stream persisted as JSONL.
/// Loads all entries on creation and appends on insert.
pub struct FileMemoryStore {
    path: PathBuf,
    inner: InMemoryMemoryStore,
}

impl FileMemoryStore {
    pub async fn new(path: PathBuf) -> EchoLinkResult<Self> {
        let inner = InMemoryMemoryStore::new();

        if path.exists() {
            let data = tokio::fs::read_to_string(&path).await?;
            for line in data.lines() {
                if line.trim().is_empty() {
                    continue;
                }
                let entry: MemoryEntry = serde_json::from_str(line)
                    .map_err(|e| EchoLinkError::Session(format!("Invalid JSONL entry: {e}")))?;
                inner.insert(entry).await?;
            }
        } else if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        Ok(Self { path, inner })
    }

    async fn append_to_file(&self, entry: &MemoryEntry) -> EchoLinkResult<()> {
        use tokio::io::AsyncWriteExt;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }
}

#[async_trait]
impl MemoryStore for FileMemoryStore {
    async fn insert(&self, entry: MemoryEntry) -> EchoLinkResult<()> {
        self.append_to_file(&entry).await?;
        self.inner.insert(entry).await
    }

    async fn list(&self, session_filter: Option<Uuid>) -> EchoLinkResult<Vec<MemoryEntry>> {
        self.inner.list(session_filter).await
    }

    async fn count(&self) -> EchoLinkResult<usize> {
        self.inner.count().await
    }
}
