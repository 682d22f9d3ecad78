use crate::transcript::Transcript;
use async_trait::async_trait;
use echolink_core::{EchoLinkError, EchoLinkResult};
use std::path::PathBuf;
use tracing::debug;
use uuid::Uuid;

#[async_trait]
pub trait TranscriptStore: Send + Sync {
    async fn save(&self, transcript: &Transcript) -> EchoLinkResult<()>;
    async fn get(&self, session_id: Uuid) -> EchoLinkResult<Option<Transcript>>;
    async fn list(&self) -> EchoLinkResult<Vec<Uuid>>;
}

/// File-based transcript archive, one pretty-printed JSON file per session.
pub struct FileTranscriptStore {
    dir: PathBuf,
}

impl FileTranscriptStore {
    pub async fn new(dir: PathBuf) -> EchoLinkResult<Self> {
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn transcript_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

#[async_trait]
impl TranscriptStore for FileTranscriptStore {
    async fn save(&self, transcript: &Transcript) -> EchoLinkResult<()> {
        let path = self.transcript_path(transcript.session_id);
        let json = serde_json::to_string_pretty(transcript)?;
        tokio::fs::write(&path, json).await?;
        debug!(path = %path.display(), "Transcript saved");
        Ok(())
    }

    async fn get(&self, session_id: Uuid) -> EchoLinkResult<Option<Transcript>> {
        let path = self.transcript_path(session_id);
        if !path.exists() {
            return Ok(None);
        }
        let data = tokio::fs::read_to_string(path).await?;
        let transcript: Transcript = serde_json::from_str(&data)
            .map_err(|e| EchoLinkError::Session(format!("Failed to parse transcript: {e}")))?;
        Ok(Some(transcript))
    }

    async fn list(&self) -> EchoLinkResult<Vec<Uuid>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if let Some(name) = entry.file_name().to_str() {
                if let Some(stem) = name.strip_suffix(".json") {
                    if let Ok(id) = Uuid::parse_str(stem) {
                        ids.push(id);
                    }
                }
            }
        }
        Ok(ids)
    }
}
