use crate::assessment::{AssessmentSession, SessionId};
use crate::env;
use anyhow::{Context, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use tokio::fs as async_fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Durable home for session snapshots.
///
/// `save` is called with the fully mutated session before the service commits
/// it in memory; an error aborts the whole operation.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save(&self, session: &AssessmentSession) -> Result<()>;

    async fn load(&self, id: SessionId) -> Result<Option<AssessmentSession>>;

    async fn load_all(&self) -> Result<Vec<AssessmentSession>>;
}

/// Keeps the latest snapshot of each session in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: DashMap<SessionId, AssessmentSession>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn save(&self, session: &AssessmentSession) -> Result<()> {
        self.sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn load(&self, id: SessionId) -> Result<Option<AssessmentSession>> {
        Ok(self.sessions.get(&id).map(|entry| entry.value().clone()))
    }

    async fn load_all(&self) -> Result<Vec<AssessmentSession>> {
        Ok(self
            .sessions
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }
}

/// One JSON document per session under `<data_dir>/sessions/`
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
    sessions_dir: PathBuf,
}

impl FileStore {
    /// Create the store, making the sessions directory if needed
    pub fn new(data_dir: &Path) -> Result<Self> {
        let sessions_dir = env::sessions_dir_path(data_dir);
        std::fs::create_dir_all(&sessions_dir).with_context(|| {
            format!(
                "Failed to create sessions directory: {}",
                sessions_dir.display()
            )
        })?;

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            sessions_dir,
        })
    }

    pub fn sessions_dir(&self) -> &Path {
        &self.sessions_dir
    }

    fn session_path(&self, id: SessionId) -> PathBuf {
        env::session_file_path(&self.data_dir, &id.to_string())
    }

    async fn read_session(path: &Path) -> Result<AssessmentSession> {
        let content = async_fs::read(path)
            .await
            .with_context(|| format!("Failed to read session file: {}", path.display()))?;
        serde_json::from_slice(&content)
            .with_context(|| format!("Failed to deserialize session: {}", path.display()))
    }
}

#[async_trait]
impl SessionStore for FileStore {
    /// Write to a temp file and rename it over the target
    async fn save(&self, session: &AssessmentSession) -> Result<()> {
        let final_path = self.session_path(session.id);
        let temp_path = final_path.with_extension(env::session::TEMP_FILE_EXTENSION);

        let content =
            serde_json::to_vec_pretty(session).context("Failed to serialize session")?;

        let mut file = async_fs::File::create(&temp_path)
            .await
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;
        file.write_all(&content)
            .await
            .context("Failed to write session data")?;
        file.sync_all().await.context("Failed to sync session data")?;
        drop(file);

        if let Err(e) = async_fs::rename(&temp_path, &final_path).await {
            let _ = async_fs::remove_file(&temp_path).await;
            return Err(e).context("Failed to commit session file");
        }

        debug!(
            "Saved session {} ({} bytes) to {}",
            session.id,
            content.len(),
            final_path.display()
        );
        Ok(())
    }

    async fn load(&self, id: SessionId) -> Result<Option<AssessmentSession>> {
        let path = self.session_path(id);
        let exists = async_fs::try_exists(&path)
            .await
            .with_context(|| format!("Failed to check {}", path.display()))?;
        if !exists {
            return Ok(None);
        }
        Self::read_session(&path).await.map(Some)
    }

    async fn load_all(&self) -> Result<Vec<AssessmentSession>> {
        let mut sessions = Vec::new();

        let mut entries = async_fs::read_dir(&self.sessions_dir)
            .await
            .context("Failed to read sessions directory")?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_session = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == env::session::SESSION_FILE_EXTENSION);
            if !is_session {
                continue;
            }

            match Self::read_session(&path).await {
                Ok(session) => sessions.push(session),
                Err(e) => warn!("Skipping unreadable session file: {:#}", e),
            }
        }

        info!(
            "Loaded {} sessions from {}",
            sessions.len(),
            self.sessions_dir.display()
        );
        Ok(sessions)
    }
}
