use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::models::FinishedSession;

/// Receives finished sessions. Where they end up is up to the implementation.
pub trait SessionSink {
    fn persist(&self, session: &FinishedSession) -> Result<()>;
}

/// Stores one pretty-printed JSON file per finished session.
#[derive(Debug, Clone)]
pub struct JsonSessionStore {
    dir: PathBuf,
}

impl JsonSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)
                .with_context(|| format!("Failed to create directory: {}", self.dir.display()))?;
        }
        Ok(())
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    pub fn load(&self, id: &str) -> Result<FinishedSession> {
        read_session(&self.path_for(id))
    }

    /// Stored sessions, newest first. Unreadable files are skipped.
    pub fn list(&self) -> Result<Vec<FinishedSession>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut sessions = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read session directory: {}", self.dir.display()))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| read_session(&path).ok())
            .collect::<Vec<_>>();

        sessions.sort_by(|a, b| b.finished_at.cmp(&a.finished_at));
        Ok(sessions)
    }

    /// The most recently finished session.
    pub fn latest(&self) -> Result<FinishedSession> {
        self.list()?
            .into_iter()
            .next()
            .ok_or(anyhow!("No finished sessions found"))
    }
}

impl SessionSink for JsonSessionStore {
    fn persist(&self, session: &FinishedSession) -> Result<()> {
        self.ensure_dir()?;

        let path = self.path_for(&session.id);
        let content = serde_json::to_string_pretty(session)?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to save session to {}", path.display()))?;

        info!(session = %session.id, path = %path.display(), "session saved");
        Ok(())
    }
}

fn read_session(path: &Path) -> Result<FinishedSession> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read session file: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse session file: {}", path.display()))
}
