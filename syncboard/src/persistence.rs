//! Persistence primitives: the operation log and the activity log
//!
//! The operation log is the replica's durable history: every change it has
//! merged, one JSON object per line. Replaying it into a fresh document
//! reproduces the document. The activity log is an audit trail of the
//! intentions this replica executed.

use crate::error::{BoardError, Result};
use crate::types::Change;
use async_trait::async_trait;
use fs2::FileExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use syncboard_operations::LogEntry;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Durable, append-only history of merged changes
#[async_trait]
pub trait OperationLog: Send + Sync {
    /// Every stored change, oldest first
    async fn load(&self) -> Result<Vec<Change>>;

    /// Store one change
    async fn append(&self, change: &Change) -> Result<()>;
}

/// In-memory log. Clones share the same history, which lets tests reopen a
/// replica on the log a previous instance wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    changes: Arc<Mutex<Vec<Change>>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.changes.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.changes.lock().await.is_empty()
    }
}

#[async_trait]
impl OperationLog for MemoryLog {
    async fn load(&self) -> Result<Vec<Change>> {
        Ok(self.changes.lock().await.clone())
    }

    async fn append(&self, change: &Change) -> Result<()> {
        self.changes.lock().await.push(change.clone());
        Ok(())
    }
}

/// JSONL file log, held exclusively by one replica while open
#[derive(Debug)]
pub struct JsonlLog {
    path: PathBuf,
    _lock: LogLock,
}

impl JsonlLog {
    /// Open (or create) the log at `path`.
    ///
    /// Fails with `LockBusy` if another replica holds it. A partially written
    /// last line, left by a crash during append, is cut off.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let lock = LogLock::acquire(path.with_extension("lock"))?;
        repair_torn_tail(&path).await?;

        debug!(path = %path.display(), "opened operation log");
        Ok(Self { path, _lock: lock })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl OperationLog for JsonlLog {
    async fn load(&self) -> Result<Vec<Change>> {
        if !fs::try_exists(&self.path).await? {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).await?;
        let changes = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str)
            .collect::<std::result::Result<Vec<Change>, _>>()?;
        Ok(changes)
    }

    async fn append(&self, change: &Change) -> Result<()> {
        append_line(&self.path, change).await
    }
}

/// Audit trail of executed intentions
#[derive(Debug, Clone)]
pub struct ActivityLog {
    path: PathBuf,
}

impl ActivityLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, entry: &LogEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        append_line(&self.path, entry).await
    }

    /// Read entries, newest first
    pub async fn read(&self, limit: Option<usize>) -> Result<Vec<LogEntry>> {
        if !fs::try_exists(&self.path).await? {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).await?;
        let mut entries: Vec<LogEntry> = content
            .lines()
            .filter(|line| !line.is_empty())
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();

        // Reverse to get newest first
        entries.reverse();

        if let Some(limit) = limit {
            entries.truncate(limit);
        }

        Ok(entries)
    }
}

async fn append_line<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut line = serde_json::to_string(value)?;
    line.push('\n');

    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;

    file.write_all(line.as_bytes()).await?;
    file.flush().await?;

    Ok(())
}

/// Drop any bytes after the last newline
async fn repair_torn_tail(path: &Path) -> Result<()> {
    let content = match fs::read(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    if content.is_empty() || content.ends_with(b"\n") {
        return Ok(());
    }

    let keep = content
        .iter()
        .rposition(|b| *b == b'\n')
        .map_or(0, |i| i + 1);
    warn!(
        path = %path.display(),
        dropped = content.len() - keep,
        "truncating torn last line of operation log"
    );

    let file = fs::OpenOptions::new().write(true).open(path).await?;
    file.set_len(keep as u64).await?;
    Ok(())
}

/// RAII lock guard - releases on drop
#[derive(Debug)]
struct LogLock {
    file: std::fs::File,
    path: PathBuf,
}

impl LogLock {
    /// Try to acquire an exclusive lock (non-blocking)
    fn acquire(path: PathBuf) -> Result<Self> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self { file, path }),
            Err(_) => Err(BoardError::LockBusy { path }),
        }
    }
}

impl Drop for LogLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
        debug!(path = %self.path.display(), "released log lock");
    }
}
