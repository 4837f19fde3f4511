//! Single-file JSON persistence for task snapshots.
//!
//! Every write replaces the whole file: the new snapshot is written to a
//! `<file>.tmp` sibling, synced, and renamed over the canonical path, so a
//! reader only ever sees a complete old or a complete new snapshot. Writers
//! are serialized through one async mutex per store; tokio hands that lock
//! out in the order `lock()` was called, which keeps writers FIFO.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::models::{Task, TaskStatus};

/// How `read_all` reacts to a file that exists but cannot be read or decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadPolicy {
    /// Log a warning and treat the snapshot as empty.
    #[default]
    Lenient,
    /// Surface the failure as a [`StoreError`].
    Strict,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: io::Error,
    },

    #[error("malformed task file {path}: {source}")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode tasks: {0}")]
    Encode(#[from] serde_json::Error),
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> StoreError {
    let path = path.to_path_buf();
    move |source| StoreError::Io { path, source }
}

pub struct TaskStore {
    path: PathBuf,
    read_policy: ReadPolicy,
    write_gate: Mutex<()>,
}

impl TaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            read_policy: ReadPolicy::default(),
            write_gate: Mutex::new(()),
        }
    }

    pub fn with_read_policy(mut self, read_policy: ReadPolicy) -> Self {
        self.read_policy = read_policy;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling path the next snapshot is staged at before the rename.
    pub fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Create the data directory and, if the file is absent, write the seed tasks.
    ///
    /// Failures are logged and swallowed so the server can still start; reads
    /// will then come back empty and writes will report their own errors.
    pub async fn initialize(&self) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent).await {
                tracing::error!(dir = %parent.display(), error = %e, "failed to create data directory");
                return;
            }
        }

        let _guard = self.write_gate.lock().await;
        match fs::try_exists(&self.path).await {
            Ok(true) => {
                tracing::debug!(path = %self.path.display(), "task file already present");
            }
            Ok(false) => {
                let seed = seed_tasks(Utc::now());
                match self.persist(&seed).await {
                    Ok(()) => tracing::info!(
                        path = %self.path.display(),
                        count = seed.len(),
                        "created task file with seed data"
                    ),
                    Err(e) => tracing::error!(error = %e, "failed to write seed data"),
                }
            }
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "failed to check for task file");
            }
        }
    }

    /// Read the full snapshot. A missing file is an empty snapshot.
    ///
    /// Never waits on the write gate: the canonical file is only ever replaced
    /// by a rename, so this sees either the previous or the next snapshot.
    pub async fn read_all(&self) -> Result<Vec<Task>, StoreError> {
        match self.load().await {
            Ok(tasks) => Ok(tasks),
            Err(e) => match self.read_policy {
                ReadPolicy::Strict => Err(e),
                ReadPolicy::Lenient => {
                    tracing::warn!(error = %e, "unreadable task file, treating as empty");
                    Ok(Vec::new())
                }
            },
        }
    }

    /// Replace the whole snapshot, waiting behind any writer already in flight.
    pub async fn write_all(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let _guard = self.write_gate.lock().await;
        self.persist(tasks).await
    }

    /// Read, mutate, and persist the snapshot while holding the write gate.
    ///
    /// The snapshot is loaded strictly whatever the read policy: a file that
    /// exists but cannot be read or decoded aborts the mutation rather than
    /// being replaced. Nothing is written when `mutate` returns `Err`.
    pub async fn modify<T, E, F>(&self, mutate: F) -> Result<T, E>
    where
        F: FnOnce(&mut Vec<Task>) -> Result<T, E>,
        E: From<StoreError>,
    {
        let _guard = self.write_gate.lock().await;
        let mut tasks = self.load().await?;
        let out = mutate(&mut tasks)?;
        self.persist(&tasks).await?;
        Ok(out)
    }

    async fn load(&self) -> Result<Vec<Task>, StoreError> {
        let text = match fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_err(&self.path)(e)),
        };
        serde_json::from_str(&text).map_err(|source| StoreError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    // Caller must hold the write gate.
    async fn persist(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let tmp_path = self.temp_path();
        let written = match self.stage(&tmp_path, tasks).await {
            Ok(()) => self.commit(&tmp_path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            discard_temp(&tmp_path).await;
            return Err(e);
        }
        tracing::debug!(path = %self.path.display(), count = tasks.len(), "task file written");
        Ok(())
    }

    async fn stage(&self, tmp_path: &Path, tasks: &[Task]) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(tasks)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.map_err(io_err(parent))?;
        }

        let mut file = fs::File::create(tmp_path)
            .await
            .map_err(io_err(tmp_path))?;
        file.write_all(text.as_bytes())
            .await
            .map_err(io_err(tmp_path))?;
        file.flush().await.map_err(io_err(tmp_path))?;
        file.sync_all().await.map_err(io_err(tmp_path))?;
        Ok(())
    }

    async fn commit(&self, tmp_path: &Path) -> Result<(), StoreError> {
        fs::rename(tmp_path, &self.path)
            .await
            .map_err(io_err(&self.path))
    }
}

// Best-effort removal of a temp file left by a failed stage or commit.
async fn discard_temp(tmp_path: &Path) {
    match fs::remove_file(tmp_path).await {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %tmp_path.display(), error = %e, "failed to remove temp file");
        }
    }
}

/// The three records a fresh store starts with, all stamped with `now`.
pub fn seed_tasks(now: DateTime<Utc>) -> Vec<Task> {
    let seed = |id: &str, title: &str, description: &str, status| Task {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        status,
        created_at: now,
        updated_at: now,
    };

    vec![
        seed(
            "seed-1",
            "Welcome to TaskFlow",
            "Create, update, and delete tasks with ease.",
            TaskStatus::Pending,
        ),
        seed(
            "seed-2",
            "File Persistence",
            "Your data is saved in a local JSON file.",
            TaskStatus::Done,
        ),
        seed(
            "seed-3",
            "Atomic Writes",
            "The backend ensures data integrity during save operations.",
            TaskStatus::Pending,
        ),
    ]
}
