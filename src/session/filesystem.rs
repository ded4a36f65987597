use super::storage::SessionBackend;
use crate::error::{Result, StoreError};
use crate::models::SessionFile;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const SESSION_EXPIRY_MINUTES: i64 = 30;

/// Session persisted as `session-<id>.json` in a directory. Every mutation
/// rewrites the file.
pub struct FilesystemSession {
    dir: PathBuf,
    file: SessionFile,
}

impl FilesystemSession {
    /// Default location, `~/.cache/convostore`
    pub fn default_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".cache")))
            .ok_or_else(|| StoreError::Session("could not determine cache directory".into()))?
            .join("convostore");
        if !cache_dir.exists() {
            fs::create_dir_all(&cache_dir)?;
        }
        Ok(cache_dir)
    }

    /// Start an empty session with a fresh id. Nothing is written until the
    /// first mutation.
    pub fn create(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            file: SessionFile {
                session_id: Uuid::new_v4().to_string(),
                last_updated: Local::now(),
                values: Default::default(),
            },
        }
    }

    /// Resume the most recent unexpired session in `dir`, or create one.
    pub fn resume_or_create(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        match Self::find_recent(&dir) {
            Some(file) => {
                tracing::debug!(session_id = %file.session_id, "resuming session");
                Self { dir, file }
            }
            None => Self::create(dir),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.file.session_id
    }

    pub fn path(&self) -> PathBuf {
        Self::file_path(&self.dir, &self.file.session_id)
    }

    fn file_path(dir: &Path, session_id: &str) -> PathBuf {
        dir.join(format!("session-{}.json", session_id))
    }

    fn is_session_file(path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some("json")
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with("session-"))
                .unwrap_or(false)
    }

    fn find_recent(dir: &Path) -> Option<SessionFile> {
        let now = Local::now();
        let entries = fs::read_dir(dir).ok()?;

        let mut sessions: Vec<(PathBuf, SessionFile)> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = entry.path();
                if !Self::is_session_file(&path) {
                    return None;
                }
                let content = fs::read_to_string(&path).ok()?;
                let file: SessionFile = serde_json::from_str(&content).ok()?;
                Some((path, file))
            })
            .collect();

        // Most recent first
        sessions.sort_by(|a, b| b.1.last_updated.cmp(&a.1.last_updated));

        let (path, file) = sessions.into_iter().next()?;
        let age_minutes = now.signed_duration_since(file.last_updated).num_minutes();
        if age_minutes.abs() < SESSION_EXPIRY_MINUTES {
            Some(file)
        } else {
            tracing::debug!(path = %path.display(), age_minutes, "removing expired session");
            let _ = fs::remove_file(&path);
            None
        }
    }

    /// Delete every session file in `dir`.
    pub fn clear_all(dir: &Path) -> Result<usize> {
        let mut removed = 0;
        if let Ok(entries) = fs::read_dir(dir) {
            for entry in entries.filter_map(|e| e.ok()) {
                let path = entry.path();
                if Self::is_session_file(&path) {
                    fs::remove_file(&path)?;
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }

    fn save(&mut self) -> Result<()> {
        self.file.last_updated = Local::now();
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        let content = serde_json::to_string_pretty(&self.file)?;
        fs::write(self.path(), content)?;
        Ok(())
    }
}

impl SessionBackend for FilesystemSession {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.file.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        let previous = self.file.values.insert(key.to_string(), value);
        self.save().inspect_err(|_| match previous {
            Some(old) => {
                self.file.values.insert(key.to_string(), old);
            }
            None => {
                self.file.values.remove(key);
            }
        })
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if let Some(old) = self.file.values.remove(key) {
            self.save().inspect_err(|_| {
                self.file.values.insert(key.to_string(), old);
            })?;
        }
        Ok(())
    }
}
