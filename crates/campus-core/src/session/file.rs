//! File-backed session store.
//!
//! Stores the session in `<base>/session.json` with restricted permissions (0600).
//! The file carries two named values: `id_token` and `is_admin` ("true"/"false").
//! Writes go to a temp file that is renamed into place, so other processes
//! never observe a half-written session.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{Session, SessionStore, ensure_token, redact_token};
use crate::config::paths;

/// On-disk shape of the session file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id_token: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "string_flag"
    )]
    is_admin: Option<String>,
}

/// Keeps the admin flag only when it is a JSON string; other shapes read as unset.
fn string_flag<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(flag)) => Some(flag),
        _ => None,
    })
}

impl PersistedSession {
    fn into_session(self) -> Option<Session> {
        let token = self.id_token.filter(|t| !t.trim().is_empty())?;
        let is_admin = self.is_admin.as_deref() == Some("true");
        Some(Session::new(token, is_admin))
    }
}

#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store at the default location under the backoffice home.
    pub fn open_default() -> Self {
        Self::new(paths::session_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_unlocked(&self) -> Result<Option<Session>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read session from {}", self.path.display())
                });
            }
        };

        let persisted: PersistedSession = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse session from {}", self.path.display()))?;
        Ok(persisted.into_session())
    }

    fn write_unlocked(&self, persisted: &PersistedSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(persisted).context("Failed to serialize session")?;
        let tmp_path = self.path.with_extension("json.tmp");

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options
            .open(&tmp_path)
            .with_context(|| format!("Failed to open {} for writing", tmp_path.display()))?;
        file.write_all(contents.as_bytes())
            .with_context(|| format!("Failed to write to {}", tmp_path.display()))?;
        file.sync_all()
            .with_context(|| format!("Failed to flush {}", tmp_path.display()))?;
        drop(file);

        fs::rename(&tmp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                self.path.display()
            )
        })
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>> {
        let _guard = self.guard();
        self.read_unlocked()
    }

    fn set_session(&self, token: &str, is_admin: bool) -> Result<()> {
        ensure_token(token)?;
        let _guard = self.guard();
        self.write_unlocked(&PersistedSession {
            id_token: Some(token.to_string()),
            is_admin: Some(is_admin.to_string()),
        })?;
        tracing::info!(token = %redact_token(token), is_admin, "session stored");
        Ok(())
    }

    fn clear_session(&self) -> Result<bool> {
        let _guard = self.guard();
        // A corrupt file still counts as something to clear.
        let had_session = match self.read_unlocked() {
            Ok(session) => session.is_some(),
            Err(_) => self.path.exists(),
        };

        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to remove {}", self.path.display()));
            }
        }

        if had_session {
            tracing::info!("session cleared");
        }
        Ok(had_session)
    }
}
