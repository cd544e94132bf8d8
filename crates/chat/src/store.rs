//! Conversation history persistence.
//!
//! One JSONL file per session under `<data_dir>/history/`. Append is the
//! only mutation: a turn is one fsynced line, fully recorded or not at
//! all. Appends for the same session are serialized through a per-session
//! mutex so concurrent turns cannot interleave records; distinct sessions
//! write in parallel.

use crate::types::{ConversationSession, Turn};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use sumika_core::{AppError, AppResult};

/// Append-only per-session conversation store.
pub struct ConversationStore {
    root: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ConversationStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            root: data_dir.join("history"),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Append a completed turn to its session.
    pub fn append(&self, turn: &Turn) -> AppResult<()> {
        let path = self.session_path(&turn.session_id)?;
        let lock = self.session_lock(&turn.session_id);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| AppError::Store(format!("Failed to open {:?}: {}", path, e)))?;

        let json_line = serde_json::to_string(turn)
            .map_err(|e| AppError::Store(format!("Failed to serialize turn: {}", e)))?;

        writeln!(file, "{}", json_line)
            .map_err(|e| AppError::Store(format!("Failed to write to {:?}: {}", path, e)))?;

        file.sync_all()
            .map_err(|e| AppError::Store(format!("Failed to sync {:?}: {}", path, e)))?;

        tracing::debug!(session_id = %turn.session_id, "Appended turn");
        Ok(())
    }

    /// Load a session's full history. Unknown sessions are empty, not errors.
    pub fn load(&self, session_id: &str) -> AppResult<ConversationSession> {
        let path = self.session_path(session_id)?;

        if !path.exists() {
            return Ok(ConversationSession::empty(session_id));
        }

        let file = File::open(&path)
            .map_err(|e| AppError::Store(format!("Failed to open {:?}: {}", path, e)))?;
        let reader = BufReader::new(file);

        let mut turns = Vec::new();
        for (line_num, line) in reader.lines().enumerate() {
            let line = line
                .map_err(|e| AppError::Store(format!("Failed to read line {}: {}", line_num + 1, e)))?;
            if line.trim().is_empty() {
                continue;
            }
            let turn: Turn = serde_json::from_str(&line).map_err(|e| {
                AppError::Store(format!(
                    "Failed to parse line {} in {:?}: {}",
                    line_num + 1,
                    path,
                    e
                ))
            })?;
            turns.push(turn);
        }

        tracing::debug!(session_id, count = turns.len(), "Loaded session");
        Ok(ConversationSession {
            session_id: session_id.to_string(),
            turns,
        })
    }

    /// Delete a session's history.
    pub fn clear(&self, session_id: &str) -> AppResult<()> {
        let path = self.session_path(session_id)?;
        let lock = self.session_lock(session_id);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if path.exists() {
            std::fs::remove_file(&path)
                .map_err(|e| AppError::Store(format!("Failed to delete {:?}: {}", path, e)))?;
            tracing::debug!(session_id, "Cleared session");
        }
        Ok(())
    }

    /// List session ids with persisted history.
    pub fn list_sessions(&self) -> AppResult<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("jsonl") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn session_path(&self, session_id: &str) -> AppResult<PathBuf> {
        validate_session_id(session_id)?;
        Ok(self.root.join(format!("{}.jsonl", session_id)))
    }

    fn session_lock(&self, session_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Session ids become file names; keep them path-safe.
pub fn validate_session_id(session_id: &str) -> AppResult<()> {
    if session_id.is_empty() {
        return Err(AppError::Store("Session id cannot be empty".to_string()));
    }
    if !session_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::Store(format!(
            "Invalid session id '{}': only alphanumerics, '-' and '_' are allowed",
            session_id
        )));
    }
    Ok(())
}
