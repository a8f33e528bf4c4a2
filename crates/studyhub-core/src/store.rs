//! File-backed local state.
//!
//! The browser original kept three kinds of localStorage state: the auth
//! token + cached user, a per-note like/dislike memory, and ad hoc
//! `tasks_{org_id}` lists. Each gets a small JSON store under the configured
//! state directory, with an explicit lifecycle: sessions are written on
//! login/registration and cleared on logout or any 401.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::{LocalTask, User};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Corrupt store file: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> StoreResult<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&raw)?))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let raw = serde_json::to_string_pretty(value)?;
    fs::write(path, raw)?;
    Ok(())
}

fn remove_if_present(path: &Path) -> StoreResult<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// The persisted session: bearer token plus the cached user it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Persists the current session as `session.json` in the state directory.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join("session.json"),
        }
    }

    pub fn load(&self) -> StoreResult<Option<Session>> {
        read_json(&self.path)
    }

    pub fn save(&self, session: &Session) -> StoreResult<()> {
        write_json(&self.path, session)
    }

    /// Called on logout and on any 401 response.
    pub fn clear(&self) -> StoreResult<()> {
        remove_if_present(&self.path)
    }
}

/// The caller's remembered reaction to a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Liked,
    Disliked,
}

/// Per-note like/dislike memory backing the optimistic rating toggle.
#[derive(Debug, Clone)]
pub struct RatingStore {
    path: PathBuf,
}

impl RatingStore {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join("ratings.json"),
        }
    }

    pub fn get(&self, note_id: &str) -> StoreResult<Option<Rating>> {
        let map: HashMap<String, Rating> = read_json(&self.path)?.unwrap_or_default();
        Ok(map.get(note_id).copied())
    }

    pub fn set(&self, note_id: &str, rating: Option<Rating>) -> StoreResult<()> {
        let mut map: HashMap<String, Rating> = read_json(&self.path)?.unwrap_or_default();
        match rating {
            Some(r) => {
                map.insert(note_id.to_string(), r);
            }
            None => {
                map.remove(note_id);
            }
        }
        write_json(&self.path, &map)
    }
}

/// Per-organization local task lists, one `tasks_{org_id}.json` file each.
#[derive(Debug, Clone)]
pub struct TaskStore {
    state_dir: PathBuf,
}

impl TaskStore {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            state_dir: state_dir.to_path_buf(),
        }
    }

    fn path_for(&self, org_id: &str) -> PathBuf {
        self.state_dir.join(format!("tasks_{}.json", org_id))
    }

    pub fn list(&self, org_id: &str) -> StoreResult<Vec<LocalTask>> {
        Ok(read_json(&self.path_for(org_id))?.unwrap_or_default())
    }

    pub fn add(&self, org_id: &str, task: LocalTask) -> StoreResult<()> {
        let mut tasks = self.list(org_id)?;
        tasks.push(task);
        write_json(&self.path_for(org_id), &tasks)
    }

    /// Remove by position. Out-of-range indices are ignored.
    pub fn remove(&self, org_id: &str, index: usize) -> StoreResult<()> {
        let mut tasks = self.list(org_id)?;
        if index < tasks.len() {
            tasks.remove(index);
            write_json(&self.path_for(org_id), &tasks)?;
        }
        Ok(())
    }
}
