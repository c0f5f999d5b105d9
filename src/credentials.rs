//! Credential context for authenticated backend calls
//!
//! The bearer token lives in a shared handle that is passed to the transport
//! at construction, optionally backed by a JSON file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

#[derive(Debug, Serialize, Deserialize)]
struct StoredCredentials {
    token: String,
}

/// Shared, cloneable token holder
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    token: Arc<RwLock<Option<String>>>,
    path: Option<PathBuf>,
}

impl Credentials {
    /// In-memory credentials, never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Credentials with a preset token (tests, one-off scripts)
    #[allow(dead_code)] // Used in tests
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Arc::new(RwLock::new(Some(token.into()))),
            path: None,
        }
    }

    /// Load credentials backed by `path`. A missing file means no token.
    pub fn load(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let token = match fs::read(&path) {
            Ok(data) => {
                let stored: StoredCredentials = serde_json::from_slice(&data).map_err(|err| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("failed to parse {}: {err}", path.display()),
                    )
                })?;
                Some(stored.token).filter(|t| !t.is_empty())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => return Err(err),
        };

        Ok(Self {
            token: Arc::new(RwLock::new(token)),
            path: Some(path),
        })
    }

    /// Current bearer token, if any
    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Replace the token and persist it when file-backed
    pub fn set_token(&self, token: impl Into<String>) -> io::Result<()> {
        let token = token.into();
        if let Some(path) = &self.path {
            write_atomic(path, &StoredCredentials { token: token.clone() })?;
        }
        *self.write_guard() = Some(token);
        Ok(())
    }

    /// Forget the token and remove the backing file
    pub fn clear(&self) -> io::Result<()> {
        *self.write_guard() = None;
        if let Some(path) = &self.path {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    fn write_guard(&self) -> std::sync::RwLockWriteGuard<'_, Option<String>> {
        self.token
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

fn write_atomic(path: &Path, stored: &StoredCredentials) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let bytes = serde_json::to_vec_pretty(stored)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, bytes)?;
    fs::rename(&tmp_path, path)
}
