// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Policy document persistence with atomic replacement.

use serde::Serialize;
use sichter_core::Policy;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PolicyStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("policy document error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone)]
pub struct PolicyStore {
    path: PathBuf,
}

impl PolicyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw document. Missing or empty files yield `Null`, not an error.
    pub fn read_raw(&self) -> Result<serde_yaml::Value, PolicyStoreError> {
        let body = match std::fs::read_to_string(&self.path) {
            Ok(body) => body,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(serde_yaml::Value::Null),
            Err(err) => return Err(err.into()),
        };
        if body.trim().is_empty() {
            return Ok(serde_yaml::Value::Null);
        }
        Ok(serde_yaml::from_str(&body)?)
    }

    /// Best-effort typed view. Read or parse failures are logged and
    /// defaulted; the caller always gets a usable policy.
    pub fn load(&self) -> Policy {
        match self.read_raw() {
            Ok(values) => Policy::from_value(&values),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "unreadable policy, using defaults");
                Policy::default()
            }
        }
    }

    /// Atomically replace the document.
    ///
    /// Serializes to a temporary sibling in the same directory, flushes,
    /// then renames over the target; the temporary is removed on any
    /// failure. Readers therefore see the prior or the new document, never
    /// a partial mix.
    pub fn write<T: Serialize>(&self, values: &T) -> Result<(), PolicyStoreError> {
        let body = serde_yaml::to_string(values)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.sibling_tmp_path();
        let result = (|| -> std::io::Result<()> {
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(body.as_bytes())?;
            file.sync_all()?;
            std::fs::rename(&tmp, &self.path)
        })();
        if let Err(err) = result {
            let _ = std::fs::remove_file(&tmp);
            return Err(err.into());
        }
        Ok(())
    }

    fn sibling_tmp_path(&self) -> PathBuf {
        let nanos =
            SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or_default();
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "policy.yml".to_string());
        self.path.with_file_name(format!(".{name}.tmp-{nanos}"))
    }
}

#[cfg(test)]
#[path = "policy_store_tests.rs"]
mod tests;
