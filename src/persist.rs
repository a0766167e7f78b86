/*
 * This file is part of Smctherm.
 *
 * Copyright (C) 2026 Smctherm contributors
 *
 * Smctherm is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Smctherm is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Smctherm. If not, see <https://www.gnu.org/licenses/>.
 */

//! Persistence of the last valid reading per metric.
//!
//! Written whenever a fresh aggregate passes validity filtering, read back
//! only in fail-soft mode. One small JSON document, replaced atomically on
//! every write so a crash never leaves a truncated file behind.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Cpu,
    Gpu,
}

impl Metric {
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Cpu => "cpu",
            Metric::Gpu => "gpu",
        }
    }
}

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("failed to read state file {path}: {source}")]
    FileRead { path: PathBuf, source: io::Error },
    #[error("failed to write state file {path}: {source}")]
    FileWrite { path: PathBuf, source: io::Error },
    #[error("state file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no stored value for the {0} metric")]
    Missing(&'static str),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredState {
    #[serde(default)]
    cpu: Option<f64>,
    #[serde(default)]
    gpu: Option<f64>,
}

/// File-backed store holding one scalar per metric.
pub struct LastValidStore {
    path: PathBuf,
}

impl LastValidStore {
    pub fn new(path: PathBuf) -> Self {
        LastValidStore { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// XDG config dir, then `~/.config`, then a world-writable fallback.
    pub fn default_path() -> PathBuf {
        if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
            return Path::new(&xdg).join("smctherm").join("state.json");
        }
        if let Ok(home) = env::var("HOME") {
            return Path::new(&home)
                .join(".config")
                .join("smctherm")
                .join("state.json");
        }
        PathBuf::from("/tmp/smctherm/state.json")
    }

    fn load(&self) -> Result<StoredState, PersistError> {
        if !self.path.exists() {
            return Ok(StoredState::default());
        }
        let contents = fs::read_to_string(&self.path).map_err(|e| PersistError::FileRead {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Last persisted valid value for `metric`. A missing or unparsable state
    /// file is an error the caller reports and degrades to 0.0; it is never
    /// fatal to the read path.
    pub fn read(&self, metric: Metric) -> Result<f64, PersistError> {
        let state = self.load()?;
        let value = match metric {
            Metric::Cpu => state.cpu,
            Metric::Gpu => state.gpu,
        };
        value.ok_or(PersistError::Missing(metric.as_str()))
    }

    /// Record `value` for `metric`. Callers only pass values that already
    /// passed the validity-range check.
    pub fn write(&self, metric: Metric, value: f64) -> Result<(), PersistError> {
        // A corrupt existing file is replaced rather than propagated.
        let mut state = self.load().unwrap_or_default();
        match metric {
            Metric::Cpu => state.cpu = Some(value),
            Metric::Gpu => state.gpu = Some(value),
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| PersistError::FileWrite {
                path: self.path.clone(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(&state)?;

        // Write to a temp file then rename so readers never see a partial file.
        let temp_path = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| PersistError::FileWrite {
            path: temp_path.clone(),
            source: e,
        })?;
        file.write_all(json.as_bytes())
            .map_err(|e| PersistError::FileWrite {
                path: temp_path.clone(),
                source: e,
            })?;
        file.sync_all().map_err(|e| PersistError::FileWrite {
            path: temp_path.clone(),
            source: e,
        })?;
        drop(file);

        fs::rename(&temp_path, &self.path).map_err(|e| PersistError::FileWrite {
            path: self.path.clone(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> LastValidStore {
        LastValidStore::new(dir.path().join("state.json"))
    }

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.write(Metric::Cpu, 52.375).unwrap();
        assert_eq!(store.read(Metric::Cpu).unwrap(), 52.375);
    }

    #[test]
    fn test_metrics_are_independent() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.write(Metric::Cpu, 52.0).unwrap();
        store.write(Metric::Gpu, 48.5).unwrap();
        assert_eq!(store.read(Metric::Cpu).unwrap(), 52.0);
        assert_eq!(store.read(Metric::Gpu).unwrap(), 48.5);
    }

    #[test]
    fn test_overwrite_keeps_latest() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.write(Metric::Cpu, 40.0).unwrap();
        store.write(Metric::Cpu, 45.5).unwrap();
        assert_eq!(store.read(Metric::Cpu).unwrap(), 45.5);
    }

    #[test]
    fn test_missing_file_reports_missing_metric() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(matches!(
            store.read(Metric::Cpu),
            Err(PersistError::Missing("cpu"))
        ));
    }

    #[test]
    fn test_unparsable_file_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "not json at all").unwrap();
        assert!(matches!(
            store.read(Metric::Cpu),
            Err(PersistError::Parse(_))
        ));
    }

    #[test]
    fn test_write_replaces_corrupt_state() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "garbage").unwrap();
        store.write(Metric::Gpu, 60.0).unwrap();
        assert_eq!(store.read(Metric::Gpu).unwrap(), 60.0);
        assert!(matches!(
            store.read(Metric::Cpu),
            Err(PersistError::Missing("cpu"))
        ));
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.write(Metric::Cpu, 33.0).unwrap();
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("state.json")]);
    }

    #[test]
    fn test_creates_missing_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let store = LastValidStore::new(dir.path().join("nested").join("deep").join("state.json"));
        store.write(Metric::Cpu, 21.0).unwrap();
        assert_eq!(store.read(Metric::Cpu).unwrap(), 21.0);
    }
}
