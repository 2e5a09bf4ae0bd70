// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directory-backed step table visible to every process on the node.
//!
//! Layout: `<dir>/<job>.<step>.json` holds the entry and
//! `<dir>/<job>.<step>.lock` carries the advisory per-key lock. Entries are
//! replaced by write-to-temp then rename, so readers never see a torn file.
//! Lock files outlive their entries: a waiter and a later inserter must
//! contend on the same inode.

use crate::{EntryGuard, StepEntry, StepTable, TableError};
use fs2::FileExt;
use nd_core::{StepKey, StepState};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

pub struct FileStepTable {
    dir: PathBuf,
}

impl FileStepTable {
    /// Open (creating if needed) the table rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, TableError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn stem(key: StepKey) -> String {
        format!("{}.{}", key.job_id, key.step_id.raw())
    }

    fn entry_path(&self, key: StepKey) -> PathBuf {
        self.dir.join(format!("{}.json", Self::stem(key)))
    }

    fn lock_path(&self, key: StepKey) -> PathBuf {
        self.dir.join(format!("{}.lock", Self::stem(key)))
    }

    fn acquire(&self, key: StepKey) -> Result<File, TableError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.lock_path(key))?;
        file.lock_exclusive()?;
        Ok(file)
    }

    fn read(path: &Path) -> Result<Option<StepEntry>, TableError> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn write_entry(path: &Path, entry: &StepEntry) -> Result<(), TableError> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_vec(entry)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

struct FileGuard {
    lock: File,
    path: PathBuf,
    entry: StepEntry,
}

impl EntryGuard for FileGuard {
    fn entry(&self) -> &StepEntry {
        &self.entry
    }

    fn set_state(&mut self, state: StepState) -> Result<(), TableError> {
        let previous = self.entry.state;
        self.entry.state = state;
        write_entry(&self.path, &self.entry).inspect_err(|_| self.entry.state = previous)
    }

    fn set_exec_name(&mut self, exec_name: &str) -> Result<(), TableError> {
        let previous = std::mem::replace(&mut self.entry.exec_name, exec_name.to_string());
        write_entry(&self.path, &self.entry).inspect_err(|_| self.entry.exec_name = previous)
    }
}

impl Drop for FileGuard {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.lock) {
            // closing the descriptor releases the lock anyway
            tracing::debug!(path = %self.path.display(), error = %e, "explicit unlock failed");
        }
    }
}

impl StepTable for FileStepTable {
    fn insert(&self, entry: StepEntry) -> Result<(), TableError> {
        let key = entry.key();
        let _lock = self.acquire(key)?;
        write_entry(&self.entry_path(key), &entry)
    }

    fn lock_entry(&self, key: StepKey) -> Result<Option<Box<dyn EntryGuard + '_>>, TableError> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let lock = self.acquire(key)?;
        // deleted while we waited
        let Some(entry) = Self::read(&path)? else {
            return Ok(None);
        };
        Ok(Some(Box::new(FileGuard { lock, path, entry })))
    }

    fn delete(&self, key: StepKey) -> Result<(), TableError> {
        let _lock = self.acquire(key)?;
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(TableError::NotFound(key)),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<StepKey>, TableError> {
        let mut keys = Vec::new();
        for dirent in fs::read_dir(&self.dir)? {
            let path = dirent?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(entry) = Self::read(&path)? {
                keys.push(entry.key());
            }
        }
        Ok(keys)
    }
}
