// SPDX-License-Identifier: LGPL-3.0-or-later

//! Named, write-once byte storage for original and filtered WAV files.
//!
//! A name, once written, always resolves to the same bytes. Writers that
//! race on one name all observe a single winner; nobody overwrites.

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use log::debug;

use crate::error::{ServiceError, ServiceResult};

/// Storage backend of the service.
pub trait SignalStore: Send + Sync {
    /// Store `bytes` under `name` unless the name is taken. Returns `true`
    /// when this call created the entry.
    fn put_if_absent(&self, name: &str, bytes: &[u8]) -> ServiceResult<bool>;

    /// Bytes stored under `name`.
    fn get(&self, name: &str) -> ServiceResult<Arc<[u8]>>;

    /// Whether `name` exists.
    fn contains(&self, name: &str) -> ServiceResult<bool>;
}

/// Reject names that could escape the store or hide as dot-files.
pub fn check_name(name: &str) -> ServiceResult<()> {
    let bad = name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\', '\0'])
        || name.contains("..");
    if bad {
        return Err(ServiceError::InvalidName(name.to_owned()));
    }
    Ok(())
}

// ── In-memory store ────────────────────────────────────────────────

/// Process-local store backed by a hash map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Arc<[u8]>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SignalStore for MemoryStore {
    fn put_if_absent(&self, name: &str, bytes: &[u8]) -> ServiceResult<bool> {
        check_name(name)?;
        let mut entries = self
            .entries
            .write()
            .map_err(|_| ServiceError::Poisoned("memory store"))?;
        if entries.contains_key(name) {
            return Ok(false);
        }
        entries.insert(name.to_owned(), Arc::from(bytes));
        Ok(true)
    }

    fn get(&self, name: &str) -> ServiceResult<Arc<[u8]>> {
        check_name(name)?;
        let entries = self
            .entries
            .read()
            .map_err(|_| ServiceError::Poisoned("memory store"))?;
        entries
            .get(name)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(name.to_owned()))
    }

    fn contains(&self, name: &str) -> ServiceResult<bool> {
        check_name(name)?;
        let entries = self
            .entries
            .read()
            .map_err(|_| ServiceError::Poisoned("memory store"))?;
        Ok(entries.contains_key(name))
    }
}

// ── Directory store ────────────────────────────────────────────────

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Store backed by a media directory; each entry is one file.
///
/// Entries are written to a temporary file and hard-linked into place, so
/// readers never see a partially written file and an existing name is
/// never replaced.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> ServiceResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| ServiceError::io(&root, e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, name: &str) -> ServiceResult<PathBuf> {
        check_name(name)?;
        Ok(self.root.join(name))
    }
}

impl SignalStore for DirStore {
    fn put_if_absent(&self, name: &str, bytes: &[u8]) -> ServiceResult<bool> {
        let path = self.path_of(name)?;
        if path.exists() {
            return Ok(false);
        }

        let tmp = self.root.join(format!(
            ".{name}.{}.{}.tmp",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        let write = || -> std::io::Result<()> {
            let mut f = fs::File::create(&tmp)?;
            f.write_all(bytes)?;
            f.sync_all()
        };
        if let Err(e) = write() {
            let _ = fs::remove_file(&tmp);
            return Err(ServiceError::io(&tmp, e));
        }

        let linked = fs::hard_link(&tmp, &path);
        let _ = fs::remove_file(&tmp);
        match linked {
            Ok(()) => {
                debug!("store: wrote {} ({} bytes)", path.display(), bytes.len());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(ServiceError::io(&path, e)),
        }
    }

    fn get(&self, name: &str) -> ServiceResult<Arc<[u8]>> {
        let path = self.path_of(name)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes.into()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ServiceError::NotFound(name.to_owned())),
            Err(e) => Err(ServiceError::io(&path, e)),
        }
    }

    fn contains(&self, name: &str) -> ServiceResult<bool> {
        Ok(self.path_of(name)?.is_file())
    }
}
