// relaychat-core/src/storage.rs
//! Persistence of the identities that have connected before, used to tell a
//! first join from a returning one.
//!
//! [`FileSeenStore`] keeps one UUID per line in `seen_players.txt` and appends
//! under an exclusive file lock. [`MemorySeenStore`] is the same contract
//! without a file.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::roster::Identity;

pub const SEEN_FILE_NAME: &str = "seen_players.txt";

pub trait SeenStore: Send + Sync {
    fn has_been_seen(&self, identity: &Identity) -> bool;

    /// Records the identity. Returns true only if it was not seen before and was recorded.
    fn mark_seen(&self, identity: &Identity) -> bool;
}

#[derive(Debug)]
pub struct FileSeenStore {
    path: PathBuf,
    seen: Mutex<HashSet<Uuid>>,
}

impl FileSeenStore {
    /// Opens the store under `data_dir`, creating the directory if missing.
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        let path = data_dir.join(SEEN_FILE_NAME);
        let seen = if path.exists() {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            parse_seen(&text)
        } else {
            HashSet::new()
        };

        info!("Loaded {} seen players from {}.", seen.len(), path.display());
        Ok(Self {
            path,
            seen: Mutex::new(seen),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.lock().is_empty()
    }

    fn append(&self, id: Uuid) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        fs2::FileExt::lock_exclusive(&file)?;
        let written = writeln!(file, "{}", id).and_then(|_| file.flush());
        fs2::FileExt::unlock(&file)?;
        written
    }
}

fn parse_seen(text: &str) -> HashSet<Uuid> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match Uuid::parse_str(line) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("Skipping malformed seen-player entry '{}': {}", line, e);
                None
            }
        })
        .collect()
}

impl SeenStore for FileSeenStore {
    fn has_been_seen(&self, identity: &Identity) -> bool {
        self.seen.lock().contains(&identity.id())
    }

    fn mark_seen(&self, identity: &Identity) -> bool {
        let mut seen = self.seen.lock();
        if !seen.insert(identity.id()) {
            return false;
        }
        match self.append(identity.id()) {
            Ok(()) => {
                debug!("Marked {} as seen.", identity.name());
                true
            }
            Err(e) => {
                seen.remove(&identity.id());
                warn!("Failed to save seen player {}: {}", identity.name(), e);
                false
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct MemorySeenStore {
    seen: Mutex<HashSet<Uuid>>,
}

impl MemorySeenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SeenStore for MemorySeenStore {
    fn has_been_seen(&self, identity: &Identity) -> bool {
        self.seen.lock().contains(&identity.id())
    }

    fn mark_seen(&self, identity: &Identity) -> bool {
        self.seen.lock().insert(identity.id())
    }
}
