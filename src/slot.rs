// Key-value slots that hold the serialized task collection

use eyre::{Context, Result, eyre};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default key the task collection is stored under
pub const DEFAULT_KEY: &str = "tasks";

/// A single persistent text slot
///
/// `write` replaces the previous value wholesale.
pub trait Slot {
    /// Current value, or `None` if nothing was ever written
    fn read(&self) -> Result<Option<String>>;

    fn write(&mut self, text: &str) -> Result<()>;
}

/// Slot backed by `<dir>/<key>.json`
///
/// Writes take an exclusive lock on `<key>.lock`. A caller doing
/// read-modify-write across processes calls `hold_lock` before reading so
/// the lock spans the whole cycle.
#[derive(Debug)]
pub struct FileSlot {
    path: PathBuf,
    lock_path: PathBuf,
    held: Option<File>,
}

impl FileSlot {
    /// Open a slot in `dir`, creating the directory if needed
    pub fn open<P: AsRef<Path>>(dir: P, key: &str) -> Result<Self> {
        validate_key(key)?;

        let dir = dir.as_ref();
        fs::create_dir_all(dir).context("Failed to create data directory")?;

        Ok(Self {
            path: dir.join(format!("{}.json", key)),
            lock_path: dir.join(format!("{}.lock", key)),
            held: None,
        })
    }

    /// Take the exclusive lock now and keep it until this slot is dropped
    ///
    /// Blocks while another process holds it. Later writes reuse the held lock.
    pub fn hold_lock(&mut self) -> Result<()> {
        if self.held.is_none() {
            self.held = Some(self.acquire_lock()?);
            debug!(path = ?self.lock_path, "Holding slot lock");
        }
        Ok(())
    }

    pub fn is_locked(&self) -> bool {
        self.held.is_some()
    }

    fn acquire_lock(&self) -> Result<File> {
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
            .context("Failed to open slot lock file")?;
        lock.lock_exclusive().context("Failed to acquire file lock")?;
        Ok(lock)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Slot for FileSlot {
    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", self.path.display())),
        }
    }

    fn write(&mut self, text: &str) -> Result<()> {
        // A lock taken here is released when `_lock` drops at the end of this call
        let _lock = match self.held {
            Some(_) => None,
            None => Some(self.acquire_lock()?),
        };

        let tmp_path = self.path.with_extension("json.tmp");
        let mut file = File::create(&tmp_path)
            .with_context(|| format!("Failed to create temporary slot file {}", tmp_path.display()))?;
        file.write_all(text.as_bytes())
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        file.sync_all()
            .with_context(|| format!("Failed to sync {}", tmp_path.display()))?;
        drop(file);

        fs::rename(&tmp_path, &self.path).context("Failed to replace slot file")?;
        debug!(path = ?self.path, bytes = text.len(), "Wrote slot");

        Ok(())
    }
}

/// In-process slot, for tests and embedders that persist elsewhere
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    value: Option<String>,
    writes: usize,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(text: impl Into<String>) -> Self {
        Self {
            value: Some(text.into()),
            writes: 0,
        }
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Number of writes since creation
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Slot for MemorySlot {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.value.clone())
    }

    fn write(&mut self, text: &str) -> Result<()> {
        self.value = Some(text.to_string());
        self.writes += 1;
        Ok(())
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(eyre!("Storage key cannot be empty"));
    }
    if key.len() > 64 {
        return Err(eyre!("Storage key too long: {} (max 64 chars)", key));
    }
    if !key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err(eyre!("Invalid storage key: {} (must be alphanumeric with _/-)", key));
    }
    Ok(())
}
