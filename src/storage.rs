//! File-backed persistence for protocol records.
//!
//! Two layouts share the codec engine:
//! - one JSON document per file (`save` / `load`), replaced atomically via
//!   a temporary file and rename;
//! - one JSON document per line (`append_line` / `read_lines`) for
//!   append-only logs such as queued transactions. A torn or corrupt line
//!   is skipped on read instead of failing the whole log.
//!
//! Errors carry the file path as context and are returned to the caller;
//! nothing here retries.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::{debug, warn};
use serde_json::Value;

use crate::codec::{Record, decode_record, to_vec};

/// Named record storage.
pub trait DocumentStore {
    /// Load the document `name`; `Ok(None)` if it does not exist.
    fn load<R: Record>(&self, name: &str) -> Result<Option<R>>;

    /// Replace the document `name` atomically.
    ///
    /// `record` must pass [`is_encodable`](crate::codec::is_encodable);
    /// see [`to_vec`].
    fn save<R: Record>(&self, name: &str, record: &R) -> Result<()>;

    /// Append `record` as one line of the log `name`. Same encoding
    /// contract as [`save`](Self::save).
    fn append_line<R: Record>(&self, name: &str, record: &R) -> Result<()>;

    /// Every decodable line of the log `name`, in append order.
    fn read_lines<R: Record>(&self, name: &str) -> Result<Vec<R>>;

    /// Delete `name`. Returns `false` if it did not exist.
    fn remove(&self, name: &str) -> Result<bool>;
}

/// [`DocumentStore`] over a directory, one file per name.
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    /// Use `root` as the store directory, creating it if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("create store directory {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty()
            || name.starts_with('.')
            || name.contains(['/', '\\'])
            || name.contains("..")
        {
            bail!("invalid document name '{name}'");
        }
        Ok(self.root.join(name))
    }
}

/// Read a whole file, mapping "not found" to `None`.
fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("read {}", path.display())),
    }
}

impl DocumentStore for FsDocumentStore {
    fn load<R: Record>(&self, name: &str) -> Result<Option<R>> {
        let path = self.path(name)?;
        let Some(bytes) = read_optional(&path)? else {
            return Ok(None);
        };
        let value: Value = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse {}", path.display()))?;
        let record =
            decode_record(&value).with_context(|| format!("decode {}", path.display()))?;
        Ok(Some(record))
    }

    fn save<R: Record>(&self, name: &str, record: &R) -> Result<()> {
        let path = self.path(name)?;
        let tmp = self.root.join(format!("{name}.tmp"));
        let bytes = to_vec(record).context("encode document")?;

        let mut file =
            File::create(&tmp).with_context(|| format!("create {}", tmp.display()))?;
        file.write_all(&bytes)
            .and_then(|()| file.sync_all())
            .with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
        debug!("store: saved {} ({} bytes)", name, bytes.len());
        Ok(())
    }

    fn append_line<R: Record>(&self, name: &str, record: &R) -> Result<()> {
        let path = self.path(name)?;
        let mut line = to_vec(record).context("encode document")?;
        line.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open {}", path.display()))?;
        file.write_all(&line)
            .with_context(|| format!("append to {}", path.display()))?;
        Ok(())
    }

    fn read_lines<R: Record>(&self, name: &str) -> Result<Vec<R>> {
        let path = self.path(name)?;
        let Some(bytes) = read_optional(&path)? else {
            return Ok(Vec::new());
        };

        let mut records = Vec::new();
        for (index, line) in bytes.split(|b| *b == b'\n').enumerate() {
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            let decoded = serde_json::from_slice::<Value>(line)
                .map_err(crate::error::DecodeError::from)
                .and_then(|value| decode_record::<R>(&value));
            match decoded {
                Ok(record) => records.push(record),
                Err(e) => warn!("store: {} line {} skipped: {}", name, index + 1, e),
            }
        }
        Ok(records)
    }

    fn remove(&self, name: &str) -> Result<bool> {
        let path = self.path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("remove {}", path.display())),
        }
    }
}
