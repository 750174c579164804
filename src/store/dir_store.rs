//! This module provides a key/value store that maps every key to a file in a real directory
//! on the host system.
//!
//! ### Key Features:
//! - **Isolated root**: All entries live inside one designated directory (self.root).
//! - **Arbitrary keys**: File names are the hex encoding of the key, so keys may contain path
//!   delimiters, dots or any other character.
//! - **Long keys**: A hex name longer than 200 characters is cut into segments. Every
//!   segment but the last becomes a directory named `<segment>.d`, the last one names the file.
//!   The suffix keeps a file and a directory sharing the same hex segment apart.
//! - **Foreign files are ignored**: Files whose names are not valid hex are never reported as keys.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use tracing::warn;

use crate::core::{KvStore, Result};

/// Longest hex segment used as one host path component. Most host file
/// systems limit a component to 255 bytes.
const SEGMENT_LEN: usize = 200;

const SEGMENT_DIR_SUFFIX: &str = ".d";

/// A durable [`KvStore`] keeping one host file per key.
///
/// ### Usage notes:
/// - Values are stored as UTF-8 text, one file per key.
/// - Not safe for several processes writing the same root at once.
/// - Errors are returned via `anyhow::Result` with descriptive messages.
///
/// ### Example:
/// ```no_run
/// use kv_vfs::{DirStore, KvStore};
///
/// let root = std::env::temp_dir().join("kv_vfs_store");
/// let mut store = DirStore::new(&root).unwrap();
/// store.set("fsjs./note.txt", "Hello").unwrap();
/// assert_eq!(store.get("fsjs./note.txt").unwrap().as_deref(), Some("Hello"));
/// ```
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf, // host-related absolute path
}

impl DirStore {
    /// Creates a store rooted at the host directory `root`.
    /// * `root` must be an absolute host path. If it does not exist it will be created.
    /// If `root` is relative or exists but is not a directory, error returns.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();

        if root.as_os_str().is_empty() {
            return Err(anyhow!("invalid root path: empty"));
        }
        if root.is_relative() {
            return Err(anyhow!("the root path must be absolute"));
        }
        if root.exists() && !root.is_dir() {
            return Err(anyhow!("{:?} is not a directory", root));
        }

        fs::create_dir_all(root).with_context(|| format!("cannot create {:?}", root))?;

        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() {
            return Err(anyhow!("invalid key: empty"));
        }
        let encoded = hex::encode(key);
        let mut path = self.root.clone();
        let mut rest = encoded.as_str();
        while rest.len() > SEGMENT_LEN {
            let (segment, tail) = rest.split_at(SEGMENT_LEN);
            path.push(format!("{}{}", segment, SEGMENT_DIR_SUFFIX));
            rest = tail;
        }
        path.push(rest);
        Ok(path)
    }

    /// Removes the segment directories left empty above `path`.
    fn prune(&self, path: &Path) {
        let mut dir = path.parent();
        while let Some(current) = dir {
            if current == self.root.as_path() || fs::remove_dir(current).is_err() {
                break;
            }
            dir = current.parent();
        }
    }

    fn collect_keys(&self, dir: &Path, encoded: &str, prefix: &str, keys: &mut Vec<String>) -> Result<()> {
        for entry in fs::read_dir(dir).with_context(|| format!("cannot list {:?}", dir))? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                warn!("ignoring foreign entry in store: {}", entry.path().display());
                continue;
            };
            if entry.file_type()?.is_dir() {
                if let Some(segment) = name.strip_suffix(SEGMENT_DIR_SUFFIX) {
                    if segment.len() == SEGMENT_LEN {
                        let nested = format!("{}{}", encoded, segment);
                        self.collect_keys(&entry.path(), &nested, prefix, keys)?;
                    }
                }
                continue;
            }
            let Some(key) = hex::decode(format!("{}{}", encoded, name))
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok())
            else {
                warn!("ignoring foreign file in store: {}", entry.path().display());
                continue;
            };
            if key.starts_with(prefix) {
                keys.push(key);
            }
        }
        Ok(())
    }
}

impl KvStore for DirStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.key_path(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("cannot read key {:?}", key)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("cannot create {:?}", parent))?;
        }
        fs::write(&path, value).with_context(|| format!("cannot write key {:?}", key))
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                self.prune(&path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("cannot delete key {:?}", key)),
        }
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        self.collect_keys(&self.root, "", prefix, &mut keys)?;
        keys.sort();
        Ok(keys)
    }
}
