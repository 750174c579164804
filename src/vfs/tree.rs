//! In-memory tree snapshot, its persistence, and the registry of live cursors.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::FsConfig;
use crate::core::{KvStore, Result};
use crate::vfs::entry::{Directory, Node};
use crate::vfs::path::{self, AbsolutePath, Lookup};

/// Persisted form of the tree. The root is implicit and unnamed.
#[derive(Serialize)]
struct SnapshotRef<'a> {
    contents: &'a [Node],
}

#[derive(Deserialize)]
struct Snapshot {
    contents: Vec<Node>,
}

/// Index of a cursor in the registry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CursorId(usize);

/// Owner of the tree snapshot.
///
/// ### Internal state
///
/// * `root`: the unnamed root directory. Always a [`Node::Directory`].
/// * `cursors`: current paths of every cursor ever registered. The registry
///   only grows: a dropped cursor leaves a `None` slot behind, which is never
///   reused and never consulted again.
/// * `initialized`: set by the first successful [`load`](TreeStore::load).
pub struct TreeStore {
    config: FsConfig,
    backend: Box<dyn KvStore>,
    root: Node,
    initialized: bool,
    cursors: Vec<Option<AbsolutePath>>,
}

impl TreeStore {
    /// Creates a store over `backend`. Nothing is read until [`load`](TreeStore::load).
    pub fn new(config: FsConfig, backend: Box<dyn KvStore>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            backend,
            root: Node::Directory(Directory::default()),
            initialized: false,
            cursors: Vec::new(),
        })
    }

    pub fn config(&self) -> &FsConfig {
        &self.config
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn backend(&self) -> &dyn KvStore {
        self.backend.as_ref()
    }

    /// Reads the snapshot from the backend. A missing or unparseable snapshot
    /// is replaced by an empty tree, which is persisted right away. Calling it
    /// again after a successful load does nothing.
    pub fn load(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        let raw = self
            .backend
            .get(&self.config.prefix)
            .context("cannot read tree snapshot")?;
        match raw.map(|raw| serde_json::from_str::<Snapshot>(&raw)) {
            Some(Ok(snapshot)) => {
                debug!("loaded tree snapshot with {} top-level entries", snapshot.contents.len());
                self.root = Node::Directory(Directory {
                    name: String::new(),
                    contents: snapshot.contents,
                });
            }
            Some(Err(e)) => {
                warn!("unparseable tree snapshot, formatting: {}", e);
                self.format()?;
            }
            None => {
                info!("no tree snapshot under {:?}, formatting", self.config.prefix);
                self.format()?;
            }
        }
        self.initialized = true;
        Ok(())
    }

    /// Writes the whole tree under the snapshot key.
    pub fn save(&mut self) -> Result<()> {
        let contents = self.root.contents().unwrap_or_default();
        let raw = serde_json::to_string(&SnapshotRef { contents })?;
        self.backend
            .set(&self.config.prefix, &raw)
            .context("cannot write tree snapshot")
    }

    /// Wipes every key of the namespace, installs an empty tree and sends
    /// every registered cursor back to the root.
    pub fn reset(&mut self) -> Result<()> {
        for slot in self.cursors.iter_mut().flatten() {
            *slot = AbsolutePath::root();
        }
        self.format()?;
        self.initialized = true;
        Ok(())
    }

    fn format(&mut self) -> Result<()> {
        let keys = self.backend.keys_with_prefix(&self.config.prefix)?;
        info!("formatting: removing {} stored keys", keys.len());
        for key in keys {
            self.backend.delete(&key)?;
        }
        self.root = Node::Directory(Directory::default());
        self.save()
    }

    pub fn lookup(&self, path: &AbsolutePath, lookup: Lookup) -> Option<&Node> {
        path::resolve(&self.root, path, lookup)
    }

    /// Children of the directory at `path`, if `path` is a directory.
    pub fn directory_mut(&mut self, path: &AbsolutePath) -> Option<&mut Vec<Node>> {
        path::resolve_mut(&mut self.root, path, Lookup::DirsOnly)?.contents_mut()
    }

    /// Store key holding the payload of the file at `path`.
    pub fn payload_key(&self, path: &AbsolutePath) -> String {
        let rendered = path.render(&self.config.syntax);
        format!("{}{}", self.config.prefix, rendered.to_lowercase())
    }

    pub fn read_payload(&self, path: &AbsolutePath) -> Result<Option<String>> {
        self.backend.get(&self.payload_key(path))
    }

    pub fn write_payload(&mut self, path: &AbsolutePath, payload: &str) -> Result<()> {
        let key = self.payload_key(path);
        self.backend.set(&key, payload)
    }

    pub fn delete_payload(&mut self, path: &AbsolutePath) -> Result<()> {
        let key = self.payload_key(path);
        self.backend.delete(&key)
    }

    /// Every stored key of this namespace, the snapshot key included.
    pub fn keys(&self) -> Result<Vec<String>> {
        self.backend.keys_with_prefix(&self.config.prefix)
    }

    pub fn register_cursor(&mut self, path: AbsolutePath) -> CursorId {
        self.cursors.push(Some(path));
        CursorId(self.cursors.len() - 1)
    }

    /// Marks the slot of a discarded cursor as inert.
    pub fn release_cursor(&mut self, id: CursorId) {
        if let Some(slot) = self.cursors.get_mut(id.0) {
            *slot = None;
        }
    }

    pub fn cursor_path(&self, id: CursorId) -> Option<&AbsolutePath> {
        self.cursors.get(id.0)?.as_ref()
    }

    pub fn set_cursor_path(&mut self, id: CursorId, path: AbsolutePath) {
        if let Some(Some(slot)) = self.cursors.get_mut(id.0) {
            *slot = path;
        }
    }

    /// Moves every live cursor at or below `target` to `destination`.
    /// Returns how many cursors were moved.
    pub fn evacuate(&mut self, target: &AbsolutePath, destination: &AbsolutePath) -> usize {
        let mut moved = 0;
        for slot in self.cursors.iter_mut().flatten() {
            if slot.is_within(target) {
                *slot = destination.clone();
                moved += 1;
            }
        }
        moved
    }
}
