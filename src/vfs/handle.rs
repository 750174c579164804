//! Shared handle to one virtual tree.

use std::cell::{BorrowMutError, Ref, RefCell, RefMut};
use std::rc::Rc;

use tracing::info;

use crate::config::FsConfig;
use crate::core::{KvStore, Result};
use crate::vfs::cursor::Cursor;
use crate::vfs::dir_entry::DirEntry;
use crate::vfs::engine::MutationEngine;
use crate::vfs::path::AbsolutePath;
use crate::vfs::tree::TreeStore;

/// A virtual file system stored in a [`KvStore`].
///
/// `Vfs` is a cheap, cloneable handle: every clone and every [`Cursor`] opened
/// from it work on the same tree, so a change made through one of them is
/// visible to all others as soon as the call returns. The handle is meant for
/// one thread; it is neither `Send` nor `Sync`.
///
/// Besides opening cursors, `Vfs` exposes the tree operations with explicit
/// absolute paths (`"."`, `"./docs"`, ...). Paths that do not parse as
/// absolute are treated like paths that do not exist.
///
/// ### Example
///
/// ```
/// use kv_vfs::{MapStore, Vfs};
///
/// let fs = Vfs::new(MapStore::new()).unwrap();
/// assert_eq!(fs.make_dir(".", "docs").unwrap().as_deref(), Some("./docs"));
/// assert_eq!(fs.write_file("./docs", "a.txt", Some("hello")).unwrap().as_deref(), Some("hello"));
/// assert!(fs.move_file("./docs/a.txt", "./b.txt").unwrap());
/// ```
#[derive(Clone)]
pub struct Vfs {
    engine: Rc<RefCell<MutationEngine>>,
}

impl Vfs {
    /// Opens the tree stored in `backend` with the default configuration,
    /// formatting the backend if it holds no valid tree.
    pub fn new<S: KvStore + 'static>(backend: S) -> Result<Self> {
        Self::with_config(FsConfig::default(), backend)
    }

    pub fn with_config<S: KvStore + 'static>(config: FsConfig, backend: S) -> Result<Self> {
        let mut tree = TreeStore::new(config, Box::new(backend))?;
        tree.load()?;
        info!("virtual file system ready under {:?}", tree.config().prefix);
        Ok(Self {
            engine: Rc::new(RefCell::new(MutationEngine::new(tree))),
        })
    }

    /// Opens a cursor at the root.
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self)
    }

    pub(crate) fn engine(&self) -> Ref<'_, MutationEngine> {
        self.engine.borrow()
    }

    pub(crate) fn engine_mut(&self) -> RefMut<'_, MutationEngine> {
        self.engine.borrow_mut()
    }

    pub(crate) fn try_engine_mut(&self) -> std::result::Result<RefMut<'_, MutationEngine>, BorrowMutError> {
        self.engine.try_borrow_mut()
    }

    pub fn config(&self) -> FsConfig {
        self.engine().config().clone()
    }

    pub fn version(&self) -> String {
        self.engine().config().version.clone()
    }

    fn parse(&self, path: &str) -> Option<AbsolutePath> {
        AbsolutePath::parse(&self.engine().config().syntax, path)
    }

    fn render(&self, path: &AbsolutePath) -> String {
        path.render(&self.engine().config().syntax)
    }

    /// Lists the directory at the absolute `path`.
    pub fn list(&self, path: &str) -> Vec<DirEntry> {
        match self.parse(path) {
            Some(path) => self.engine().list(&path),
            None => Vec::new(),
        }
    }

    /// Creates directory `name` in `parent`; returns the new absolute path.
    pub fn make_dir(&self, parent: &str, name: &str) -> Result<Option<String>> {
        let Some(parent) = self.parse(parent) else {
            return Ok(None);
        };
        let created = self.engine_mut().make_dir(&parent, name)?;
        Ok(created.map(|path| self.render(&path)))
    }

    /// Removes directory `name` in `parent` recursively.
    pub fn remove_dir(&self, parent: &str, name: &str) -> Result<bool> {
        match self.parse(parent) {
            Some(parent) => self.engine_mut().remove_dir(&parent, name),
            None => Ok(false),
        }
    }

    /// Creates file `name` in `parent` if needed and stores `payload` if given.
    pub fn write_file(&self, parent: &str, name: &str, payload: Option<&str>) -> Result<Option<String>> {
        match self.parse(parent) {
            Some(parent) => self.engine_mut().write_file(&parent, name, payload),
            None => Ok(None),
        }
    }

    /// Payload of the existing file `name` in `parent`.
    pub fn read_file(&self, parent: &str, name: &str) -> Result<Option<String>> {
        match self.parse(parent) {
            Some(parent) => self.engine().read_file(&parent, name),
            None => Ok(None),
        }
    }

    pub fn delete_file(&self, parent: &str, name: &str) -> Result<bool> {
        match self.parse(parent) {
            Some(parent) => self.engine_mut().delete_file(&parent, name),
            None => Ok(false),
        }
    }

    /// Moves a file; both paths are absolute.
    pub fn move_file(&self, source: &str, destination: &str) -> Result<bool> {
        let (Some(source), Some(destination)) = (self.parse(source), self.parse(destination)) else {
            return Ok(false);
        };
        self.engine_mut().move_file(&source, &destination)
    }

    /// Wipes the namespace and sends every cursor back to the root.
    pub fn reset(&self) -> Result<()> {
        self.engine_mut().reset()
    }

    /// Every key this file system owns in the backing store.
    pub fn keys(&self) -> Result<Vec<String>> {
        self.engine().tree().keys()
    }
}
