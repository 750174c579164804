use std::fmt;

use crate::core::Result;
use crate::vfs::dir_entry::DirEntry;
use crate::vfs::handle::Vfs;
use crate::vfs::path::{self, AbsolutePath};
use crate::vfs::tree::CursorId;

/// A working-directory handle into a [`Vfs`].
///
/// The cursor's current path is kept in the tree's cursor registry, not in
/// the cursor itself, so that removing a directory (or resetting the whole
/// system) through any handle can move every affected cursor to a path that
/// still exists. Names passed to the cursor operations are resolved in the
/// current directory.
///
/// ### Example
///
/// ```
/// use kv_vfs::{MapStore, Vfs};
///
/// let fs = Vfs::new(MapStore::new()).unwrap();
/// let mut cursor = fs.cursor();
/// cursor.mkdir("docs").unwrap();
/// assert_eq!(cursor.cd("docs"), "./docs");
/// assert_eq!(cursor.write("a.txt", Some("hello")).unwrap().as_deref(), Some("hello"));
///
/// let other = fs.cursor();
/// assert!(other.rmdir("docs").unwrap());
/// assert_eq!(cursor.current_path(), ".");
/// ```
pub struct Cursor {
    vfs: Vfs,
    id: CursorId,
}

impl Cursor {
    /// Registers a new cursor at the root of `vfs`.
    pub fn new(vfs: &Vfs) -> Self {
        let id = vfs
            .engine_mut()
            .tree_mut()
            .register_cursor(AbsolutePath::root());
        Self {
            vfs: vfs.clone(),
            id,
        }
    }

    /// Registers a new cursor and moves it to `expr`, if `expr` exists.
    pub fn open(vfs: &Vfs, expr: &str) -> Self {
        let mut cursor = Self::new(vfs);
        cursor.cd(expr);
        cursor
    }

    fn current(&self) -> AbsolutePath {
        self.vfs
            .engine()
            .tree()
            .cursor_path(self.id)
            .cloned()
            .unwrap_or_default()
    }

    /// Current directory in canonical form, e.g. `"./docs"`.
    pub fn current_path(&self) -> String {
        self.current().render(&self.vfs.engine().config().syntax)
    }

    /// Changes the current directory to `expr` (relative, or absolute when it
    /// starts with the root marker). A target that does not exist leaves the
    /// cursor where it was. Returns the current path after the change.
    pub fn cd(&mut self, expr: &str) -> String {
        let current = self.current();
        let target = {
            let engine = self.vfs.engine();
            path::normalize(&engine.config().syntax, engine.tree().root(), &current, expr)
        };
        if target != current {
            self.vfs
                .engine_mut()
                .tree_mut()
                .set_cursor_path(self.id, target);
        }
        self.current_path()
    }

    /// Lists the current directory.
    pub fn ls(&self) -> Vec<DirEntry> {
        self.vfs.engine().list(&self.current())
    }

    /// Creates a directory; returns its absolute path, or `None` if rejected.
    pub fn mkdir(&self, name: &str) -> Result<Option<String>> {
        let current = self.current();
        let created = self.vfs.engine_mut().make_dir(&current, name)?;
        let engine = self.vfs.engine();
        Ok(created.map(|path| path.render(&engine.config().syntax)))
    }

    /// Removes a directory and everything inside it.
    pub fn rmdir(&self, name: &str) -> Result<bool> {
        let current = self.current();
        self.vfs.engine_mut().remove_dir(&current, name)
    }

    /// Creates the file if needed, stores `payload` if given, and returns the
    /// stored payload.
    pub fn write(&self, name: &str, payload: Option<&str>) -> Result<Option<String>> {
        let current = self.current();
        self.vfs.engine_mut().write_file(&current, name, payload)
    }

    /// Creates the file if needed without changing its payload.
    pub fn touch(&self, name: &str) -> Result<Option<String>> {
        self.write(name, None)
    }

    /// Payload of an existing file; `None` if there is no such file.
    pub fn read(&self, name: &str) -> Result<Option<String>> {
        self.vfs.engine().read_file(&self.current(), name)
    }

    /// Deletes a file.
    pub fn rm(&self, name: &str) -> Result<bool> {
        let current = self.current();
        self.vfs.engine_mut().delete_file(&current, name)
    }

    /// Moves a file. Both paths are absolute; the current directory is not used.
    pub fn mv(&self, source: &str, destination: &str) -> Result<bool> {
        self.vfs.move_file(source, destination)
    }

    /// Wipes the whole file system. Every cursor ends up at the root.
    pub fn format(&self) -> Result<()> {
        self.vfs.reset()
    }

    pub fn version(&self) -> String {
        self.vfs.version()
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.current_path())
    }
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("id", &self.id)
            .field("path", &self.current_path())
            .finish()
    }
}

impl Drop for Cursor {
    fn drop(&mut self) {
        if let Ok(mut engine) = self.vfs.try_engine_mut() {
            engine.tree_mut().release_cursor(self.id);
        }
    }
}
