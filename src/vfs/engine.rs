//! Structural mutations of the tree.
//!
//! Every operation that changes the tree ends with exactly one snapshot save,
//! so each one is durable when it returns. Rejections (malformed name, missing
//! target, name conflict) are reported as `None` / `false` and leave no trace;
//! `Err` is reserved for failures of the backing store.

use tracing::debug;

use crate::config::FsConfig;
use crate::core::{Result, utils};
use crate::vfs::dir_entry::DirEntry;
use crate::vfs::entry::Node;
use crate::vfs::path::{AbsolutePath, Lookup};
use crate::vfs::tree::TreeStore;

pub struct MutationEngine {
    tree: TreeStore,
}

impl MutationEngine {
    pub fn new(tree: TreeStore) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &TreeStore {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut TreeStore {
        &mut self.tree
    }

    pub fn config(&self) -> &FsConfig {
        self.tree.config()
    }

    fn valid_name(&self, name: &str) -> bool {
        let valid = utils::is_valid_name(&self.config().syntax, name);
        if !valid {
            debug!("rejected malformed name {:?}", name);
        }
        valid
    }

    fn render(&self, path: &AbsolutePath) -> String {
        path.render(&self.config().syntax)
    }

    /// Lists the directory at `path`. Files and missing paths list as empty.
    pub fn list(&self, path: &AbsolutePath) -> Vec<DirEntry> {
        self.tree
            .lookup(path, Lookup::Any)
            .and_then(Node::contents)
            .map(|contents| {
                contents
                    .iter()
                    .map(|node| DirEntry::new(node.name(), node.entry_type()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Appends an empty directory `name` to `parent`.
    /// Returns the path of the new directory, or `None` if `name` is
    /// malformed, `parent` is not a directory, or the name is taken.
    pub fn make_dir(&mut self, parent: &AbsolutePath, name: &str) -> Result<Option<AbsolutePath>> {
        if !self.valid_name(name) {
            return Ok(None);
        }
        let Some(contents) = self.tree.directory_mut(parent) else {
            debug!("mkdir: no directory at parent");
            return Ok(None);
        };
        if contents.iter().any(|node| node.is_named(name)) {
            debug!("mkdir: {:?} already exists", name);
            return Ok(None);
        }
        contents.push(Node::dir(name));
        self.tree.save()?;

        let created = parent.join(name);
        debug!("mkdir {}", self.render(&created));
        Ok(Some(created))
    }

    /// Removes the directory `name` under `parent` with everything inside it.
    ///
    /// Every file payload of the subtree is deleted from the store first.
    /// Then the cursors sitting in the subtree are moved to `parent`, the
    /// entry is spliced out and the tree saved. A store failure while deleting
    /// payloads leaves the directory and its cursors in place.
    pub fn remove_dir(&mut self, parent: &AbsolutePath, name: &str) -> Result<bool> {
        if !self.valid_name(name) {
            return Ok(false);
        }
        let target = parent.join(name);
        let Some(node) = self.tree.lookup(&target, Lookup::DirsOnly) else {
            debug!("rmdir: no directory {}", self.render(&target));
            return Ok(false);
        };

        let mut files = Vec::new();
        collect_files(node, &target, &mut files);

        for file in &files {
            self.tree.delete_payload(file)?;
        }

        let moved = self.tree.evacuate(&target, parent);
        if moved > 0 {
            debug!("rmdir: evacuated {} cursor(s) to {}", moved, self.render(parent));
        }
        if let Some(contents) = self.tree.directory_mut(parent) {
            if let Some(index) = contents
                .iter()
                .position(|node| node.is_dir() && node.is_named(name))
            {
                contents.remove(index);
            }
        }
        self.tree.save()?;

        debug!("rmdir {} ({} file(s))", self.render(&target), files.len());
        Ok(true)
    }

    /// Creates the file `name` under `parent` if it does not exist yet, then
    /// stores `payload` if one is given. Returns the payload as re-read from
    /// the store; a file that never received a payload reads as `""`.
    ///
    /// A new file gets its payload stored before its entry is committed, so a
    /// failed payload write never leaves a listed file behind.
    ///
    /// Returns `None` if `name` is malformed, `parent` is not a directory, or
    /// a directory of that name already exists there.
    pub fn write_file(
        &mut self,
        parent: &AbsolutePath,
        name: &str,
        payload: Option<&str>,
    ) -> Result<Option<String>> {
        if !self.valid_name(name) {
            return Ok(None);
        }
        let Some(contents) = self.tree.directory_mut(parent) else {
            debug!("write: no directory at parent");
            return Ok(None);
        };
        let exists = match contents.iter().find(|node| node.is_named(name)) {
            Some(Node::Directory(_)) => {
                debug!("write: {:?} is a directory", name);
                return Ok(None);
            }
            Some(Node::File(_)) => true,
            None => false,
        };

        let file = parent.join(name);
        if let Some(payload) = payload {
            self.tree.write_payload(&file, payload)?;
            debug!("write {} ({} bytes)", self.render(&file), payload.len());
        }
        if !exists {
            if let Some(contents) = self.tree.directory_mut(parent) {
                contents.push(Node::file(name));
            }
            self.tree.save()?;
        }
        Ok(Some(self.tree.read_payload(&file)?.unwrap_or_default()))
    }

    /// Payload of an existing file, without creating anything.
    pub fn read_file(&self, parent: &AbsolutePath, name: &str) -> Result<Option<String>> {
        let file = parent.join(name);
        if !self.valid_name(name) || self.tree.lookup(&file, Lookup::Any).is_none_or(Node::is_dir) {
            return Ok(None);
        }
        Ok(Some(self.tree.read_payload(&file)?.unwrap_or_default()))
    }

    /// Deletes the file `name` under `parent`: payload first, then the entry.
    /// Cursors sitting on the file are moved to `parent`.
    pub fn delete_file(&mut self, parent: &AbsolutePath, name: &str) -> Result<bool> {
        if !self.valid_name(name) {
            return Ok(false);
        }
        let Some(index) = self.file_index(parent, name) else {
            debug!("rm: no file {:?}", name);
            return Ok(false);
        };
        let file = parent.join(name);
        self.tree.delete_payload(&file)?;
        let moved = self.tree.evacuate(&file, parent);
        if moved > 0 {
            debug!("rm: evacuated {} cursor(s) to {}", moved, self.render(parent));
        }
        if let Some(contents) = self.tree.directory_mut(parent) {
            contents.remove(index);
        }
        self.tree.save()?;

        debug!("rm {}", self.render(&file));
        Ok(true)
    }

    /// Moves a file between two absolute paths.
    ///
    /// Both parents must be directories, the source must be an existing file
    /// and the destination must not name a directory. The destination is
    /// written and committed before the source is deleted, so an interrupted
    /// move leaves two copies rather than none. Moving a file onto itself
    /// (paths equal ignoring case) only renames the entry.
    pub fn move_file(&mut self, source: &AbsolutePath, destination: &AbsolutePath) -> Result<bool> {
        let (Some((src_parent, src_name)), Some((dst_parent, dst_name))) =
            (source.split_leaf(), destination.split_leaf())
        else {
            return Ok(false);
        };
        if !self.valid_name(src_name) || !self.valid_name(dst_name) {
            return Ok(false);
        }
        if self.tree.lookup(&dst_parent, Lookup::DirsOnly).is_none() {
            debug!("mv: no directory {}", self.render(&dst_parent));
            return Ok(false);
        }
        let Some(src_index) = self.file_index(&src_parent, src_name) else {
            debug!("mv: no file {}", self.render(source));
            return Ok(false);
        };
        if self.tree.lookup(destination, Lookup::DirsOnly).is_some() {
            debug!("mv: {} is a directory", self.render(destination));
            return Ok(false);
        }

        if source.same_as(destination) {
            if let Some(contents) = self.tree.directory_mut(&src_parent) {
                contents[src_index].set_name(dst_name);
            }
            self.tree.save()?;
            debug!("mv: renamed in place to {}", self.render(destination));
            return Ok(true);
        }

        let payload = self.tree.read_payload(source)?;
        match payload.as_deref() {
            Some(payload) => {
                self.write_file(&dst_parent, dst_name, Some(payload))?;
            }
            None => {
                self.write_file(&dst_parent, dst_name, None)?;
                self.tree.delete_payload(destination)?;
            }
        }
        self.delete_file(&src_parent, src_name)?;

        debug!("mv {} -> {}", self.render(source), self.render(destination));
        Ok(true)
    }

    /// Wipes the whole namespace. See [`TreeStore::reset`].
    pub fn reset(&mut self) -> Result<()> {
        self.tree.reset()
    }

    fn file_index(&self, parent: &AbsolutePath, name: &str) -> Option<usize> {
        self.tree
            .lookup(parent, Lookup::DirsOnly)?
            .contents()?
            .iter()
            .position(|node| node.is_file() && node.is_named(name))
    }
}

/// Pre-order walk collecting the path of every file below `node`.
fn collect_files(node: &Node, path: &AbsolutePath, files: &mut Vec<AbsolutePath>) {
    for child in node.contents().unwrap_or_default() {
        let child_path = path.join(child.name());
        match child {
            Node::File(_) => files.push(child_path),
            Node::Directory(_) => collect_files(child, &child_path, files),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::core::KvStore;
    use crate::store::MapStore;
    use crate::vfs::entry::EntryType;

    fn setup_engine() -> (MapStore, MutationEngine) {
        let backend = MapStore::new();
        let mut tree = TreeStore::new(FsConfig::default(), Box::new(backend.clone())).unwrap();
        tree.load().unwrap();
        (backend, MutationEngine::new(tree))
    }

    fn path(s: &str) -> AbsolutePath {
        AbsolutePath::parse(&FsConfig::default().syntax, s).unwrap()
    }

    fn root() -> AbsolutePath {
        AbsolutePath::root()
    }

    /// Store whose payload writes and deletes fail once `broken` is set.
    /// The snapshot key keeps working.
    struct FlakyStore {
        inner: MapStore,
        broken: Rc<Cell<bool>>,
    }

    impl FlakyStore {
        fn check(&self, key: &str) -> Result<()> {
            if self.broken.get() && key != "fsjs" {
                return Err(anyhow::anyhow!("store unavailable for {:?}", key));
            }
            Ok(())
        }
    }

    impl KvStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            self.check(key)?;
            self.inner.set(key, value)
        }

        fn delete(&mut self, key: &str) -> Result<()> {
            self.check(key)?;
            self.inner.delete(key)
        }

        fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
            self.inner.keys_with_prefix(prefix)
        }
    }

    fn setup_flaky_engine() -> (Rc<Cell<bool>>, MutationEngine) {
        let broken = Rc::new(Cell::new(false));
        let store = FlakyStore {
            inner: MapStore::new(),
            broken: broken.clone(),
        };
        let mut tree = TreeStore::new(FsConfig::default(), Box::new(store)).unwrap();
        tree.load().unwrap();
        (broken, MutationEngine::new(tree))
    }

    fn names(engine: &MutationEngine, at: &str) -> Vec<String> {
        engine
            .list(&path(at))
            .iter()
            .map(|entry| entry.name().to_string())
            .collect()
    }

    mod make_dir {
        use super::*;

        #[test]
        fn test_make_dir_returns_new_path() -> Result<()> {
            let (_backend, mut engine) = setup_engine();
            let created = engine.make_dir(&root(), "docs")?;
            assert_eq!(created, Some(path("./docs")));
            assert_eq!(
                engine.list(&root()),
                [DirEntry::new("docs", EntryType::Directory)]
            );
            Ok(())
        }

        #[test]
        fn test_make_dir_nested() -> Result<()> {
            let (_backend, mut engine) = setup_engine();
            engine.make_dir(&root(), "a")?;
            let created = engine.make_dir(&path("./A"), "b")?;
            assert_eq!(created, Some(path("./A/b")));
            assert_eq!(names(&engine, "./a"), ["b"]);
            Ok(())
        }

        #[test]
        fn test_make_dir_case_insensitive_conflict() -> Result<()> {
            let (_backend, mut engine) = setup_engine();
            engine.make_dir(&root(), "docs")?;
            engine.write_file(&root(), "notes", None)?;
            assert_eq!(engine.make_dir(&root(), "Docs")?, None);
            assert_eq!(engine.make_dir(&root(), "NOTES")?, None);
            assert_eq!(names(&engine, "."), ["docs", "notes"]);
            Ok(())
        }

        #[test]
        fn test_make_dir_malformed_names() -> Result<()> {
            let (_backend, mut engine) = setup_engine();
            for name in ["", "a/b", ".", ".."] {
                assert_eq!(engine.make_dir(&root(), name)?, None, "{:?}", name);
            }
            assert!(engine.list(&root()).is_empty());
            Ok(())
        }

        #[test]
        fn test_make_dir_under_missing_or_file_parent() -> Result<()> {
            let (_backend, mut engine) = setup_engine();
            engine.write_file(&root(), "f", None)?;
            assert_eq!(engine.make_dir(&path("./missing"), "x")?, None);
            assert_eq!(engine.make_dir(&path("./f"), "x")?, None);
            Ok(())
        }

        #[test]
        fn test_make_dir_is_persisted() -> Result<()> {
            let (backend, mut engine) = setup_engine();
            engine.make_dir(&root(), "docs")?;
            let snapshot = backend.get("fsjs")?.unwrap();
            assert_eq!(
                snapshot,
                r#"{"contents":[{"type":"dir","name":"docs","contents":[]}]}"#
            );
            Ok(())
        }
    }

    mod remove_dir {
        use super::*;

        fn setup_populated() -> (MapStore, MutationEngine) {
            let (backend, mut engine) = setup_engine();
            engine.make_dir(&root(), "docs").unwrap();
            engine.make_dir(&path("./docs"), "sub").unwrap();
            engine.make_dir(&path("./docs/sub"), "deeper").unwrap();
            engine.write_file(&path("./docs"), "a.txt", Some("A")).unwrap();
            engine.write_file(&path("./docs/sub"), "b.txt", Some("B")).unwrap();
            engine.write_file(&path("./docs/sub/deeper"), "c.txt", Some("C")).unwrap();
            engine.write_file(&root(), "keep.txt", Some("K")).unwrap();
            (backend, engine)
        }

        #[test]
        fn test_remove_dir_deletes_all_payloads() -> Result<()> {
            let (backend, mut engine) = setup_populated();
            assert!(engine.remove_dir(&root(), "DOCS")?);
            assert_eq!(names(&engine, "."), ["keep.txt"]);
            assert_eq!(backend.keys_with_prefix("fsjs")?, ["fsjs", "fsjs./keep.txt"]);
            Ok(())
        }

        #[test]
        fn test_remove_dir_evacuates_to_parent() -> Result<()> {
            let (_backend, mut engine) = setup_populated();
            let tree = engine.tree_mut();
            let deep = tree.register_cursor(path("./docs/sub/deeper"));
            let exact = tree.register_cursor(path("./Docs/Sub"));
            let above = tree.register_cursor(path("./docs"));
            let elsewhere = tree.register_cursor(path("./keep.txt"));

            assert!(engine.remove_dir(&path("./docs"), "sub")?);

            let tree = engine.tree();
            assert_eq!(tree.cursor_path(deep), Some(&path("./docs")));
            assert_eq!(tree.cursor_path(exact), Some(&path("./docs")));
            assert_eq!(tree.cursor_path(above), Some(&path("./docs")));
            assert_eq!(tree.cursor_path(elsewhere), Some(&path("./keep.txt")));
            for id in [deep, exact, above, elsewhere] {
                let current = tree.cursor_path(id).unwrap();
                assert!(tree.lookup(current, Lookup::Any).is_some());
            }
            Ok(())
        }

        #[test]
        fn test_remove_dir_failure_keeps_cursors() -> Result<()> {
            let (broken, mut engine) = setup_flaky_engine();
            engine.make_dir(&root(), "docs")?;
            engine.write_file(&path("./docs"), "a.txt", Some("A"))?;
            let inside = engine.tree_mut().register_cursor(path("./docs"));

            broken.set(true);
            assert!(engine.remove_dir(&root(), "docs").is_err());
            assert_eq!(engine.tree().cursor_path(inside), Some(&path("./docs")));
            assert_eq!(names(&engine, "."), ["docs"]);

            broken.set(false);
            assert!(engine.remove_dir(&root(), "docs")?);
            assert_eq!(engine.tree().cursor_path(inside), Some(&root()));
            Ok(())
        }

        #[test]
        fn test_remove_dir_rejects_files_and_missing() -> Result<()> {
            let (backend, mut engine) = setup_populated();
            let before = backend.keys_with_prefix("fsjs")?;
            assert!(!engine.remove_dir(&root(), "keep.txt")?);
            assert!(!engine.remove_dir(&root(), "missing")?);
            assert!(!engine.remove_dir(&root(), "")?);
            assert!(!engine.remove_dir(&root(), "docs/sub")?);
            assert!(!engine.remove_dir(&path("./nowhere"), "docs")?);
            assert_eq!(backend.keys_with_prefix("fsjs")?, before);
            Ok(())
        }

        #[test]
        fn test_remove_dir_keeps_same_named_file_sibling_alone() -> Result<()> {
            let (_backend, mut engine) = setup_engine();
            engine.make_dir(&root(), "a")?;
            engine.write_file(&root(), "b", None)?;
            engine.make_dir(&root(), "c")?;
            assert!(engine.remove_dir(&root(), "c")?);
            assert_eq!(names(&engine, "."), ["a", "b"]);
            Ok(())
        }
    }

    mod list {
        use super::*;

        #[test]
        fn test_list_keeps_insertion_order_and_kinds() -> Result<()> {
            let (_backend, mut engine) = setup_engine();
            engine.write_file(&root(), "z.txt", None)?;
            engine.make_dir(&root(), "b")?;
            engine.write_file(&root(), "a.txt", None)?;
            assert_eq!(
                engine.list(&root()),
                [
                    DirEntry::new("z.txt", EntryType::File),
                    DirEntry::new("b", EntryType::Directory),
                    DirEntry::new("a.txt", EntryType::File),
                ]
            );
            Ok(())
        }

        #[test]
        fn test_list_file_or_missing_is_empty() -> Result<()> {
            let (_backend, mut engine) = setup_engine();
            engine.write_file(&root(), "a.txt", Some("x"))?;
            assert!(engine.list(&path("./a.txt")).is_empty());
            assert!(engine.list(&path("./missing")).is_empty());
            Ok(())
        }
    }

    mod write_file {
        use super::*;

        #[test]
        fn test_write_then_touch_keeps_payload() -> Result<()> {
            let (_backend, mut engine) = setup_engine();
            engine.make_dir(&root(), "docs")?;
            let docs = path("./docs");
            assert_eq!(engine.write_file(&docs, "a.txt", Some("hello"))?.as_deref(), Some("hello"));
            assert_eq!(engine.write_file(&docs, "a.txt", None)?.as_deref(), Some("hello"));
            assert_eq!(engine.write_file(&docs, "A.TXT", None)?.as_deref(), Some("hello"));
            assert_eq!(names(&engine, "./docs"), ["a.txt"]);
            Ok(())
        }

        #[test]
        fn test_touch_creates_empty_file() -> Result<()> {
            let (backend, mut engine) = setup_engine();
            assert_eq!(engine.write_file(&root(), "new.txt", None)?.as_deref(), Some(""));
            assert_eq!(engine.list(&root()), [DirEntry::new("new.txt", EntryType::File)]);
            assert_eq!(backend.get("fsjs./new.txt")?, None);
            Ok(())
        }

        #[test]
        fn test_empty_payload_round_trip() -> Result<()> {
            let (backend, mut engine) = setup_engine();
            engine.write_file(&root(), "a", Some("full"))?;
            assert_eq!(engine.write_file(&root(), "a", Some(""))?.as_deref(), Some(""));
            assert_eq!(backend.get("fsjs./a")?.as_deref(), Some(""));
            Ok(())
        }

        #[test]
        fn test_write_is_rejected() -> Result<()> {
            let (_backend, mut engine) = setup_engine();
            engine.make_dir(&root(), "docs")?;
            assert_eq!(engine.write_file(&root(), "", Some("x"))?, None);
            assert_eq!(engine.write_file(&root(), "a/b", Some("x"))?, None);
            assert_eq!(engine.write_file(&root(), "DOCS", Some("x"))?, None);
            assert_eq!(engine.write_file(&path("./missing"), "a", Some("x"))?, None);
            assert_eq!(names(&engine, "."), ["docs"]);
            Ok(())
        }

        #[test]
        fn test_failed_payload_write_leaves_no_entry() -> Result<()> {
            let (broken, mut engine) = setup_flaky_engine();
            broken.set(true);
            assert!(engine.write_file(&root(), "a.txt", Some("x")).is_err());
            assert!(engine.list(&root()).is_empty());

            broken.set(false);
            assert_eq!(engine.write_file(&root(), "a.txt", Some("x"))?.as_deref(), Some("x"));
            assert_eq!(names(&engine, "."), ["a.txt"]);
            Ok(())
        }

        #[test]
        fn test_read_file_does_not_create() -> Result<()> {
            let (_backend, mut engine) = setup_engine();
            engine.make_dir(&root(), "docs")?;
            engine.write_file(&root(), "a", Some("x"))?;
            assert_eq!(engine.read_file(&root(), "A")?.as_deref(), Some("x"));
            assert_eq!(engine.read_file(&root(), "b")?, None);
            assert_eq!(engine.read_file(&root(), "docs")?, None);
            assert_eq!(names(&engine, "."), ["docs", "a"]);
            Ok(())
        }
    }

    mod delete_file {
        use super::*;

        #[test]
        fn test_delete_file() -> Result<()> {
            let (backend, mut engine) = setup_engine();
            engine.write_file(&root(), "a.txt", Some("x"))?;
            assert!(engine.delete_file(&root(), "A.txt")?);
            assert!(engine.list(&root()).is_empty());
            assert_eq!(backend.keys_with_prefix("fsjs")?, ["fsjs"]);
            assert!(!engine.delete_file(&root(), "a.txt")?);
            Ok(())
        }

        #[test]
        fn test_delete_file_evacuates_cursors() -> Result<()> {
            let (_backend, mut engine) = setup_engine();
            engine.make_dir(&root(), "docs")?;
            engine.write_file(&path("./docs"), "a.txt", Some("x"))?;
            engine.write_file(&path("./docs"), "b.txt", Some("y"))?;
            let on_file = engine.tree_mut().register_cursor(path("./docs/A.TXT"));
            let on_sibling = engine.tree_mut().register_cursor(path("./docs/b.txt"));

            assert!(engine.delete_file(&path("./docs"), "a.txt")?);
            let tree = engine.tree();
            assert_eq!(tree.cursor_path(on_file), Some(&path("./docs")));
            assert_eq!(tree.cursor_path(on_sibling), Some(&path("./docs/b.txt")));
            Ok(())
        }

        #[test]
        fn test_delete_file_ignores_directories() -> Result<()> {
            let (_backend, mut engine) = setup_engine();
            engine.make_dir(&root(), "docs")?;
            assert!(!engine.delete_file(&root(), "docs")?);
            assert!(!engine.delete_file(&root(), "")?);
            assert_eq!(names(&engine, "."), ["docs"]);
            Ok(())
        }
    }

    mod move_file {
        use super::*;

        #[test]
        fn test_move_between_directories() -> Result<()> {
            let (backend, mut engine) = setup_engine();
            engine.make_dir(&root(), "docs")?;
            engine.write_file(&path("./docs"), "a.txt", Some("hello"))?;

            assert!(engine.move_file(&path("./docs/a.txt"), &path("./b.txt"))?);
            assert!(engine.list(&path("./docs")).is_empty());
            assert_eq!(names(&engine, "."), ["docs", "b.txt"]);
            assert_eq!(engine.read_file(&root(), "b.txt")?.as_deref(), Some("hello"));
            assert_eq!(backend.get("fsjs./docs/a.txt")?, None);
            Ok(())
        }

        #[test]
        fn test_move_evacuates_cursors_on_source() -> Result<()> {
            let (_backend, mut engine) = setup_engine();
            engine.make_dir(&root(), "docs")?;
            engine.write_file(&path("./docs"), "b.txt", Some("x"))?;
            let on_source = engine.tree_mut().register_cursor(path("./docs/b.txt"));

            assert!(engine.move_file(&path("./docs/b.txt"), &path("./c.txt"))?);
            let current = engine.tree().cursor_path(on_source).cloned();
            assert_eq!(current, Some(path("./docs")));
            assert!(engine.tree().lookup(&path("./docs"), Lookup::Any).is_some());
            Ok(())
        }

        #[test]
        fn test_move_overwrites_existing_destination() -> Result<()> {
            let (_backend, mut engine) = setup_engine();
            engine.write_file(&root(), "a", Some("new"))?;
            engine.write_file(&root(), "b", Some("old"))?;
            assert!(engine.move_file(&path("./a"), &path("./b"))?);
            assert_eq!(names(&engine, "."), ["b"]);
            assert_eq!(engine.read_file(&root(), "b")?.as_deref(), Some("new"));
            Ok(())
        }

        #[test]
        fn test_move_file_without_payload_clears_destination() -> Result<()> {
            let (backend, mut engine) = setup_engine();
            engine.write_file(&root(), "empty", None)?;
            engine.write_file(&root(), "full", Some("data"))?;
            assert!(engine.move_file(&path("./empty"), &path("./full"))?);
            assert_eq!(backend.get("fsjs./full")?, None);
            assert_eq!(engine.read_file(&root(), "full")?.as_deref(), Some(""));
            Ok(())
        }

        #[test]
        fn test_move_onto_itself_renames() -> Result<()> {
            let (_backend, mut engine) = setup_engine();
            engine.write_file(&root(), "readme", Some("text"))?;
            assert!(engine.move_file(&path("./readme"), &path("./README"))?);
            assert_eq!(names(&engine, "."), ["README"]);
            assert_eq!(engine.read_file(&root(), "readme")?.as_deref(), Some("text"));
            Ok(())
        }

        #[test]
        fn test_move_rejections() -> Result<()> {
            let (backend, mut engine) = setup_engine();
            engine.make_dir(&root(), "docs")?;
            engine.write_file(&root(), "a", Some("x"))?;
            let before = backend.keys_with_prefix("fsjs")?;

            assert!(!engine.move_file(&path("./missing"), &path("./b"))?);
            assert!(!engine.move_file(&path("./docs"), &path("./b"))?);
            assert!(!engine.move_file(&path("./a"), &path("./nowhere/b"))?);
            assert!(!engine.move_file(&path("./a"), &path("./a/b"))?);
            assert!(!engine.move_file(&path("./a"), &path("./docs/"))?);
            assert!(!engine.move_file(&path("./a"), &path("./DOCS"))?);
            assert!(!engine.move_file(&root(), &path("./b"))?);
            assert!(!engine.move_file(&path("./a"), &root())?);

            assert_eq!(backend.keys_with_prefix("fsjs")?, before);
            assert_eq!(names(&engine, "."), ["docs", "a"]);
            Ok(())
        }
    }
}
