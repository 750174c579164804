//! A virtual, hierarchical file system that lives entirely inside a key/value store.
//!
//! ### Overview
//!
//! `kv-vfs` keeps a tree of named directories and files in any storage that can get, set,
//! delete and prefix-scan string keys (the [`KvStore`] trait). The tree itself is persisted as
//! one JSON snapshot; every file payload lives under its own key derived from the file's path.
//! Any number of [`Cursor`]s can be opened on the same [`Vfs`], each with its own current
//! directory.
//!
//! **Key ideas**:
//! - **Path expressions**: `"."` is the root, `".."` goes one level up, `"/"` separates names
//!   (all three are configurable through [`FsConfig`]). Names match case-insensitively.
//! - **Forgiving navigation**: `cd` to a path that does not exist leaves the cursor in place.
//! - **Consistent cursors**: removing a directory moves every cursor inside it to the removed
//!   directory's parent; a full reset moves every cursor to the root.
//! - **Durability**: each mutation is committed to the store before it returns.
//! - **Sentinel results**: rejected operations return `None` or `false`; `Err` only ever comes
//!   from the store.

mod config;
mod core;
mod store;
mod vfs;

pub use config::{FsConfig, PathSyntax};
pub use crate::core::{KvStore, Result};
pub use store::{DirStore, MapStore};
pub use vfs::{
    AbsolutePath, Cursor, CursorId, DirEntry, Directory, EntryType, FileNode, Lookup,
    MutationEngine, Node, TreeStore, Vfs, normalize, resolve, resolve_mut,
};
