mod cursor;
mod dir_entry;
mod engine;
mod entry;
mod handle;
mod path;
mod tree;

pub use cursor::Cursor;
pub use dir_entry::DirEntry;
pub use engine::MutationEngine;
pub use entry::{Directory, EntryType, FileNode, Node};
pub use handle::Vfs;
pub use path::{AbsolutePath, Lookup, normalize, resolve, resolve_mut};
pub use tree::{CursorId, TreeStore};
