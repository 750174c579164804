/// Host-provided key/value persistence layer.
///
/// Every durable byte of the virtual file system goes through this trait: the
/// serialized tree snapshot under one reserved key and one key per file
/// payload. Implementations decide where the data actually lives.
pub trait KvStore {
    /// Returns the value stored under `key`, or `None` if the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>>;
    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    /// Removes `key`. Removing an absent key is not an error.
    fn delete(&mut self, key: &str) -> Result<()>;
    /// Returns every stored key that starts with `prefix`.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}

pub type Result<T> = std::result::Result<T, anyhow::Error>;

pub mod utils {
    use crate::config::PathSyntax;

    /// Case-insensitive name comparison used for every sibling lookup.
    pub fn same_name(a: &str, b: &str) -> bool {
        a == b || a.to_lowercase() == b.to_lowercase()
    }

    /// Checks a single node name: not empty, no delimiter, not a path marker.
    pub fn is_valid_name(syntax: &PathSyntax, name: &str) -> bool {
        !name.is_empty()
            && !name.contains(syntax.delimiter.as_str())
            && name != syntax.root
            && name != syntax.parent
    }

}
