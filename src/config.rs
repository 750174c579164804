//! Configuration of the path syntax and the storage namespace.

use anyhow::{Context, anyhow};
use serde::Deserialize;

use crate::core::Result;

/// Tokens that make up a path expression.
///
/// With the defaults, `"./docs/a.txt"` addresses `a.txt` inside `docs` under
/// the root, and `"../x"` means "go one level up, then into `x`".
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PathSyntax {
    pub delimiter: String,
    pub root: String,
    pub parent: String,
}

impl Default for PathSyntax {
    fn default() -> Self {
        Self {
            delimiter: "/".to_string(),
            root: ".".to_string(),
            parent: "..".to_string(),
        }
    }
}

/// Full configuration of a virtual file system instance.
///
/// * `prefix`: namespace of every key written to the store. The tree
///   snapshot is stored under exactly `prefix`, file payloads under
///   `prefix` followed by the lowercased absolute path of the file.
/// * `version`: reported by [`Cursor::version`](crate::Cursor::version).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FsConfig {
    pub syntax: PathSyntax,
    pub prefix: String,
    pub version: String,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            syntax: PathSyntax::default(),
            prefix: "fsjs".to_string(),
            version: "0.1".to_string(),
        }
    }
}

impl FsConfig {
    /// Parses a (possibly partial) JSON configuration. Missing fields take
    /// their default values. The result is validated.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: FsConfig = serde_json::from_str(json).context("malformed vfs config")?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the tokens can be told apart from each other.
    pub fn validate(&self) -> Result<()> {
        let syntax = &self.syntax;
        if syntax.delimiter.is_empty() {
            return Err(anyhow!("invalid config: empty path delimiter"));
        }
        if syntax.root.is_empty() || syntax.parent.is_empty() {
            return Err(anyhow!("invalid config: empty path marker"));
        }
        if syntax.root.contains(syntax.delimiter.as_str())
            || syntax.parent.contains(syntax.delimiter.as_str())
        {
            return Err(anyhow!("invalid config: path markers must not contain the delimiter"));
        }
        if syntax.root == syntax.parent {
            return Err(anyhow!("invalid config: root and parent markers are equal"));
        }
        if self.prefix.is_empty() {
            return Err(anyhow!("invalid config: empty key prefix"));
        }
        Ok(())
    }
}
