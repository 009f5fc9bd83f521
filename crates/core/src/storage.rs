//! File-backed key-value store holding whole JSON documents.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

use crate::config::AppConfig;

/// Local persistent store: one file per key under a root directory.
///
/// Every write replaces the stored document in full. Concurrent writers are
/// not coordinated, the last rename wins.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Create a store rooted at the provided directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at the configured storage directory.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.storage_root.clone())
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read the raw value for `key`, returning `None` if it was never written.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    /// Overwrite the value stored under `key`.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create {}", self.root.display()))?;

        let path = self.path_for(key);
        let mut tmp = NamedTempFile::new_in(&self.root)
            .with_context(|| format!("failed to stage write for {}", path.display()))?;
        tmp.write_all(value.as_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?;
        tmp.persist(&path)
            .with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_key(key)))
    }
}

fn sanitize_key(input: &str) -> String {
    let result: String = input
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_'))
        .collect();
    if result.is_empty() {
        "value".to_string()
    } else {
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn get_returns_none_for_unknown_key() -> Result<()> {
        let dir = tempdir()?;
        let store = LocalStore::new(dir.path().join("missing"));
        assert_eq!(store.get("anything")?, None);
        Ok(())
    }

    #[test]
    fn set_replaces_previous_value() -> Result<()> {
        let dir = tempdir()?;
        let store = LocalStore::new(dir.path().join("store"));

        store.set("board", "[1,2,3]")?;
        assert_eq!(store.get("board")?.as_deref(), Some("[1,2,3]"));

        store.set("board", "[]")?;
        assert_eq!(store.get("board")?.as_deref(), Some("[]"));

        let files: Vec<_> = fs::read_dir(store.root())?.collect();
        assert_eq!(files.len(), 1, "temporary files must not linger");
        Ok(())
    }

    #[test]
    fn keys_map_to_safe_file_names() {
        assert_eq!(sanitize_key("excel_cherry_leaderboard"), "excel_cherry_leaderboard");
        assert_eq!(sanitize_key("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_key("///"), "value");
    }
}
