//! File-backed prompt templates with a read-through cache.
//!
//! Templates live as `<name>.j2` files in one directory. Loaded text is kept
//! in memory until `invalidate`/`clear` is called.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

const TEMPLATE_EXTENSION: &str = "j2";

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt not found: {0}")]
    NotFound(String),

    #[error("Failed to read prompt '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Template render error: {0}")]
    Render(String),
}

pub struct PromptStore {
    dir: PathBuf,
    cache: RwLock<HashMap<String, Arc<str>>>,
}

impl PromptStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Sorted template names (file stems). A missing directory yields none.
    pub async fn list(&self) -> Result<Vec<String>, PromptError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(PromptError::Io {
                    name: self.dir.display().to_string(),
                    source,
                })
            }
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|source| PromptError::Io {
            name: self.dir.display().to_string(),
            source,
        })? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Returns the template text for `name`, reading it from disk on first use.
    pub async fn load(&self, name: &str) -> Result<Arc<str>, PromptError> {
        let key = sanitize_name(name);

        if let Some(cached) = self.cache.read().await.get(&key) {
            return Ok(Arc::clone(cached));
        }

        let path = self.dir.join(format!("{key}.{TEMPLATE_EXTENSION}"));
        if key.is_empty() || !tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_file()) {
            return Err(PromptError::NotFound(name.to_string()));
        }

        let text: Arc<str> = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| PromptError::Io {
                name: name.to_string(),
                source,
            })?
            .into();

        debug!("Loaded prompt template '{}' from {}", key, path.display());
        self.cache.write().await.insert(key, Arc::clone(&text));
        Ok(text)
    }

    /// Drops the cached text for `name`; the next `load` re-reads the file.
    pub async fn invalidate(&self, name: &str) {
        self.cache.write().await.remove(&sanitize_name(name));
    }

    pub async fn clear(&self) {
        self.cache.write().await.clear();
    }
}

/// Strips path traversal from a user-supplied template name. This is the key
/// templates are cached and logged under.
pub fn sanitize_name(name: &str) -> String {
    name.replace("..", "").replace(['/', '\\'], "")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_template(dir: &Path, name: &str, body: &str) {
        std::fs::write(dir.join(format!("{name}.j2")), body).unwrap();
    }

    #[test]
    fn test_sanitize_strips_traversal() {
        assert_eq!(sanitize_name("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_name("alert_analysis_prompt"), "alert_analysis_prompt");
        assert_eq!(sanitize_name("a\\b"), "ab");
    }

    #[tokio::test]
    async fn test_list_sorted_j2_stems_only() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), "zeta", "z");
        write_template(dir.path(), "alpha", "a");
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let store = PromptStore::new(dir.path());
        assert_eq!(store.list().await.unwrap(), vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn test_list_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = PromptStore::new(dir.path().join("missing"));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = PromptStore::new(dir.path());
        assert!(matches!(
            store.load("nope").await,
            Err(PromptError::NotFound(name)) if name == "nope"
        ));
    }

    #[tokio::test]
    async fn test_load_is_cached_until_invalidated() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), "alert", "v1");
        let store = PromptStore::new(dir.path());

        assert_eq!(&*store.load("alert").await.unwrap(), "v1");

        write_template(dir.path(), "alert", "v2");
        assert_eq!(&*store.load("alert").await.unwrap(), "v1");

        store.invalidate("alert").await;
        assert_eq!(&*store.load("alert").await.unwrap(), "v2");

        write_template(dir.path(), "alert", "v3");
        store.clear().await;
        assert_eq!(&*store.load("alert").await.unwrap(), "v3");
    }

    #[tokio::test]
    async fn test_load_traversal_cannot_escape_dir() {
        let root = tempfile::tempdir().unwrap();
        let prompts = root.path().join("prompts");
        std::fs::create_dir(&prompts).unwrap();
        write_template(root.path(), "secret", "outside");

        let store = PromptStore::new(&prompts);
        assert!(matches!(
            store.load("../secret").await,
            Err(PromptError::NotFound(_))
        ));
    }
}
