//! Durable sinks for accepted documents.
//!
//! The pipeline persists through the [`DocumentStore`] trait so tests can run
//! against [`MemoryDocumentStore`] while the server writes to disk with
//! [`FsDocumentStore`]. Stores never overwrite: a name that already exists is
//! an error, and callers are expected to generate unique names.
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Errors raised by a [`DocumentStore`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("document name {0:?} is not a valid file name")]
    InvalidName(String),

    #[error("document {0:?} already exists")]
    AlreadyExists(String),

    #[error("i/o error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A byte sink that persists a document under a suggested name.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persists `bytes` and returns a location string for logs and responses.
    async fn store(&self, bytes: &[u8], suggested_name: &str) -> Result<String, StoreError>;

    /// Short label for readiness reporting, e.g. `"filesystem"`.
    fn kind(&self) -> &'static str;
}

/// Replaces characters that are unsafe in file names with `_`.
///
/// Keeps ASCII alphanumerics plus `.`, `-` and `_`. Leading dots are replaced
/// so the result can never be `.` / `..` or a hidden file.
///
/// ```rust
/// use ingest::sanitize_file_name;
///
/// assert_eq!(sanitize_file_name("2024/06/01 scan.pdf"), "2024_06_01_scan.pdf");
/// assert_eq!(sanitize_file_name("..pdf"), "__pdf");
/// ```
pub fn sanitize_file_name(name: &str) -> String {
    let mut leading = true;
    name.chars()
        .map(|c| {
            let keep = c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_');
            let out = if !keep || (leading && c == '.') { '_' } else { c };
            leading = leading && c == '.';
            out
        })
        .collect()
}

/// Writes documents into a single directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    /// Opens a store rooted at `root`, creating the directory if missing.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|source| StoreError::Io {
                path: root.clone(),
                source,
            })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn store(&self, bytes: &[u8], suggested_name: &str) -> Result<String, StoreError> {
        let name = sanitize_file_name(suggested_name);
        if name.is_empty() {
            return Err(StoreError::InvalidName(suggested_name.to_string()));
        }
        let path = self.root.join(&name);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|source| {
                if source.kind() == io::ErrorKind::AlreadyExists {
                    StoreError::AlreadyExists(name.clone())
                } else {
                    StoreError::Io {
                        path: path.clone(),
                        source,
                    }
                }
            })?;

        let io_err = |source| StoreError::Io {
            path: path.clone(),
            source,
        };
        file.write_all(bytes).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)?;

        debug!(path = %path.display(), size = bytes.len(), "document_written");
        Ok(path.display().to_string())
    }

    fn kind(&self) -> &'static str {
        "filesystem"
    }
}

/// In-memory store, mainly for tests.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the stored document, if present.
    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.lock().get(name).cloned()
    }

    /// Names of all stored documents, sorted.
    pub fn names(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        self.documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn store(&self, bytes: &[u8], suggested_name: &str) -> Result<String, StoreError> {
        let name = sanitize_file_name(suggested_name);
        if name.is_empty() {
            return Err(StoreError::InvalidName(suggested_name.to_string()));
        }
        let mut documents = self.lock();
        if documents.contains_key(&name) {
            return Err(StoreError::AlreadyExists(name));
        }
        documents.insert(name.clone(), bytes.to_vec());
        Ok(format!("memory://{name}"))
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_unsafe_characters() {
        let cases = [
            ("scan.pdf", "scan.pdf"),
            ("my scan (1).pdf", "my_scan__1_.pdf"),
            ("../etc/passwd", "___etc_passwd"),
            ("..", "__"),
            ("résumé.pdf", "r_sum_.pdf"),
            ("a.b.pdf", "a.b.pdf"),
            ("", ""),
        ];
        for (input, expected) in cases {
            assert_eq!(sanitize_file_name(input), expected, "{input}");
        }
    }

    #[tokio::test]
    async fn fs_store_writes_and_refuses_overwrite() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsDocumentStore::open(dir.path().join("received"))
            .await
            .expect("open store");
        assert!(store.root().is_dir());

        let location = store.store(b"%PDF-1.4", "scan.pdf").await.expect("store");
        assert!(location.ends_with("scan.pdf"));
        let written = std::fs::read(store.root().join("scan.pdf")).expect("read back");
        assert_eq!(written, b"%PDF-1.4");

        let err = store.store(b"%PDF-1.7", "scan.pdf").await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(name) if name == "scan.pdf"));
        let unchanged = std::fs::read(store.root().join("scan.pdf")).expect("read back");
        assert_eq!(unchanged, b"%PDF-1.4");
    }

    #[tokio::test]
    async fn fs_store_sanitizes_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsDocumentStore::open(dir.path()).await.expect("open store");
        store
            .store(b"%PDF-", "../outside.pdf")
            .await
            .expect("store");
        assert!(dir.path().join("___outside.pdf").is_file());
        assert!(!dir.path().parent().unwrap().join("outside.pdf").exists());
    }

    #[tokio::test]
    async fn empty_name_rejected() {
        let store = MemoryDocumentStore::new();
        let err = store.store(b"%PDF-", "").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidName(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryDocumentStore::new();
        let location = store.store(b"%PDF-1.4", "a b.pdf").await.unwrap();
        assert_eq!(location, "memory://a_b.pdf");
        assert_eq!(store.get("a_b.pdf").as_deref(), Some(&b"%PDF-1.4"[..]));
        assert_eq!(store.names(), vec!["a_b.pdf".to_string()]);
        assert!(store.store(b"x", "a b.pdf").await.is_err());
        assert_eq!(store.len(), 1);
    }
}
