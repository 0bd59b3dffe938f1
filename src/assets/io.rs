use std::future::Future;
#[cfg(not(target_arch = "wasm32"))]
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::errors::Result;

/// Document reader trait.
/// Reads entity documents by relative uri, asynchronously.
pub trait DocumentReader: Send + Sync {
    fn read_to_string(&self, uri: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Reads documents from a directory on disk.
#[cfg(not(target_arch = "wasm32"))]
pub struct FileDocumentReader {
    root_path: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileDocumentReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let root_path = if path.is_file() {
            path.parent().unwrap_or(Path::new(".")).to_path_buf()
        } else {
            path.to_path_buf()
        };
        Self { root_path }
    }

    #[inline]
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl DocumentReader for FileDocumentReader {
    async fn read_to_string(&self, uri: &str) -> Result<String> {
        let path = self.root_path.join(uri);
        log::debug!("Reading document {}", path.display());
        let text = tokio::fs::read_to_string(&path).await?;
        Ok(text)
    }
}

/// In-memory document store, for bundled or generated documents.
#[derive(Default)]
pub struct MemoryDocumentReader {
    documents: RwLock<FxHashMap<String, String>>,
}

impl MemoryDocumentReader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, uri: impl Into<String>, text: impl Into<String>) {
        self.documents.write().insert(uri.into(), text.into());
    }

    #[must_use]
    pub fn contains(&self, uri: &str) -> bool {
        self.documents.read().contains_key(uri)
    }
}

impl DocumentReader for MemoryDocumentReader {
    async fn read_to_string(&self, uri: &str) -> Result<String> {
        self.documents.read().get(uri).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no document at \"{uri}\""),
            )
            .into()
        })
    }
}
