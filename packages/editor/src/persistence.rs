//! # Persistence Gateway
//!
//! Loads and saves whole page documents by page id. The editor never talks
//! to storage directly; it goes through [`PersistenceGateway`].
//!
//! Two backends ship with the crate:
//! - [`MemoryGateway`]: `HashMap`-backed, for tests and previews. Can be told
//!   to fail or slow down saves.
//! - [`FileGateway`]: one pretty-printed `{page_id}.json` per page.

use async_trait::async_trait;
use pagebuilder_model::{PageDocument, PageId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PersistenceError {
    #[error("Page not found: {0}")]
    NotFound(PageId),

    /// Transient failure; the same save may succeed later
    #[error("Storage unavailable: {0}")]
    Retryable(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Page id that cannot be stored as a file name
    #[error("Invalid page id: {0:?}")]
    InvalidPageId(PageId),
}

impl PersistenceError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, PersistenceError::Retryable(_))
    }
}

/// Storage backend for page documents
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Load a page. Fails with `NotFound` if the page does not exist.
    async fn load(&self, page_id: &PageId) -> Result<PageDocument, PersistenceError>;

    /// Replace the stored document for a page.
    async fn save(&self, page_id: &PageId, doc: &PageDocument) -> Result<(), PersistenceError>;
}

/// In-memory page storage
#[derive(Debug, Default)]
pub struct MemoryGateway {
    pages: RwLock<HashMap<PageId, PageDocument>>,
    fail_saves: AtomicBool,
    save_delay: Option<Duration>,
    saves: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every save sleep for `delay` before completing
    pub fn with_save_delay(mut self, delay: Duration) -> Self {
        self.save_delay = Some(delay);
        self
    }

    pub async fn insert(&self, page_id: PageId, doc: PageDocument) {
        self.pages.write().await.insert(page_id, doc);
    }

    pub async fn get(&self, page_id: &PageId) -> Option<PageDocument> {
        self.pages.read().await.get(page_id).cloned()
    }

    /// Make subsequent saves fail with a retryable error
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of saves that reached storage
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Highest number of saves ever running at the same time
    pub fn max_concurrent_saves(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn load(&self, page_id: &PageId) -> Result<PageDocument, PersistenceError> {
        self.get(page_id)
            .await
            .ok_or_else(|| PersistenceError::NotFound(page_id.clone()))
    }

    async fn save(&self, page_id: &PageId, doc: &PageDocument) -> Result<(), PersistenceError> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        if let Some(delay) = self.save_delay {
            tokio::time::sleep(delay).await;
        }

        let result = if self.fail_saves.load(Ordering::SeqCst) {
            Err(PersistenceError::Retryable("memory gateway set to fail".to_string()))
        } else {
            self.pages.write().await.insert(page_id.clone(), doc.clone());
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Page storage as JSON files in a directory
#[derive(Debug, Clone)]
pub struct FileGateway {
    root: PathBuf,
}

impl FileGateway {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path for a page. Page ids must be non-empty and use only
    /// `[A-Za-z0-9_-]`, so every id maps to its own file.
    pub fn path_for(&self, page_id: &PageId) -> Result<PathBuf, PersistenceError> {
        let id = page_id.as_str();
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if !valid {
            return Err(PersistenceError::InvalidPageId(page_id.clone()));
        }
        Ok(self.root.join(format!("{}.json", id)))
    }
}

#[async_trait]
impl PersistenceGateway for FileGateway {
    #[instrument(skip(self), fields(page = %page_id))]
    async fn load(&self, page_id: &PageId) -> Result<PageDocument, PersistenceError> {
        let path = self.path_for(page_id)?;

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PersistenceError::NotFound(page_id.clone()));
            }
            Err(e) => return Err(PersistenceError::Retryable(e.to_string())),
        };

        let doc: PageDocument = serde_json::from_str(&content)
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;

        info!(path = %path.display(), sections = doc.section_count(), "Loaded page");
        Ok(doc)
    }

    #[instrument(skip(self, doc), fields(page = %page_id))]
    async fn save(&self, page_id: &PageId, doc: &PageDocument) -> Result<(), PersistenceError> {
        let path = self.path_for(page_id)?;
        let json = serde_json::to_string_pretty(doc)
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| PersistenceError::Retryable(e.to_string()))?;

        // Write then rename so readers never see a half-written page
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| PersistenceError::Retryable(e.to_string()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| PersistenceError::Retryable(e.to_string()))?;

        debug!(path = %path.display(), "Wrote page");
        Ok(())
    }
}
