//! Breaker store: daily circuit-breaker state persistence.

use std::path::PathBuf;
use std::sync::RwLock;

use async_trait::async_trait;

use super::StoreError;
use crate::portfolio::BreakerDocument;

/// Durable store for the day's breaker document.
///
/// Whole-document semantics; at most one writer process.
#[async_trait]
pub trait BreakerStore: Send + Sync {
    /// Load the stored document, if any exists.
    async fn load(&self) -> Result<Option<BreakerDocument>, StoreError>;

    /// Overwrite the document.
    async fn save(&self, doc: &BreakerDocument) -> Result<(), StoreError>;
}

/// JSON-file-backed breaker store.
#[derive(Debug, Clone)]
pub struct JsonBreakerStore {
    path: PathBuf,
}

impl JsonBreakerStore {
    /// Create a store backed by the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl BreakerStore for JsonBreakerStore {
    async fn load(&self) -> Result<Option<BreakerDocument>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read {
                path: self.path.display().to_string(),
                source,
            }),
        }
    }

    async fn save(&self, doc: &BreakerDocument) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(doc)?;
        tokio::fs::write(&self.path, raw)
            .await
            .map_err(|source| StoreError::Write {
                path: self.path.display().to_string(),
                source,
            })
    }
}

/// In-memory breaker store for tests.
#[derive(Debug, Default)]
pub struct InMemoryBreakerStore {
    doc: RwLock<Option<BreakerDocument>>,
}

#[async_trait]
impl BreakerStore for InMemoryBreakerStore {
    async fn load(&self) -> Result<Option<BreakerDocument>, StoreError> {
        Ok(self
            .doc
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone())
    }

    async fn save(&self, doc: &BreakerDocument) -> Result<(), StoreError> {
        let mut current = self
            .doc
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *current = Some(doc.clone());
        Ok(())
    }
}
