//! Position store: whole-document read/overwrite persistence.

use std::path::PathBuf;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::StoreError;
use crate::models::TrackedPosition;

/// The durable position document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionDocument {
    /// Tracked positions, open and closed.
    pub positions: Vec<TrackedPosition>,
    /// Symbols on the watchlist.
    pub watchlist: Vec<String>,
}

impl PositionDocument {
    /// Open positions only.
    #[must_use]
    pub fn open_positions(&self) -> Vec<&TrackedPosition> {
        self.positions
            .iter()
            .filter(|p| p.status == crate::models::PositionStatus::Open)
            .collect()
    }
}

/// Durable store for the position document.
///
/// Whole-document semantics only; the engine reads, modifies and
/// overwrites. Assumes at most one writer process.
#[async_trait]
pub trait PositionStore: Send + Sync {
    /// Load the document. A missing backing file yields the default
    /// (empty) document.
    async fn load(&self) -> Result<PositionDocument, StoreError>;

    /// Overwrite the document.
    async fn save(&self, doc: &PositionDocument) -> Result<(), StoreError>;
}

/// JSON-file-backed position store.
#[derive(Debug, Clone)]
pub struct JsonPositionStore {
    path: PathBuf,
}

impl JsonPositionStore {
    /// Create a store backed by the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PositionStore for JsonPositionStore {
    async fn load(&self) -> Result<PositionDocument, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(PositionDocument::default())
            }
            Err(source) => Err(StoreError::Read {
                path: self.path.display().to_string(),
                source,
            }),
        }
    }

    async fn save(&self, doc: &PositionDocument) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(doc)?;
        tokio::fs::write(&self.path, raw)
            .await
            .map_err(|source| StoreError::Write {
                path: self.path.display().to_string(),
                source,
            })
    }
}

/// In-memory position store for tests.
#[derive(Debug, Default)]
pub struct InMemoryPositionStore {
    doc: RwLock<PositionDocument>,
}

#[async_trait]
impl PositionStore for InMemoryPositionStore {
    async fn load(&self) -> Result<PositionDocument, StoreError> {
        Ok(self
            .doc
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone())
    }

    async fn save(&self, doc: &PositionDocument) -> Result<(), StoreError> {
        let mut current = self
            .doc
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *current = doc.clone();
        Ok(())
    }
}
