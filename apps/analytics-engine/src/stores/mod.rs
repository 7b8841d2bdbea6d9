//! Durable stores and the injectable clock.
//!
//! Both stores are explicit, constructor-injected objects with whole-
//! document read/overwrite semantics; tests substitute the in-memory
//! implementations and a manual clock.

mod breaker;
mod clock;
mod position;

use thiserror::Error;

pub use breaker::{BreakerStore, InMemoryBreakerStore, JsonBreakerStore};
pub use clock::{Clock, ManualClock, SystemClock};
pub use position::{InMemoryPositionStore, JsonPositionStore, PositionDocument, PositionStore};

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to read the backing file.
    #[error("failed to read store at {path}: {source}")]
    Read {
        /// Store path.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Failed to write the backing file.
    #[error("failed to write store at {path}: {source}")]
    Write {
        /// Store path.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Document (de)serialization failed.
    #[error("store document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
