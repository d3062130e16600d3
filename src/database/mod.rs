/*!
 * Read-only access to the podcast library database.
 *
 * The database maps transcript identifiers to episode and show metadata,
 * which the batch driver uses to name output files.
 */

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

pub mod connection;
pub mod repository;
pub mod models;

// Re-export main types
pub use connection::DatabaseConnection;
pub use models::{EpisodeMetadata, ShowEpisode};
pub use repository::MetadataRepository;

/// Source of display metadata, keyed by transcript identifier
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    /// `Ok(None)` when the identifier is unknown
    async fn lookup_metadata(&self, identifier: &str) -> Result<Option<EpisodeMetadata>>;
}

/// Fixed in-memory lookup, also used when no database is configured
#[async_trait]
impl MetadataLookup for HashMap<String, EpisodeMetadata> {
    async fn lookup_metadata(&self, identifier: &str) -> Result<Option<EpisodeMetadata>> {
        Ok(self.get(identifier).cloned())
    }
}
