/*!
 * Repository layer for metadata queries.
 *
 * Wraps the SQL against the podcast library tables and maps rows to
 * the types in `models`.
 */

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use super::connection::DatabaseConnection;
use super::models::{EpisodeMetadata, ShowEpisode};
use super::MetadataLookup;

const EPISODE_METADATA_QUERY: &str = r#"
    SELECT
        e.ZTITLE AS episode_title,
        e.ZPUBDATE,
        e.ZDURATION,
        p.ZTITLE AS podcast_title,
        p.ZAUTHOR,
        p.ZCATEGORY
    FROM ZMTEPISODE e
    JOIN ZMTPODCAST p ON e.ZPODCASTUUID = p.ZUUID
    WHERE e.ZTRANSCRIPTIDENTIFIER = ?1
"#;

const SHOW_EPISODES_QUERY: &str = r#"
    SELECT
        e.ZSTORETRACKID AS episode_id,
        e.ZTITLE AS episode_title,
        e.ZPUBDATE AS pub_date,
        e.ZDURATION AS duration,
        e.ZTRANSCRIPTIDENTIFIER AS transcript_id,
        e.ZUUID AS episode_uuid
    FROM ZMTEPISODE e
    JOIN ZMTPODCAST p ON e.ZPODCAST = p.Z_PK
    WHERE p.ZSTORECOLLECTIONID = ?1
    ORDER BY e.ZPUBDATE DESC
"#;

/// Repository for metadata lookups
#[derive(Clone)]
pub struct MetadataRepository {
    /// Database connection
    db: DatabaseConnection,
}

impl MetadataRepository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Open the library database read-only and check its tables
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db = DatabaseConnection::open_read_only(db_path)?;
        db.verify_tables()?;
        Ok(Self::new(db))
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Look up display metadata by transcript identifier
    pub async fn lookup_metadata(&self, identifier: &str) -> Result<Option<EpisodeMetadata>> {
        let identifier = identifier.to_string();

        self.db
            .execute_async(move |conn| Self::lookup_metadata_sync(conn, &identifier))
            .await
    }

    /// Synchronous form of [`MetadataRepository::lookup_metadata`]
    pub fn lookup_metadata_sync(conn: &Connection, identifier: &str) -> Result<Option<EpisodeMetadata>> {
        let result = conn
            .query_row(EPISODE_METADATA_QUERY, [identifier], |row| {
                Ok(EpisodeMetadata {
                    episode_title: row.get(0)?,
                    pub_date: row.get(1)?,
                    duration: row.get(2)?,
                    podcast_title: row.get(3)?,
                    author: row.get(4)?,
                    category: row.get(5)?,
                })
            })
            .optional()?;

        debug!(
            "Metadata for {}: {}",
            identifier,
            if result.is_some() { "found" } else { "not found" }
        );
        Ok(result)
    }

    /// All episodes of a show, newest first
    pub async fn episodes_for_show(&self, store_collection_id: i64) -> Result<Vec<ShowEpisode>> {
        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(SHOW_EPISODES_QUERY)?;
                let episodes = stmt
                    .query_map([store_collection_id], |row| {
                        Ok(ShowEpisode {
                            episode_id: row.get(0)?,
                            episode_title: row.get(1)?,
                            pub_date: row.get(2)?,
                            duration: row.get(3)?,
                            transcript_id: row.get(4)?,
                            episode_uuid: row.get(5)?,
                        })
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;

                Ok(episodes)
            })
            .await
    }
}

#[async_trait]
impl MetadataLookup for MetadataRepository {
    async fn lookup_metadata(&self, identifier: &str) -> Result<Option<EpisodeMetadata>> {
        MetadataRepository::lookup_metadata(self, identifier).await
    }
}
