/*!
 * Rows read from the podcast library database.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Seconds between the Unix epoch and the Core Data reference date (2001-01-01 UTC)
pub const CORE_DATA_EPOCH_OFFSET: i64 = 978_307_200;

/// Convert a Core Data timestamp to UTC
pub fn core_data_to_utc(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    DateTime::from_timestamp(CORE_DATA_EPOCH_OFFSET + seconds.trunc() as i64, 0)
}

/// Display metadata for one transcript
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeMetadata {
    pub episode_title: Option<String>,
    pub podcast_title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    /// Core Data timestamp
    pub pub_date: Option<f64>,
    /// Seconds
    pub duration: Option<f64>,
}

impl EpisodeMetadata {
    pub fn new(podcast_title: impl Into<String>, episode_title: impl Into<String>) -> Self {
        Self {
            episode_title: Some(episode_title.into()),
            podcast_title: Some(podcast_title.into()),
            ..Default::default()
        }
    }

    /// Podcast and episode titles, when both are present and non-empty
    pub fn display_titles(&self) -> Option<(&str, &str)> {
        let podcast = self.podcast_title.as_deref().filter(|t| !t.is_empty())?;
        let episode = self.episode_title.as_deref().filter(|t| !t.is_empty())?;
        Some((podcast, episode))
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.pub_date.and_then(core_data_to_utc)
    }
}

/// One episode of a show, as listed by store collection id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShowEpisode {
    /// Store track id, also used to fetch transcripts
    pub episode_id: Option<i64>,
    pub episode_title: Option<String>,
    pub pub_date: Option<f64>,
    pub duration: Option<f64>,
    pub transcript_id: Option<String>,
    pub episode_uuid: Option<String>,
}

impl ShowEpisode {
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.pub_date.and_then(core_data_to_utc)
    }
}
