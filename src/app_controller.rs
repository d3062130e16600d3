use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::collections::HashMap;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::batch::{self, BatchOptions, BatchProcessor, BatchSummary};
use crate::database::{EpisodeMetadata, MetadataLookup, MetadataRepository, ShowEpisode};
use crate::fetcher::TranscriptFetcher;
use crate::ttml::TranscriptOptions;

// @module: Application controller for transcript extraction

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Convert one TTML file into a transcript file
    pub fn convert_file(&self, input: &Path, output: &Path) -> Result<usize> {
        let options = TranscriptOptions::with_timestamps(self.config.include_timestamps);
        let lines = batch::convert_document(input, output, options)
            .with_context(|| format!("Failed to convert {:?}", input))?;

        info!("Transcript saved to {:?}", output);
        Ok(lines)
    }

    /// Convert the whole TTML cache into the output directory.
    ///
    /// With `use_metadata` the library database must exist; without it every
    /// transcript is named after its content id.
    pub async fn run_batch(&self, use_metadata: bool) -> Result<BatchSummary> {
        info!("Searching for TTML files...");
        let sources = batch::discover_sources(&self.config.ttml_dir, &self.config.identifier_prefix)?;
        info!("Found {} TTML files", sources.len());

        let repository;
        let no_metadata: HashMap<String, EpisodeMetadata> = HashMap::new();
        let lookup: &dyn MetadataLookup = if use_metadata {
            info!("Connecting to podcast library database...");
            repository = MetadataRepository::open(&self.config.database_path)
                .context("Please ensure the Podcasts app has been used and the database exists")?;
            &repository
        } else {
            warn!("Metadata lookup disabled, naming transcripts by content id");
            &no_metadata
        };

        let mut processor = BatchProcessor::new(lookup, BatchOptions::from(&self.config));
        if Self::show_progress() {
            processor = processor.with_progress(Self::create_progress_bar());
        }

        processor.run(sources).await
    }

    /// Download the TTML transcript of one episode
    pub async fn fetch(&self, episode_id: u64, output: Option<&Path>) -> Result<PathBuf> {
        let fetcher = TranscriptFetcher::new(self.config.fetch.clone());
        fetcher.fetch_transcript(episode_id, output).await
    }

    /// Episodes of a show from the library database, newest first
    pub async fn list_episodes(&self, store_collection_id: i64) -> Result<Vec<ShowEpisode>> {
        let repository = MetadataRepository::open(&self.config.database_path)?;
        repository.episodes_for_show(store_collection_id).await
    }

    /// One line per episode: date, store id, title and transcript id
    pub fn format_episode(episode: &ShowEpisode) -> String {
        let date = episode
            .published_at()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "----------".to_string());
        let id = episode
            .episode_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());

        format!(
            "{} {} {} [{}]",
            date,
            id,
            episode.episode_title.as_deref().unwrap_or("(untitled)"),
            episode.transcript_id.as_deref().unwrap_or("no transcript")
        )
    }

    fn show_progress() -> bool {
        std::io::stderr().is_terminal() && log::max_level() <= log::LevelFilter::Info
    }

    fn create_progress_bar() -> ProgressBar {
        let progress_bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} transcripts ({percent}%) {eta}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar
    }
}
