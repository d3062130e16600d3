/*!
 * Batch conversion of a TTML cache directory.
 *
 * A run has two phases. Planning walks the discovered documents in order,
 * looks up their metadata and claims output names from the collision
 * counter; this is the only shared state, so it happens sequentially.
 * Conversion then runs on blocking workers, each owning its own parse tree
 * and destination path.
 */

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use log::{debug, error, info, warn};

use crate::app_config::Config;
use crate::database::{EpisodeMetadata, MetadataLookup};
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::naming::{canonical_identifier, content_id, OutputNamer};
use crate::ttml::{Transcript, TranscriptOptions};

/// One TTML document found in the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtmlSource {
    pub path: PathBuf,
    /// Canonical identifier used for metadata lookup
    pub transcript_identifier: String,
    /// Content id used for fallback file names
    pub id: String,
}

/// Find every TTML document below `ttml_dir` whose identifier starts with `prefix`
pub fn discover_sources<P: AsRef<Path>>(ttml_dir: P, prefix: &str) -> Result<Vec<TtmlSource>> {
    let ttml_dir = ttml_dir.as_ref();
    if !FileManager::dir_exists(ttml_dir) {
        return Err(anyhow!("TTML directory not found: {:?}", ttml_dir));
    }

    let mut sources = Vec::new();
    for path in FileManager::find_files(ttml_dir, "ttml")? {
        let relative = FileManager::relative_identifier(&path, ttml_dir)?;
        let transcript_identifier = canonical_identifier(&relative);

        if !transcript_identifier.starts_with(prefix) {
            debug!("Ignoring {} (outside {})", relative, prefix);
            continue;
        }

        let id = content_id(&transcript_identifier, prefix);
        sources.push(TtmlSource {
            path,
            transcript_identifier,
            id,
        });
    }

    Ok(sources)
}

/// Read, convert and write a single document.
///
/// Returns the number of transcript lines written.
pub fn convert_document(input: &Path, output: &Path, options: TranscriptOptions) -> Result<usize, AppError> {
    let ttml = std::fs::read_to_string(input)
        .map_err(|e| AppError::File(format!("Failed to read {:?}: {}", input, e)))?;

    let transcript = Transcript::from_ttml(&ttml, options)?;
    transcript.write_to(output)?;

    debug!("Transcript saved to {:?} ({} lines)", output, transcript.len());
    Ok(transcript.len())
}

/// Settings for one batch run
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub output_dir: PathBuf,
    pub include_timestamps: bool,
    pub skip_existing: bool,
    pub concurrency: usize,
}

impl From<&Config> for BatchOptions {
    fn from(config: &Config) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            include_timestamps: config.include_timestamps,
            skip_existing: config.skip_existing,
            concurrency: config.concurrency,
        }
    }
}

/// A document with its resolved destination
#[derive(Debug, Clone)]
pub struct PlannedDocument {
    pub source: TtmlSource,
    pub metadata: Option<EpisodeMetadata>,
    pub output_path: PathBuf,
}

/// A document that could not be converted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub identifier: String,
    pub kind: &'static str,
    pub message: String,
}

/// Counts for a finished batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub found: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub failures: Vec<BatchFailure>,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Processing {} files completed! Converted {}, failed {}, skipped {}.",
            self.found, self.succeeded, self.failed, self.skipped
        )
    }
}

/// Batch driver over a metadata source
pub struct BatchProcessor<'a> {
    lookup: &'a dyn MetadataLookup,
    options: BatchOptions,
    progress: Option<ProgressBar>,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(lookup: &'a dyn MetadataLookup, options: BatchOptions) -> Self {
        Self {
            lookup,
            options,
            progress: None,
        }
    }

    /// Report conversion progress on `progress`
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Resolve metadata and output paths, in discovery order
    pub async fn plan(&self, sources: Vec<TtmlSource>, namer: &mut OutputNamer) -> Vec<PlannedDocument> {
        let mut planned = Vec::with_capacity(sources.len());

        for source in sources {
            debug!("Processing: {}", source.transcript_identifier);

            let metadata = match self.lookup.lookup_metadata(&source.transcript_identifier).await {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!("Database query error for {}: {}", source.transcript_identifier, e);
                    None
                }
            };

            match metadata.as_ref().and_then(EpisodeMetadata::display_titles) {
                Some((podcast, episode)) => debug!("  Found metadata: \"{}\" - \"{}\"", podcast, episode),
                None => debug!("  No metadata found, using ID: {}", source.id),
            }

            let filename = namer.filename_for(metadata.as_ref(), &source.id);
            planned.push(PlannedDocument {
                output_path: self.options.output_dir.join(filename),
                source,
                metadata,
            });
        }

        planned
    }

    /// Convert every source, continuing past per-document failures
    pub async fn run(&self, sources: Vec<TtmlSource>) -> Result<BatchSummary> {
        FileManager::ensure_dir(&self.options.output_dir)?;

        let mut summary = BatchSummary {
            found: sources.len(),
            ..Default::default()
        };

        let mut namer = OutputNamer::new();
        let planned = self.plan(sources, &mut namer).await;

        let mut pending = Vec::with_capacity(planned.len());
        for document in planned {
            if self.options.skip_existing && document.output_path.exists() {
                debug!("  Skipping (already exists): {:?}", document.output_path);
                summary.skipped += 1;
                continue;
            }
            pending.push(document);
        }

        if let Some(progress) = &self.progress {
            progress.set_length(pending.len() as u64);
        }

        let options = TranscriptOptions::with_timestamps(self.options.include_timestamps);
        let mut results = stream::iter(pending.into_iter().map(|document| async move {
            let result = convert_blocking(document.source.path.clone(), document.output_path.clone(), options).await;
            (document, result)
        }))
        .buffer_unordered(self.options.concurrency.max(1));

        while let Some((document, result)) = results.next().await {
            let result = match result {
                Err(e) if e.kind() == "sink" => self.retry_with_id_name(&document, e, &mut namer, options).await,
                other => other,
            };

            match result {
                Ok(_) => summary.succeeded += 1,
                Err(e) => {
                    let identifier = document.source.transcript_identifier;
                    error!("Error processing {}: {}", identifier, e);
                    summary.failed += 1;
                    summary.failures.push(BatchFailure {
                        identifier,
                        kind: e.kind(),
                        message: e.to_string(),
                    });
                }
            }
            if let Some(progress) = &self.progress {
                progress.inc(1);
            }
        }

        if let Some(progress) = &self.progress {
            progress.finish_and_clear();
        }

        summary.failures.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        info!("{}", summary);
        Ok(summary)
    }

    /// Write a document that could not be saved under its titled name as `id.txt`.
    ///
    /// Documents that were already named by id get `error` back unchanged.
    ///
    /// The fallback name is claimed from the same counter, so it never
    /// collides with a name handed out during planning.
    async fn retry_with_id_name(
        &self,
        document: &PlannedDocument,
        error: AppError,
        namer: &mut OutputNamer,
        options: TranscriptOptions,
    ) -> Result<usize, AppError> {
        let titled = document.metadata.as_ref().and_then(EpisodeMetadata::display_titles).is_some();
        if !titled {
            return Err(error);
        }

        let fallback = self.options.output_dir.join(namer.id_filename(&document.source.id));

        warn!(
            "Could not write {:?} ({}), retrying as {:?}",
            document.output_path, error, fallback
        );
        convert_blocking(document.source.path.clone(), fallback, options).await
    }
}

/// [`convert_document`] on tokio's blocking pool
async fn convert_blocking(input: PathBuf, output: PathBuf, options: TranscriptOptions) -> Result<usize, AppError> {
    tokio::task::spawn_blocking(move || convert_document(&input, &output, options))
        .await
        .unwrap_or_else(|e| Err(AppError::Unknown(format!("conversion task failed: {}", e))))
}
