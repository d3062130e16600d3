/*!
 * Output filename resolution for batch conversion.
 *
 * Transcripts are named after the podcast and episode titles when metadata
 * is available and after the content id otherwise. Repeated names get a
 * numeric suffix from a counter owned by the caller.
 */

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::database::models::EpisodeMetadata;

/// Longest sanitized base name, in characters
pub const MAX_FILENAME_CHARS: usize = 200;

/// Extension given to every transcript file
pub const TRANSCRIPT_EXTENSION: &str = "txt";

/// Identifier used when a path carries no content id
pub const UNKNOWN_ID: &str = "unknown";

static INVALID_CHARS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[<>:"/\\|?*]"#).unwrap());

static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// Cache copies are stored as "<name>.ttml-<digits>.ttml"
static DUPLICATE_SUFFIX_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+\.ttml)-\d+\.ttml$").unwrap());

/// Make a display title safe to use as a file name.
///
/// Replaces `< > : " / \ | ? *` with `-`, collapses whitespace runs to one
/// space, trims, and keeps at most [`MAX_FILENAME_CHARS`] characters.
pub fn sanitize_filename(name: &str) -> String {
    let replaced = INVALID_CHARS_REGEX.replace_all(name, "-");
    let collapsed = WHITESPACE_REGEX.replace_all(&replaced, " ");
    collapsed.trim().chars().take(MAX_FILENAME_CHARS).collect()
}

/// Strip the cache duplication suffix from a transcript path.
///
/// `episode123.ttml-5.ttml` becomes `episode123.ttml`; anything else is
/// returned unchanged.
pub fn canonical_identifier(relative_path: &str) -> String {
    DUPLICATE_SUFFIX_REGEX.replace(relative_path, "$1").into_owned()
}

/// Content id following `prefix` up to the next `/`, or [`UNKNOWN_ID`]
pub fn content_id(identifier: &str, prefix: &str) -> String {
    identifier
        .find(prefix)
        .map(|start| &identifier[start + prefix.len()..])
        .and_then(|rest| rest.split('/').next())
        .filter(|id| !id.is_empty())
        .unwrap_or(UNKNOWN_ID)
        .to_string()
}

/// Collision counter keyed by base filename
#[derive(Debug, Default, Clone)]
pub struct OutputNamer {
    counts: HashMap<String, usize>,
}

impl OutputNamer {
    pub fn new() -> Self {
        Self::default()
    }

    // @returns: How many times `base` was handed out before, then bumps it
    fn claim(&mut self, base: &str) -> usize {
        let count = self.counts.entry(base.to_string()).or_insert(0);
        let current = *count;
        *count += 1;
        current
    }

    /// `Podcast - Episode.txt`, then `Podcast - Episode (1).txt`, ...
    pub fn titled_filename(&mut self, podcast_title: &str, episode_title: &str) -> String {
        let base = sanitize_filename(&format!("{} - {}", podcast_title, episode_title));
        match self.claim(&base) {
            0 => format!("{}.{}", base, TRANSCRIPT_EXTENSION),
            n => format!("{} ({}).{}", base, n, TRANSCRIPT_EXTENSION),
        }
    }

    /// `id.txt`, then `id-1.txt`, ...
    pub fn id_filename(&mut self, id: &str) -> String {
        match self.claim(id) {
            0 => format!("{}.{}", id, TRANSCRIPT_EXTENSION),
            n => format!("{}-{}.{}", id, n, TRANSCRIPT_EXTENSION),
        }
    }

    /// Titled name when metadata carries both titles, id-based otherwise
    pub fn filename_for(&mut self, metadata: Option<&EpisodeMetadata>, id: &str) -> String {
        match metadata.and_then(EpisodeMetadata::display_titles) {
            Some((podcast, episode)) => self.titled_filename(podcast, episode),
            None => self.id_filename(id),
        }
    }
}
