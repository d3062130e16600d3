/*!
 * Transcript assembly from a parsed TTML document.
 *
 * The walk is `tt > body > div* > p*`. Each paragraph contributes either one
 * line per sentence-level span it contains or, when it has none, one line
 * for the whole paragraph.
 */

use std::fmt;
use std::path::Path;

use log::{debug, warn};

use super::extractor::{extract_text, is_sentence_unit, normalize_whitespace};
use super::markup::{parse_document, MarkupNode, QName};
use super::timestamp::{format_timestamp, parse_time_expression};
use crate::errors::TranscriptError;
use crate::file_utils::FileManager;

/// Separator placed between transcript lines
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Rendering options for one transcript
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranscriptOptions {
    /// Prefix each line with `[HH:MM:SS]` when the unit has a `begin` time
    pub include_timestamps: bool,
}

impl TranscriptOptions {
    pub fn with_timestamps(include_timestamps: bool) -> Self {
        Self { include_timestamps }
    }
}

/// A text-bearing element: a paragraph or a sentence span inside one
#[derive(Debug, Clone, Copy)]
pub struct Unit<'a> {
    pub node: &'a MarkupNode,
}

impl<'a> Unit<'a> {
    pub fn new(node: &'a MarkupNode) -> Self {
        Self { node }
    }

    /// Raw `begin` attribute, if any
    pub fn begin(&self) -> Option<&'a str> {
        self.node.attribute(&QName::local("begin"))
    }

    /// Extracted and whitespace-normalized text
    pub fn text(&self) -> String {
        normalize_whitespace(&extract_text(self.node))
    }

    /// Render the unit as a transcript line, or `None` if it has no text
    pub fn render(&self, options: TranscriptOptions) -> Option<String> {
        let text = self.text();
        if text.is_empty() {
            return None;
        }

        if options.include_timestamps {
            if let Some(begin) = self.begin() {
                match parse_time_expression(begin) {
                    Some(seconds) => return Some(format!("[{}] {}", format_timestamp(seconds), text)),
                    None => warn!("Ignoring unparseable begin time '{}'", begin),
                }
            }
        }

        Some(text)
    }
}

/// Namespaced name first, unqualified second
fn structural(local: &str) -> [QName; 2] {
    [QName::ttml(local), QName::local(local)]
}

/// Locate every text-bearing unit of the document, in document order.
///
/// Fails when the root has no `body` or the body has no `div`. Every `div`
/// is visited, not only the first.
pub fn locate_units(root: &MarkupNode) -> Result<Vec<Unit<'_>>, TranscriptError> {
    let body = root
        .find_children(&structural("body"))
        .into_iter()
        .next()
        .ok_or_else(|| TranscriptError::Structure("No body element found in TTML".to_string()))?;

    let divisions = body.find_children(&structural("div"));
    if divisions.is_empty() {
        return Err(TranscriptError::Structure("No div element found in body".to_string()));
    }

    let mut units = Vec::new();
    for division in divisions {
        for paragraph in division.find_children(&structural("p")) {
            let before = units.len();
            collect_sentences(paragraph, &mut units);
            if units.len() == before {
                units.push(Unit::new(paragraph));
            }
        }
    }

    Ok(units)
}

/// Outermost sentence spans below `node`, at any depth
fn collect_sentences<'a>(node: &'a MarkupNode, out: &mut Vec<Unit<'a>>) {
    for child in &node.children {
        if is_sentence_unit(child) {
            out.push(Unit::new(child));
        } else {
            collect_sentences(child, out);
        }
    }
}

/// Build the ordered transcript lines for a parsed document
pub fn assemble(root: &MarkupNode, include_timestamps: bool) -> Result<Vec<String>, TranscriptError> {
    let options = TranscriptOptions::with_timestamps(include_timestamps);
    let units = locate_units(root)?;
    let total = units.len();

    let lines: Vec<String> = units.iter().filter_map(|unit| unit.render(options)).collect();

    debug!("Assembled {} lines from {} units ({} empty)", lines.len(), total, total - lines.len());
    Ok(lines)
}

/// A rendered transcript, one line per non-empty unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    pub lines: Vec<String>,
}

impl Transcript {
    pub fn from_document(root: &MarkupNode, options: TranscriptOptions) -> Result<Self, TranscriptError> {
        Ok(Self {
            lines: assemble(root, options.include_timestamps)?,
        })
    }

    /// Parse raw TTML and assemble it
    pub fn from_ttml(ttml: &str, options: TranscriptOptions) -> Result<Self, TranscriptError> {
        let root = parse_document(ttml)?;
        Self::from_document(&root, options)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines joined by [`PARAGRAPH_SEPARATOR`], without a trailing newline
    pub fn render(&self) -> String {
        self.lines.join(PARAGRAPH_SEPARATOR)
    }

    /// Write the rendered transcript to `path` in a single replace.
    ///
    /// The file either holds the whole transcript or is left untouched.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), TranscriptError> {
        let path = path.as_ref();
        FileManager::write_atomic(path, &self.render())
            .map_err(|e| TranscriptError::Sink(format!("{:?}: {:#}", path, e)))
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Convert one TTML document into transcript text
pub fn convert(ttml: &str, options: TranscriptOptions) -> Result<String, TranscriptError> {
    Transcript::from_ttml(ttml, options).map(|transcript| transcript.render())
}
