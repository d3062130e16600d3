/*!
 * TTML to plain-text extraction engine.
 *
 * - `markup`: immutable element tree and the parser that builds it
 * - `extractor`: recursive text reconstruction and whitespace normalization
 * - `transcript`: paragraph/sentence unit selection and line assembly
 * - `timestamp`: `[HH:MM:SS]` formatting and `begin` time parsing
 *
 * The engine is synchronous and holds no state between documents.
 */

pub mod markup;
pub mod extractor;
pub mod transcript;
pub mod timestamp;

pub use markup::{parse_document, MarkupNode, QName, PODCASTS_NS, TTML_NS};
pub use extractor::{extract_text, is_word_unit, normalize_whitespace};
pub use transcript::{assemble, convert, Transcript, TranscriptOptions, Unit, PARAGRAPH_SEPARATOR};
pub use timestamp::{format_timestamp, parse_time_expression};
