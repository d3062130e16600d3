/*!
 * Linear text reconstruction from a markup subtree.
 */

use once_cell::sync::Lazy;

use super::markup::{MarkupNode, QName, PODCASTS_NS};

/// Candidate keys for the `unit` classification attribute, tried in order:
/// unqualified first, then qualified by the podcasts namespace.
pub static UNIT_ATTRIBUTE_KEYS: Lazy<[QName; 2]> =
    Lazy::new(|| [QName::local("unit"), QName::qualified(PODCASTS_NS, "unit")]);

pub const WORD_UNIT: &str = "word";
pub const SENTENCE_UNIT: &str = "sentence";

/// Value of the node's `unit` attribute under any recognized key
pub fn unit_of(node: &MarkupNode) -> Option<&str> {
    node.attribute_any(UNIT_ATTRIBUTE_KEYS.as_slice())
}

/// Whether the node is a span carrying the given unit classification
pub fn is_span_with_unit(node: &MarkupNode, unit: &str) -> bool {
    node.local_name() == "span" && unit_of(node) == Some(unit)
}

/// A word-level span, which is always followed by a separating space
pub fn is_word_unit(node: &MarkupNode) -> bool {
    is_span_with_unit(node, WORD_UNIT)
}

/// A sentence-level span, which becomes its own transcript line
pub fn is_sentence_unit(node: &MarkupNode) -> bool {
    is_span_with_unit(node, SENTENCE_UNIT)
}

/// Concatenate the text of `node` and its subtree in document order.
///
/// A single space is inserted after every word-level span. No other
/// characters are added and nothing is normalized here; callers run
/// [`normalize_whitespace`] on the finished string.
pub fn extract_text(node: &MarkupNode) -> String {
    let mut out = String::new();
    write_text(node, &mut out);
    out
}

fn write_text(node: &MarkupNode, out: &mut String) {
    if let Some(text) = &node.text {
        out.push_str(text);
    }

    for child in &node.children {
        write_text(child, out);
        if is_word_unit(child) {
            out.push(' ');
        }
        if let Some(tail) = &child.tail {
            out.push_str(tail);
        }
    }
}

/// Collapse every run of whitespace to one ASCII space and trim both ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
