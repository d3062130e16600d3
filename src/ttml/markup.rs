/*!
 * Immutable markup tree and the parser that builds it.
 *
 * The tree mirrors the classic "element with text and tail" model: text that
 * follows a child element belongs to that child's `tail`, so a parent's
 * content is its own `text` followed by each child and the child's tail.
 */

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use log::trace;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;

use crate::errors::TranscriptError;

/// TTML core namespace
pub const TTML_NS: &str = "http://www.w3.org/ns/ttml";

/// Namespace used by podcast transcripts for the `unit` attribute
pub const PODCASTS_NS: &str = "http://podcasts.apple.com/transcript-ttml-internal";

/// Element or attribute name, optionally qualified by a namespace URI
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QName {
    pub namespace: Option<String>,
    pub local: String,
}

impl QName {
    /// Name without a namespace
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local: local.into(),
        }
    }

    /// Name qualified by a namespace URI
    pub fn qualified(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local: local.into(),
        }
    }

    /// Name in the TTML core namespace
    pub fn ttml(local: impl Into<String>) -> Self {
        Self::qualified(TTML_NS, local)
    }
}

/// Clark notation, `{uri}local` or plain `local`
impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

/// One element of a parsed markup document
#[derive(Debug, Clone, PartialEq)]
pub struct MarkupNode {
    pub name: QName,
    pub attributes: BTreeMap<QName, String>,
    /// Text before the first child
    pub text: Option<String>,
    pub children: Vec<MarkupNode>,
    /// Text after this element's end tag, owned by the parent
    pub tail: Option<String>,
}

impl MarkupNode {
    pub fn new(name: QName) -> Self {
        Self {
            name,
            attributes: BTreeMap::new(),
            text: None,
            children: Vec::new(),
            tail: None,
        }
    }

    pub fn with_attribute(mut self, key: QName, value: impl Into<String>) -> Self {
        self.attributes.insert(key, value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = Some(tail.into());
        self
    }

    pub fn with_child(mut self, child: MarkupNode) -> Self {
        self.children.push(child);
        self
    }

    /// Local part of the tag name, ignoring the namespace
    pub fn local_name(&self) -> &str {
        &self.name.local
    }

    pub fn attribute(&self, key: &QName) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// First value found while trying `keys` in order
    pub fn attribute_any(&self, keys: &[QName]) -> Option<&str> {
        keys.iter().find_map(|key| self.attribute(key))
    }

    /// Direct children with exactly this name
    pub fn children_named<'a, 'n>(&'a self, name: &'n QName) -> impl Iterator<Item = &'a MarkupNode> + 'n
    where
        'a: 'n,
    {
        self.children.iter().filter(move |child| &child.name == name)
    }

    /// Direct children matching the first candidate name that matches anything.
    ///
    /// Later candidates are only consulted when every earlier one matched
    /// nothing, so a namespaced document never mixes in unqualified elements.
    pub fn find_children(&self, candidates: &[QName]) -> Vec<&MarkupNode> {
        for candidate in candidates {
            let found: Vec<&MarkupNode> = self
                .children
                .iter()
                .filter(|child| &child.name == candidate)
                .collect();
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }
}

impl FromStr for MarkupNode {
    type Err = TranscriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_document(s)
    }
}

/// Parse a complete XML document into its root element.
///
/// Namespace prefixes are resolved, entity references are expanded, and
/// comments and processing instructions are dropped.
pub fn parse_document(input: &str) -> Result<MarkupNode, TranscriptError> {
    let mut reader = NsReader::from_str(input.trim_start_matches('\u{feff}'));
    reader.config_mut().check_end_names = true;

    let mut stack: Vec<MarkupNode> = Vec::new();
    let mut root: Option<MarkupNode> = None;

    loop {
        let (namespace, event) = {
            let (resolved, event) = reader.read_resolved_event()?;
            let namespace = match &event {
                Event::Start(start) | Event::Empty(start) => element_namespace(resolved, start)?,
                _ => None,
            };
            (namespace, event)
        };

        match event {
            Event::Start(start) => {
                if root.is_some() && stack.is_empty() {
                    return Err(TranscriptError::Parse("junk after document element".to_string()));
                }
                let node = open_element(&reader, &start, namespace)?;
                stack.push(node);
            }
            Event::Empty(start) => {
                if root.is_some() && stack.is_empty() {
                    return Err(TranscriptError::Parse("junk after document element".to_string()));
                }
                let node = open_element(&reader, &start, namespace)?;
                close_element(&mut stack, &mut root, node);
            }
            Event::End(end) => {
                let node = stack.pop().ok_or_else(|| {
                    TranscriptError::Parse(format!(
                        "unexpected closing tag </{}>",
                        String::from_utf8_lossy(end.name().as_ref())
                    ))
                })?;
                close_element(&mut stack, &mut root, node);
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| TranscriptError::Parse(e.to_string()))?;
                append_text(&mut stack, &text)?;
            }
            Event::CData(data) => {
                let bytes = data.into_inner();
                let text = std::str::from_utf8(&bytes)
                    .map_err(|e| TranscriptError::Parse(e.to_string()))?;
                append_text(&mut stack, text)?;
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes carry no text
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(TranscriptError::Parse(format!(
            "unclosed element <{}>",
            open.name.local
        )));
    }

    root.ok_or_else(|| TranscriptError::Parse("no element found".to_string()))
}

fn element_namespace(resolved: ResolveResult<'_>, start: &BytesStart<'_>) -> Result<Option<String>, TranscriptError> {
    match resolved {
        ResolveResult::Bound(Namespace(uri)) => Ok(Some(decode(uri)?)),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(TranscriptError::Parse(format!(
            "unbound namespace prefix '{}' on <{}>",
            String::from_utf8_lossy(&prefix),
            String::from_utf8_lossy(start.name().as_ref())
        ))),
    }
}

fn open_element(
    reader: &NsReader<&[u8]>,
    start: &BytesStart<'_>,
    namespace: Option<String>,
) -> Result<MarkupNode, TranscriptError> {
    let local = decode(start.local_name().as_ref())?;
    let mut node = MarkupNode::new(QName { namespace, local });

    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| TranscriptError::Parse(e.to_string()))?;

        // xmlns declarations are consumed by the reader, not exposed as attributes
        if attribute.key.as_namespace_binding().is_some() {
            continue;
        }

        let (resolved, local) = reader.resolve_attribute(attribute.key);
        let namespace = match resolved {
            ResolveResult::Bound(Namespace(uri)) => Some(decode(uri)?),
            ResolveResult::Unbound => None,
            ResolveResult::Unknown(prefix) => {
                return Err(TranscriptError::Parse(format!(
                    "unbound namespace prefix '{}' on attribute",
                    String::from_utf8_lossy(&prefix)
                )));
            }
        };
        let value = attribute
            .unescape_value()
            .map_err(|e| TranscriptError::Parse(e.to_string()))?;

        node.attributes.insert(
            QName {
                namespace,
                local: decode(local.as_ref())?,
            },
            value.into_owned(),
        );
    }

    trace!("Opened element {}", node.name);
    Ok(node)
}

fn close_element(stack: &mut [MarkupNode], root: &mut Option<MarkupNode>, node: MarkupNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => *root = Some(node),
    }
}

fn append_text(stack: &mut [MarkupNode], text: &str) -> Result<(), TranscriptError> {
    if text.is_empty() {
        return Ok(());
    }

    let Some(node) = stack.last_mut() else {
        if text.trim().is_empty() {
            return Ok(());
        }
        return Err(TranscriptError::Parse(
            "text content outside of the document element".to_string(),
        ));
    };

    let slot = match node.children.last_mut() {
        Some(child) => &mut child.tail,
        None => &mut node.text,
    };
    slot.get_or_insert_with(String::new).push_str(text);
    Ok(())
}

fn decode(bytes: &[u8]) -> Result<String, TranscriptError> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| TranscriptError::Parse(e.to_string()))
}
