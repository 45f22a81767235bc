//! Generic JSON-like tree decoded from XML response bodies.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix given to XML attributes when they become object fields.
pub const ATTRIBUTE_PREFIX: &str = "-";

/// Field holding text that sits next to child elements.
pub const CONTENT_KEY: &str = "#content";

/// Errors raised while turning XML into a [`ResponseTree`].
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("document has no root element")]
    MissingRoot,

    #[error("unexpected end of document inside <{0}>")]
    UnexpectedEof(String),

    #[error("unexpected content after root element <{0}>")]
    TrailingContent(String),

    #[error("failed to decode {what}: {source}")]
    Shape {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// A decoded response: objects, arrays and text leaves.
///
/// Serializes to plain JSON (`{}`, `[]` and strings).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseTree {
    Text(String),
    Array(Vec<ResponseTree>),
    Object(BTreeMap<String, ResponseTree>),
}

impl Default for ResponseTree {
    fn default() -> Self {
        ResponseTree::Object(BTreeMap::new())
    }
}

impl From<&str> for ResponseTree {
    fn from(s: &str) -> Self {
        ResponseTree::Text(s.to_string())
    }
}

impl From<String> for ResponseTree {
    fn from(s: String) -> Self {
        ResponseTree::Text(s)
    }
}

impl From<Vec<ResponseTree>> for ResponseTree {
    fn from(items: Vec<ResponseTree>) -> Self {
        ResponseTree::Array(items)
    }
}

impl From<BTreeMap<String, ResponseTree>> for ResponseTree {
    fn from(fields: BTreeMap<String, ResponseTree>) -> Self {
        ResponseTree::Object(fields)
    }
}

impl ResponseTree {
    /// Parses an XML document.
    ///
    /// The root element becomes the single field of the returned object.
    pub fn from_xml(xml: &str) -> Result<Self, DecodeError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<(String, ResponseTree)> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    if let Some((name, _)) = &root {
                        return Err(DecodeError::TrailingContent(name.clone()));
                    }
                    stack.push(Element::open(&e)?);
                }
                Event::Empty(e) => {
                    if let Some((name, _)) = &root {
                        return Err(DecodeError::TrailingContent(name.clone()));
                    }
                    let element = Element::open(&e)?;
                    close(element, &mut stack, &mut root);
                }
                Event::End(_) => {
                    // quick-xml already verified the end tag matches.
                    if let Some(element) = stack.pop() {
                        close(element, &mut stack, &mut root);
                    }
                }
                Event::Text(e) => {
                    let text = e.unescape()?;
                    match stack.last_mut() {
                        Some(top) => top.text.push_str(&text),
                        None => {
                            if let Some((name, _)) = &root {
                                return Err(DecodeError::TrailingContent(name.clone()));
                            }
                        }
                    }
                }
                Event::CData(e) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions, doctype.
                _ => {}
            }
        }

        if let Some(open) = stack.pop() {
            return Err(DecodeError::UnexpectedEof(open.name));
        }

        let (name, value) = root.ok_or(DecodeError::MissingRoot)?;
        let mut fields = BTreeMap::new();
        fields.insert(name, value);
        Ok(ResponseTree::Object(fields))
    }

    /// Returns the field `key` of an object node.
    pub fn get(&self, key: &str) -> Option<&ResponseTree> {
        match self {
            ResponseTree::Object(fields) => fields.get(key),
            _ => None,
        }
    }

    /// Walks a chain of object fields.
    pub fn get_path(&self, path: &[&str]) -> Option<&ResponseTree> {
        path.iter().try_fold(self, |node, key| node.get(key))
    }

    /// Whether this is an object with field `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ResponseTree::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ResponseTree]> {
        match self {
            ResponseTree::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, ResponseTree>> {
        match self {
            ResponseTree::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Removes and returns the field `key` of an object node.
    pub fn take(&mut self, key: &str) -> Option<ResponseTree> {
        match self {
            ResponseTree::Object(fields) => fields.remove(key),
            _ => None,
        }
    }

    /// True for a text leaf with no content.
    pub fn is_empty_text(&self) -> bool {
        matches!(self, ResponseTree::Text(s) if s.is_empty())
    }

    /// Compact JSON rendering.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Indented JSON rendering.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Decodes this tree into a typed value through its JSON form.
    pub fn decode<T: serde::de::DeserializeOwned>(
        &self,
        what: &'static str,
    ) -> Result<T, DecodeError> {
        let value = serde_json::to_value(self).map_err(|source| DecodeError::Shape { what, source })?;
        serde_json::from_value(value).map_err(|source| DecodeError::Shape { what, source })
    }
}

/// An element whose end tag has not been seen yet.
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<(String, ResponseTree)>,
    text: String,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Result<Self, DecodeError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }

        Ok(Self { name, attributes, children: Vec::new(), text: String::new() })
    }

    fn into_value(self) -> ResponseTree {
        if self.children.is_empty() && self.attributes.is_empty() {
            return ResponseTree::Text(self.text);
        }

        let mut fields: BTreeMap<String, ResponseTree> = BTreeMap::new();
        for (key, value) in self.attributes {
            fields.insert(format!("{ATTRIBUTE_PREFIX}{key}"), ResponseTree::Text(value));
        }

        // Child values are never arrays, so an array here means a repeated tag.
        for (name, value) in self.children {
            match fields.remove(&name) {
                None => {
                    fields.insert(name, value);
                }
                Some(ResponseTree::Array(mut items)) => {
                    items.push(value);
                    fields.insert(name, ResponseTree::Array(items));
                }
                Some(previous) => {
                    fields.insert(name, ResponseTree::Array(vec![previous, value]));
                }
            }
        }

        if !self.text.is_empty() {
            fields.insert(CONTENT_KEY.to_string(), ResponseTree::Text(self.text));
        }

        ResponseTree::Object(fields)
    }
}

fn close(element: Element, stack: &mut [Element], root: &mut Option<(String, ResponseTree)>) {
    let name = element.name.clone();
    let value = element.into_value();
    match stack.last_mut() {
        Some(parent) => parent.children.push((name, value)),
        None => *root = Some((name, value)),
    }
}
