//! Header decoder for polar captures.
//!
//! The preamble is Latin-1 text, one `NAME value` (or `NAME=value`) attribute per
//! line, terminated by an `EOH` line. Lines starting with `CC` or `**` are comments;
//! a standalone `CC` token inside a value starts an inline note.
use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::io::directory::{AttributeDirectory, canonical_name};
use crate::types::ByteOrder;

pub const ATTR_AZIMUTHS: &str = "NRAYS";
pub const ATTR_RANGES: &str = "FIFO";
pub const ATTR_BIT_DEPTH: &str = "DABIT";
pub const ATTR_BYTE_ORDER: &str = "BYTEO";
pub const ATTR_RANGE_RESOLUTION: &str = "RGRES";
pub const ATTR_END_OF_HEADER: &str = "EOH";

/// A header value coerced from its text form.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl AttributeValue {
    pub fn parse(raw: &str) -> Self {
        if let Ok(i) = raw.parse::<i64>() {
            return AttributeValue::Integer(i);
        }
        match raw.parse::<f64>() {
            Ok(f) if f.is_finite() => AttributeValue::Float(f),
            _ => AttributeValue::Text(raw.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Integer(i) => Some(*i as f64),
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Text(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Integer(i) => write!(f, "{}", i),
            AttributeValue::Float(v) => write!(f, "{}", v),
            AttributeValue::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HeaderAttribute {
    pub name: String,
    /// Value text as it appeared in the capture, whitespace collapsed.
    pub raw: String,
    pub value: AttributeValue,
    pub description: String,
    /// Inline `CC` comment from the capture. Not embedded in rendered output and
    /// ignored by equality.
    pub note: Option<String>,
}

impl HeaderAttribute {
    pub fn new(name: &str, raw: &str, directory: &AttributeDirectory) -> Self {
        let name = canonical_name(name);
        let description = directory.describe(&name).to_string();
        Self {
            value: AttributeValue::parse(raw),
            raw: raw.to_string(),
            name,
            description,
            note: None,
        }
    }
}

impl PartialEq for HeaderAttribute {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.raw == other.raw
            && self.value == other.value
            && self.description == other.description
    }
}

/// Ordered, name-unique header attributes with case-insensitive lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    attributes: Vec<HeaderAttribute>,
    index: HashMap<String, usize>,
}

impl Header {
    /// Build a header from `(name, value)` pairs, e.g. when re-reading embedded metadata.
    pub fn from_pairs<I, K, V>(pairs: I, directory: &AttributeDirectory) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut header = Header::default();
        for (name, raw) in pairs {
            header.insert(HeaderAttribute::new(name.as_ref(), raw.as_ref(), directory));
        }
        header
    }

    /// Insert keeping first-seen order; a repeated name replaces the value in place.
    fn insert(&mut self, attribute: HeaderAttribute) {
        match self.index.get(&attribute.name) {
            Some(&pos) => {
                warn!(
                    "Duplicate header attribute {}: replacing {:?} with {:?}",
                    attribute.name, self.attributes[pos].raw, attribute.raw
                );
                self.attributes[pos] = attribute;
            }
            None => {
                self.index.insert(attribute.name.clone(), self.attributes.len());
                self.attributes.push(attribute);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&HeaderAttribute> {
        self.index
            .get(&canonical_name(name))
            .map(|&pos| &self.attributes[pos])
    }

    pub fn value(&self, name: &str) -> Option<&AttributeValue> {
        self.get(name).map(|a| &a.value)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.value(name).and_then(AttributeValue::as_f64)
    }

    pub fn describe(&self, name: &str) -> Option<&str> {
        self.get(name).map(|a| a.description.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeaderAttribute> {
        self.attributes.iter()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Byte offset of the sample payload, recorded from the `EOH` line.
    pub fn payload_offset(&self) -> Option<usize> {
        self.value(ATTR_END_OF_HEADER)
            .and_then(AttributeValue::as_i64)
            .and_then(|v| usize::try_from(v).ok())
    }

    /// Validate and extract the attributes that describe the payload layout.
    pub fn layout(&self) -> Result<HeaderLayout> {
        let azimuth_count = self.require_count(ATTR_AZIMUTHS)?;
        let range_count = self.require_count(ATTR_RANGES)?;
        let bit_depth = self.require_integer(ATTR_BIT_DEPTH)?;

        let byte_order_attr = self.require(ATTR_BYTE_ORDER)?;
        let byte_order = ByteOrder::parse(&byte_order_attr.raw).ok_or_else(|| {
            Error::malformed(
                ATTR_BYTE_ORDER,
                format!("must be 0/1, LSB or MSB, got {:?}", byte_order_attr.raw),
            )
        })?;

        let resolution_attr = self.require(ATTR_RANGE_RESOLUTION)?;
        let range_resolution = resolution_attr
            .value
            .as_f64()
            .filter(|v| *v > 0.0)
            .ok_or_else(|| {
                Error::malformed(
                    ATTR_RANGE_RESOLUTION,
                    format!("must be a positive number, got {:?}", resolution_attr.raw),
                )
            })?;

        Ok(HeaderLayout {
            azimuth_count,
            range_count,
            bit_depth,
            byte_order,
            range_resolution,
        })
    }

    fn require(&self, name: &str) -> Result<&HeaderAttribute> {
        self.get(name)
            .ok_or_else(|| Error::malformed(name, "is missing"))
    }

    fn require_integer(&self, name: &str) -> Result<i64> {
        let attr = self.require(name)?;
        attr.value.as_i64().ok_or_else(|| {
            Error::malformed(name, format!("must be an integer, got {:?}", attr.raw))
        })
    }

    fn require_count(&self, name: &str) -> Result<usize> {
        let value = self.require_integer(name)?;
        usize::try_from(value)
            .map_err(|_| Error::malformed(name, format!("must not be negative, got {}", value)))
    }
}

/// Payload layout declared by the header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderLayout {
    pub azimuth_count: usize,
    pub range_count: usize,
    /// Declared bits per sample; only 8 and 16 decode.
    pub bit_depth: i64,
    pub byte_order: ByteOrder,
    pub range_resolution: f64,
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Split a collapsed line into key and value. `=` wins when it precedes the first space.
fn split_key_value(text: &str) -> (&str, &str) {
    let eq = text.find('=');
    let sp = text.find(' ');
    match (eq, sp) {
        (Some(e), Some(s)) if e < s => (text[..e].trim(), text[e + 1..].trim()),
        (Some(e), None) => (text[..e].trim(), text[e + 1..].trim()),
        (_, Some(s)) => (&text[..s], text[s + 1..].trim()),
        (None, None) => (text, ""),
    }
}

/// Separate an inline `CC` note from the value.
fn split_note(value: &str) -> (String, Option<String>) {
    let tokens: Vec<&str> = value.split(' ').collect();
    match tokens.iter().position(|t| *t == "CC") {
        Some(pos) => {
            let note = tokens[pos + 1..].join(" ");
            (
                tokens[..pos].join(" "),
                if note.is_empty() { None } else { Some(note) },
            )
        }
        None => (value.to_string(), None),
    }
}

/// Decode the header preamble of a capture.
///
/// Returns the header with an `EOH` attribute holding the payload offset. Fails with
/// `TruncatedFile` when no `EOH` line is found and with `MalformedHeader` when a
/// layout attribute is missing or invalid.
pub fn decode_header(bytes: &[u8], directory: &AttributeDirectory) -> Result<Header> {
    let mut header = Header::default();
    let mut pos = 0usize;

    while pos < bytes.len() {
        let (line_end, next) = match bytes[pos..].iter().position(|&b| b == b'\n') {
            Some(nl) => (pos + nl, pos + nl + 1),
            None => (bytes.len(), bytes.len()),
        };
        let mut line = &bytes[pos..line_end];
        if line.last() == Some(&b'\r') {
            line = &line[..line.len() - 1];
        }
        pos = next;

        let text = latin1(line);
        let trimmed = text.trim_start();
        if trimmed.is_empty() || trimmed.starts_with("CC") || trimmed.starts_with("**") {
            continue;
        }

        let collapsed = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");
        let (key, value) = split_key_value(&collapsed);

        if canonical_name(key) == ATTR_END_OF_HEADER {
            header.insert(HeaderAttribute::new(
                ATTR_END_OF_HEADER,
                &pos.to_string(),
                directory,
            ));
            debug!("End of header at byte {}, {} attributes", pos, header.len());
            header.layout()?;
            return Ok(header);
        }

        let (value, note) = split_note(value);
        if key.is_empty() || value.is_empty() {
            debug!("Skipping header line without value: {:?}", collapsed);
            continue;
        }

        let mut attribute = HeaderAttribute::new(key, &value, directory);
        attribute.note = note;
        debug!("Header attribute {} = {:?}", attribute.name, attribute.raw);
        header.insert(attribute);
    }

    Err(Error::TruncatedFile {
        expected: bytes.len() + 1,
        actual: bytes.len(),
    })
}
