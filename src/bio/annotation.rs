//! Canonical annotation record shared by every source format.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Prefixes that address a key inside [`Attributes`] from a query or sort field.
pub const ATTRIBUTE_PREFIXES: [&str; 2] = ["attributes.", "attribute."];

/// Returns the attribute name when `field` is written as `attributes.<name>` or `attribute.<name>`.
pub fn strip_attribute_prefix(field: &str) -> Option<&str> {
    ATTRIBUTE_PREFIXES
        .iter()
        .find_map(|prefix| field.strip_prefix(prefix))
        .filter(|name| !name.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Strand {
    #[serde(rename = "+")]
    Forward,
    #[serde(rename = "-")]
    Reverse,
    #[default]
    #[serde(rename = ".")]
    Unknown,
}

impl Strand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strand::Forward => "+",
            Strand::Reverse => "-",
            Strand::Unknown => ".",
        }
    }

    /// Reads an explicit strand column. Anything that is not a forward or
    /// reverse marker is treated as unknown.
    pub fn from_symbol(symbol: &str) -> Self {
        match symbol.trim() {
            "+" | "1" | "+1" => Strand::Forward,
            "-" | "-1" => Strand::Reverse,
            _ => Strand::Unknown,
        }
    }

    /// Flat-file locations carry no strand column; a `complement(...)`
    /// wrapper anywhere in the location marks the reverse strand.
    pub fn from_location(location: &str) -> Self {
        if location.contains("complement") {
            Strand::Reverse
        } else {
            Strand::Forward
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single attribute value. GFF3 flag attributes and flat-file qualifiers
/// without a value are stored as `Flag(true)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Flag(bool),
    Text(String),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(text) => Some(text),
            AttributeValue::Flag(_) => None,
        }
    }

    /// Text form used for comparisons and export.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            AttributeValue::Text(text) => Cow::Borrowed(text),
            AttributeValue::Flag(flag) => Cow::Owned(flag.to_string()),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Flag(value)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

/// Ordered, schema-free attribute bag.
///
/// Keys keep the order in which the source format listed them. Lookups by
/// dotted query path (`attributes.product`) go through [`Attributes::lookup`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(IndexMap<String, AttributeValue>);

impl Attributes {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Option<AttributeValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut AttributeValue> {
        self.0.get_mut(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AttributeValue::as_str)
    }

    /// Resolves `attributes.<name>`, `attribute.<name>` or a bare `<name>`.
    pub fn lookup(&self, path: &str) -> Option<&AttributeValue> {
        let key = strip_attribute_prefix(path).unwrap_or(path);
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<AttributeValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// `key=value;key=value`, with flags written as a bare `key`.
impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            match value {
                AttributeValue::Flag(true) => write!(f, "{}", key)?,
                other => write!(f, "{}={}", key, other)?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub job_id: String,
    pub feature_id: String,
    pub feature_type: String,
    pub contig: String,
    /// 1-based, inclusive. Not validated against `end`.
    pub start: i64,
    pub end: i64,
    pub strand: Strand,
    #[serde(default)]
    pub attributes: Attributes,
}

impl Annotation {
    pub fn new(
        job_id: impl Into<String>,
        feature_id: impl Into<String>,
        feature_type: impl Into<String>,
        contig: impl Into<String>,
        start: i64,
        end: i64,
        strand: Strand,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            feature_id: feature_id.into(),
            feature_type: feature_type.into(),
            contig: contig.into(),
            start,
            end,
            strand,
            attributes: Attributes::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn has_ordered_coordinates(&self) -> bool {
        self.start <= self.end
    }

    /// Closed-interval overlap with `[start, end]` on `contig`.
    pub fn overlaps(&self, contig: &str, start: i64, end: i64) -> bool {
        self.contig == contig && !(self.end < start || self.start > end)
    }
}
