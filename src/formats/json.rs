//! JSON result documents.
//!
//! The document is kept as a `serde_json::Value`; the transformer is the one
//! that understands the `features` array.

use crate::formats::{Document, FileFormat};
use crate::{BaktaError, Result};
use serde::Serialize;
use serde_json::Value;

pub const FORMAT_TAG: &str = "format";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct JsonDocument {
    pub value: Value,
}

impl JsonDocument {
    pub fn format_tag(&self) -> Option<&str> {
        self.value.get(FORMAT_TAG).and_then(Value::as_str)
    }

    pub fn features(&self) -> Option<&Vec<Value>> {
        self.value.get("features").and_then(Value::as_array)
    }

    pub fn feature_count(&self) -> usize {
        self.features().map(Vec::len).unwrap_or(0)
    }
}

lazy_parser!(JsonParser, FileFormat::Json, JsonDocument, Document::Json, parse_str);

pub fn parse_str(text: &str) -> Result<JsonDocument> {
    let mut value: Value =
        serde_json::from_str(text).map_err(|e| BaktaError::parse(FileFormat::Json, e))?;

    if let Value::Object(map) = &mut value {
        map.insert(FORMAT_TAG.to_string(), Value::String(FileFormat::Json.name().to_string()));
    }

    Ok(JsonDocument { value })
}
