use super::{mismatch, synthetic_id, Records, Transform};
use crate::bio::{Annotation, AttributeValue, Attributes, Strand};
use crate::formats::json::FORMAT_TAG;
use crate::formats::{Document, FileFormat};
use crate::{BaktaError, Result};
use serde_json::{Map, Value};

const ID_KEYS: &[&str] = &["id", "locus", "locus_tag"];
const TYPE_KEYS: &[&str] = &["type"];
const CONTIG_KEYS: &[&str] = &["contig", "sequence", "seqid"];
const START_KEYS: &[&str] = &["start"];
const END_KEYS: &[&str] = &["end", "stop"];
const STRAND_KEYS: &[&str] = &["strand"];

const UNKNOWN: &str = "unknown";

fn first<'a>(feature: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| feature.get(*key))
        .find(|v| !v.is_null())
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Missing coordinates default to 0; anything present must be an integer.
fn coordinate(value: Option<&Value>, index: usize) -> Result<i64> {
    let parsed = match value {
        None => return Ok(0),
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => None,
    };
    parsed.ok_or_else(|| {
        let shown = value.map(Value::to_string).unwrap_or_default();
        BaktaError::transform(
            FileFormat::Json,
            format!("feature {}: coordinate {} is not an integer", index, shown),
        )
    })
}

fn strand(value: Option<&Value>) -> Strand {
    match value {
        Some(Value::String(s)) => Strand::from_symbol(s),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(1) => Strand::Forward,
            Some(-1) => Strand::Reverse,
            _ => Strand::Unknown,
        },
        _ => Strand::Unknown,
    }
}

/// Non-core keys become attributes. Nested values are kept as JSON text.
fn attribute(value: &Value) -> Option<AttributeValue> {
    match value {
        Value::Null => None,
        Value::Bool(flag) => Some(AttributeValue::Flag(*flag)),
        Value::String(s) => Some(AttributeValue::Text(s.clone())),
        Value::Number(n) => Some(AttributeValue::Text(n.to_string())),
        nested => Some(AttributeValue::Text(nested.to_string())),
    }
}

fn is_core(key: &str) -> bool {
    [ID_KEYS, TYPE_KEYS, CONTIG_KEYS, START_KEYS, END_KEYS, STRAND_KEYS]
        .iter()
        .any(|keys| keys.contains(&key))
}

#[derive(Debug, Clone)]
pub struct JsonTransformer {
    job_id: String,
}

impl JsonTransformer {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self { job_id: job_id.into() }
    }

    fn annotation(&self, index: usize, feature: &Map<String, Value>) -> Result<Annotation> {
        let start = coordinate(first(feature, START_KEYS), index)?;
        let end = coordinate(first(feature, END_KEYS), index)?;

        let contig = first(feature, CONTIG_KEYS)
            .and_then(text)
            .unwrap_or_else(|| UNKNOWN.to_string());
        let feature_id = first(feature, ID_KEYS)
            .and_then(text)
            .unwrap_or_else(|| synthetic_id(&contig, start, end));
        let feature_type = first(feature, TYPE_KEYS)
            .and_then(text)
            .unwrap_or_else(|| UNKNOWN.to_string());

        let attributes: Attributes = feature
            .iter()
            .filter(|(key, _)| !is_core(key))
            .filter_map(|(key, value)| attribute(value).map(|v| (key.clone(), v)))
            .collect();

        Ok(Annotation::new(
            self.job_id.clone(),
            feature_id,
            feature_type,
            contig,
            start,
            end,
            strand(first(feature, STRAND_KEYS)),
        )
        .with_attributes(attributes))
    }
}

impl Transform for JsonTransformer {
    fn format(&self) -> FileFormat {
        FileFormat::Json
    }

    fn job_id(&self) -> &str {
        &self.job_id
    }

    fn transform(&self, document: &Document) -> Result<Records> {
        let Document::Json(doc) = document else {
            return Err(mismatch(FileFormat::Json, document));
        };

        if doc.format_tag() != Some(FileFormat::Json.name()) {
            return Err(BaktaError::transform(
                FileFormat::Json,
                format!("document has no '{}' tag", FORMAT_TAG),
            ));
        }
        let features = doc
            .features()
            .ok_or_else(|| BaktaError::transform(FileFormat::Json, "document has no 'features' array"))?;

        features
            .iter()
            .enumerate()
            .map(|(i, value)| match value {
                Value::Object(feature) => self.annotation(i, feature),
                _ => Err(BaktaError::transform(
                    FileFormat::Json,
                    format!("feature {} is not an object", i),
                )),
            })
            .collect::<Result<Vec<_>>>()
            .map(Records::Annotations)
    }
}
