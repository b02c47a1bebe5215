//! Field/operator/value conditions and their evaluation against annotations.
//!
//! A [`QueryCondition`] is plain data (serializable, part of cache keys).
//! Before evaluation it is compiled once into a [`CompiledCondition`]: the
//! field name is resolved, the value is coerced to the field's type and the
//! operand shape is checked against the operator. Usage errors surface at
//! compile time as [`BaktaError::InvalidQuery`].

use crate::bio::{strip_attribute_prefix, Annotation};
use crate::{BaktaError, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    /// Case-insensitive substring test.
    Contains,
    /// Membership in a list operand.
    In,
    /// Inclusive two-sided range; operand is a two-element list.
    Between,
}

impl Operator {
    pub const ALL: [Operator; 9] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Lt,
        Operator::Ge,
        Operator::Le,
        Operator::Contains,
        Operator::In,
        Operator::Between,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::Contains => "~",
            Operator::In => "in",
            Operator::Between => "between",
        }
    }

    fn is_ordering(&self) -> bool {
        matches!(self, Operator::Gt | Operator::Lt | Operator::Ge | Operator::Le)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = BaktaError;

    fn from_str(s: &str) -> Result<Self> {
        let op = match s.trim().to_ascii_lowercase().as_str() {
            "==" | "=" | "eq" => Operator::Eq,
            "!=" | "ne" => Operator::Ne,
            ">" | "gt" => Operator::Gt,
            "<" | "lt" => Operator::Lt,
            ">=" | "ge" | "gte" => Operator::Ge,
            "<=" | "le" | "lte" => Operator::Le,
            "~" | "contains" => Operator::Contains,
            "in" => Operator::In,
            "between" => Operator::Between,
            other => return Err(BaktaError::InvalidQuery(format!("unknown operator '{}'", other))),
        };
        Ok(op)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOperator::And => f.write_str("AND"),
            LogicalOperator::Or => f.write_str("OR"),
        }
    }
}

/// Right-hand side of a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<QueryValue>),
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Text(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Int(value)
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        QueryValue::Int(value as i64)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

impl<T: Into<QueryValue>> From<Vec<T>> for QueryValue {
    fn from(values: Vec<T>) -> Self {
        QueryValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Bool(b) => write!(f, "{}", b),
            QueryValue::Int(i) => write!(f, "{}", i),
            QueryValue::Text(s) => f.write_str(s),
            QueryValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

/// `field operator value`. With `is_attribute` set (or a dotted
/// `attributes.<name>` field) the lookup goes through the attribute map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryCondition {
    pub field: String,
    pub operator: Operator,
    pub value: QueryValue,
    #[serde(default)]
    pub is_attribute: bool,
}

impl QueryCondition {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<QueryValue>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
            is_attribute: false,
        }
    }

    pub fn attribute(name: impl Into<String>, operator: Operator, value: impl Into<QueryValue>) -> Self {
        Self {
            is_attribute: true,
            ..Self::new(name, operator, value)
        }
    }

    pub fn compile(&self) -> Result<CompiledCondition> {
        let field = Field::resolve(&self.field, self.is_attribute)?;
        let operand = Operand::build(&field, self.operator, &self.value)
            .map_err(|reason| BaktaError::InvalidQuery(format!("{}: {}", self, reason)))?;
        Ok(CompiledCondition {
            field,
            operator: self.operator,
            operand,
        })
    }

    /// Compiles and evaluates in one step. Prefer [`ConditionSet::compile`]
    /// when testing many records.
    pub fn matches(&self, annotation: &Annotation) -> Result<bool> {
        Ok(self.compile()?.matches(annotation))
    }
}

impl fmt::Display for QueryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_attribute && strip_attribute_prefix(&self.field).is_none() {
            write!(f, "attributes.{} {} {}", self.field, self.operator, self.value)
        } else {
            write!(f, "{} {} {}", self.field, self.operator, self.value)
        }
    }
}

/// Resolved field reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Field {
    JobId,
    FeatureId,
    FeatureType,
    Contig,
    Start,
    End,
    Strand,
    Attribute(String),
}

/// Value read from an annotation for comparison.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FieldValue<'a> {
    Int(i64),
    Text(Cow<'a, str>),
}

impl Field {
    pub(crate) const NAMES: [&'static str; 7] =
        ["job_id", "feature_id", "feature_type", "contig", "start", "end", "strand"];

    pub(crate) fn resolve(name: &str, is_attribute: bool) -> Result<Self> {
        if let Some(key) = strip_attribute_prefix(name) {
            return Ok(Field::Attribute(key.to_string()));
        }
        if is_attribute {
            if name.is_empty() {
                return Err(BaktaError::InvalidQuery("empty attribute name".to_string()));
            }
            return Ok(Field::Attribute(name.to_string()));
        }

        let field = match name {
            "job_id" => Field::JobId,
            "feature_id" => Field::FeatureId,
            "feature_type" | "type" => Field::FeatureType,
            "contig" => Field::Contig,
            "start" => Field::Start,
            "end" => Field::End,
            "strand" => Field::Strand,
            other => {
                return Err(BaktaError::InvalidQuery(format!(
                    "unknown field '{}' (expected one of {} or attributes.<name>)",
                    other,
                    Self::NAMES.join(", ")
                )))
            }
        };
        Ok(field)
    }

    pub(crate) fn is_integer(&self) -> bool {
        matches!(self, Field::Start | Field::End)
    }

    /// `None` only for a missing attribute.
    pub(crate) fn value_of<'a>(&self, annotation: &'a Annotation) -> Option<FieldValue<'a>> {
        let text = |s: &'a str| Some(FieldValue::Text(Cow::Borrowed(s)));
        match self {
            Field::JobId => text(&annotation.job_id),
            Field::FeatureId => text(&annotation.feature_id),
            Field::FeatureType => text(&annotation.feature_type),
            Field::Contig => text(&annotation.contig),
            Field::Start => Some(FieldValue::Int(annotation.start)),
            Field::End => Some(FieldValue::Int(annotation.end)),
            Field::Strand => text(annotation.strand.as_str()),
            Field::Attribute(key) => annotation
                .attributes
                .get(key)
                .map(|value| FieldValue::Text(value.as_text())),
        }
    }
}

/// Natural ordering of two field values. Integers compare numerically.
/// With `numeric_text`, numbers sort before non-numeric text, numbers
/// compare by value and text compares lexicographically.
pub(crate) fn compare_values(left: &FieldValue<'_>, right: &FieldValue<'_>, numeric_text: bool) -> Ordering {
    match (left, right) {
        (FieldValue::Int(a), FieldValue::Int(b)) => a.cmp(b),
        (FieldValue::Int(a), FieldValue::Text(b)) => a.to_string().as_str().cmp(b.as_ref()),
        (FieldValue::Text(a), FieldValue::Int(b)) => a.as_ref().cmp(b.to_string().as_str()),
        (FieldValue::Text(a), FieldValue::Text(b)) => compare_text(a, b, numeric_text),
    }
}

fn compare_text(a: &str, b: &str, numeric: bool) -> Ordering {
    if !numeric {
        return a.cmp(b);
    }
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Scalar {
    Int(i64),
    Text(String),
}

impl Scalar {
    fn coerce(field: &Field, value: &QueryValue) -> std::result::Result<Self, String> {
        if field.is_integer() {
            return match value {
                QueryValue::Int(i) => Ok(Scalar::Int(*i)),
                QueryValue::Text(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Scalar::Int)
                    .map_err(|_| format!("'{}' is not an integer", s)),
                QueryValue::Bool(b) => Err(format!("'{}' is not an integer", b)),
                QueryValue::List(_) => Err("unexpected list value".to_string()),
            };
        }
        match value {
            QueryValue::Int(i) => Ok(Scalar::Text(i.to_string())),
            QueryValue::Text(s) => Ok(Scalar::Text(s.clone())),
            QueryValue::Bool(b) => Ok(Scalar::Text(b.to_string())),
            QueryValue::List(_) => Err("unexpected list value".to_string()),
        }
    }

    fn as_field_value(&self) -> FieldValue<'_> {
        match self {
            Scalar::Int(i) => FieldValue::Int(*i),
            Scalar::Text(s) => FieldValue::Text(Cow::Borrowed(s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    One(Scalar),
    Many(Vec<Scalar>),
    Range(Scalar, Scalar),
}

impl Operand {
    fn build(field: &Field, operator: Operator, value: &QueryValue) -> std::result::Result<Self, String> {
        match (operator, value) {
            (Operator::In, QueryValue::List(items)) => items
                .iter()
                .map(|item| Scalar::coerce(field, item))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(Operand::Many),
            (Operator::In, _) => Err("'in' requires a list of values".to_string()),
            (Operator::Between, QueryValue::List(items)) if items.len() == 2 => Ok(Operand::Range(
                Scalar::coerce(field, &items[0])?,
                Scalar::coerce(field, &items[1])?,
            )),
            (Operator::Between, _) => Err("'between' requires exactly two values".to_string()),
            (Operator::Contains, _) if field.is_integer() => {
                Err("'contains' cannot be applied to an integer field".to_string())
            }
            (Operator::Contains, value) => match Scalar::coerce(field, value)? {
                Scalar::Text(s) => Ok(Operand::One(Scalar::Text(s.to_lowercase()))),
                other => Ok(Operand::One(other)),
            },
            (_, value) => Scalar::coerce(field, value).map(Operand::One),
        }
    }
}

/// A condition with its field resolved and its operand type-checked.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledCondition {
    field: Field,
    operator: Operator,
    operand: Operand,
}

impl CompiledCondition {
    /// A missing attribute never matches, whatever the operator.
    pub fn matches(&self, annotation: &Annotation) -> bool {
        let Some(actual) = self.field.value_of(annotation) else {
            return false;
        };
        let numeric_text = matches!(self.field, Field::Attribute(_));
        let cmp = |scalar: &Scalar| compare_values(&actual, &scalar.as_field_value(), numeric_text);
        let equals = |scalar: &Scalar| cmp(scalar) == Ordering::Equal;

        match (&self.operand, self.operator) {
            (Operand::One(scalar), Operator::Eq) => equals(scalar),
            (Operand::One(scalar), Operator::Ne) => !equals(scalar),
            (Operand::One(scalar), op) if op.is_ordering() => {
                let ordering = cmp(scalar);
                match op {
                    Operator::Gt => ordering == Ordering::Greater,
                    Operator::Lt => ordering == Ordering::Less,
                    Operator::Ge => ordering != Ordering::Less,
                    _ => ordering != Ordering::Greater,
                }
            }
            (Operand::One(Scalar::Text(needle)), Operator::Contains) => match &actual {
                FieldValue::Text(text) => text.to_lowercase().contains(needle.as_str()),
                FieldValue::Int(i) => i.to_string().contains(needle.as_str()),
            },
            (Operand::Many(options), Operator::In) => options.iter().any(equals),
            (Operand::Range(low, high), Operator::Between) => {
                cmp(low) != Ordering::Less && cmp(high) != Ordering::Greater
            }
            _ => false,
        }
    }
}

/// Conditions joined by a single logical operator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionSet {
    pub conditions: Vec<QueryCondition>,
    #[serde(default)]
    pub operator: LogicalOperator,
}

impl ConditionSet {
    pub fn new(conditions: Vec<QueryCondition>, operator: LogicalOperator) -> Self {
        Self { conditions, operator }
    }

    pub fn all(conditions: Vec<QueryCondition>) -> Self {
        Self::new(conditions, LogicalOperator::And)
    }

    pub fn any(conditions: Vec<QueryCondition>) -> Self {
        Self::new(conditions, LogicalOperator::Or)
    }

    pub fn push(&mut self, condition: QueryCondition) {
        self.conditions.push(condition);
    }

    pub fn with(mut self, condition: QueryCondition) -> Self {
        self.push(condition);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn compile(&self) -> Result<CompiledFilter> {
        Ok(CompiledFilter {
            conditions: self
                .conditions
                .iter()
                .map(QueryCondition::compile)
                .collect::<Result<Vec<_>>>()?,
            operator: self.operator,
        })
    }
}

impl fmt::Display for ConditionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, condition) in self.conditions.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", self.operator)?;
            }
            write!(f, "{}", condition)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFilter {
    conditions: Vec<CompiledCondition>,
    operator: LogicalOperator,
}

impl CompiledFilter {
    /// An empty filter matches everything.
    pub fn matches(&self, annotation: &Annotation) -> bool {
        if self.conditions.is_empty() {
            return true;
        }
        match self.operator {
            LogicalOperator::And => self.conditions.iter().all(|c| c.matches(annotation)),
            LogicalOperator::Or => self.conditions.iter().any(|c| c.matches(annotation)),
        }
    }
}
