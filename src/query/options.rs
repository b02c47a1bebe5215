use super::condition::{compare_values, ConditionSet, Field, LogicalOperator, QueryCondition};
use crate::bio::Annotation;
use crate::{BaktaError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortOrder {
    type Err = BaktaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            other => Err(BaktaError::InvalidQuery(format!("unknown sort order '{}'", other))),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Ascending => f.write_str("asc"),
            SortOrder::Descending => f.write_str("desc"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    #[serde(default)]
    pub order: SortOrder,
}

impl SortSpec {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Descending,
        }
    }
}

/// Filter, sort and page for one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default)]
    pub filter: ConditionSet,
    #[serde(default)]
    pub sort: Option<SortSpec>,
    /// `None` is unbounded.
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: usize,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, condition: QueryCondition) -> Self {
        self.filter.push(condition);
        self
    }

    pub fn combine(mut self, operator: LogicalOperator) -> Self {
        self.filter.operator = operator;
        self
    }

    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

/// One page of matches. `total` counts all matches, ignoring the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub items: Vec<Annotation>,
    pub total: usize,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl QueryResult {
    pub fn has_more(&self) -> bool {
        self.offset + self.items.len() < self.total
    }
}

/// Stable sort by `spec`. Records missing a sort attribute come first when
/// ascending; descending reverses the whole ordering.
pub fn sort_annotations(items: &mut [Annotation], spec: &SortSpec) -> Result<()> {
    let field = Field::resolve(&spec.field, false)?;
    let numeric_text = matches!(field, Field::Attribute(_));

    items.sort_by(|a, b| {
        let ordering = match (field.value_of(a), field.value_of(b)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => compare_values(&x, &y, numeric_text),
        };
        match spec.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
    Ok(())
}

/// Applies `offset` then `limit`. An offset past the end yields nothing.
pub fn paginate<T>(items: Vec<T>, limit: Option<usize>, offset: usize) -> Vec<T> {
    items
        .into_iter()
        .skip(offset)
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}
