//! Query algebra and engine.

pub mod cache;
pub mod condition;
pub mod engine;
pub mod expr;
pub mod options;

pub use cache::{CacheKey, CacheStats, ResultCache};
pub use condition::{
    CompiledCondition, CompiledFilter, ConditionSet, LogicalOperator, Operator, QueryCondition, QueryValue,
};
pub use engine::{range_conditions, QueryEngine};
pub use expr::parse_condition;
pub use options::{paginate, sort_annotations, QueryOptions, QueryResult, SortOrder, SortSpec};
