//! Textual conditions: `FIELD OP VALUE`.
//!
//! ```text
//! feature_type == CDS
//! start >= 1000
//! attributes.product ~ polymerase
//! contig in contig_1,contig_2
//! end between 100..500
//! ```

use super::condition::{Operator, QueryCondition, QueryValue};
use crate::{BaktaError, Result};
use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while1},
    character::complete::{multispace0, multispace1},
    combinator::{rest, value},
    sequence::terminated,
    IResult,
};
use std::str::FromStr;

fn field(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '.' || c == '-')(input)
}

fn operator(input: &str) -> IResult<&str, Operator> {
    alt((
        value(Operator::Eq, tag("==")),
        value(Operator::Ne, tag("!=")),
        value(Operator::Ge, tag(">=")),
        value(Operator::Le, tag("<=")),
        value(Operator::Gt, tag(">")),
        value(Operator::Lt, tag("<")),
        value(Operator::Eq, tag("=")),
        value(Operator::Contains, tag("~")),
        value(Operator::Contains, terminated(tag_no_case("contains"), multispace1)),
        value(Operator::Between, terminated(tag_no_case("between"), multispace1)),
        value(Operator::In, terminated(tag_no_case("in"), multispace1)),
    ))(input)
}

fn expression(input: &str) -> IResult<&str, (&str, Operator, &str)> {
    let (input, _) = multispace0(input)?;
    let (input, name) = field(input)?;
    let (input, _) = multispace0(input)?;
    let (input, op) = operator(input)?;
    let (input, _) = multispace0(input)?;
    let (input, operand) = rest(input)?;
    Ok((input, (name, op, operand.trim())))
}

fn unquote(text: &str) -> &str {
    let text = text.trim();
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}

fn operand(op: Operator, text: &str) -> std::result::Result<QueryValue, String> {
    let list = |parts: Vec<&str>| QueryValue::List(parts.into_iter().map(|p| QueryValue::from(unquote(p))).collect());

    match op {
        Operator::In => {
            let parts: Vec<&str> = text.split(',').map(str::trim).filter(|p| !p.is_empty()).collect();
            if parts.is_empty() {
                return Err("'in' needs at least one value".to_string());
            }
            Ok(list(parts))
        }
        Operator::Between => {
            let parts: Vec<&str> = if text.contains("..") {
                text.split("..").collect()
            } else {
                text.split(',').collect()
            };
            if parts.len() != 2 || parts.iter().any(|p| p.trim().is_empty()) {
                return Err("'between' needs two values, as 'lo,hi' or 'lo..hi'".to_string());
            }
            Ok(list(parts))
        }
        _ if text.is_empty() => Err("missing value".to_string()),
        _ => Ok(QueryValue::from(unquote(text))),
    }
}

/// Parses `FIELD OP VALUE`. Values stay text; integer fields coerce them
/// when the condition is compiled.
pub fn parse_condition(text: &str) -> Result<QueryCondition> {
    let invalid = |reason: &str| BaktaError::InvalidQuery(format!("cannot parse condition '{}': {}", text, reason));

    let (_, (name, op, raw)) = expression(text).map_err(|_| invalid("expected FIELD OP VALUE"))?;
    let value = operand(op, raw).map_err(|reason| invalid(&reason))?;

    Ok(QueryCondition::new(name, op, value))
}

impl FromStr for QueryCondition {
    type Err = BaktaError;

    fn from_str(s: &str) -> Result<Self> {
        parse_condition(s)
    }
}
