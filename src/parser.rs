//! Parse format strings into a [`FormatDescriptor`] using PEST.

use crate::ast::{FormatDescriptor, FormatItem};
use crate::codec::CodecError;
use crate::table::{order_spec, type_spec, OrderSpec};
use pest::Parser;
use pest_derive::Parser as PestParser;

#[derive(PestParser)]
#[grammar = "grammar.pest"]
struct FormatParser;

/// Parse a format string into its descriptor.
pub fn parse(format: &str) -> Result<FormatDescriptor, CodecError> {
    let pairs = FormatParser::parse(Rule::format, format)
        .map_err(|e| CodecError::Syntax(e.to_string()))?;
    let pair = pairs.into_iter().next().ok_or_else(|| CodecError::Syntax("empty parse".to_string()))?;
    let descriptor = build_descriptor(pair)?;
    tracing::debug!(
        fmt = format,
        items = descriptor.items.len(),
        size = descriptor.size(),
        "parsed format"
    );
    Ok(descriptor)
}

/// Size in bytes of one record described by `format`.
pub fn calcsize(format: &str) -> Result<usize, CodecError> {
    Ok(parse(format)?.size())
}

fn build_descriptor(pair: pest::iterators::Pair<Rule>) -> Result<FormatDescriptor, CodecError> {
    let mut order = OrderSpec::default();
    let mut items = Vec::new();
    let mut total = 0usize;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::order => {
                let c = first_char(inner.as_str())?;
                order = *order_spec(c).ok_or(CodecError::BadChar(c))?;
            }
            Rule::item => {
                let item = build_item(inner)?;
                // Record size must fit in one allocation.
                total = item
                    .count
                    .checked_mul(item.spec.width)
                    .and_then(|len| total.checked_add(len))
                    .filter(|&t| t <= isize::MAX as usize)
                    .ok_or_else(|| CodecError::InvalidRepeatCount(item.count.to_string()))?;
                items.push(item);
            }
            Rule::dangling => {
                return Err(CodecError::MissingTypeCode(inner.as_str().to_string()));
            }
            _ => {}
        }
    }

    Ok(FormatDescriptor { order, items })
}

fn build_item(pair: pest::iterators::Pair<Rule>) -> Result<FormatItem, CodecError> {
    let mut count = 1usize;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::count => count = parse_count(inner.as_str())?,
            Rule::code => {
                let c = first_char(inner.as_str())?;
                let spec = type_spec(c).ok_or(CodecError::BadChar(c))?;
                return Ok(FormatItem { count, spec });
            }
            _ => {}
        }
    }
    Err(CodecError::Syntax("item without format character".to_string()))
}

/// Decimal repeat count, most significant digit first. Zero is rejected.
fn parse_count(digits: &str) -> Result<usize, CodecError> {
    match digits.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CodecError::InvalidRepeatCount(digits.to_string())),
    }
}

fn first_char(s: &str) -> Result<char, CodecError> {
    s.chars().next().ok_or_else(|| CodecError::Syntax("empty token".to_string()))
}
