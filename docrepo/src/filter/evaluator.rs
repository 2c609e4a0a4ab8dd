use crate::collection::Document;
use crate::common::Value;
use crate::errors::DocRepoResult;
use std::cmp::Ordering;

use super::{unsupported_raw_filter, DocumentPredicate, Filter};

const IN_PROCESS: &str = "in-process";

impl Filter {
    /// Evaluates this filter against a stored document.
    ///
    /// Follows document-store query semantics:
    /// - a missing field reads as null, so `eq(field, null)` matches it;
    /// - an array field matches `eq` and `in` when any element matches;
    /// - ordering comparisons only hold between values of the same type bracket;
    /// - `regex` only matches string values.
    ///
    /// # Errors
    ///
    /// Returns [crate::errors::ErrorKind::FilterError] for an invalid regular
    /// expression or a raw filter that is not a [DocumentPredicate].
    pub fn apply(&self, document: &Document) -> DocRepoResult<bool> {
        match self {
            Filter::All => Ok(true),
            Filter::Eq(field, value) => Ok(matches_eq(&document.get(field)?, value)),
            Filter::Ne(field, value) => Ok(!matches_eq(&document.get(field)?, value)),
            Filter::Gt(field, value) => Ok(matches_ordering(&document.get(field)?, value, |o| o == Ordering::Greater)),
            Filter::Gte(field, value) => Ok(matches_ordering(&document.get(field)?, value, |o| o != Ordering::Less)),
            Filter::Lt(field, value) => Ok(matches_ordering(&document.get(field)?, value, |o| o == Ordering::Less)),
            Filter::Lte(field, value) => Ok(matches_ordering(&document.get(field)?, value, |o| o != Ordering::Greater)),
            Filter::In(field, values) => {
                let field_value = document.get(field)?;
                Ok(values.iter().any(|v| matches_eq(&field_value, v)))
            }
            Filter::Regex(field, pattern) => {
                let regex = pattern.regex()?;
                let field_value = document.get(field)?;
                let matched = candidates(&field_value)
                    .any(|v| v.as_str().map(|s| regex.is_match(s)).unwrap_or(false));
                Ok(matched)
            }
            Filter::And(filters) => {
                for filter in filters {
                    if !filter.apply(document)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Filter::Or(filters) => {
                for filter in filters {
                    if filter.apply(document)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Filter::Not(filter) => Ok(!filter.apply(document)?),
            Filter::Raw(raw) => match raw.downcast_ref::<DocumentPredicate>() {
                Some(predicate) => Ok(predicate.test(document)),
                None => Err(unsupported_raw_filter(raw, IN_PROCESS)),
            },
        }
    }
}

// the field value itself, then each element when it is an array
fn candidates(field_value: &Value) -> Box<dyn Iterator<Item = &Value> + '_> {
    match field_value {
        Value::Array(items) => Box::new(std::iter::once(field_value).chain(items.iter())),
        _ => Box::new(std::iter::once(field_value)),
    }
}

fn matches_eq(field_value: &Value, expected: &Value) -> bool {
    candidates(field_value).any(|v| v == expected)
}

fn matches_ordering(field_value: &Value, expected: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
    candidates(field_value)
        .filter(|v| !v.is_null() && v.is_comparable_with(expected))
        .any(|v| accept(v.cmp(expected)))
}
