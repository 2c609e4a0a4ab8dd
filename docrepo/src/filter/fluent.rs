use crate::common::Value;

use super::{Filter, RegexPattern};

/// Starts a filter on the named field.
///
/// Field names are the declared entity field names; the repository rewrites
/// them to stored names (and the identifier field to `_id`) before the filter
/// reaches a backend. Dotted names address embedded fields.
pub fn field(field_name: &str) -> FluentFilter {
    FluentFilter {
        field_name: field_name.to_string(),
    }
}

/// A builder for filters on one field.
pub struct FluentFilter {
    field_name: String,
}

impl FluentFilter {
    /// Matches documents where the field equals the value.
    #[inline]
    pub fn eq<T: Into<Value>>(self, value: T) -> Filter {
        Filter::Eq(self.field_name, value.into())
    }

    /// Matches documents where the field does not equal the value.
    #[inline]
    pub fn ne<T: Into<Value>>(self, value: T) -> Filter {
        Filter::Ne(self.field_name, value.into())
    }

    #[inline]
    pub fn gt<T: Into<Value>>(self, value: T) -> Filter {
        Filter::Gt(self.field_name, value.into())
    }

    #[inline]
    pub fn gte<T: Into<Value>>(self, value: T) -> Filter {
        Filter::Gte(self.field_name, value.into())
    }

    #[inline]
    pub fn lt<T: Into<Value>>(self, value: T) -> Filter {
        Filter::Lt(self.field_name, value.into())
    }

    #[inline]
    pub fn lte<T: Into<Value>>(self, value: T) -> Filter {
        Filter::Lte(self.field_name, value.into())
    }

    /// Matches documents where the field lies in the inclusive range.
    pub fn between<T: Into<Value>>(self, lower: T, upper: T) -> Filter {
        Filter::And(vec![
            Filter::Gte(self.field_name.clone(), lower.into()),
            Filter::Lte(self.field_name, upper.into()),
        ])
    }

    /// Matches documents where the field equals one of the values.
    pub fn in_array<T: Into<Value>>(self, values: Vec<T>) -> Filter {
        Filter::In(self.field_name, values.into_iter().map(Into::into).collect())
    }

    /// Matches documents where the field equals none of the values.
    pub fn not_in_array<T: Into<Value>>(self, values: Vec<T>) -> Filter {
        Filter::Not(Box::new(self.in_array(values)))
    }

    /// Matches documents whose string field matches the regular expression.
    ///
    /// An invalid pattern is reported when the filter is evaluated.
    pub fn regex(self, pattern: &str) -> Filter {
        Filter::Regex(self.field_name, RegexPattern::new(pattern))
    }
}
