use crate::collection::Document;
use crate::common::Value;
use crate::errors::{DocRepoError, DocRepoResult, ErrorKind};
use itertools::Itertools;
use regex::Regex;
use std::any::Any;
use std::fmt::{Debug, Display, Formatter};
use std::sync::{Arc, OnceLock};

/// A predicate selecting documents of a collection.
///
/// Filters are plain values: build them with [crate::filter::field] and the
/// combinators, pass them to a repository, and each backend translates them
/// into its own query form. [Filter::Raw] carries a predicate in a backend's
/// native form for queries the portable variants cannot express.
///
/// The default filter is [Filter::All], which matches every document.
///
/// ```rust
/// use docrepo::filter::{field, Filter};
///
/// let filter = field("price").gt(10).and(field("color").eq("red"));
/// assert_eq!(filter.to_string(), "((price > 10) && (color == \"red\"))");
/// assert!(matches!(Filter::default(), Filter::All));
/// ```
#[derive(Clone, Default)]
pub enum Filter {
    /// Matches every document.
    #[default]
    All,
    /// Field equals the value. An array field matches when any element equals it.
    Eq(String, Value),
    /// Negation of [Filter::Eq].
    Ne(String, Value),
    /// Field is greater than the value.
    Gt(String, Value),
    /// Field is greater than or equal to the value.
    Gte(String, Value),
    /// Field is less than the value.
    Lt(String, Value),
    /// Field is less than or equal to the value.
    Lte(String, Value),
    /// Field equals any of the values.
    In(String, Vec<Value>),
    /// String field matches the regular expression.
    Regex(String, RegexPattern),
    /// Every inner filter matches. An empty list matches everything.
    And(Vec<Filter>),
    /// At least one inner filter matches. An empty list matches nothing.
    Or(Vec<Filter>),
    /// The inner filter does not match.
    Not(Box<Filter>),
    /// Backend-native predicate.
    Raw(RawFilter),
}

impl Filter {
    /// Combines this filter with `other`, both must match.
    pub fn and(self, other: Filter) -> Filter {
        match self {
            Filter::And(mut filters) => {
                filters.push(other);
                Filter::And(filters)
            }
            filter => Filter::And(vec![filter, other]),
        }
    }

    /// Combines this filter with `other`, either may match.
    pub fn or(self, other: Filter) -> Filter {
        match self {
            Filter::Or(mut filters) => {
                filters.push(other);
                Filter::Or(filters)
            }
            filter => Filter::Or(vec![filter, other]),
        }
    }

    /// Negates this filter.
    pub fn not(self) -> Filter {
        Filter::Not(Box::new(self))
    }

    pub fn is_match_all(&self) -> bool {
        matches!(self, Filter::All)
    }

    /// Returns a copy of this filter with every field name rewritten by `f`.
    ///
    /// Raw filters are opaque and copied unchanged.
    pub fn map_field_names(&self, f: &dyn Fn(&str) -> String) -> Filter {
        match self {
            Filter::All => Filter::All,
            Filter::Eq(field, value) => Filter::Eq(f(field.as_str()), value.clone()),
            Filter::Ne(field, value) => Filter::Ne(f(field.as_str()), value.clone()),
            Filter::Gt(field, value) => Filter::Gt(f(field.as_str()), value.clone()),
            Filter::Gte(field, value) => Filter::Gte(f(field.as_str()), value.clone()),
            Filter::Lt(field, value) => Filter::Lt(f(field.as_str()), value.clone()),
            Filter::Lte(field, value) => Filter::Lte(f(field.as_str()), value.clone()),
            Filter::In(field, values) => Filter::In(f(field.as_str()), values.clone()),
            Filter::Regex(field, pattern) => Filter::Regex(f(field.as_str()), pattern.clone()),
            Filter::And(filters) => Filter::And(filters.iter().map(|x| x.map_field_names(f)).collect()),
            Filter::Or(filters) => Filter::Or(filters.iter().map(|x| x.map_field_names(f)).collect()),
            Filter::Not(filter) => Filter::Not(Box::new(filter.map_field_names(f))),
            Filter::Raw(raw) => Filter::Raw(raw.clone()),
        }
    }

    /// Returns a copy of this filter with every compared value rewritten by `f`.
    pub fn map_values(&self, f: &dyn Fn(&Value) -> Value) -> Filter {
        match self {
            Filter::Eq(field, value) => Filter::Eq(field.clone(), f(value)),
            Filter::Ne(field, value) => Filter::Ne(field.clone(), f(value)),
            Filter::Gt(field, value) => Filter::Gt(field.clone(), f(value)),
            Filter::Gte(field, value) => Filter::Gte(field.clone(), f(value)),
            Filter::Lt(field, value) => Filter::Lt(field.clone(), f(value)),
            Filter::Lte(field, value) => Filter::Lte(field.clone(), f(value)),
            Filter::In(field, values) => Filter::In(field.clone(), values.iter().map(f).collect()),
            Filter::And(filters) => Filter::And(filters.iter().map(|x| x.map_values(f)).collect()),
            Filter::Or(filters) => Filter::Or(filters.iter().map(|x| x.map_values(f)).collect()),
            Filter::Not(filter) => Filter::Not(Box::new(filter.map_values(f))),
            other => other.clone(),
        }
    }

    /// Checks whether any part of this filter is a raw filter.
    pub fn contains_raw(&self) -> bool {
        match self {
            Filter::Raw(_) => true,
            Filter::And(filters) | Filter::Or(filters) => filters.iter().any(|f| f.contains_raw()),
            Filter::Not(filter) => filter.contains_raw(),
            _ => false,
        }
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::All => write!(f, "(all)"),
            Filter::Eq(field, value) => write!(f, "({} == {})", field, value),
            Filter::Ne(field, value) => write!(f, "({} != {})", field, value),
            Filter::Gt(field, value) => write!(f, "({} > {})", field, value),
            Filter::Gte(field, value) => write!(f, "({} >= {})", field, value),
            Filter::Lt(field, value) => write!(f, "({} < {})", field, value),
            Filter::Lte(field, value) => write!(f, "({} <= {})", field, value),
            Filter::In(field, values) => {
                write!(f, "({} in [{}])", field, values.iter().join(", "))
            }
            Filter::Regex(field, pattern) => write!(f, "({} =~ /{}/)", field, pattern.as_str()),
            Filter::And(filters) => write!(f, "({})", filters.iter().join(" && ")),
            Filter::Or(filters) => write!(f, "({})", filters.iter().join(" || ")),
            Filter::Not(filter) => write!(f, "!{}", filter),
            Filter::Raw(raw) => write!(f, "raw({})", raw.description()),
        }
    }
}

impl Debug for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

/// A regular expression with its compiled form cached on first use.
#[derive(Clone)]
pub struct RegexPattern {
    pattern: String,
    compiled: Arc<OnceLock<Result<Regex, regex::Error>>>,
}

impl RegexPattern {
    pub fn new(pattern: &str) -> Self {
        RegexPattern {
            pattern: pattern.to_string(),
            compiled: Arc::new(OnceLock::new()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Compiled expression.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::FilterError] if the pattern is not a valid regex.
    pub fn regex(&self) -> DocRepoResult<&Regex> {
        match self.compiled.get_or_init(|| Regex::new(&self.pattern)) {
            Ok(regex) => Ok(regex),
            Err(err) => {
                log::error!("Invalid regex pattern {}: {}", self.pattern, err);
                Err(err.clone().into())
            }
        }
    }
}

/// A predicate in a backend's native form.
///
/// The in-process backend understands [DocumentPredicate]; the MongoDB
/// backend understands a `bson::Document` query. A backend handed a raw filter
/// of any other type fails the operation with [ErrorKind::FilterError].
///
/// Field names inside a raw filter are passed through untouched, so they must
/// already use the stored (policy-renamed) names.
#[derive(Clone)]
pub struct RawFilter {
    native: Arc<dyn Any + Send + Sync>,
    description: String,
}

impl RawFilter {
    pub fn new<T: Any + Send + Sync>(native: T) -> Self {
        RawFilter {
            native: Arc::new(native),
            description: std::any::type_name::<T>().to_string(),
        }
    }

    /// Replaces the text shown when the filter is displayed or logged.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Borrows the native predicate if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.native.downcast_ref::<T>()
    }
}

/// Native predicate of in-process backends: a closure over stored documents.
#[derive(Clone)]
pub struct DocumentPredicate {
    predicate: Arc<dyn Fn(&Document) -> bool + Send + Sync>,
}

impl DocumentPredicate {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Document) -> bool + Send + Sync + 'static,
    {
        DocumentPredicate {
            predicate: Arc::new(predicate),
        }
    }

    pub fn test(&self, document: &Document) -> bool {
        (self.predicate)(document)
    }
}

/// Creates a filter matching every document.
pub fn all() -> Filter {
    Filter::All
}

/// Creates a filter matching when every filter matches.
pub fn and(filters: Vec<Filter>) -> Filter {
    Filter::And(filters)
}

/// Creates a filter matching when any filter matches.
pub fn or(filters: Vec<Filter>) -> Filter {
    Filter::Or(filters)
}

/// Creates a filter matching when `filter` does not.
pub fn not(filter: Filter) -> Filter {
    Filter::Not(Box::new(filter))
}

/// Wraps a backend-native predicate.
pub fn raw<T: Any + Send + Sync>(native: T) -> Filter {
    Filter::Raw(RawFilter::new(native))
}

/// Creates a raw filter evaluated in-process against stored documents.
pub fn predicate<F>(predicate: F) -> Filter
where
    F: Fn(&Document) -> bool + Send + Sync + 'static,
{
    Filter::Raw(RawFilter::new(DocumentPredicate::new(predicate)).with_description("document predicate"))
}

pub(crate) fn unsupported_raw_filter(raw: &RawFilter, backend: &str) -> DocRepoError {
    log::error!("Raw filter {} is not supported by the {} backend", raw.description(), backend);
    DocRepoError::new(
        &format!("Raw filter {} is not supported by the {} backend", raw.description(), backend),
        ErrorKind::FilterError,
    )
}
