use crate::common::{Value, FIELD_SEPARATOR};
use crate::errors::{DocRepoError, DocRepoResult, ErrorKind};
use indexmap::IndexMap;
use itertools::Itertools;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt::{Debug, Display};

type FieldVec = SmallVec<[String; 8]>;

/// An insertion-ordered set of key-value pairs as stored in a collection.
///
/// Keys are [String]s and values are [Value]s. Embedded documents are addressed
/// with dotted keys, so `document.get("engine.serial")` reads the `serial` field
/// of the document stored under `engine`.
///
/// Field order is significant: two documents are equal only if they hold the
/// same pairs in the same order, which matches how document stores compare
/// embedded documents.
#[derive(Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Document {
    data: IndexMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Document {
            data: IndexMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of top level fields.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Associates the value with the key.
    ///
    /// Dotted keys create or update embedded documents on the way down, so
    /// `put("engine.serial", "X1")` on an empty document produces
    /// `{"engine": {"serial": "X1"}}`.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::InvalidArgument] if the key, or any segment of a dotted
    /// key, is empty.
    pub fn put<T: Into<Value>>(&mut self, key: &str, value: T) -> DocRepoResult<()> {
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(DocRepoError::new(
                "Document does not support empty key",
                ErrorKind::InvalidArgument,
            ));
        }

        if self.is_embedded(key) {
            let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
            self.deep_put(&splits, value.into())
        } else {
            self.data.insert(key.to_string(), value.into());
            Ok(())
        }
    }

    /// Inserts a top level pair without interpreting dots in the key.
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        self.data.insert(key, value)
    }

    /// Returns the value at the key, or [Value::Null] if absent.
    ///
    /// Dotted keys walk embedded documents. A numeric segment indexes into an
    /// array; any other segment applied to an array collects that field from
    /// every element.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::InvalidArgument] for an empty key segment or an
    /// out-of-bounds array index.
    pub fn get(&self, key: &str) -> DocRepoResult<Value> {
        if let Some(value) = self.data.get(key) {
            return Ok(value.clone());
        }

        if self.is_embedded(key) {
            let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
            if splits[0].is_empty() {
                log::error!("Document does not support empty key");
                return Err(DocRepoError::new(
                    "Document does not support empty key",
                    ErrorKind::InvalidArgument,
                ));
            }
            return self.recursive_get(self.data.get(splits[0]), &splits[1..]);
        }
        Ok(Value::Null)
    }

    /// Borrows a top level value.
    pub fn get_ref(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Removes a top level field, keeping the order of the remaining ones.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Checks whether a possibly dotted field path exists.
    pub fn contains_field(&self, field: &str) -> bool {
        if self.contains_key(field) {
            return true;
        }
        self.fields().iter().any(|f| f == field)
    }

    /// Top level keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> indexmap::map::IterMut<'_, String, Value> {
        self.data.iter_mut()
    }

    /// All leaf field paths, embedded ones in dotted form.
    pub fn fields(&self) -> FieldVec {
        self.get_fields_internal("")
    }

    /// Merges `other` into this document.
    ///
    /// Embedded documents present on both sides are merged recursively; any
    /// other value from `other` replaces the existing one.
    pub fn merge(&mut self, other: &Document) {
        for (key, value) in other.data.iter() {
            match (self.data.get_mut(key), value) {
                (Some(Value::Document(existing)), Value::Document(incoming)) => {
                    existing.merge(incoming);
                }
                _ => {
                    self.data.insert(key.clone(), value.clone());
                }
            }
        }
    }

    pub(crate) fn to_json(&self) -> String {
        format!(
            "{{{}}}",
            self.data
                .iter()
                .map(|(k, v)| format!("{:?}: {}", k, v.to_json()))
                .join(", ")
        )
    }

    fn is_embedded(&self, key: &str) -> bool {
        key.contains(FIELD_SEPARATOR)
    }

    fn get_fields_internal(&self, prefix: &str) -> FieldVec {
        let mut fields = FieldVec::new();
        for (key, value) in self.data.iter() {
            let field = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}{}{}", prefix, FIELD_SEPARATOR, key)
            };

            match value {
                Value::Document(doc) if !doc.is_empty() => {
                    fields.extend(doc.get_fields_internal(&field));
                }
                _ => fields.push(field),
            }
        }
        fields
    }

    fn deep_put(&mut self, splits: &[&str], value: Value) -> DocRepoResult<()> {
        let key = splits[0];
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(DocRepoError::new(
                "Document does not support empty key",
                ErrorKind::InvalidArgument,
            ));
        }

        if splits.len() == 1 {
            self.data.insert(key.to_string(), value);
            return Ok(());
        }

        match self.data.get_mut(key) {
            Some(Value::Document(nested)) => nested.deep_put(&splits[1..], value),
            _ => {
                let mut nested = Document::new();
                nested.deep_put(&splits[1..], value)?;
                self.data.insert(key.to_string(), Value::Document(nested));
                Ok(())
            }
        }
    }

    fn recursive_get(&self, value: Option<&Value>, splits: &[&str]) -> DocRepoResult<Value> {
        let value = match value {
            None => return Ok(Value::Null),
            Some(v) => v,
        };

        if splits.is_empty() {
            return Ok(value.clone());
        }

        let key = splits[0];
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(DocRepoError::new(
                "Document does not support empty key",
                ErrorKind::InvalidArgument,
            ));
        }

        match value {
            Value::Document(obj) => self.recursive_get(obj.data.get(key), &splits[1..]),
            Value::Array(arr) => {
                if let Ok(index) = key.parse::<usize>() {
                    match arr.get(index) {
                        Some(item) => self.recursive_get(Some(item), &splits[1..]),
                        None => {
                            log::error!("Array index {} out of bound", index);
                            Err(DocRepoError::new(
                                &format!("Array index {} out of bound", index),
                                ErrorKind::InvalidArgument,
                            ))
                        }
                    }
                } else {
                    self.decompose(arr, splits)
                }
            }
            _ => Ok(Value::Null),
        }
    }

    fn decompose(&self, arr: &[Value], splits: &[&str]) -> DocRepoResult<Value> {
        let mut items: Vec<Value> = Vec::with_capacity(arr.len());
        for item in arr {
            match self.recursive_get(Some(item), splits)? {
                Value::Array(values) => items.extend(values),
                Value::Null => {}
                value => items.push(value),
            }
        }
        Ok(Value::Array(items))
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.data.len() == other.data.len() && self.data.iter().eq(other.data.iter())
    }
}

impl Eq for Document {}

impl PartialOrd for Document {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Document {
    fn cmp(&self, other: &Self) -> Ordering {
        self.data.iter().cmp(other.data.iter())
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.data
                .iter()
                .map(|(k, v)| format!("{:?}: {:?}", k, v))
                .join(", ")
        )
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Document {
            data: iter.into_iter().collect(),
        }
    }
}

pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a [Document] with JSON-like syntax.
///
/// ```rust
/// use docrepo::doc;
///
/// let price = 100;
/// let car = doc! {
///     car_name: "Roadster",
///     price: (price * 2),
///     engine: { serial: "X1", cylinders: 8 },
///     tags: ["fast", "red"],
/// };
/// assert_eq!(car.size(), 4);
/// ```
#[macro_export]
macro_rules! doc {
    ({}) => {
        $crate::collection::Document::new()
    };

    () => {
        $crate::collection::Document::new()
    };

    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::doc!($($key : $value),*)
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::doc_value;

            let mut doc = $crate::collection::Document::new();
            $(
                doc.insert($crate::collection::normalize(stringify!($key)), $crate::doc_value!($value));
            )*
            doc
        }
    };
}

/// Converts one `doc!` value: nested documents, arrays or any expression.
#[macro_export]
macro_rules! doc_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}
