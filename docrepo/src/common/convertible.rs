use crate::collection::{Document, ObjectId};
use crate::common::Value;
use crate::errors::{DocRepoError, DocRepoResult, ErrorKind};
use chrono::{DateTime, Utc};
use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// Two-way mapping between a Rust type and a [Value].
///
/// Entities implement it, usually through `#[derive(Convertible)]`, so the
/// repository can turn them into stored documents and back.
pub trait Convertible {
    type Output;

    fn to_value(&self) -> DocRepoResult<Value>;
    fn from_value(value: &Value) -> DocRepoResult<Self::Output>;
}

fn mapping_error(expected: &str, value: &Value) -> DocRepoError {
    log::error!("Value {} is not {}", value, expected);
    DocRepoError::new(
        &format!("Value of type {} is not {}", value.type_name(), expected),
        ErrorKind::ObjectMappingError,
    )
}

macro_rules! impl_convertible_for_int {
    ($($t:ty => $name:literal),* $(,)?) => {
        $(
            impl Convertible for $t {
                type Output = $t;

                fn to_value(&self) -> DocRepoResult<Value> {
                    Ok(Value::from(*self))
                }

                fn from_value(value: &Value) -> DocRepoResult<Self::Output> {
                    value
                        .as_integer()
                        .and_then(|i| <$t>::try_from(i).ok())
                        .ok_or_else(|| mapping_error($name, value))
                }
            }
        )*
    };
}

impl_convertible_for_int! {
    i8 => "an i8",
    i16 => "an i16",
    i32 => "an i32",
    i64 => "an i64",
    u8 => "a u8",
    u16 => "a u16",
    u32 => "a u32",
    usize => "a usize",
}

impl Convertible for u64 {
    type Output = u64;

    fn to_value(&self) -> DocRepoResult<Value> {
        Ok(Value::from(*self))
    }

    fn from_value(value: &Value) -> DocRepoResult<Self::Output> {
        match value {
            Value::I32(_) | Value::I64(_) => value
                .as_integer()
                .and_then(|i| u64::try_from(i).ok())
                .ok_or_else(|| mapping_error("a u64", value)),
            // large u64 values are stored as floats
            Value::F64(f) if f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64 => Ok(*f as u64),
            _ => Err(mapping_error("a u64", value)),
        }
    }
}

impl Convertible for f32 {
    type Output = f32;

    fn to_value(&self) -> DocRepoResult<Value> {
        Ok(Value::F64(*self as f64))
    }

    fn from_value(value: &Value) -> DocRepoResult<Self::Output> {
        value
            .as_decimal()
            .map(|f| f as f32)
            .ok_or_else(|| mapping_error("an f32", value))
    }
}

impl Convertible for f64 {
    type Output = f64;

    fn to_value(&self) -> DocRepoResult<Value> {
        Ok(Value::F64(*self))
    }

    fn from_value(value: &Value) -> DocRepoResult<Self::Output> {
        value.as_decimal().ok_or_else(|| mapping_error("an f64", value))
    }
}

impl Convertible for bool {
    type Output = bool;

    fn to_value(&self) -> DocRepoResult<Value> {
        Ok(Value::Bool(*self))
    }

    fn from_value(value: &Value) -> DocRepoResult<Self::Output> {
        value.as_bool().copied().ok_or_else(|| mapping_error("a bool", value))
    }
}

impl Convertible for String {
    type Output = String;

    fn to_value(&self) -> DocRepoResult<Value> {
        Ok(Value::String(self.clone()))
    }

    fn from_value(value: &Value) -> DocRepoResult<Self::Output> {
        value.as_string().cloned().ok_or_else(|| mapping_error("a string", value))
    }
}

impl Convertible for ObjectId {
    type Output = ObjectId;

    fn to_value(&self) -> DocRepoResult<Value> {
        Ok(Value::ObjectId(*self))
    }

    fn from_value(value: &Value) -> DocRepoResult<Self::Output> {
        match value {
            Value::ObjectId(id) => Ok(*id),
            Value::String(s) => ObjectId::parse_str(s),
            _ => Err(mapping_error("an object id", value)),
        }
    }
}

impl Convertible for Uuid {
    type Output = Uuid;

    fn to_value(&self) -> DocRepoResult<Value> {
        Ok(Value::Uuid(*self))
    }

    // string form is accepted so that uuids persisted as text read back
    fn from_value(value: &Value) -> DocRepoResult<Self::Output> {
        match value {
            Value::Uuid(id) => Ok(*id),
            Value::String(s) => Ok(Uuid::parse_str(s)?),
            Value::Bytes(b) => Ok(Uuid::from_slice(b)?),
            _ => Err(mapping_error("a uuid", value)),
        }
    }
}

impl Convertible for DateTime<Utc> {
    type Output = DateTime<Utc>;

    fn to_value(&self) -> DocRepoResult<Value> {
        Ok(Value::DateTime(*self))
    }

    fn from_value(value: &Value) -> DocRepoResult<Self::Output> {
        match value {
            Value::DateTime(dt) => Ok(*dt),
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| mapping_error("an RFC 3339 date-time", value)),
            _ => Err(mapping_error("a date-time", value)),
        }
    }
}

impl Convertible for () {
    type Output = ();

    fn to_value(&self) -> DocRepoResult<Value> {
        Ok(Value::Null)
    }

    fn from_value(value: &Value) -> DocRepoResult<Self::Output> {
        match value {
            Value::Null => Ok(()),
            _ => Err(mapping_error("null", value)),
        }
    }
}

impl Convertible for Document {
    type Output = Document;

    fn to_value(&self) -> DocRepoResult<Value> {
        Ok(Value::Document(self.clone()))
    }

    fn from_value(value: &Value) -> DocRepoResult<Self::Output> {
        value.as_document().cloned().ok_or_else(|| mapping_error("a document", value))
    }
}

impl Convertible for Value {
    type Output = Value;

    fn to_value(&self) -> DocRepoResult<Value> {
        Ok(self.clone())
    }

    fn from_value(value: &Value) -> DocRepoResult<Self::Output> {
        Ok(value.clone())
    }
}

impl<T> Convertible for Option<T>
where
    T: Convertible,
{
    type Output = Option<T::Output>;

    fn to_value(&self) -> DocRepoResult<Value> {
        match self {
            Some(v) => v.to_value(),
            None => Ok(Value::Null),
        }
    }

    fn from_value(value: &Value) -> DocRepoResult<Self::Output> {
        match value {
            Value::Null => Ok(None),
            _ => Ok(Some(T::from_value(value)?)),
        }
    }
}

impl<T> Convertible for Box<T>
where
    T: Convertible,
{
    type Output = Box<T::Output>;

    fn to_value(&self) -> DocRepoResult<Value> {
        self.as_ref().to_value()
    }

    fn from_value(value: &Value) -> DocRepoResult<Self::Output> {
        Ok(Box::new(T::from_value(value)?))
    }
}

impl<T> Convertible for Vec<T>
where
    T: Convertible + Any,
{
    type Output = Vec<T::Output>;

    fn to_value(&self) -> DocRepoResult<Value> {
        // byte vectors are stored as binary data
        if TypeId::of::<T>() == TypeId::of::<u8>() {
            let mut bytes = Vec::with_capacity(self.len());
            for item in self {
                let raw = item.to_value()?;
                match raw.as_integer().and_then(|i| u8::try_from(i).ok()) {
                    Some(b) => bytes.push(b),
                    None => return Err(mapping_error("a u8", &raw)),
                }
            }
            return Ok(Value::Bytes(bytes));
        }

        let mut arr = Vec::with_capacity(self.len());
        for item in self {
            arr.push(item.to_value()?);
        }
        Ok(Value::Array(arr))
    }

    fn from_value(value: &Value) -> DocRepoResult<Self::Output> {
        match value {
            Value::Bytes(bytes) => bytes
                .iter()
                .map(|b| T::from_value(&Value::I32(*b as i32)))
                .collect(),
            Value::Array(arr) => arr.iter().map(T::from_value).collect(),
            _ => Err(mapping_error("an array", value)),
        }
    }
}

impl<V> Convertible for BTreeMap<String, V>
where
    V: Convertible,
{
    type Output = BTreeMap<String, V::Output>;

    fn to_value(&self) -> DocRepoResult<Value> {
        let mut doc = Document::new();
        for (key, value) in self {
            doc.insert(key.clone(), value.to_value()?);
        }
        Ok(Value::Document(doc))
    }

    fn from_value(value: &Value) -> DocRepoResult<Self::Output> {
        match value {
            Value::Document(doc) => doc
                .iter()
                .map(|(k, v)| -> DocRepoResult<(String, V::Output)> {
                    Ok((k.clone(), V::from_value(v)?))
                })
                .collect(),
            _ => Err(mapping_error("a document", value)),
        }
    }
}

impl<V> Convertible for HashMap<String, V>
where
    V: Convertible,
{
    type Output = HashMap<String, V::Output>;

    // keys are written sorted so the stored document is deterministic
    fn to_value(&self) -> DocRepoResult<Value> {
        let mut keys: Vec<&String> = self.keys().collect();
        keys.sort();
        let mut doc = Document::new();
        for key in keys {
            if let Some(value) = self.get(key) {
                doc.insert(key.clone(), value.to_value()?);
            }
        }
        Ok(Value::Document(doc))
    }

    fn from_value(value: &Value) -> DocRepoResult<Self::Output> {
        match value {
            Value::Document(doc) => doc
                .iter()
                .map(|(k, v)| -> DocRepoResult<(String, V::Output)> {
                    Ok((k.clone(), V::from_value(v)?))
                })
                .collect(),
            _ => Err(mapping_error("a document", value)),
        }
    }
}

/// Converts a [Value] into `T`.
pub fn from_value<T>(value: &Value) -> DocRepoResult<T::Output>
where
    T: Convertible,
{
    T::from_value(value)
}

/// Converts `data` into a [Value].
pub fn to_value<T>(data: &T) -> DocRepoResult<Value>
where
    T: Convertible,
{
    data.to_value()
}
