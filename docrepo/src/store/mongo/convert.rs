use crate::collection::{Document, ObjectId};
use crate::common::{SortableFields, SortOrder, Value};
use crate::errors::{DocRepoError, DocRepoResult, ErrorKind};
use crate::filter::{unsupported_raw_filter, Filter};
use chrono::{DateTime, Utc};
use mongodb::bson::spec::BinarySubtype;
use mongodb::bson::{self, Binary, Bson};

const BACKEND: &str = "mongodb";

/// Converts a value to BSON. Uuids become binary subtype 4.
pub fn to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(*b),
        Value::I32(i) => Bson::Int32(*i),
        Value::I64(i) => Bson::Int64(*i),
        Value::F64(f) => Bson::Double(*f),
        Value::String(s) => Bson::String(s.clone()),
        Value::ObjectId(id) => Bson::ObjectId(bson::oid::ObjectId::from_bytes(id.bytes())),
        Value::Uuid(id) => Bson::Binary(Binary {
            subtype: BinarySubtype::Uuid,
            bytes: id.as_bytes().to_vec(),
        }),
        Value::DateTime(dt) => Bson::DateTime(bson::DateTime::from_millis(dt.timestamp_millis())),
        Value::Bytes(bytes) => Bson::Binary(Binary {
            subtype: BinarySubtype::Generic,
            bytes: bytes.clone(),
        }),
        Value::Array(items) => Bson::Array(items.iter().map(to_bson).collect()),
        Value::Document(doc) => Bson::Document(to_bson_document(doc)),
    }
}

pub fn to_bson_document(document: &Document) -> bson::Document {
    let mut result = bson::Document::new();
    for (key, value) in document.iter() {
        result.insert(key.clone(), to_bson(value));
    }
    result
}

/// Converts BSON back to a value. Types without a counterpart are kept in
/// their extended JSON text form.
pub fn from_bson(value: Bson) -> Value {
    match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Int32(i) => Value::I32(i),
        Bson::Int64(i) => Value::I64(i),
        Bson::Double(f) => Value::F64(f),
        Bson::String(s) | Bson::Symbol(s) => Value::String(s),
        Bson::ObjectId(id) => Value::ObjectId(ObjectId::from_bytes(id.bytes())),
        Bson::Binary(binary) => match binary.subtype {
            BinarySubtype::Uuid | BinarySubtype::UuidOld if binary.bytes.len() == 16 => {
                match uuid::Uuid::from_slice(&binary.bytes) {
                    Ok(id) => Value::Uuid(id),
                    Err(_) => Value::Bytes(binary.bytes),
                }
            }
            _ => Value::Bytes(binary.bytes),
        },
        Bson::DateTime(dt) => DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis())
            .map(Value::DateTime)
            .unwrap_or(Value::Null),
        Bson::Array(items) => Value::Array(items.into_iter().map(from_bson).collect()),
        Bson::Document(doc) => Value::Document(from_bson_document(doc)),
        other => Value::String(other.to_string()),
    }
}

pub fn from_bson_document(document: bson::Document) -> Document {
    document
        .into_iter()
        .map(|(key, value)| (key, from_bson(value)))
        .collect()
}

/// Translates a filter to a MongoDB query document.
///
/// # Errors
///
/// [ErrorKind::FilterError] for a raw filter that does not wrap a
/// [bson::Document].
pub fn to_bson_filter(filter: &Filter) -> DocRepoResult<bson::Document> {
    let query = match filter {
        Filter::All => bson::Document::new(),
        Filter::Eq(field, value) => single(field, to_bson(value)),
        Filter::Ne(field, value) => operator(field, "$ne", to_bson(value)),
        Filter::Gt(field, value) => operator(field, "$gt", to_bson(value)),
        Filter::Gte(field, value) => operator(field, "$gte", to_bson(value)),
        Filter::Lt(field, value) => operator(field, "$lt", to_bson(value)),
        Filter::Lte(field, value) => operator(field, "$lte", to_bson(value)),
        Filter::In(field, values) => {
            operator(field, "$in", Bson::Array(values.iter().map(to_bson).collect()))
        }
        Filter::Regex(field, pattern) => {
            // compile locally so a bad pattern fails the same way on every backend
            pattern.regex()?;
            operator(field, "$regex", Bson::String(pattern.as_str().to_string()))
        }
        Filter::And(filters) if filters.is_empty() => bson::Document::new(),
        Filter::And(filters) => single("$and", Bson::from(translate_all(filters)?)),
        // $or rejects an empty array; nor-of-everything matches nothing
        Filter::Or(filters) if filters.is_empty() => {
            single("$nor", Bson::from(vec![bson::Document::new()]))
        }
        Filter::Or(filters) => single("$or", Bson::from(translate_all(filters)?)),
        Filter::Not(inner) => single("$nor", Bson::from(vec![to_bson_filter(inner)?])),
        Filter::Raw(raw) => match raw.downcast_ref::<bson::Document>() {
            Some(native) => native.clone(),
            None => return Err(unsupported_raw_filter(raw, BACKEND)),
        },
    };
    Ok(query)
}

/// Translates sort fields to a MongoDB sort document.
pub fn to_bson_sort(sort_by: &SortableFields) -> bson::Document {
    let mut sort = bson::Document::new();
    for (field, order) in sort_by.sorting_order() {
        let direction = match order {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        };
        sort.insert(field.clone(), direction);
    }
    sort
}

fn single(key: &str, value: Bson) -> bson::Document {
    let mut document = bson::Document::new();
    document.insert(key, value);
    document
}

fn operator(field: &str, op: &str, value: Bson) -> bson::Document {
    single(field, Bson::Document(single(op, value)))
}

fn translate_all(filters: &[Filter]) -> DocRepoResult<Vec<bson::Document>> {
    filters.iter().map(to_bson_filter).collect()
}

/// Maps a driver error to the crate's error kinds.
pub(crate) fn driver_error(message: &str, error: mongodb::error::Error) -> DocRepoError {
    let text = error.to_string();
    let kind = if text.contains("E11000") {
        ErrorKind::DuplicateKey
    } else {
        match *error.kind {
            mongodb::error::ErrorKind::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            mongodb::error::ErrorKind::Authentication { .. }
            | mongodb::error::ErrorKind::Io(_)
            | mongodb::error::ErrorKind::ServerSelection { .. }
            | mongodb::error::ErrorKind::DnsResolve { .. } => ErrorKind::ConnectionError,
            _ => ErrorKind::BackendError,
        }
    };
    log::error!("{}: {}", message, text);
    DocRepoError::new_with_cause(message, kind.clone(), DocRepoError::new(&text, kind))
}
