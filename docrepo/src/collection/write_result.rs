use crate::common::Value;

/// Outcome of a write against a store collection.
///
/// Backends fill the counters that apply to the operation and leave the rest
/// at zero. `acknowledged` reports whether the backend confirmed the write; an
/// acknowledged write that matched nothing is not an error.
///
/// ```rust,ignore
/// let result = collection.replace_one(&filter, document, &UpdateOptions::default())?;
/// if result.acknowledged() && result.matched_count() == 0 {
///     println!("nothing to replace");
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteResult {
    acknowledged: bool,
    matched_count: u64,
    modified_count: u64,
    deleted_count: u64,
    inserted_ids: Vec<Value>,
    upserted_id: Option<Value>,
}

impl WriteResult {
    /// Result of an insert that stored documents under the given ids.
    pub fn inserted(inserted_ids: Vec<Value>) -> Self {
        WriteResult {
            acknowledged: true,
            inserted_ids,
            ..Default::default()
        }
    }

    /// Result of a replace or update.
    pub fn updated(matched_count: u64, modified_count: u64, upserted_id: Option<Value>) -> Self {
        WriteResult {
            acknowledged: true,
            matched_count,
            modified_count,
            upserted_id,
            ..Default::default()
        }
    }

    /// Result of a delete.
    pub fn deleted(deleted_count: u64) -> Self {
        WriteResult {
            acknowledged: true,
            deleted_count,
            ..Default::default()
        }
    }

    /// Result of a write the backend did not confirm.
    pub fn unacknowledged() -> Self {
        WriteResult::default()
    }

    pub fn acknowledged(&self) -> bool {
        self.acknowledged
    }

    pub fn matched_count(&self) -> u64 {
        self.matched_count
    }

    pub fn modified_count(&self) -> u64 {
        self.modified_count
    }

    pub fn deleted_count(&self) -> u64 {
        self.deleted_count
    }

    pub fn inserted_ids(&self) -> &[Value] {
        &self.inserted_ids
    }

    pub fn upserted_id(&self) -> Option<&Value> {
        self.upserted_id.as_ref()
    }

    pub(crate) fn into_inserted_ids(self) -> Vec<Value> {
        self.inserted_ids
    }
}
