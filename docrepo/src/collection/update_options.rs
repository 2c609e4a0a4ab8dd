/// Options for replace operations on a store collection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOptions {
    insert_if_absent: bool,
}

impl UpdateOptions {
    /// Creates options; with `insert_if_absent` a replace that matches nothing
    /// inserts the replacement instead.
    pub fn new(insert_if_absent: bool) -> Self {
        Self { insert_if_absent }
    }

    pub fn is_insert_if_absent(&self) -> bool {
        self.insert_if_absent
    }
}

/// Creates `UpdateOptions` with insert-if-absent (upsert) behavior.
pub fn insert_if_absent() -> UpdateOptions {
    UpdateOptions::new(true)
}
