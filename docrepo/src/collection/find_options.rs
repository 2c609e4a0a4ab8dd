use crate::common::{SortOrder, SortableFields};

/// Sorting and paging instructions handed to a store collection's `find`.
///
/// Backends apply them in a fixed order regardless of how they were set:
/// sort first, then skip, then limit.
///
/// ```rust
/// use docrepo::collection::FindOptions;
/// use docrepo::common::SortOrder;
///
/// let options = FindOptions::new()
///     .sort_by("price", SortOrder::Descending)
///     .skip(10)
///     .limit(20);
/// assert_eq!(options.skip_count(), Some(10));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub(crate) sort_by: Option<SortableFields>,
    pub(crate) skip: Option<u64>,
    pub(crate) limit: Option<u64>,
}

/// Creates `FindOptions` sorted by one field.
pub fn order_by(field_name: &str, sort_order: SortOrder) -> FindOptions {
    FindOptions::new().sort_by(field_name, sort_order)
}

/// Creates `FindOptions` that skips the first `skip` results.
pub fn skip_by(skip: u64) -> FindOptions {
    FindOptions::new().skip(skip)
}

/// Creates `FindOptions` that returns at most `limit` results.
pub fn limit_to(limit: u64) -> FindOptions {
    FindOptions::new().limit(limit)
}

impl FindOptions {
    pub fn new() -> FindOptions {
        FindOptions {
            sort_by: None,
            skip: None,
            limit: None,
        }
    }

    pub fn skip(mut self, skip: u64) -> FindOptions {
        self.skip = Some(skip);
        self
    }

    pub fn limit(mut self, limit: u64) -> FindOptions {
        self.limit = Some(limit);
        self
    }

    /// Adds a sort field. Repeated calls add tie-breaking fields.
    pub fn sort_by(mut self, field_name: &str, sort_order: SortOrder) -> FindOptions {
        let fields = self.sort_by.take().unwrap_or_default();
        self.sort_by = Some(fields.add_sorted_field(field_name.to_string(), sort_order));
        self
    }

    pub fn sorted_fields(&self) -> Option<&SortableFields> {
        self.sort_by.as_ref()
    }

    pub fn skip_count(&self) -> Option<u64> {
        self.skip
    }

    pub fn limit_count(&self) -> Option<u64> {
        self.limit
    }

    pub(crate) fn with_sort_fields(mut self, sort_by: Option<SortableFields>) -> FindOptions {
        self.sort_by = sort_by;
        self
    }
}
