/// Direction for sorting documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Smallest to largest, A to Z, oldest to newest
    #[default]
    Ascending,
    /// Largest to smallest, Z to A, newest to oldest
    Descending,
}

impl SortOrder {
    /// Applies this direction to an ascending comparison result.
    pub fn apply(&self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

/// An ordered list of fields to sort by, each with its own direction.
///
/// Earlier fields take precedence; later fields only break ties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortableFields {
    sorting_order: Vec<(String, SortOrder)>,
}

impl SortableFields {
    pub fn new() -> SortableFields {
        SortableFields {
            sorting_order: Vec::new(),
        }
    }

    /// Appends a field with its sort direction.
    pub fn add_sorted_field(mut self, field_name: String, sort_order: SortOrder) -> SortableFields {
        self.sorting_order.push((field_name, sort_order));
        self
    }

    pub fn sorting_order(&self) -> &[(String, SortOrder)] {
        &self.sorting_order
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.sorting_order.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sorting_order.is_empty()
    }
}
