use crate::common::SortOrder;
use crate::errors::{DocRepoError, DocRepoResult, ErrorKind};

/// Direction of a search sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Asc,
    Desc,
}

impl From<SortMode> for SortOrder {
    fn from(mode: SortMode) -> Self {
        match mode {
            SortMode::Asc => SortOrder::Ascending,
            SortMode::Desc => SortOrder::Descending,
        }
    }
}

/// Paging and sorting of a search.
///
/// Pages are zero-based. A blank sort field keeps the backend's natural
/// order.
///
/// ```rust
/// use docrepo::repository::{SearchOptions, SortMode};
///
/// let options = SearchOptions::new(1, 20).sort_by("price", SortMode::Desc);
/// assert_eq!(options.skip().unwrap(), 20);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    page_number: u64,
    page_size: u64,
    sort_field: String,
    sort_mode: SortMode,
}

impl SearchOptions {
    pub fn new(page_number: u64, page_size: u64) -> Self {
        SearchOptions {
            page_number,
            page_size,
            sort_field: String::new(),
            sort_mode: SortMode::Asc,
        }
    }

    pub fn sort_by(mut self, sort_field: &str, sort_mode: SortMode) -> Self {
        self.sort_field = sort_field.to_string();
        self.sort_mode = sort_mode;
        self
    }

    pub fn page_number(&self) -> u64 {
        self.page_number
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn sort_field(&self) -> &str {
        &self.sort_field
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    /// Trimmed sort field, `None` when blank.
    pub(crate) fn sort_field_name(&self) -> Option<&str> {
        let field = self.sort_field.trim();
        if field.is_empty() {
            None
        } else {
            Some(field)
        }
    }

    /// Number of documents before the requested page.
    ///
    /// # Errors
    ///
    /// [ErrorKind::InvalidArgument] for a zero page size, or when the offset
    /// does not fit in 64 bits.
    pub fn skip(&self) -> DocRepoResult<u64> {
        if self.page_size == 0 {
            log::error!("Page size must be greater than zero");
            return Err(DocRepoError::new(
                "Page size must be greater than zero",
                ErrorKind::InvalidArgument,
            ));
        }

        self.page_number.checked_mul(self.page_size).ok_or_else(|| {
            log::error!(
                "Page {} of size {} is out of range",
                self.page_number,
                self.page_size
            );
            DocRepoError::new(
                &format!(
                    "Page {} of size {} is out of range",
                    self.page_number, self.page_size
                ),
                ErrorKind::InvalidArgument,
            )
        })
    }
}

impl Default for SearchOptions {
    /// First page of ten, natural order.
    fn default() -> Self {
        SearchOptions::new(0, 10)
    }
}
