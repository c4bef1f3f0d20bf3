//! Validated page requests.

use std::fmt;
use std::num::NonZeroU32;

use crate::PaginationError;

/// A 1-based page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageNumber(NonZeroU32);

impl PageNumber {
    /// The first page.
    pub const FIRST: Self = Self(NonZeroU32::MIN);

    /// Build a page number, rejecting zero.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::ZeroPage`] when `value` is zero.
    pub fn new(value: u32) -> Result<Self, PaginationError> {
        NonZeroU32::new(value)
            .map(Self)
            .ok_or(PaginationError::ZeroPage)
    }

    /// Parse an optional query parameter, defaulting to [`PageNumber::FIRST`]
    /// when the parameter is absent or blank.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::InvalidPage`] for non-numeric input and
    /// [`PaginationError::ZeroPage`] for `0`.
    pub fn parse(raw: Option<&str>) -> Result<Self, PaginationError> {
        let Some(value) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            return Ok(Self::FIRST);
        };
        let parsed = value
            .parse::<u32>()
            .map_err(|_| PaginationError::InvalidPage {
                value: value.to_owned(),
            })?;
        Self::new(parsed)
    }

    /// Raw page number.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Page number plus page size, convertible into an offset/limit pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    page: PageNumber,
    per_page: NonZeroU32,
}

impl PageRequest {
    /// Build a request for `page` with `per_page` items per page.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::ZeroPerPage`] when `per_page` is zero.
    pub fn new(page: PageNumber, per_page: u32) -> Result<Self, PaginationError> {
        let per_page = NonZeroU32::new(per_page).ok_or(PaginationError::ZeroPerPage)?;
        Ok(Self { page, per_page })
    }

    /// Build a request from the raw `page` query parameter.
    ///
    /// # Errors
    ///
    /// Propagates [`PageNumber::parse`] and [`PageRequest::new`] failures.
    pub fn from_query(raw_page: Option<&str>, per_page: u32) -> Result<Self, PaginationError> {
        Self::new(PageNumber::parse(raw_page)?, per_page)
    }

    /// Requested page number.
    #[must_use]
    pub const fn page(&self) -> PageNumber {
        self.page
    }

    /// Items per page.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page.get()
    }

    /// Number of items to skip before the requested page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.get() - 1) * u64::from(self.per_page.get())
    }

    /// Maximum number of items on the requested page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.per_page.get()
    }

    /// Number of items the requested page holds when the collection has
    /// `total_items` entries.
    #[must_use]
    pub fn expected_len(&self, total_items: u64) -> u64 {
        total_items
            .saturating_sub(self.offset())
            .min(u64::from(self.limit()))
    }
}

#[cfg(test)]
mod tests {
    //! Unit coverage for page parsing and offset arithmetic.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, 1)]
    #[case(Some(""), 1)]
    #[case(Some("  "), 1)]
    #[case(Some("1"), 1)]
    #[case(Some(" 7 "), 7)]
    fn parse_accepts_missing_and_numeric_pages(#[case] raw: Option<&str>, #[case] expected: u32) {
        let page = PageNumber::parse(raw).expect("page parses");
        assert_eq!(page.get(), expected);
    }

    #[rstest]
    #[case("abc")]
    #[case("-1")]
    #[case("1.5")]
    fn parse_rejects_non_numeric_pages(#[case] raw: &str) {
        let err = PageNumber::parse(Some(raw)).expect_err("page should be rejected");
        assert_eq!(
            err,
            PaginationError::InvalidPage {
                value: raw.to_owned()
            }
        );
    }

    #[rstest]
    fn parse_rejects_page_zero() {
        assert_eq!(PageNumber::parse(Some("0")), Err(PaginationError::ZeroPage));
    }

    #[rstest]
    fn zero_page_size_is_rejected() {
        assert_eq!(
            PageRequest::new(PageNumber::FIRST, 0),
            Err(PaginationError::ZeroPerPage)
        );
    }

    #[rstest]
    #[case(1, 0)]
    #[case(2, 9)]
    #[case(5, 36)]
    fn offset_skips_previous_pages(#[case] page: u32, #[case] offset: u64) {
        let request =
            PageRequest::new(PageNumber::new(page).expect("page"), 9).expect("request");
        assert_eq!(request.offset(), offset);
        assert_eq!(request.limit(), 9);
    }

    #[rstest]
    #[case(0, 1, 0)]
    #[case(5, 1, 5)]
    #[case(9, 1, 9)]
    #[case(20, 2, 9)]
    #[case(20, 3, 2)]
    #[case(20, 4, 0)]
    fn expected_len_matches_remaining_items(
        #[case] total: u64,
        #[case] page: u32,
        #[case] expected: u64,
    ) {
        let request =
            PageRequest::new(PageNumber::new(page).expect("page"), 9).expect("request");
        assert_eq!(request.expected_len(total), expected);
    }
}
