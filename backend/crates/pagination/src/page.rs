//! Page envelope returned by listing queries.

use serde::{Deserialize, Serialize};

use crate::PageRequest;

/// One page of a listing plus the total number of matching items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    total_items: u64,
    per_page: u32,
    items: Vec<T>,
}

impl<T> Page<T> {
    /// Assemble a page answered for `request`.
    #[must_use]
    pub fn new(request: &PageRequest, total_items: u64, items: Vec<T>) -> Self {
        Self {
            total_items,
            per_page: request.per_page(),
            items,
        }
    }

    /// Total number of items matching the listing filter.
    #[must_use]
    pub const fn total_items(&self) -> u64 {
        self.total_items
    }

    /// Configured page size.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Items on this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the page, returning its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Project every item while keeping the pagination metadata.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            total_items: self.total_items,
            per_page: self.per_page,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}
