//! Page-number pagination primitives shared by listing endpoints.
//!
//! Listing endpoints accept a 1-based `page` query parameter and answer with a
//! fixed page size. [`PageRequest`] validates the inbound parameter and turns
//! it into the offset/limit pair a store understands, while [`Page`] carries
//! the resulting slice together with the total item count so clients can
//! compute how many pages exist.
//!
//! ```
//! use pagination::{Page, PageRequest};
//!
//! let request = PageRequest::from_query(Some("3"), 9).expect("valid page");
//! assert_eq!(request.offset(), 18);
//! assert_eq!(request.limit(), 9);
//!
//! let page = Page::new(&request, 20, vec!["a", "b"]);
//! assert_eq!(page.total_items(), 20);
//! ```

mod page;
mod request;

pub use page::Page;
pub use request::{PageNumber, PageRequest};

/// Errors raised while validating pagination input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// The `page` parameter was not an unsigned integer.
    #[error("page must be a positive integer, got {value:?}")]
    InvalidPage {
        /// Raw value supplied by the client.
        value: String,
    },
    /// The `page` parameter was zero; pages are numbered from 1.
    #[error("page must be at least 1")]
    ZeroPage,
    /// The configured page size was zero.
    #[error("page size must be at least 1")]
    ZeroPerPage,
}
