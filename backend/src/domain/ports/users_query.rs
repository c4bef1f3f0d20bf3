//! Driving port for user reads: profile lookup and paged listings.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Error, User, UserId, UserListing};

/// Fixed number of users per listing page.
pub const USERS_PER_PAGE: u32 = 9;

/// Message returned whenever a profile cannot be resolved.
pub const USER_NOT_FOUND_MESSAGE: &str = "User not found";

/// Read use cases consumed by the HTTP adapter.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Load a full profile with relationships expanded.
    ///
    /// # Errors
    ///
    /// Returns `not_found` when no such user exists and
    /// `service_unavailable` when the store cannot be reached.
    async fn fetch_profile(&self, id: &UserId) -> Result<User, Error>;

    /// Page through every user.
    async fn list_users(&self, page: PageRequest) -> Result<Page<UserListing>, Error>;

    /// Page through users `viewer` does not follow, excluding `viewer`.
    async fn find_people(&self, viewer: &User, page: PageRequest)
    -> Result<Page<UserListing>, Error>;
}
