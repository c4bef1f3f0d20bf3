//! Driven port for the user store.
//!
//! Follow relationships are stored as one `(follower, followee)` edge, so
//! `A.following` and `B.followers` are two views of the same record and can
//! never disagree.

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{User, UserId, UserListing};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// The store could not be reached.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another user already owns the email address.
        EmailTaken => "email already in use",
        /// A write referenced a user that does not exist.
        MissingUser { id: String } => "user {id} does not exist",
    }
}

/// Which users a listing covers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UserFilter {
    /// Every stored user.
    #[default]
    All,
    /// Every stored user except the listed identifiers.
    Excluding(Vec<UserId>),
}

impl UserFilter {
    /// Whether `id` passes the filter.
    pub fn admits(&self, id: &UserId) -> bool {
        match self {
            Self::All => true,
            Self::Excluding(excluded) => !excluded.contains(id),
        }
    }
}

/// Persistence contract for users and their follow edges.
///
/// Listings are ordered by creation time, then identifier, so paging is
/// stable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Store a newly registered user. Relationship lists are ignored.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Fetch a user with `following` and `followers` expanded.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Number of users admitted by `filter`.
    async fn count(&self, filter: &UserFilter) -> Result<u64, UserPersistenceError>;

    /// One page of users admitted by `filter`.
    async fn list(
        &self,
        filter: &UserFilter,
        page: &PageRequest,
    ) -> Result<Vec<UserListing>, UserPersistenceError>;

    /// Persist the profile fields (`name`, `email`, `about`, `photo`,
    /// `updated`) of an existing user in one write.
    async fn save_profile(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Remove a user and every follow edge that references it.
    ///
    /// Returns `false` when no such user existed.
    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError>;

    /// Record that `follower` follows `followee`. Recording an existing edge
    /// is a no-op.
    async fn add_follow(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<(), UserPersistenceError>;

    /// Remove the edge from `follower` to `followee`, if present.
    async fn remove_follow(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<(), UserPersistenceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn all_admits_everyone() {
        assert!(UserFilter::All.admits(&UserId::random()));
    }

    #[rstest]
    fn excluding_rejects_listed_ids() {
        let hidden = UserId::random();
        let filter = UserFilter::Excluding(vec![hidden.clone()]);

        assert!(!filter.admits(&hidden));
        assert!(filter.admits(&UserId::random()));
    }

    #[rstest]
    fn email_conflict_message_is_client_facing() {
        assert_eq!(UserPersistenceError::email_taken().to_string(), "email already in use");
    }
}
