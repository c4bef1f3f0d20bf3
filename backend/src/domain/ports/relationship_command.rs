//! Driving port for follow relationships.
//!
//! A follow is two halves: the actor gains a `following` entry and the target
//! gains a `followers` entry. Each half is idempotent.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Message returned when a user tries to follow themselves.
pub const SELF_FOLLOW_MESSAGE: &str = "users cannot follow themselves";

/// Relationship use cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RelationshipCommand: Send + Sync {
    /// Add `target` to `user`'s `following` list.
    async fn add_following(&self, user: &UserId, target: &UserId) -> Result<(), Error>;

    /// Add `user` to `target`'s `followers` list and return the updated target.
    async fn add_follower(&self, user: &UserId, target: &UserId) -> Result<User, Error>;

    /// Remove `target` from `user`'s `following` list.
    async fn remove_following(&self, user: &UserId, target: &UserId) -> Result<(), Error>;

    /// Remove `user` from `target`'s `followers` list and return the updated
    /// target.
    async fn remove_follower(&self, user: &UserId, target: &UserId) -> Result<User, Error>;

    /// Add following, then add follower.
    async fn follow(&self, user: &UserId, target: &UserId) -> Result<User, Error> {
        self.add_following(user, target).await?;
        self.add_follower(user, target).await
    }

    /// Remove following, then remove follower.
    async fn unfollow(&self, user: &UserId, target: &UserId) -> Result<User, Error> {
        self.remove_following(user, target).await?;
        self.remove_follower(user, target).await
    }
}
