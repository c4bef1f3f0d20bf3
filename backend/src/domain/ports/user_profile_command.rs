//! Driving port for profile mutations.

use async_trait::async_trait;

use crate::domain::{Error, ProfileUpdate, User};

/// Profile write use cases.
///
/// Callers pass an already loaded and authorized profile.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileCommand: Send + Sync {
    /// Merge `update` into `profile`, persist it and return the stored state.
    ///
    /// # Errors
    ///
    /// Write rejections (for example a taken email) surface as
    /// `invalid_request` carrying the store's message.
    async fn update_profile(&self, profile: User, update: ProfileUpdate) -> Result<User, Error>;

    /// Delete `profile` and every follow edge referencing it.
    async fn delete_profile(&self, profile: &User) -> Result<(), Error>;
}
