//! User domain service implementing the read, profile and relationship ports
//! on top of a [`UserRepository`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::{debug, info, warn};

use crate::domain::ports::{
    RelationshipCommand, SELF_FOLLOW_MESSAGE, USER_NOT_FOUND_MESSAGE, UserFilter,
    UserPersistenceError, UserProfileCommand, UserRepository, UsersQuery,
};
use crate::domain::{Error, ProfileUpdate, User, UserId, UserListing};

/// Service backing every user use case.
#[derive(Clone)]
pub struct UserService<R> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> UserService<R> {
    /// Create a service over `repo`, stamping updates with `clock`.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// # use social_backend::domain::UserService;
    /// # use social_backend::outbound::memory::InMemoryUserRepository;
    /// let service = UserService::new(
    ///     Arc::new(InMemoryUserRepository::default()),
    ///     Arc::new(DefaultClock),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }
}

/// Map failures on read paths.
fn map_read_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user store unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user store error: {message}"))
        }
        UserPersistenceError::MissingUser { .. } => Error::not_found(USER_NOT_FOUND_MESSAGE),
        err @ UserPersistenceError::EmailTaken => Error::internal(err.to_string()),
    }
}

/// Map failures on write paths. Rejected writes surface the store's message
/// to the client.
fn map_write_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user store unavailable: {message}"))
        }
        UserPersistenceError::MissingUser { .. } => Error::not_found(USER_NOT_FOUND_MESSAGE),
        err @ (UserPersistenceError::Query { .. } | UserPersistenceError::EmailTaken) => {
            Error::invalid_request(err.to_string())
        }
    }
}

fn reject_self_follow(user: &UserId, target: &UserId) -> Result<(), Error> {
    if user == target {
        return Err(Error::invalid_request(SELF_FOLLOW_MESSAGE));
    }
    Ok(())
}

impl<R> UserService<R>
where
    R: UserRepository,
{
    async fn page(&self, filter: UserFilter, page: PageRequest) -> Result<Page<UserListing>, Error> {
        let total = self.repo.count(&filter).await.map_err(map_read_error)?;
        let users = self
            .repo
            .list(&filter, &page)
            .await
            .map_err(map_read_error)?;
        let expected = page.expected_len(total);
        if u64::try_from(users.len()).ok() != Some(expected) {
            // Count and slice are separate reads; a concurrent write can
            // land between them.
            warn!(total, expected, returned = users.len(), "user store changed while paging");
        }
        debug!(total, page = %page.page(), returned = users.len(), "listed users");
        Ok(Page::new(&page, total, users))
    }

    async fn load(&self, id: &UserId) -> Result<User, Error> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(map_read_error)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND_MESSAGE))
    }
}

#[async_trait]
impl<R> UsersQuery for UserService<R>
where
    R: UserRepository,
{
    async fn fetch_profile(&self, id: &UserId) -> Result<User, Error> {
        self.load(id).await
    }

    async fn list_users(&self, page: PageRequest) -> Result<Page<UserListing>, Error> {
        self.page(UserFilter::All, page).await
    }

    async fn find_people(
        &self,
        viewer: &User,
        page: PageRequest,
    ) -> Result<Page<UserListing>, Error> {
        let excluded = viewer
            .following()
            .iter()
            .map(|summary| summary.id.clone())
            .chain(std::iter::once(viewer.id().clone()))
            .collect();
        self.page(UserFilter::Excluding(excluded), page).await
    }
}

#[async_trait]
impl<R> UserProfileCommand for UserService<R>
where
    R: UserRepository,
{
    async fn update_profile(&self, mut profile: User, update: ProfileUpdate) -> Result<User, Error> {
        let photo_replaced = update.photo.is_some();
        profile.apply(update, self.clock.utc());
        self.repo
            .save_profile(&profile)
            .await
            .map_err(map_write_error)?;
        info!(user = %profile.id(), photo_replaced, "profile updated");
        Ok(profile)
    }

    async fn delete_profile(&self, profile: &User) -> Result<(), Error> {
        let removed = self
            .repo
            .delete(profile.id())
            .await
            .map_err(map_write_error)?;
        if !removed {
            return Err(Error::not_found(USER_NOT_FOUND_MESSAGE));
        }
        info!(user = %profile.id(), "profile deleted");
        Ok(())
    }
}

#[async_trait]
impl<R> RelationshipCommand for UserService<R>
where
    R: UserRepository,
{
    async fn add_following(&self, user: &UserId, target: &UserId) -> Result<(), Error> {
        reject_self_follow(user, target)?;
        self.repo
            .add_follow(user, target)
            .await
            .map_err(map_write_error)
    }

    async fn add_follower(&self, user: &UserId, target: &UserId) -> Result<User, Error> {
        reject_self_follow(user, target)?;
        self.repo
            .add_follow(user, target)
            .await
            .map_err(map_write_error)?;
        info!(follower = %user, followee = %target, "follow recorded");
        self.load(target).await
    }

    async fn remove_following(&self, user: &UserId, target: &UserId) -> Result<(), Error> {
        reject_self_follow(user, target)?;
        self.repo
            .remove_follow(user, target)
            .await
            .map_err(map_write_error)
    }

    async fn remove_follower(&self, user: &UserId, target: &UserId) -> Result<User, Error> {
        reject_self_follow(user, target)?;
        self.repo
            .remove_follow(user, target)
            .await
            .map_err(map_write_error)?;
        info!(follower = %user, followee = %target, "follow removed");
        self.load(target).await
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
