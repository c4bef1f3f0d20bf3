//! In-process `UserRepository` used when no database is configured and by
//! tests.
//!
//! Follow edges live in one insertion-ordered list, mirroring the single
//! `follows` table of the PostgreSQL adapter. The lock is only held for one
//! synchronous operation and never across an `.await`.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::ports::{UserFilter, UserPersistenceError, UserRepository};
use crate::domain::{User, UserId, UserListing, UserSummary};

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, User>,
    edges: Vec<(UserId, UserId)>,
}

impl State {
    fn summaries<'a>(&'a self, ids: impl Iterator<Item = &'a UserId>) -> Vec<UserSummary> {
        ids.filter_map(|id| self.users.get(id).map(User::summary))
            .collect()
    }

    fn expand(&self, user: &User) -> User {
        let id = user.id();
        let following = self.summaries(
            self.edges
                .iter()
                .filter(|(follower, _)| follower == id)
                .map(|(_, followee)| followee),
        );
        let followers = self.summaries(
            self.edges
                .iter()
                .filter(|(_, followee)| followee == id)
                .map(|(follower, _)| follower),
        );
        user.clone().with_relationships(following, followers)
    }

    fn sorted(&self, filter: &UserFilter) -> Vec<&User> {
        let mut users: Vec<&User> = self
            .users
            .values()
            .filter(|user| filter.admits(user.id()))
            .collect();
        users.sort_by(|a, b| {
            a.created()
                .cmp(&b.created())
                .then_with(|| a.id().as_uuid().cmp(b.id().as_uuid()))
        });
        users
    }

    fn email_taken_by_other(&self, user: &User) -> bool {
        self.users
            .values()
            .any(|other| other.id() != user.id() && other.email() == user.email())
    }

    fn require(&self, id: &UserId) -> Result<(), UserPersistenceError> {
        if self.users.contains_key(id) {
            Ok(())
        } else {
            Err(UserPersistenceError::missing_user(id.to_string()))
        }
    }
}

/// Thread-safe in-memory user store.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    state: RwLock<State>,
}

fn poisoned<T>(_: PoisonError<T>) -> UserPersistenceError {
    UserPersistenceError::query("user store lock poisoned")
}

impl InMemoryUserRepository {
    /// Store pre-populated with `users`.
    ///
    /// Later entries replace earlier ones with the same identifier.
    pub fn seeded(users: impl IntoIterator<Item = User>) -> Self {
        let users = users
            .into_iter()
            .map(|user| (user.id().clone(), user.with_relationships(Vec::new(), Vec::new())))
            .collect();
        Self {
            state: RwLock::new(State {
                users,
                edges: Vec::new(),
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, UserPersistenceError> {
        self.state.read().map_err(poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, UserPersistenceError> {
        self.state.write().map_err(poisoned)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut state = self.write()?;
        if state.email_taken_by_other(user) {
            return Err(UserPersistenceError::email_taken());
        }
        if state.users.contains_key(user.id()) {
            return Err(UserPersistenceError::query(format!(
                "user {} already exists",
                user.id()
            )));
        }
        let stored = user.clone().with_relationships(Vec::new(), Vec::new());
        state.users.insert(user.id().clone(), stored);
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.read()?;
        Ok(state.users.get(id).map(|user| state.expand(user)))
    }

    async fn count(&self, filter: &UserFilter) -> Result<u64, UserPersistenceError> {
        let state = self.read()?;
        let total = state
            .users
            .keys()
            .filter(|id| filter.admits(id))
            .count();
        Ok(u64::try_from(total).unwrap_or(u64::MAX))
    }

    async fn list(
        &self,
        filter: &UserFilter,
        page: &PageRequest,
    ) -> Result<Vec<UserListing>, UserPersistenceError> {
        let state = self.read()?;
        let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(page.limit()).unwrap_or(usize::MAX);
        Ok(state
            .sorted(filter)
            .into_iter()
            .skip(skip)
            .take(take)
            .map(User::listing)
            .collect())
    }

    async fn save_profile(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut state = self.write()?;
        if state.email_taken_by_other(user) {
            return Err(UserPersistenceError::email_taken());
        }
        let Some(stored) = state.users.get_mut(user.id()) else {
            return Err(UserPersistenceError::missing_user(user.id().to_string()));
        };
        // Only profile fields are written; role and credentials stay as stored.
        *stored = User::new(
            stored.id().clone(),
            user.name().clone(),
            user.email().clone(),
            stored.credentials().clone(),
            stored.created(),
        )
        .with_role(stored.role())
        .with_about(user.about().cloned())
        .with_photo(user.photo().cloned())
        .with_updated(user.updated());
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut state = self.write()?;
        if state.users.remove(id).is_none() {
            return Ok(false);
        }
        state
            .edges
            .retain(|(follower, followee)| follower != id && followee != id);
        Ok(true)
    }

    async fn add_follow(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<(), UserPersistenceError> {
        let mut state = self.write()?;
        state.require(follower)?;
        state.require(followee)?;
        let exists = state
            .edges
            .iter()
            .any(|(from, to)| from == follower && to == followee);
        if !exists {
            state.edges.push((follower.clone(), followee.clone()));
        }
        Ok(())
    }

    async fn remove_follow(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<(), UserPersistenceError> {
        let mut state = self.write()?;
        state.require(follower)?;
        state.require(followee)?;
        state
            .edges
            .retain(|(from, to)| !(from == follower && to == followee));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Email, PasswordCredentials, Photo, UserName};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use pagination::PageNumber;
    use rstest::rstest;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp")
    }

    fn user(name: &str, minutes: i64) -> User {
        User::new(
            UserId::random(),
            UserName::new(name).expect("name"),
            Email::new(format!("{}@example.com", name.to_lowercase())).expect("email"),
            PasswordCredentials::new("hash", "salt"),
            base() + Duration::minutes(minutes),
        )
    }

    fn page(number: u32) -> PageRequest {
        PageRequest::new(PageNumber::new(number).expect("page"), 9).expect("request")
    }

    #[rstest]
    #[tokio::test]
    async fn follow_edges_expand_on_both_sides() {
        let ada = user("Ada", 0);
        let grace = user("Grace", 1);
        let repo = InMemoryUserRepository::seeded([ada.clone(), grace.clone()]);

        repo.add_follow(ada.id(), grace.id()).await.expect("follow");
        repo.add_follow(ada.id(), grace.id()).await.expect("idempotent");

        let ada_loaded = repo.find_by_id(ada.id()).await.expect("read").expect("ada");
        let grace_loaded = repo.find_by_id(grace.id()).await.expect("read").expect("grace");
        assert_eq!(ada_loaded.following(), &[grace.summary()]);
        assert_eq!(grace_loaded.followers(), &[ada.summary()]);
    }

    #[rstest]
    #[tokio::test]
    async fn delete_cascades_edges() {
        let ada = user("Ada", 0);
        let grace = user("Grace", 1);
        let repo = InMemoryUserRepository::seeded([ada.clone(), grace.clone()]);
        repo.add_follow(ada.id(), grace.id()).await.expect("follow");
        repo.add_follow(grace.id(), ada.id()).await.expect("follow back");

        assert!(repo.delete(grace.id()).await.expect("delete"));

        let ada_loaded = repo.find_by_id(ada.id()).await.expect("read").expect("ada");
        assert!(ada_loaded.following().is_empty());
        assert!(ada_loaded.followers().is_empty());
        assert!(!repo.delete(grace.id()).await.expect("second delete"));
    }

    #[rstest]
    #[tokio::test]
    async fn follow_requires_both_users() {
        let ada = user("Ada", 0);
        let repo = InMemoryUserRepository::seeded([ada.clone()]);

        let err = repo
            .add_follow(ada.id(), &UserId::random())
            .await
            .expect_err("missing followee");
        assert!(matches!(err, UserPersistenceError::MissingUser { .. }));
    }

    #[rstest]
    #[case(0, 1, 0)]
    #[case(5, 1, 5)]
    #[case(20, 1, 9)]
    #[case(20, 3, 2)]
    #[case(20, 4, 0)]
    #[tokio::test]
    async fn pages_follow_creation_order(
        #[case] total: i64,
        #[case] number: u32,
        #[case] expected: usize,
    ) {
        let users: Vec<User> = (0..total).map(|n| user(&format!("user{n}"), n)).collect();
        let repo = InMemoryUserRepository::seeded(users.clone());

        let listed = repo.list(&UserFilter::All, &page(number)).await.expect("list");
        assert_eq!(listed.len(), expected);
        assert_eq!(
            repo.count(&UserFilter::All).await.expect("count"),
            u64::try_from(total).expect("non-negative")
        );
        if let Some(first) = listed.first() {
            let offset = usize::try_from((number - 1) * 9).expect("offset");
            assert_eq!(Some(&first.id), users.get(offset).map(User::id));
        }
    }

    #[rstest]
    #[tokio::test]
    async fn excluding_filter_hides_listed_users() {
        let ada = user("Ada", 0);
        let grace = user("Grace", 1);
        let repo = InMemoryUserRepository::seeded([ada.clone(), grace.clone()]);
        let filter = UserFilter::Excluding(vec![ada.id().clone()]);

        let listed = repo.list(&filter, &page(1)).await.expect("list");
        assert_eq!(listed, vec![grace.listing()]);
        assert_eq!(repo.count(&filter).await.expect("count"), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn save_profile_keeps_credentials_and_rejects_taken_email() {
        let ada = user("Ada", 0);
        let grace = user("Grace", 1);
        let repo = InMemoryUserRepository::seeded([ada.clone(), grace.clone()]);

        let mut changed = ada.clone();
        let update = crate::domain::ProfileUpdate {
            email: Some(grace.email().clone()),
            ..Default::default()
        };
        changed.apply(update, base());
        let err = repo.save_profile(&changed).await.expect_err("taken");
        assert_eq!(err, UserPersistenceError::email_taken());

        let mut renamed = ada.clone();
        let update = crate::domain::ProfileUpdate {
            name: Some(UserName::new("Countess").expect("name")),
            photo: Some(Photo::new(vec![7], None).expect("photo")),
            ..Default::default()
        };
        renamed.apply(update, base());
        repo.save_profile(&renamed).await.expect("saved");

        let stored = repo.find_by_id(ada.id()).await.expect("read").expect("ada");
        assert_eq!(stored.name().as_ref(), "Countess");
        assert_eq!(stored.credentials(), ada.credentials());
        assert_eq!(stored.photo().map(Photo::data), Some(&[7_u8][..]));
    }
}
