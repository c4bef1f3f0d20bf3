//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use pagination::PageRequest;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{UserFilter, UserPersistenceError, UserRepository};
use crate::domain::{User, UserId, UserListing, UserSummary};

use super::error_mapping::{map_diesel_error, map_pool_error, map_row_error};
use super::models::{
    NewFollowRow, NewUserRow, ProfileChangeset, UserListingRow, UserRow, summary_from_pair,
};
use super::pool::DbPool;
use super::schema::{follows, users};

/// Diesel-backed implementation of the [`UserRepository`] port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn filtered(filter: &UserFilter) -> users::BoxedQuery<'static, Pg> {
    let query = users::table.into_boxed();
    match filter {
        UserFilter::All => query,
        UserFilter::Excluding(ids) => {
            let excluded: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
            query.filter(users::id.ne_all(excluded))
        }
    }
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

async fn load_following(
    conn: &mut AsyncPgConnection,
    id: Uuid,
) -> Result<Vec<UserSummary>, UserPersistenceError> {
    let pairs: Vec<(Uuid, String)> = follows::table
        .inner_join(users::table.on(users::id.eq(follows::followee_id)))
        .filter(follows::follower_id.eq(id))
        .order_by((follows::created_at.asc(), users::id.asc()))
        .select((users::id, users::name))
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    pairs
        .into_iter()
        .map(summary_from_pair)
        .collect::<Result<_, _>>()
        .map_err(map_row_error)
}

async fn load_followers(
    conn: &mut AsyncPgConnection,
    id: Uuid,
) -> Result<Vec<UserSummary>, UserPersistenceError> {
    let pairs: Vec<(Uuid, String)> = follows::table
        .inner_join(users::table.on(users::id.eq(follows::follower_id)))
        .filter(follows::followee_id.eq(id))
        .order_by((follows::created_at.asc(), users::id.asc()))
        .select((users::id, users::name))
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    pairs
        .into_iter()
        .map(summary_from_pair)
        .collect::<Result<_, _>>()
        .map_err(map_row_error)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(&NewUserRow::from_user(user))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuid = *id.as_uuid();

        let row: Option<UserRow> = users::table
            .find(uuid)
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };

        let following = load_following(&mut conn, uuid).await?;
        let followers = load_followers(&mut conn, uuid).await?;
        row.into_user(following, followers)
            .map(Some)
            .map_err(map_row_error)
    }

    async fn count(&self, filter: &UserFilter) -> Result<u64, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(to_count(total))
    }

    async fn list(
        &self,
        filter: &UserFilter,
        page: &PageRequest,
    ) -> Result<Vec<UserListing>, UserPersistenceError> {
        let offset = i64::try_from(page.offset())
            .map_err(|_| UserPersistenceError::query("page offset out of range"))?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserListingRow> = filtered(filter)
            .order_by((users::created_at.asc(), users::id.asc()))
            .limit(i64::from(page.limit()))
            .offset(offset)
            .select(UserListingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        debug!(rows = rows.len(), offset, "loaded user listing page");

        rows.into_iter()
            .map(UserListing::try_from)
            .collect::<Result<_, _>>()
            .map_err(map_row_error)
    }

    async fn save_profile(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.find(*user.id().as_uuid()))
            .set(&ProfileChangeset::from_user(user))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(UserPersistenceError::missing_user(user.id().to_string()));
        }
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        // Edges go with the user through ON DELETE CASCADE.
        let removed = diesel::delete(users::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn add_follow(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let edge = NewFollowRow {
            follower_id: *follower.as_uuid(),
            followee_id: *followee.as_uuid(),
        };
        diesel::insert_into(follows::table)
            .values(&edge)
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn remove_follow(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (follower_id, followee_id) = (*follower.as_uuid(), *followee.as_uuid());

        let removed = diesel::delete(follows::table.find((follower_id, followee_id)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if removed > 0 {
            return Ok(());
        }

        // Nothing to remove: distinguish "not following" from a missing user.
        let present: i64 = users::table
            .filter(users::id.eq_any(vec![follower_id, followee_id]))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if to_count(present) < 2 {
            return Err(UserPersistenceError::missing_user("referenced user"));
        }
        Ok(())
    }
}
