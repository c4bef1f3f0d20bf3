//! Request and response bodies for the users API.
//!
//! Responses are built from domain values here and nowhere else, so
//! credential fields never reach a serializer.

use chrono::{DateTime, Utc};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{User, UserListing, UserSummary};

/// `{id, name}` entry in `following` and `followers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserSummaryResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
}

impl From<&UserSummary> for UserSummaryResponse {
    fn from(summary: &UserSummary) -> Self {
        Self {
            id: summary.id.to_string(),
            name: summary.name.as_ref().to_owned(),
        }
    }
}

/// Profile without credentials or photo bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub about: Option<String>,
    #[schema(example = "normal")]
    pub role: String,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
    /// Whether `GET /api/v1/users/photo/{id}` serves stored bytes.
    pub has_photo: bool,
    pub following: Vec<UserSummaryResponse>,
    pub followers: Vec<UserSummaryResponse>,
}

impl From<&User> for UserProfileResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            name: user.name().as_ref().to_owned(),
            email: user.email().as_ref().to_owned(),
            about: user.about().map(|about| about.as_ref().to_owned()),
            role: user.role().as_str().to_owned(),
            created: user.created(),
            updated: user.updated(),
            has_photo: user.photo().is_some(),
            following: user.following().iter().map(Into::into).collect(),
            followers: user.followers().iter().map(Into::into).collect(),
        }
    }
}

/// Entry of `GET /api/v1/users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserListingResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub about: Option<String>,
    pub role: String,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
}

impl From<UserListing> for UserListingResponse {
    fn from(listing: UserListing) -> Self {
        Self {
            id: listing.id.to_string(),
            name: listing.name.as_ref().to_owned(),
            email: listing.email.as_ref().to_owned(),
            about: listing.about.map(|about| about.as_ref().to_owned()),
            role: listing.role.as_str().to_owned(),
            created: listing.created,
            updated: listing.updated,
        }
    }
}

/// Entry of `GET /api/v1/users/findPeople/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PersonResponse {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<UserListing> for PersonResponse {
    fn from(listing: UserListing) -> Self {
        Self {
            id: listing.id.to_string(),
            name: listing.name.as_ref().to_owned(),
            email: listing.email.as_ref().to_owned(),
        }
    }
}

/// Paged users envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsersPage<T> {
    pub total_items: u64,
    pub per_page: u32,
    pub users: Vec<T>,
}

impl<T> UsersPage<T> {
    /// Convert a domain page, projecting each entry into `T`.
    pub fn from_page<U>(page: Page<U>) -> Self
    where
        T: From<U>,
    {
        let page = page.map(T::from);
        Self {
            total_items: page.total_items(),
            per_page: page.per_page(),
            users: page.into_items(),
        }
    }
}

/// Body of `PUT /api/v1/users/follow`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    /// Acting user; must be the caller unless the caller is an admin.
    pub user_id: String,
    /// User to follow.
    pub follow_id: String,
}

/// Body of `PUT /api/v1/users/unfollow`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnfollowRequest {
    pub user_id: String,
    pub unfollow_id: String,
}

/// Confirmation body for deletions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "User deleted successfully")]
    pub message: String,
}
