//! Internal Diesel row structs and their conversion into domain values.
//!
//! Row types never leave the persistence module.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    About, Email, PasswordCredentials, Photo, User, UserId, UserListing, UserName, UserSummary,
    UserValidationError,
};

use super::schema::{follows, users};

/// Full user row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub about: Option<String>,
    pub role: String,
    pub hashed_password: String,
    pub salt: String,
    pub photo_data: Option<Vec<u8>>,
    pub photo_content_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Listing projection: no credentials, no photo bytes.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserListingRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub about: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Insertable user row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub about: Option<&'a str>,
    pub role: &'a str,
    pub hashed_password: &'a str,
    pub salt: &'a str,
    pub photo_data: Option<&'a [u8]>,
    pub photo_content_type: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Profile fields written by a profile update. `None` clears the column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ProfileChangeset<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub about: Option<&'a str>,
    pub photo_data: Option<&'a [u8]>,
    pub photo_content_type: Option<&'a str>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Insertable follow edge.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = follows)]
pub(crate) struct NewFollowRow {
    pub follower_id: Uuid,
    pub followee_id: Uuid,
}

impl<'a> NewUserRow<'a> {
    pub(crate) fn from_user(user: &'a User) -> Self {
        let ProfileChangeset {
            name,
            email,
            about,
            photo_data,
            photo_content_type,
            updated_at,
        } = ProfileChangeset::from_user(user);
        Self {
            id: *user.id().as_uuid(),
            name,
            email,
            about,
            role: user.role().as_str(),
            hashed_password: user.credentials().hashed_password(),
            salt: user.credentials().salt(),
            photo_data,
            photo_content_type,
            created_at: user.created(),
            updated_at,
        }
    }
}

impl<'a> ProfileChangeset<'a> {
    pub(crate) fn from_user(user: &'a User) -> Self {
        Self {
            name: user.name().as_ref(),
            email: user.email().as_ref(),
            about: user.about().map(AsRef::as_ref),
            photo_data: user.photo().map(Photo::data),
            photo_content_type: user.photo().map(Photo::content_type),
            updated_at: user.updated(),
        }
    }
}

fn about_from_column(about: Option<String>) -> Result<Option<About>, UserValidationError> {
    Ok(about.map(About::new).transpose()?.flatten())
}

impl UserRow {
    /// Convert the row plus its expanded edges into the aggregate.
    pub(crate) fn into_user(
        self,
        following: Vec<UserSummary>,
        followers: Vec<UserSummary>,
    ) -> Result<User, UserValidationError> {
        let photo = match (self.photo_data, self.photo_content_type) {
            (Some(data), content_type) => Some(Photo::new(data, content_type.as_deref())?),
            (None, _) => None,
        };
        let user = User::new(
            UserId::from_uuid(self.id),
            UserName::new(self.name)?,
            Email::new(self.email)?,
            PasswordCredentials::new(self.hashed_password, self.salt),
            self.created_at,
        )
        .with_role(self.role.parse()?)
        .with_about(about_from_column(self.about)?)
        .with_photo(photo)
        .with_updated(self.updated_at)
        .with_relationships(following, followers);
        Ok(user)
    }
}

impl TryFrom<UserListingRow> for UserListing {
    type Error = UserValidationError;

    fn try_from(row: UserListingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::from_uuid(row.id),
            name: UserName::new(row.name)?,
            email: Email::new(row.email)?,
            about: about_from_column(row.about)?,
            role: row.role.parse()?,
            created: row.created_at,
            updated: row.updated_at,
        })
    }
}

/// Convert a `(id, name)` pair selected from a join into a summary.
pub(crate) fn summary_from_pair(
    (id, name): (Uuid, String),
) -> Result<UserSummary, UserValidationError> {
    Ok(UserSummary {
        id: UserId::from_uuid(id),
        name: UserName::new(name)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn row() -> UserRow {
        UserRow {
            id: Uuid::nil(),
            name: "Ada".to_owned(),
            email: "ada@example.com".to_owned(),
            about: Some("Analyst".to_owned()),
            role: "admin".to_owned(),
            hashed_password: "hash".to_owned(),
            salt: "salt".to_owned(),
            photo_data: Some(vec![1, 2]),
            photo_content_type: Some("image/png".to_owned()),
            created_at: Utc
                .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
                .single()
                .expect("timestamp"),
            updated_at: None,
        }
    }

    #[rstest]
    fn user_row_converts_to_aggregate(row: UserRow) {
        let follower = (Uuid::new_v4(), "Grace".to_owned());
        let followers = vec![summary_from_pair(follower).expect("summary")];
        let user = row.into_user(Vec::new(), followers).expect("valid row");

        assert_eq!(user.id().as_uuid(), &Uuid::nil());
        assert_eq!(user.role(), Role::Admin);
        assert_eq!(user.photo().map(Photo::content_type), Some("image/png"));
        assert_eq!(user.followers().len(), 1);
        assert_eq!(user.credentials().salt(), "salt");
    }

    #[rstest]
    fn unknown_role_is_rejected(mut row: UserRow) {
        row.role = "root".to_owned();
        assert!(row.into_user(Vec::new(), Vec::new()).is_err());
    }

    #[rstest]
    fn changeset_round_trips_profile_fields(row: UserRow) {
        let user = row.into_user(Vec::new(), Vec::new()).expect("valid row");
        let changeset = ProfileChangeset::from_user(&user);

        assert_eq!(changeset.name, "Ada");
        assert_eq!(changeset.about, Some("Analyst"));
        assert_eq!(changeset.photo_data, Some(&[1_u8, 2][..]));
        assert_eq!(changeset.updated_at, None);
    }

    #[rstest]
    fn new_row_carries_credentials(row: UserRow) {
        let user = row.into_user(Vec::new(), Vec::new()).expect("valid row");
        let insert = NewUserRow::from_user(&user);

        assert_eq!(insert.hashed_password, "hash");
        assert_eq!(insert.role, "admin");
    }
}
