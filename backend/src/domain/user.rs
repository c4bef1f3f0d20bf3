//! User aggregate and its value types.
//!
//! The aggregate deliberately does not implement `Serialize`: credential
//! material must only leave the process through the response DTOs in the
//! HTTP adapter, which never copy it.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of characters in a user name.
pub const USER_NAME_MAX: usize = 64;
/// Maximum number of characters in the free-text `about` field.
pub const ABOUT_MAX: usize = 500;
/// Maximum number of characters in an email address.
pub const EMAIL_MAX: usize = 320;
/// Maximum number of characters in a photo content type.
pub const CONTENT_TYPE_MAX: usize = 255;
/// Content type recorded for photos uploaded without one.
pub const DEFAULT_PHOTO_CONTENT_TYPE: &str = "application/octet-stream";

/// Validation errors raised while building user values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    EmptyName,
    NameTooLong { max: usize },
    EmptyEmail,
    InvalidEmail,
    EmailTooLong { max: usize },
    AboutTooLong { max: usize },
    EmptyPhoto,
    ContentTypeTooLong { max: usize },
    UnknownRole { value: String },
}

impl UserValidationError {
    /// Name of the client-facing field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyId | Self::InvalidId => "id",
            Self::EmptyName | Self::NameTooLong { .. } => "name",
            Self::EmptyEmail | Self::InvalidEmail | Self::EmailTooLong { .. } => "email",
            Self::AboutTooLong { .. } => "about",
            Self::EmptyPhoto | Self::ContentTypeTooLong { .. } => "photo",
            Self::UnknownRole { .. } => "role",
        }
    }
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmailTooLong { max } => write!(f, "email must be at most {max} characters"),
            Self::AboutTooLong { max } => write!(f, "about must be at most {max} characters"),
            Self::EmptyPhoto => write!(f, "photo must not be empty"),
            Self::ContentTypeTooLong { max } => {
                write!(f, "photo content type must be at most {max} characters")
            }
            Self::UnknownRole { value } => write!(f, "unknown role {value:?}"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`UserId`].
    #[must_use]
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, uuid.to_string())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }
        let parsed = Uuid::parse_str(&id).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.1
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Display name shown on profiles and listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserName(String);

impl UserName {
    /// Trim and validate a user name.
    pub fn new(name: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if trimmed.chars().count() > USER_NAME_MAX {
            return Err(UserValidationError::NameTooLong {
                max: USER_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Lower-cased contact address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Trim, lower-case and validate an address.
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = email.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if normalised.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(&normalised) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Free-text biography. Blank input clears the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct About(String);

impl About {
    /// Trim and validate the text; `None` when nothing remains.
    pub fn new(about: impl AsRef<str>) -> Result<Option<Self>, UserValidationError> {
        let trimmed = about.as_ref().trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if trimmed.chars().count() > ABOUT_MAX {
            return Err(UserValidationError::AboutTooLong { max: ABOUT_MAX });
        }
        Ok(Some(Self(trimmed.to_owned())))
    }
}

impl AsRef<str> for About {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Permission level of a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Role {
    /// Regular member; may only act on their own profile.
    #[default]
    Normal,
    /// Administrator; may act on any profile.
    Admin,
}

impl Role {
    /// Stable lower-case name used in storage and sessions.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "admin" => Ok(Self::Admin),
            other => Err(UserValidationError::UnknownRole {
                value: other.to_owned(),
            }),
        }
    }
}

/// Stored profile picture.
#[derive(Clone, PartialEq, Eq)]
pub struct Photo {
    data: Vec<u8>,
    content_type: String,
}

impl Photo {
    /// Build a photo, defaulting the content type when none was declared.
    pub fn new(data: Vec<u8>, content_type: Option<&str>) -> Result<Self, UserValidationError> {
        if data.is_empty() {
            return Err(UserValidationError::EmptyPhoto);
        }
        let content_type = content_type
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_PHOTO_CONTENT_TYPE)
            .to_owned();
        if content_type.chars().count() > CONTENT_TYPE_MAX {
            return Err(UserValidationError::ContentTypeTooLong {
                max: CONTENT_TYPE_MAX,
            });
        }
        Ok(Self { data, content_type })
    }

    /// Raw image bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// MIME type recorded at upload.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

impl fmt::Debug for Photo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Photo")
            .field("len", &self.data.len())
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// Password hash and salt produced by the external registration flow.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordCredentials {
    hashed_password: String,
    salt: String,
}

impl PasswordCredentials {
    /// Wrap an existing hash and salt.
    pub fn new(hashed_password: impl Into<String>, salt: impl Into<String>) -> Self {
        Self {
            hashed_password: hashed_password.into(),
            salt: salt.into(),
        }
    }

    /// Stored password hash.
    #[must_use]
    pub fn hashed_password(&self) -> &str {
        &self.hashed_password
    }

    /// Stored salt.
    #[must_use]
    pub fn salt(&self) -> &str {
        &self.salt
    }
}

impl fmt::Debug for PasswordCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordCredentials(<redacted>)")
    }
}

/// Identifier and name of a related user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: UserId,
    pub name: UserName,
}

/// Listing projection: every stored field except credentials, photo and
/// relationships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserListing {
    pub id: UserId,
    pub name: UserName,
    pub email: Email,
    pub about: Option<About>,
    pub role: Role,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
}

/// Application user with relationships expanded to summaries.
///
/// ## Invariants
/// - `following` and `followers` never contain duplicates; both are derived
///   from the same follow edges by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: UserName,
    email: Email,
    about: Option<About>,
    role: Role,
    credentials: PasswordCredentials,
    photo: Option<Photo>,
    following: Vec<UserSummary>,
    followers: Vec<UserSummary>,
    created: DateTime<Utc>,
    updated: Option<DateTime<Utc>>,
}

impl User {
    /// Build a freshly registered user with no relationships.
    pub fn new(
        id: UserId,
        name: UserName,
        email: Email,
        credentials: PasswordCredentials,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            about: None,
            role: Role::Normal,
            credentials,
            photo: None,
            following: Vec::new(),
            followers: Vec::new(),
            created,
            updated: None,
        }
    }

    /// Set the role.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Set the biography.
    #[must_use]
    pub fn with_about(mut self, about: Option<About>) -> Self {
        self.about = about;
        self
    }

    /// Set the profile photo.
    #[must_use]
    pub fn with_photo(mut self, photo: Option<Photo>) -> Self {
        self.photo = photo;
        self
    }

    /// Set the last-updated timestamp.
    #[must_use]
    pub fn with_updated(mut self, updated: Option<DateTime<Utc>>) -> Self {
        self.updated = updated;
        self
    }

    /// Attach expanded relationship lists.
    #[must_use]
    pub fn with_relationships(
        mut self,
        following: Vec<UserSummary>,
        followers: Vec<UserSummary>,
    ) -> Self {
        self.following = following;
        self.followers = followers;
        self
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn name(&self) -> &UserName {
        &self.name
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn about(&self) -> Option<&About> {
        self.about.as_ref()
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn credentials(&self) -> &PasswordCredentials {
        &self.credentials
    }

    pub fn photo(&self) -> Option<&Photo> {
        self.photo.as_ref()
    }

    pub fn following(&self) -> &[UserSummary] {
        &self.following
    }

    pub fn followers(&self) -> &[UserSummary] {
        &self.followers
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn updated(&self) -> Option<DateTime<Utc>> {
        self.updated
    }

    /// Identifier and name of this user.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }

    /// Listing projection of this user.
    pub fn listing(&self) -> UserListing {
        UserListing {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            about: self.about.clone(),
            role: self.role,
            created: self.created,
            updated: self.updated,
        }
    }

    /// Merge `update` into the profile and stamp `updated` with `now`.
    ///
    /// Fields absent from the update keep their stored value. Role,
    /// credentials and relationships are never touched.
    pub fn apply(&mut self, update: ProfileUpdate, now: DateTime<Utc>) {
        let ProfileUpdate {
            name,
            email,
            about,
            photo,
        } = update;
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(about) = about {
            self.about = about;
        }
        if let Some(photo) = photo {
            self.photo = Some(photo);
        }
        self.updated = Some(now);
    }
}

/// Field changes submitted through a profile update form.
///
/// `about` is doubly optional: `Some(None)` clears the biography.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<UserName>,
    pub email: Option<Email>,
    pub about: Option<Option<About>>,
    pub photo: Option<Photo>,
}

impl ProfileUpdate {
    /// Validate raw form values into an update.
    ///
    /// # Examples
    /// ```
    /// use social_backend::domain::ProfileUpdate;
    ///
    /// let update = ProfileUpdate::from_form(Some(" Ada "), None, Some(""), None)
    ///     .expect("valid update");
    /// assert_eq!(update.name.as_ref().map(AsRef::as_ref), Some("Ada"));
    /// assert_eq!(update.about, Some(None));
    /// ```
    pub fn from_form(
        name: Option<&str>,
        email: Option<&str>,
        about: Option<&str>,
        photo: Option<Photo>,
    ) -> Result<Self, UserValidationError> {
        Ok(Self {
            name: name.map(UserName::new).transpose()?,
            email: email.map(Email::new).transpose()?,
            about: about.map(About::new).transpose()?,
            photo,
        })
    }
}
