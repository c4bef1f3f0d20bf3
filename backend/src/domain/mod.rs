//! Domain primitives, aggregates and services.
//!
//! Purpose: define the strongly typed user model, the authorization rule and
//! the services behind the driving ports. Nothing here depends on actix or
//! Diesel; adapters live under `inbound` and `outbound`.
//!
//! Public surface:
//! - `Error` / `ErrorCode`: transport-agnostic failure payload.
//! - `User` and its value types: the profile aggregate.
//! - `authorize` / `Identity`: ownership gate for mutations.
//! - `UserService`: implementation of every driving port.

pub mod authorization;
pub mod error;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod user_service;

pub use self::authorization::{FORBIDDEN_MESSAGE, Identity, authorize};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::trace_id::TraceId;
pub use self::user::{
    ABOUT_MAX, About, CONTENT_TYPE_MAX, DEFAULT_PHOTO_CONTENT_TYPE, EMAIL_MAX, Email, PasswordCredentials, Photo,
    ProfileUpdate, Role, USER_NAME_MAX, User, UserId, UserListing, UserName, UserSummary,
    UserValidationError,
};
pub use self::user_service::UserService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use social_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// # assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
