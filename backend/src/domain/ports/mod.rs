//! Domain ports for the hexagonal boundary.
//!
//! Driving ports (`UsersQuery`, `UserProfileCommand`, `RelationshipCommand`)
//! are consumed by inbound adapters; the driven `UserRepository` port is
//! implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod relationship_command;
mod user_profile_command;
mod user_repository;
mod users_query;

#[cfg(test)]
pub use relationship_command::MockRelationshipCommand;
pub use relationship_command::{RelationshipCommand, SELF_FOLLOW_MESSAGE};
#[cfg(test)]
pub use user_profile_command::MockUserProfileCommand;
pub use user_profile_command::UserProfileCommand;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserFilter, UserPersistenceError, UserRepository};
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::{USER_NOT_FOUND_MESSAGE, USERS_PER_PAGE, UsersQuery};
