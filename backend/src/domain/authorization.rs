//! Ownership checks for profile mutations.

use super::{Error, Role, UserId};

/// Message returned when a caller acts on someone else's profile.
pub const FORBIDDEN_MESSAGE: &str = "User is not authorized to perform this action";

/// Authenticated caller as recorded in the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
}

impl Identity {
    /// Caller `user_id` acting with `role`.
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Whether this caller may act on the profile identified by `profile_id`.
    pub fn may_act_on(&self, profile_id: &UserId) -> bool {
        &self.user_id == profile_id || self.role == Role::Admin
    }
}

/// Allow the caller to act on `profile_id` when they own it or are an admin.
///
/// # Examples
/// ```
/// use social_backend::domain::{authorize, Identity, Role, UserId};
///
/// let owner = UserId::random();
/// let caller = Identity::new(owner.clone(), Role::Normal);
/// assert!(authorize(&owner, &caller).is_ok());
/// assert!(authorize(&UserId::random(), &caller).is_err());
/// ```
pub fn authorize(profile_id: &UserId, identity: &Identity) -> Result<(), Error> {
    if identity.may_act_on(profile_id) {
        Ok(())
    } else {
        tracing::debug!(
            caller = %identity.user_id,
            profile = %profile_id,
            "profile action rejected"
        );
        Err(Error::forbidden(FORBIDDEN_MESSAGE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(true, Role::Normal, true)]
    #[case(true, Role::Admin, true)]
    #[case(false, Role::Admin, true)]
    #[case(false, Role::Normal, false)]
    fn grants_owner_or_admin(#[case] owns: bool, #[case] role: Role, #[case] allowed: bool) {
        let profile = UserId::random();
        let caller = if owns { profile.clone() } else { UserId::random() };
        let identity = Identity::new(caller, role);

        assert_eq!(authorize(&profile, &identity).is_ok(), allowed);
    }

    #[rstest]
    fn rejection_is_forbidden_with_fixed_message() {
        let identity = Identity::new(UserId::random(), Role::Normal);
        let err = authorize(&UserId::random(), &identity).expect_err("not the owner");

        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert_eq!(err.message(), FORBIDDEN_MESSAGE);
    }
}
