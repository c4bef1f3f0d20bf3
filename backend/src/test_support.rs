//! Test utilities for the backend crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`, via
//! the `test-support` feature).

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{Email, PasswordCredentials, User, UserId, UserName, UserValidationError};

/// 2024-01-01T00:00:00Z, the reference instant for fixtures.
pub fn base_time() -> DateTime<Utc> {
    Utc.timestamp_opt(1_704_067_200, 0)
        .single()
        .unwrap_or_default()
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixtureClock(pub DateTime<Utc>);

impl Default for FixtureClock {
    fn default() -> Self {
        Self(base_time())
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// User named `name`, created `minutes` after [`base_time`], with email
/// `<lowercased name>@example.com`.
///
/// # Examples
/// ```
/// use social_backend::test_support::sample_user;
///
/// let ada = sample_user("Ada", 0)?;
/// assert_eq!(ada.email().as_ref(), "ada@example.com");
/// # Ok::<(), social_backend::domain::UserValidationError>(())
/// ```
pub fn sample_user(name: &str, minutes: i64) -> Result<User, UserValidationError> {
    let email: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    Ok(User::new(
        UserId::random(),
        UserName::new(name)?,
        Email::new(format!("{email}@example.com"))?,
        PasswordCredentials::new("not-a-real-hash", "not-a-real-salt"),
        base_time() + Duration::minutes(minutes),
    ))
}
