//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see driving ports, so
//! they stay testable without a store.

use std::sync::Arc;

use crate::domain::ports::{RelationshipCommand, UserProfileCommand, UsersQuery};

/// Placeholder served when a profile has no photo.
pub const DEFAULT_PHOTO_URL: &str = "/images/profile-pic.png";

/// Parameter object bundling the port implementations.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users: Arc<dyn UsersQuery>,
    pub profiles: Arc<dyn UserProfileCommand>,
    pub relationships: Arc<dyn RelationshipCommand>,
}

impl HttpStatePorts {
    /// Use one service for every port.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use social_backend::domain::UserService;
    /// use social_backend::inbound::http::state::{HttpState, HttpStatePorts};
    /// use social_backend::outbound::memory::InMemoryUserRepository;
    ///
    /// let service = Arc::new(UserService::new(
    ///     Arc::new(InMemoryUserRepository::default()),
    ///     Arc::new(DefaultClock),
    /// ));
    /// let state = HttpState::new(HttpStatePorts::from_service(service));
    /// assert_eq!(state.default_photo_url, "/images/profile-pic.png");
    /// ```
    pub fn from_service<S>(service: Arc<S>) -> Self
    where
        S: UsersQuery + UserProfileCommand + RelationshipCommand + 'static,
    {
        Self {
            users: service.clone(),
            profiles: service.clone(),
            relationships: service,
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UsersQuery>,
    pub profiles: Arc<dyn UserProfileCommand>,
    pub relationships: Arc<dyn RelationshipCommand>,
    /// Redirect target for profiles without a photo.
    pub default_photo_url: String,
}

impl HttpState {
    /// Construct state with the default placeholder URL.
    pub fn new(ports: HttpStatePorts) -> Self {
        Self::with_photo_url(ports, DEFAULT_PHOTO_URL)
    }

    /// Construct state redirecting photo-less profiles to `default_photo_url`.
    pub fn with_photo_url(ports: HttpStatePorts, default_photo_url: impl Into<String>) -> Self {
        let HttpStatePorts {
            users,
            profiles,
            relationships,
        } = ports;
        Self {
            users,
            profiles,
            relationships,
            default_photo_url: default_photo_url.into(),
        }
    }
}
