//! Server settings loaded via OrthoConfig and the runtime configuration
//! built from them.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use social_backend::inbound::http::session_config::SessionSettings;
use social_backend::inbound::http::state::DEFAULT_PHOTO_URL;
use social_backend::inbound::http::users::DEFAULT_PHOTO_LIMIT_BYTES;
use social_backend::outbound::persistence::DbPool;

const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::new(
    std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED),
    8080,
);
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Deployment settings read from `SOCIAL_*` variables, config files and
/// command-line flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SOCIAL")]
pub struct ServerSettings {
    /// Listen address; defaults to `0.0.0.0:8080`.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL URL. Without one the in-memory store is used.
    pub database_url: Option<String>,
    /// Redirect target for profiles without a photo.
    pub default_photo_url: Option<String>,
    /// Upload limit for profile forms, in bytes.
    pub photo_limit_bytes: Option<usize>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
}

impl ServerSettings {
    /// Listen address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr.unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Placeholder photo URL, falling back to the bundled image path.
    pub fn default_photo_url(&self) -> &str {
        self.default_photo_url.as_deref().unwrap_or(DEFAULT_PHOTO_URL)
    }

    /// Profile form upload limit, 1 MiB unless configured.
    pub fn photo_limit_bytes(&self) -> usize {
        self.photo_limit_bytes.unwrap_or(DEFAULT_PHOTO_LIMIT_BYTES)
    }

    /// Pool size, 10 unless configured.
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections.unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }
}

/// Everything [`super::create_server`] needs.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) default_photo_url: String,
    pub(crate) photo_limit_bytes: usize,
}

impl ServerConfig {
    /// Configuration backed by the in-memory store.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr) -> Self {
        Self {
            session,
            bind_addr,
            db_pool: None,
            default_photo_url: DEFAULT_PHOTO_URL.to_owned(),
            photo_limit_bytes: DEFAULT_PHOTO_LIMIT_BYTES,
        }
    }

    /// Apply photo settings from `settings`.
    #[must_use]
    pub fn with_photo_settings(mut self, settings: &ServerSettings) -> Self {
        self.default_photo_url = settings.default_photo_url().to_owned();
        self.photo_limit_bytes = settings.photo_limit_bytes();
        self
    }

    /// Use PostgreSQL through `pool`.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for server settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 5] = [
        "SOCIAL_BIND_ADDR",
        "SOCIAL_DATABASE_URL",
        "SOCIAL_DEFAULT_PHOTO_URL",
        "SOCIAL_PHOTO_LIMIT_BYTES",
        "SOCIAL_DB_MAX_CONNECTIONS",
    ];

    fn load_from_empty_args() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("social-backend")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), DEFAULT_BIND_ADDR);
        assert!(settings.database_url().is_none());
        assert_eq!(settings.default_photo_url(), DEFAULT_PHOTO_URL);
        assert_eq!(settings.photo_limit_bytes(), DEFAULT_PHOTO_LIMIT_BYTES);
        assert_eq!(settings.db_max_connections(), DEFAULT_DB_MAX_CONNECTIONS);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("SOCIAL_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "SOCIAL_DATABASE_URL",
                Some("postgres://localhost/social".to_owned()),
            ),
            ("SOCIAL_DEFAULT_PHOTO_URL", Some("/static/anon.png".to_owned())),
            ("SOCIAL_PHOTO_LIMIT_BYTES", Some("2048".to_owned())),
            ("SOCIAL_DB_MAX_CONNECTIONS", Some("3".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr().port(), 9000);
        assert_eq!(settings.database_url(), Some("postgres://localhost/social"));
        assert_eq!(settings.default_photo_url(), "/static/anon.png");
        assert_eq!(settings.photo_limit_bytes(), 2048);
        assert_eq!(settings.db_max_connections(), 3);
    }

    #[rstest]
    fn blank_database_url_selects_memory_store() {
        let _guard = lock_env([("SOCIAL_DATABASE_URL", Some("  ".to_owned()))]);

        assert!(load_from_empty_args().database_url().is_none());
    }
}
