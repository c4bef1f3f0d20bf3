//! HTTP inbound adapter exposing the users REST API.

pub mod error;
pub mod health;
pub mod profile;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod users;
pub mod users_dto;

use actix_web::{Scope, web};

pub use error::ApiResult;

/// `/api/v1` scope with every users route and its body configuration.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use social_backend::inbound::http::{api_scope, users::DEFAULT_PHOTO_LIMIT_BYTES};
///
/// let _app = App::new().service(api_scope(DEFAULT_PHOTO_LIMIT_BYTES));
/// ```
pub fn api_scope(photo_limit_bytes: usize) -> Scope {
    web::scope("/api/v1")
        .app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .app_data(users::multipart_config(photo_limit_bytes))
        .configure(users::configure)
}
