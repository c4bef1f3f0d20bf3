//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::{HttpResponse, web};

use crate::domain::{Error, Identity, Role, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::session_config::SESSION_COOKIE_NAME;

/// Path of the sign-in shim registered by [`test_sign_in_route`].
pub const TEST_SIGN_IN_PATH: &str = "/test/sign-in";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Disables the `Secure` flag for local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE_NAME.to_owned())
        .cookie_secure(false)
        .build()
}

/// Session cookie set by `response`.
///
/// # Panics
///
/// Panics when the response did not set a session cookie.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(Cookie::into_owned)
        .expect("session cookie")
}

async fn sign_in(
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (raw_id, raw_role) = path.into_inner();
    let user_id = UserId::new(&raw_id).map_err(|err| Error::invalid_request(err.to_string()))?;
    let role = raw_role
        .parse::<Role>()
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    session.persist_identity(&Identity::new(user_id, role))?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register `POST /test/sign-in/{id}/{role}`, standing in for the external
/// sign-in flow.
pub fn test_sign_in_route(cfg: &mut web::ServiceConfig) {
    cfg.route(
        &format!("{TEST_SIGN_IN_PATH}/{{id}}/{{role}}"),
        web::post().to(sign_in),
    );
}

/// URI that signs in as `identity` through [`test_sign_in_route`].
pub fn sign_in_uri(identity: &Identity) -> String {
    format!("{TEST_SIGN_IN_PATH}/{}/{}", identity.user_id, identity.role)
}
