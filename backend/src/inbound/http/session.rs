//! Session helpers so handlers deal with identities, not cookies.
//!
//! The sign-in flow that writes `user_id` and `role` lives outside this
//! service; here the session is only read, except by tests.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, Identity, Role, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const ROLE_KEY: &str = "role";

/// Message returned when no valid identity is present.
pub const LOGIN_REQUIRED_MESSAGE: &str = "login required";

/// Newtype wrapper exposing identity-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Wrap an actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    fn read(&self, key: &str) -> Result<Option<String>, Error> {
        self.0
            .get::<String>(key)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))
    }

    /// Write `identity` into the session cookie.
    pub fn persist_identity(&self, identity: &Identity) -> Result<(), Error> {
        self.0
            .insert(USER_ID_KEY, identity.user_id.as_ref())
            .and_then(|()| self.0.insert(ROLE_KEY, identity.role.as_str()))
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Identity recorded in the session, if present and well formed.
    ///
    /// A missing role means [`Role::Normal`].
    pub fn identity(&self) -> Result<Option<Identity>, Error> {
        let Some(raw_id) = self.read(USER_ID_KEY)? else {
            return Ok(None);
        };
        let user_id = match UserId::new(&raw_id) {
            Ok(id) => id,
            Err(error) => {
                warn!(%error, "invalid user id in session cookie");
                return Ok(None);
            }
        };
        let role = match self.read(ROLE_KEY)? {
            None => Role::Normal,
            Some(raw) => match raw.parse() {
                Ok(role) => role,
                Err(error) => {
                    warn!(%error, "invalid role in session cookie");
                    return Ok(None);
                }
            },
        };
        Ok(Some(Identity::new(user_id, role)))
    }

    /// Require an identity or fail with `401 Unauthorized`.
    pub fn require_identity(&self) -> Result<Identity, Error> {
        self.identity()?
            .ok_or_else(|| Error::unauthorized(LOGIN_REQUIRED_MESSAGE))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

/// Extractor that rejects the request with `401` unless the session carries
/// an identity.
///
/// Place it before other extractors so anonymous callers are turned away
/// before any lookup runs.
#[derive(Debug, Clone)]
pub struct SignedIn(pub Identity);

impl FromRequest for SignedIn {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = SessionContext::from_request(req, payload);
        Box::pin(async move {
            let session = fut.await?;
            Ok(SignedIn(session.require_identity()?))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    const ADA: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    async fn whoami(session: SessionContext) -> Result<HttpResponse, Error> {
        let identity = session.require_identity()?;
        Ok(HttpResponse::Ok().body(format!("{} {}", identity.user_id, identity.role)))
    }

    #[rstest]
    #[case(Some("admin"), "admin")]
    #[case(None, "normal")]
    #[actix_web::test]
    async fn reads_identity_written_by_sign_in(
        #[case] role: Option<&'static str>,
        #[case] expected_role: &str,
    ) {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/set",
                    web::get().to(move |session: Session| async move {
                        session.insert(USER_ID_KEY, ADA).expect("user id");
                        if let Some(role) = role {
                            session.insert(ROLE_KEY, role).expect("role");
                        }
                        HttpResponse::Ok()
                    }),
                )
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let set = test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        let cookie = session_cookie(&set);
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/whoami").cookie(cookie).to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body = test::read_body(res).await;
        assert_eq!(body, format!("{ADA} {expected_role}"));
    }

    #[rstest]
    #[case(Some("not-a-uuid"), None)]
    #[case(Some(ADA), Some("root"))]
    #[case(None, None)]
    #[actix_web::test]
    async fn missing_or_tampered_identity_is_unauthorised(
        #[case] user_id: Option<&'static str>,
        #[case] role: Option<&'static str>,
    ) {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/set",
                    web::get().to(move |session: Session| async move {
                        if let Some(id) = user_id {
                            session.insert(USER_ID_KEY, id).expect("user id");
                        }
                        if let Some(role) = role {
                            session.insert(ROLE_KEY, role).expect("role");
                        }
                        HttpResponse::Ok()
                    }),
                )
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let set = test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        let mut request = test::TestRequest::get().uri("/whoami");
        if let Some(cookie) = set
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
        {
            request = request.cookie(cookie.into_owned());
        }
        let res = test::call_service(&app, request.to_request()).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
