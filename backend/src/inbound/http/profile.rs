//! Profile extractors for routes addressed by a `{id}` path segment.
//!
//! [`LoadedProfile`] resolves the user once per request and caches it in the
//! request extensions. [`AuthorizedProfile`] adds the session identity and
//! the ownership gate on top.

use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use crate::domain::ports::USER_NOT_FOUND_MESSAGE;
use crate::domain::{Error, ErrorCode, Identity, User, UserId, authorize};
use crate::inbound::http::session::SignedIn;
use crate::inbound::http::state::HttpState;

const PROFILE_ID_SEGMENT: &str = "id";

/// Only connectivity failures survive; every other lookup failure reads as
/// an unknown profile.
fn lookup_error(error: Error) -> Error {
    if error.code() == ErrorCode::ServiceUnavailable {
        error
    } else {
        debug!(message = error.message(), "profile lookup failed");
        Error::not_found(USER_NOT_FOUND_MESSAGE)
    }
}

/// Profile named by the `{id}` path segment.
#[derive(Debug, Clone)]
pub struct LoadedProfile(pub User);

impl std::ops::Deref for LoadedProfile {
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for LoadedProfile {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let cached = req.extensions().get::<LoadedProfile>().cloned();
        let req = req.clone();
        Box::pin(async move {
            if let Some(profile) = cached {
                return Ok(profile);
            }
            let state = req
                .app_data::<web::Data<HttpState>>()
                .cloned()
                .ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let raw_id = req.match_info().get(PROFILE_ID_SEGMENT).unwrap_or_default();
            let id = UserId::new(raw_id).map_err(|_| Error::not_found(USER_NOT_FOUND_MESSAGE))?;
            let user = state.users.fetch_profile(&id).await.map_err(lookup_error)?;
            let profile = LoadedProfile(user);
            req.extensions_mut().insert(profile.clone());
            Ok(profile)
        })
    }
}

/// Loaded profile the signed-in caller may modify.
///
/// Resolution order is session, then profile, then the ownership gate, so
/// anonymous callers see `401` before any lookup happens.
#[derive(Debug, Clone)]
pub struct AuthorizedProfile {
    pub profile: User,
    pub identity: Identity,
}

impl FromRequest for AuthorizedProfile {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let signed_in = SignedIn::from_request(req, payload);
        let req = req.clone();
        Box::pin(async move {
            let SignedIn(identity) = signed_in.await?;
            let LoadedProfile(profile) =
                LoadedProfile::from_request(&req, &mut Payload::None).await?;
            authorize(profile.id(), &identity)?;
            Ok(Self { profile, identity })
        })
    }
}
