//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every users endpoint and the health probes, the
//! error schema wrappers from [`crate::inbound::http::schemas`], and the
//! session cookie security scheme. Swagger UI serves it in debug builds and
//! `cargo run --bin openapi-dump` prints it for external tooling.

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users_dto::{
    FollowRequest, MessageResponse, UnfollowRequest, UserProfileResponse, UserSummaryResponse,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by the sign-in service.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Social backend API",
        description = "Profiles, listings and follow relationships for a small social network."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::users::get_photo,
        crate::inbound::http::users::find_people,
        crate::inbound::http::users::follow,
        crate::inbound::http::users::unfollow,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        UserProfileResponse,
        UserSummaryResponse,
        FollowRequest,
        UnfollowRequest,
        MessageResponse
    )),
    tags(
        (name = "users", description = "Profiles and relationships"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
