//! Users API handlers.
//!
//! ```text
//! GET    /api/v1/users?page=N
//! GET    /api/v1/users/{id}
//! PUT    /api/v1/users/{id}              multipart: name, email, about, photo
//! DELETE /api/v1/users/{id}
//! GET    /api/v1/users/photo/{id}
//! GET    /api/v1/users/findPeople/{id}?page=N
//! PUT    /api/v1/users/follow            {"userId": "...", "followId": "..."}
//! PUT    /api/v1/users/unfollow          {"userId": "...", "unfollowId": "..."}
//! ```

use actix_multipart::MultipartError;
use actix_multipart::form::bytes::Bytes as FilePart;
use actix_multipart::form::text::Text;
use actix_multipart::form::{MultipartForm, MultipartFormConfig};
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, delete, get, put, web};
use pagination::PageRequest;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::ports::USERS_PER_PAGE;
use crate::domain::{Error, Identity, Photo, ProfileUpdate, UserId, UserValidationError, authorize};
use crate::inbound::http::ApiResult;
use crate::inbound::http::profile::{AuthorizedProfile, LoadedProfile};
use crate::inbound::http::schemas::{ErrorSchema, ProfileFormSchema};
use crate::inbound::http::session::SignedIn;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users_dto::{
    FollowRequest, MessageResponse, PersonResponse, UnfollowRequest, UserListingResponse,
    UserProfileResponse, UsersPage,
};

/// Message returned when the multipart body cannot be read.
pub const PHOTO_UPLOAD_FAILED_MESSAGE: &str = "Photo could not be uploaded";

/// Message returned after a profile is removed.
pub const USER_DELETED_MESSAGE: &str = "User deleted successfully";

/// Default upload limit for profile forms.
pub const DEFAULT_PHOTO_LIMIT_BYTES: usize = 1024 * 1024;

/// `?page=N` query string.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number; defaults to 1.
    #[param(value_type = Option<u32>, minimum = 1, example = 1)]
    pub page: Option<String>,
}

impl PageQuery {
    fn to_request(&self) -> Result<PageRequest, Error> {
        PageRequest::from_query(self.page.as_deref(), USERS_PER_PAGE).map_err(|err| {
            Error::invalid_request(err.to_string())
                .with_details(json!({ "field": "page", "code": "invalid_page" }))
        })
    }
}

/// Multipart body of `PUT /api/v1/users/{id}`.
///
/// Unknown parts are ignored and a repeated part replaces the earlier one.
#[derive(Debug, MultipartForm)]
#[multipart(duplicate_field = "replace")]
pub struct ProfileForm {
    pub name: Option<Text<String>>,
    pub email: Option<Text<String>>,
    pub about: Option<Text<String>>,
    pub photo: Option<FilePart>,
}

impl ProfileForm {
    fn into_update(self) -> Result<ProfileUpdate, Error> {
        let photo = match self.photo {
            Some(part) if !part.data.is_empty() => {
                let content_type = part.content_type.as_ref().map(|mime| mime.essence_str());
                Some(Photo::new(part.data.to_vec(), content_type).map_err(map_validation_error)?)
            }
            Some(_) => {
                debug!("ignoring empty photo part");
                None
            }
            None => None,
        };
        ProfileUpdate::from_form(
            self.name.as_deref().map(String::as_str),
            self.email.as_deref().map(String::as_str),
            self.about.as_deref().map(String::as_str),
            photo,
        )
        .map_err(map_validation_error)
    }
}

fn map_validation_error(err: UserValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({ "field": err.field() }))
}

fn parse_body_id(raw: &str, field: &'static str) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
    })
}

fn multipart_error_handler(err: MultipartError, _req: &HttpRequest) -> actix_web::Error {
    warn!(error = %err, "profile form rejected");
    Error::invalid_request(PHOTO_UPLOAD_FAILED_MESSAGE)
        .with_details(json!({ "reason": err.to_string() }))
        .into()
}

/// Multipart limits for profile forms.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use social_backend::inbound::http::users::{DEFAULT_PHOTO_LIMIT_BYTES, multipart_config};
///
/// let _app = App::new().app_data(multipart_config(DEFAULT_PHOTO_LIMIT_BYTES));
/// ```
pub fn multipart_config(limit_bytes: usize) -> MultipartFormConfig {
    MultipartFormConfig::default()
        .total_limit(limit_bytes)
        .memory_limit(limit_bytes)
        .error_handler(multipart_error_handler)
}

/// Register the users routes. Fixed paths come before `{id}` so they are
/// never read as identifiers.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_users)
        .service(follow)
        .service(unfollow)
        .service(get_photo)
        .service(find_people)
        .service(get_user)
        .service(update_user)
        .service(delete_user);
}

/// Page through all users.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(PageQuery),
    responses(
        (status = 200, description = "Users page", body = UsersPage<UserListingResponse>),
        (status = 400, description = "Invalid page", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers",
    security([])
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<UsersPage<UserListingResponse>>> {
    let page = state.users.list_users(query.to_request()?).await?;
    Ok(web::Json(UsersPage::from_page(page)))
}

/// Fetch one profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Profile", body = UserProfileResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 400, description = "Invalid request or user not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    _caller: SignedIn,
    profile: LoadedProfile,
) -> ApiResult<web::Json<UserProfileResponse>> {
    Ok(web::Json(UserProfileResponse::from(&*profile)))
}

/// Update profile fields and optionally replace the photo.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    request_body(content = ProfileFormSchema, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated profile", body = UserProfileResponse),
        (status = 400, description = "Invalid request or user not found", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    authorized: AuthorizedProfile,
    MultipartForm(form): MultipartForm<ProfileForm>,
) -> ApiResult<web::Json<UserProfileResponse>> {
    let update = form.into_update()?;
    let updated = state
        .profiles
        .update_profile(authorized.profile, update)
        .await?;
    Ok(web::Json(UserProfileResponse::from(&updated)))
}

/// Delete a profile and every follow edge that references it.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 400, description = "Invalid request or user not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    authorized: AuthorizedProfile,
) -> ApiResult<web::Json<MessageResponse>> {
    state.profiles.delete_profile(&authorized.profile).await?;
    Ok(web::Json(MessageResponse {
        message: USER_DELETED_MESSAGE.to_owned(),
    }))
}

/// Serve the stored photo or redirect to the placeholder.
#[utoipa::path(
    get,
    path = "/api/v1/users/photo/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Photo bytes with the stored content type"),
        (status = 307, description = "No photo; redirect to the placeholder"),
        (status = 400, description = "Invalid request or user not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUserPhoto",
    security([])
)]
#[get("/users/photo/{id}")]
pub async fn get_photo(
    state: web::Data<HttpState>,
    profile: LoadedProfile,
) -> ApiResult<HttpResponse> {
    let response = match profile.photo() {
        Some(photo) => HttpResponse::Ok()
            .insert_header((header::CONTENT_TYPE, photo.content_type()))
            .body(photo.data().to_vec()),
        None => HttpResponse::TemporaryRedirect()
            .insert_header((header::LOCATION, state.default_photo_url.as_str()))
            .finish(),
    };
    Ok(response)
}

/// Page through users the profile does not follow yet.
#[utoipa::path(
    get,
    path = "/api/v1/users/findPeople/{id}",
    params(("id" = String, Path, description = "User identifier"), PageQuery),
    responses(
        (status = 200, description = "Suggested people", body = UsersPage<PersonResponse>),
        (status = 400, description = "Invalid page or user not found", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "findPeople"
)]
#[get("/users/findPeople/{id}")]
pub async fn find_people(
    state: web::Data<HttpState>,
    _caller: SignedIn,
    profile: LoadedProfile,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<UsersPage<PersonResponse>>> {
    let page = state
        .users
        .find_people(&profile, query.to_request()?)
        .await?;
    Ok(web::Json(UsersPage::from_page(page)))
}

fn acting_user(raw: &str, caller: &Identity) -> Result<UserId, Error> {
    let user_id = parse_body_id(raw, "userId")?;
    authorize(&user_id, caller)?;
    Ok(user_id)
}

/// Follow another user.
#[utoipa::path(
    put,
    path = "/api/v1/users/follow",
    request_body = FollowRequest,
    responses(
        (status = 200, description = "Followed user's profile", body = UserProfileResponse),
        (status = 400, description = "Invalid request or user not found", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "followUser"
)]
#[put("/users/follow")]
pub async fn follow(
    state: web::Data<HttpState>,
    SignedIn(caller): SignedIn,
    payload: web::Json<FollowRequest>,
) -> ApiResult<web::Json<UserProfileResponse>> {
    let FollowRequest { user_id, follow_id } = payload.into_inner();
    let user_id = acting_user(&user_id, &caller)?;
    let target = parse_body_id(&follow_id, "followId")?;
    let updated = state.relationships.follow(&user_id, &target).await?;
    Ok(web::Json(UserProfileResponse::from(&updated)))
}

/// Stop following another user.
#[utoipa::path(
    put,
    path = "/api/v1/users/unfollow",
    request_body = UnfollowRequest,
    responses(
        (status = 200, description = "Unfollowed user's profile", body = UserProfileResponse),
        (status = 400, description = "Invalid request or user not found", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "unfollowUser"
)]
#[put("/users/unfollow")]
pub async fn unfollow(
    state: web::Data<HttpState>,
    SignedIn(caller): SignedIn,
    payload: web::Json<UnfollowRequest>,
) -> ApiResult<web::Json<UserProfileResponse>> {
    let UnfollowRequest {
        user_id,
        unfollow_id,
    } = payload.into_inner();
    let user_id = acting_user(&user_id, &caller)?;
    let target = parse_body_id(&unfollow_id, "unfollowId")?;
    let updated = state.relationships.unfollow(&user_id, &target).await?;
    Ok(web::Json(UserProfileResponse::from(&updated)))
}
