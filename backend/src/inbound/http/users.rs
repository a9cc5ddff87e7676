//! Account API handlers.
//!
//! ```text
//! POST /api/v1/auth/register {"name":"Ada","email":"ada@example.com","password":"pw","address":"1 Analytical Way"}
//! POST /api/v1/auth/login {"email":"ada@example.com","password":"pw"}
//! GET  /api/v1/users/me
//! PUT  /api/v1/users/me {"address":"2 Difference Lane"}
//! GET  /api/v1/users/{id}/items
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::ToSchema;

use crate::domain::{
    Error, ItemFilter, LoginCredentials, ProfileUpdate, Registration, User, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::items::{ItemResponse, ItemSearchQuery, item_list};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, map_credentials_validation_error, map_user_validation_error, parse_id, required,
};

/// Registration request body for `POST /api/v1/auth/register`.
///
/// `streetAddress` is accepted as an alias of `address`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(alias = "streetAddress")]
    pub address: Option<String>,
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = Error;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        let name = required(value.name, FieldName::new("name"))?;
        let email = required(value.email, FieldName::new("email"))?;
        let password = required(value.password, FieldName::new("password"))?;
        let address = required(value.address, FieldName::new("address"))?;
        Self::try_from_parts(&name, &email, &password, &address)
            .map_err(|err| map_credentials_validation_error(&err))
    }
}

/// Identifier of a newly registered account.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RegisteredResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
}

/// Login request body for `POST /api/v1/auth/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = Error;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        let email = required(value.email, FieldName::new("email"))?;
        let password = required(value.password, FieldName::new("password"))?;
        Self::try_from_parts(&email, &password)
            .map_err(|err| map_credentials_validation_error(&err))
    }
}

/// Bearer token issued on login.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Partial profile update. Omitted fields are left unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    #[serde(alias = "streetAddress")]
    pub address: Option<String>,
}

impl TryFrom<UpdateProfileRequest> for ProfileUpdate {
    type Error = Error;

    fn try_from(value: UpdateProfileRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(value.name.as_deref(), value.address.as_deref())
            .map_err(|err| map_user_validation_error(&err))
    }
}

/// Hypermedia link attached to profile responses.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Link {
    #[schema(example = "self")]
    pub rel: String,
    #[schema(example = "/api/v1/users/me")]
    pub href: String,
    #[schema(example = "GET")]
    pub method: String,
}

impl Link {
    fn new(rel: &str, href: &str, method: &str) -> Self {
        Self {
            rel: rel.to_owned(),
            href: href.to_owned(),
            method: method.to_owned(),
        }
    }
}

/// Caller's profile with navigation links.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub address: String,
    pub links: Vec<Link>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.as_str().to_owned(),
            email: user.email.as_str().to_owned(),
            address: user.address.as_str().to_owned(),
            links: vec![
                Link::new("self", "/api/v1/users/me", "GET"),
                Link::new("update", "/api/v1/users/me", "PUT"),
                Link::new("items", "/api/v1/items/me", "GET"),
            ],
        }
    }
}

/// Create an account.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisteredResponse),
        (status = 400, description = "Missing fields or duplicate email", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = Registration::try_from(payload.into_inner())?;
    let id = state.registration.register(&registration).await?;
    info!(user_id = %id, "account registered");
    Ok(HttpResponse::Created().json(RegisteredResponse { id: id.to_string() }))
}

/// Verify credentials and issue a bearer token.
///
/// Unknown emails and wrong passwords produce the same response.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = TokenResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<TokenResponse>> {
    let credentials = LoginCredentials::try_from(payload.into_inner())?;
    let user_id = state.login.authenticate(&credentials).await?;
    let issued = state.tokens.issue(&user_id).map_err(|err| {
        error!(error = %err, "token issuance failed");
        Error::internal("token issuance failed")
    })?;
    Ok(web::Json(TokenResponse {
        token: issued.token.as_str().to_owned(),
    }))
}

/// Fetch the caller's profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<ProfileResponse>> {
    let user = state.profile.fetch_profile(caller.user_id()).await?;
    Ok(web::Json(ProfileResponse::from(user)))
}

/// Update the caller's name and/or address.
#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Invalid fields", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateCurrentUser"
)]
#[put("/users/me")]
pub async fn update_current_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let update = ProfileUpdate::try_from(payload.into_inner())?;
    let user = state
        .profile_command
        .update_profile(caller.user_id(), &update)
        .await?;
    Ok(web::Json(ProfileResponse::from(user)))
}

/// List the items owned by another user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/items",
    params(("id" = String, Path, description = "User identifier"), ItemSearchQuery),
    responses(
        (status = 200, description = "Items owned by the user", body = [ItemResponse]),
        (status = 400, description = "Malformed identifier", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUserItems"
)]
#[get("/users/{id}/items")]
pub async fn list_user_items(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
    query: web::Query<ItemSearchQuery>,
) -> ApiResult<web::Json<Vec<ItemResponse>>> {
    let owner = parse_id(&path, FieldName::new("id"), UserId::new)?;
    let filter = ItemFilter::from(query.into_inner());
    let items = state.items.list_items_owned_by(&owner, &filter).await?;
    Ok(web::Json(item_list(items)))
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
