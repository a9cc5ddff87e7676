//! Item catalogue API handlers.
//!
//! ```text
//! GET    /api/v1/items?name=Mario&system=SNES
//! GET    /api/v1/items/me
//! POST   /api/v1/items {"name":"Super Mario World","publisher":"Nintendo",...}
//! GET    /api/v1/items/{id}
//! PUT    /api/v1/items/{id} {"condition":"Boxed"}
//! DELETE /api/v1/items/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, Item, ItemDraft, ItemFields, ItemFilter, ItemId, ItemPatch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, map_item_validation_error, parse_id};

/// Item attributes accepted on create and update.
///
/// Example JSON:
/// `{"name":"Super Mario World","publisher":"Nintendo","yearPublished":1990,"system":"SNES","condition":"Good"}`
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequest {
    pub name: Option<String>,
    pub publisher: Option<String>,
    pub year_published: Option<i32>,
    pub system: Option<String>,
    pub condition: Option<String>,
    pub previous_owners: Option<u32>,
}

impl From<ItemRequest> for ItemFields {
    fn from(value: ItemRequest) -> Self {
        Self {
            name: value.name,
            publisher: value.publisher,
            year_published: value.year_published,
            system: value.system,
            condition: value.condition,
            previous_owners: value.previous_owners,
        }
    }
}

impl TryFrom<ItemRequest> for ItemDraft {
    type Error = Error;

    fn try_from(value: ItemRequest) -> Result<Self, Self::Error> {
        Self::try_from_fields(value.into()).map_err(|err| map_item_validation_error(&err))
    }
}

impl TryFrom<ItemRequest> for ItemPatch {
    type Error = Error;

    fn try_from(value: ItemRequest) -> Result<Self, Self::Error> {
        Self::try_from_fields(value.into()).map_err(|err| map_item_validation_error(&err))
    }
}

/// Item as returned to clients.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "Super Mario World")]
    pub name: String,
    pub publisher: String,
    pub year_published: i32,
    #[schema(example = "SNES")]
    pub system: String,
    pub condition: String,
    pub previous_owners: u32,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name,
            publisher: item.publisher,
            year_published: item.year_published,
            system: item.system,
            condition: item.condition,
            previous_owners: item.previous_owners,
            owner_id: item.owner_id.to_string(),
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

pub(crate) fn item_list(items: Vec<Item>) -> Vec<ItemResponse> {
    items.into_iter().map(ItemResponse::from).collect()
}

/// Listing filters. `name` is a case-sensitive substring, `system` is exact.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ItemSearchQuery {
    pub name: Option<String>,
    pub system: Option<String>,
}

impl From<ItemSearchQuery> for ItemFilter {
    fn from(value: ItemSearchQuery) -> Self {
        Self::new(value.name, value.system)
    }
}

fn item_id(raw: &str) -> Result<ItemId, Error> {
    parse_id(raw, FieldName::new("id"), ItemId::new)
}

/// List every item, optionally filtered by name and system.
#[utoipa::path(
    get,
    path = "/api/v1/items",
    params(ItemSearchQuery),
    responses(
        (status = 200, description = "Matching items", body = [ItemResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["items"],
    operation_id = "listItems"
)]
#[get("/items")]
pub async fn list_items(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    query: web::Query<ItemSearchQuery>,
) -> ApiResult<web::Json<Vec<ItemResponse>>> {
    let filter = ItemFilter::from(query.into_inner());
    let items = state.items.list_items(&filter).await?;
    Ok(web::Json(item_list(items)))
}

/// List the caller's own items with the same filters as `GET /items`.
#[utoipa::path(
    get,
    path = "/api/v1/items/me",
    params(ItemSearchQuery),
    responses(
        (status = 200, description = "Caller's items", body = [ItemResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["items"],
    operation_id = "listMyItems"
)]
#[get("/items/me")]
pub async fn list_my_items(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    query: web::Query<ItemSearchQuery>,
) -> ApiResult<web::Json<Vec<ItemResponse>>> {
    let filter = ItemFilter::from(query.into_inner());
    let items = state
        .items
        .list_items_owned_by(caller.user_id(), &filter)
        .await?;
    Ok(web::Json(item_list(items)))
}

/// Create an item owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/items",
    request_body = ItemRequest,
    responses(
        (status = 201, description = "Item created", body = ItemResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["items"],
    operation_id = "createItem"
)]
#[post("/items")]
pub async fn create_item(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<ItemRequest>,
) -> ApiResult<HttpResponse> {
    let draft = ItemDraft::try_from(payload.into_inner())?;
    let item = state
        .items_command
        .create_item(caller.user_id(), draft)
        .await?;
    Ok(HttpResponse::Created().json(ItemResponse::from(item)))
}

/// Fetch one item.
#[utoipa::path(
    get,
    path = "/api/v1/items/{id}",
    params(("id" = String, Path, description = "Item identifier")),
    responses(
        (status = 200, description = "Item", body = ItemResponse),
        (status = 400, description = "Malformed identifier", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Item not found", body = ErrorSchema)
    ),
    tags = ["items"],
    operation_id = "getItem"
)]
#[get("/items/{id}")]
pub async fn get_item(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<ItemResponse>> {
    let id = item_id(&path)?;
    let item = state.items.get_item(&id).await?;
    Ok(web::Json(ItemResponse::from(item)))
}

/// Update an item the caller owns. Omitted fields are left unchanged.
#[utoipa::path(
    put,
    path = "/api/v1/items/{id}",
    params(("id" = String, Path, description = "Item identifier")),
    request_body = ItemRequest,
    responses(
        (status = 200, description = "Updated item", body = ItemResponse),
        (status = 400, description = "Invalid fields", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not item owner", body = ErrorSchema),
        (status = 404, description = "Item not found", body = ErrorSchema),
        (status = 409, description = "Item changed owner concurrently", body = ErrorSchema)
    ),
    tags = ["items"],
    operation_id = "updateItem"
)]
#[put("/items/{id}")]
pub async fn update_item(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<ItemRequest>,
) -> ApiResult<web::Json<ItemResponse>> {
    let id = item_id(&path)?;
    let patch = ItemPatch::try_from(payload.into_inner())?;
    let item = state
        .items_command
        .update_item(&id, caller.user_id(), &patch)
        .await?;
    Ok(web::Json(ItemResponse::from(item)))
}

/// Delete an item the caller owns.
#[utoipa::path(
    delete,
    path = "/api/v1/items/{id}",
    params(("id" = String, Path, description = "Item identifier")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not item owner", body = ErrorSchema),
        (status = 404, description = "Item not found", body = ErrorSchema)
    ),
    tags = ["items"],
    operation_id = "deleteItem"
)]
#[delete("/items/{id}")]
pub async fn delete_item(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = item_id(&path)?;
    state
        .items_command
        .delete_item(&id, caller.user_id())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "items_tests.rs"]
mod tests;
