//! Trade offer API handlers.
//!
//! ```text
//! POST /api/v1/offers {"requestedItemId":"…","offeredItemId":"…"}
//! GET  /api/v1/offers/incoming
//! PUT  /api/v1/offers/{id} {"status":"accepted"}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, IncomingOffer, ItemId, OfferId, TradeOffer, UserSummary};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::items::ItemResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, required};

/// Offer creation body.
///
/// `requestedGameId` and `offeredGameId` are accepted as aliases.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOfferRequest {
    #[serde(alias = "requestedGameId")]
    pub requested_item_id: Option<String>,
    #[serde(alias = "offeredGameId")]
    pub offered_item_id: Option<String>,
}

struct OfferItems {
    requested: ItemId,
    offered: ItemId,
}

impl TryFrom<CreateOfferRequest> for OfferItems {
    type Error = Error;

    fn try_from(value: CreateOfferRequest) -> Result<Self, Self::Error> {
        let requested_field = FieldName::new("requestedItemId");
        let offered_field = FieldName::new("offeredItemId");
        let requested = required(value.requested_item_id, requested_field)?;
        let offered = required(value.offered_item_id, offered_field)?;
        Ok(Self {
            requested: parse_id(&requested, requested_field, ItemId::new)?,
            offered: parse_id(&offered, offered_field, ItemId::new)?,
        })
    }
}

/// Resolution body. `status` must be `accepted` or `rejected`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ResolveOfferRequest {
    #[schema(example = "accepted")]
    pub status: Option<String>,
}

/// Trade offer as returned to clients.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfferResponse {
    pub id: String,
    pub offered_by: String,
    pub offered_to: String,
    pub requested_item_id: String,
    pub offered_item_id: String,
    #[schema(example = "pending")]
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TradeOffer> for OfferResponse {
    fn from(offer: TradeOffer) -> Self {
        Self {
            id: offer.id.to_string(),
            offered_by: offer.offered_by.to_string(),
            offered_to: offer.offered_to.to_string(),
            requested_item_id: offer.requested_item.to_string(),
            offered_item_id: offer.offered_item.to_string(),
            status: offer.status.as_str().to_owned(),
            created_at: offer.created_at,
            updated_at: offer.updated_at,
        }
    }
}

/// Proposer details exposed on incoming offers.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ProposerResponse {
    pub id: String,
    pub name: String,
}

impl From<UserSummary> for ProposerResponse {
    fn from(summary: UserSummary) -> Self {
        Self {
            id: summary.id.to_string(),
            name: summary.name.as_str().to_owned(),
        }
    }
}

/// Incoming offer joined with its proposer and items.
///
/// Items deleted since the offer was made are `null`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncomingOfferResponse {
    #[serde(flatten)]
    pub offer: OfferResponse,
    pub proposer: Option<ProposerResponse>,
    pub requested_item: Option<ItemResponse>,
    pub offered_item: Option<ItemResponse>,
}

impl From<IncomingOffer> for IncomingOfferResponse {
    fn from(incoming: IncomingOffer) -> Self {
        Self {
            offer: OfferResponse::from(incoming.offer),
            proposer: incoming.offered_by.map(ProposerResponse::from),
            requested_item: incoming.requested_item.map(ItemResponse::from),
            offered_item: incoming.offered_item.map(ItemResponse::from),
        }
    }
}

/// Propose swapping one of the caller's items for another user's item.
#[utoipa::path(
    post,
    path = "/api/v1/offers",
    request_body = CreateOfferRequest,
    responses(
        (status = 201, description = "Offer created", body = OfferResponse),
        (status = 400, description = "Invalid request or self-trade", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller does not own the offered item", body = ErrorSchema),
        (status = 404, description = "Item not found", body = ErrorSchema)
    ),
    tags = ["offers"],
    operation_id = "createOffer"
)]
#[post("/offers")]
pub async fn create_offer(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<CreateOfferRequest>,
) -> ApiResult<HttpResponse> {
    let items = OfferItems::try_from(payload.into_inner())?;
    let offer = state
        .offers
        .create_offer(caller.user_id(), &items.requested, &items.offered)
        .await?;
    Ok(HttpResponse::Created().json(OfferResponse::from(offer)))
}

/// List offers addressed to the caller.
#[utoipa::path(
    get,
    path = "/api/v1/offers/incoming",
    responses(
        (status = 200, description = "Incoming offers", body = [IncomingOfferResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["offers"],
    operation_id = "listIncomingOffers"
)]
#[get("/offers/incoming")]
pub async fn list_incoming_offers(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<IncomingOfferResponse>>> {
    let offers = state.offers_query.list_incoming(caller.user_id()).await?;
    Ok(web::Json(
        offers.into_iter().map(IncomingOfferResponse::from).collect(),
    ))
}

/// Accept or reject an offer addressed to the caller.
///
/// A missing or unreadable body counts as an empty status, so lookup and
/// authorisation failures are still reported first.
#[utoipa::path(
    put,
    path = "/api/v1/offers/{id}",
    params(("id" = String, Path, description = "Offer identifier")),
    request_body = ResolveOfferRequest,
    responses(
        (status = 200, description = "Resolved offer", body = OfferResponse),
        (status = 400, description = "Invalid status or offer already processed", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller is not the recipient", body = ErrorSchema),
        (status = 404, description = "Offer not found", body = ErrorSchema),
        (status = 409, description = "Trade target no longer valid", body = ErrorSchema)
    ),
    tags = ["offers"],
    operation_id = "resolveOffer"
)]
#[put("/offers/{id}")]
pub async fn resolve_offer(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: Option<web::Json<ResolveOfferRequest>>,
) -> ApiResult<web::Json<OfferResponse>> {
    let offer_id = parse_id(&path, FieldName::new("id"), OfferId::new)?;
    let decision = payload
        .and_then(|body| body.into_inner().status)
        .unwrap_or_default();
    let offer = state
        .offers
        .resolve_offer(&offer_id, caller.user_id(), &decision)
        .await?;
    Ok(web::Json(OfferResponse::from(offer)))
}

#[cfg(test)]
#[path = "offers_tests.rs"]
mod tests;
