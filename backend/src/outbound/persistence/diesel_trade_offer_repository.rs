//! PostgreSQL-backed `TradeOfferRepository` implementation using Diesel ORM.
//!
//! Resolution runs in one transaction: a compare-and-swap on the offer status
//! followed, for an acceptance, by two owner-conditioned item updates. If an
//! item update touches no row the transaction rolls back, leaving the offer
//! pending and both owners unchanged. Concurrent resolutions of the same offer
//! serialise on the offer row lock; the loser's compare-and-swap matches no
//! row and reports the status the winner wrote.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{TradeOfferRepository, TradeOfferRepositoryError};
use crate::domain::{
    ItemId, OfferDecision, OfferId, OfferResolution, OfferStatus, TradeOffer, UserId,
};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error};
use super::models::{NewTradeOfferRow, TradeOfferRow};
use super::pool::{DbPool, PoolError};
use super::schema::{items, trade_offers};

/// Diesel-backed implementation of the `TradeOfferRepository` port.
#[derive(Clone)]
pub struct DieselTradeOfferRepository {
    pool: DbPool,
}

impl DieselTradeOfferRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TradeOfferRepositoryError {
    TradeOfferRepositoryError::connection(error.into_message())
}

fn map_diesel_error(
    error: diesel::result::Error,
    operation: &'static str,
) -> TradeOfferRepositoryError {
    match classify_diesel_error(&error, operation) {
        DieselFailure::Connection(message) => TradeOfferRepositoryError::connection(message),
        DieselFailure::Query(message) => TradeOfferRepositoryError::query(message),
        DieselFailure::UniqueViolation(_) => {
            TradeOfferRepositoryError::query("unique constraint violated")
        }
        DieselFailure::Contention => {
            TradeOfferRepositoryError::contention("serialization failure")
        }
    }
}

fn to_offer(row: TradeOfferRow) -> Result<TradeOffer, TradeOfferRepositoryError> {
    TradeOffer::try_from(row).map_err(TradeOfferRepositoryError::query)
}

/// Failure inside the resolution transaction. Any variant rolls back.
#[derive(Debug)]
enum ResolveFailure {
    Database(diesel::result::Error),
    StaleItem(ItemId),
}

impl From<diesel::result::Error> for ResolveFailure {
    fn from(error: diesel::result::Error) -> Self {
        Self::Database(error)
    }
}

async fn move_item<C>(
    conn: &mut C,
    (item_id, from, to): (ItemId, UserId, UserId),
    now: DateTime<Utc>,
) -> Result<(), ResolveFailure>
where
    C: AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    let updated = diesel::update(
        items::table
            .filter(items::id.eq(*item_id.as_uuid()))
            .filter(items::owner_id.eq(*from.as_uuid())),
    )
    .set((items::owner_id.eq(*to.as_uuid()), items::updated_at.eq(now)))
    .execute(conn)
    .await?;

    if updated == 0 {
        return Err(ResolveFailure::StaleItem(item_id));
    }
    Ok(())
}

async fn current_status<C>(
    conn: &mut C,
    offer_id: Uuid,
) -> Result<Option<String>, TradeOfferRepositoryError>
where
    C: AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    trade_offers::table
        .filter(trade_offers::id.eq(offer_id))
        .select(trade_offers::status)
        .first(conn)
        .await
        .optional()
        .map_err(|err| map_diesel_error(err, "read offer status"))
}

#[async_trait]
impl TradeOfferRepository for DieselTradeOfferRepository {
    async fn insert(&self, offer: &TradeOffer) -> Result<(), TradeOfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(trade_offers::table)
            .values(NewTradeOfferRow::from(offer))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, "insert trade offer"))
    }

    async fn find_by_id(
        &self,
        id: &OfferId,
    ) -> Result<Option<TradeOffer>, TradeOfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<TradeOfferRow> = trade_offers::table
            .filter(trade_offers::id.eq(id.as_uuid()))
            .select(TradeOfferRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find trade offer"))?;

        row.map(to_offer).transpose()
    }

    async fn list_for_recipient(
        &self,
        recipient: &UserId,
    ) -> Result<Vec<TradeOffer>, TradeOfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<TradeOfferRow> = trade_offers::table
            .filter(trade_offers::offered_to.eq(recipient.as_uuid()))
            .select(TradeOfferRow::as_select())
            .order_by((trade_offers::created_at.asc(), trade_offers::id.asc()))
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list incoming offers"))?;

        rows.into_iter().map(to_offer).collect()
    }

    async fn resolve(
        &self,
        resolution: &OfferResolution,
    ) -> Result<TradeOffer, TradeOfferRepositoryError> {
        let offer_id = *resolution.offer.id.as_uuid();
        let target = resolution.decision.target_status().as_str();
        let resolved_at = resolution.resolved_at;
        let moves = match resolution.decision {
            OfferDecision::Accept => resolution.offer.swap_moves().to_vec(),
            OfferDecision::Reject => Vec::new(),
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let swapped = conn
            .transaction::<_, ResolveFailure, _>(|conn| {
                async move {
                    let row: Option<TradeOfferRow> = diesel::update(
                        trade_offers::table
                            .filter(trade_offers::id.eq(offer_id))
                            .filter(trade_offers::status.eq(OfferStatus::Pending.as_str())),
                    )
                    .set((
                        trade_offers::status.eq(target),
                        trade_offers::updated_at.eq(resolved_at),
                    ))
                    .returning(TradeOfferRow::as_returning())
                    .get_result(conn)
                    .await
                    .optional()?;

                    let Some(row) = row else {
                        return Ok(None);
                    };
                    for movement in moves {
                        move_item(conn, movement, resolved_at).await?;
                    }
                    Ok(Some(row))
                }
                .scope_boxed()
            })
            .await
            .map_err(|failure| match failure {
                ResolveFailure::Database(err) => map_diesel_error(err, "resolve trade offer"),
                ResolveFailure::StaleItem(item_id) => {
                    TradeOfferRepositoryError::stale_item(item_id.to_string())
                }
            })?;

        match swapped {
            Some(row) => to_offer(row),
            None => match current_status(&mut *conn, offer_id).await? {
                Some(status) => Err(TradeOfferRepositoryError::already_resolved(status)),
                None => Err(TradeOfferRepositoryError::not_found(offer_id.to_string())),
            },
        }
    }
}
