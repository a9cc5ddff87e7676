//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories share one `bb8` pool of `diesel-async` connections. Row
//! structs (`models.rs`) and table definitions (`schema.rs`) stay private to
//! this module; only domain types cross the port boundary.
//!
//! # Example
//!
//! ```no_run
//! use backend::outbound::persistence::{
//!     DbPool, DieselItemRepository, PoolConfig, run_pending_migrations,
//! };
//!
//! # async fn wire() -> Result<(), backend::outbound::persistence::PoolError> {
//! let url = "postgres://exchange@localhost/exchange";
//! run_pending_migrations(url).await?;
//! let pool = DbPool::new(PoolConfig::new(url)).await?;
//! let items = DieselItemRepository::new(pool);
//! # let _ = items;
//! # Ok(())
//! # }
//! ```

mod diesel_error_mapping;
mod diesel_item_repository;
mod diesel_trade_offer_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_item_repository::DieselItemRepository;
pub use diesel_trade_offer_repository::DieselTradeOfferRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError, run_pending_migrations};
