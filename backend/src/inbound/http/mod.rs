//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod error;
pub mod health;
pub mod items;
pub mod offers;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub(crate) mod validation;

use actix_web::{Scope, web};

pub use error::ApiResult;

/// Versioned API scope with every handler and extractor configuration.
///
/// `/items/me` is registered ahead of `/items/{id}` so the literal segment
/// wins.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use backend::inbound::http::api_scope;
///
/// let _app = App::new().service(api_scope());
/// ```
pub fn api_scope() -> Scope {
    web::scope("/api/v1")
        .app_data(error::json_config())
        .app_data(error::query_config())
        .app_data(error::path_config())
        .service(users::register)
        .service(users::login)
        .service(users::current_user)
        .service(users::update_current_user)
        .service(users::list_user_items)
        .service(items::list_my_items)
        .service(items::list_items)
        .service(items::create_item)
        .service(items::get_item)
        .service(items::update_item)
        .service(items::delete_item)
        .service(offers::list_incoming_offers)
        .service(offers::create_offer)
        .service(offers::resolve_offer)
}
