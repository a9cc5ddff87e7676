//! Bearer authentication for HTTP handlers.
//!
//! Handlers that require a caller take an [`AuthenticatedUser`] argument. The
//! extractor reads `Authorization: Bearer <token>`, resolves it through the
//! [`AccessTokenService`](crate::domain::ports::AccessTokenService) port in
//! [`HttpState`] and hands the handler a verified [`UserId`]. Handlers never
//! re-verify the credential.

use actix_web::dev::Payload;
use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::{Ready, ready};
use tracing::debug;

use crate::domain::ports::AccessTokenError;
use crate::domain::{Error, UserId};

use super::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Identity of the caller, verified from the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(UserId);

impl AuthenticatedUser {
    /// Verified user id.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.0
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, Error> {
    let raw = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("Authorization header required"))?;
    let value = raw
        .to_str()
        .map_err(|_| Error::unauthorized("Authorization header is not valid text"))?;
    value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("Authorization header must use the Bearer scheme"))
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not configured"))?;
    let token = bearer_token(req.headers())?;
    state
        .tokens
        .resolve_identity(token)
        .map(AuthenticatedUser)
        .map_err(|err| {
            debug!(error = %err, "bearer token rejected");
            match err {
                AccessTokenError::Expired => Error::unauthorized("Token expired"),
                _ => Error::unauthorized("Invalid token"),
            }
        })
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
