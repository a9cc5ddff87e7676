//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! document for the REST API. It registers:
//!
//! - **Paths**: every handler under `/api/v1` plus the health probes
//! - **Schemas**: request and response DTOs, and the domain error wrappers
//!   ([`ErrorSchema`], [`ErrorCodeSchema`])
//! - **Security**: HTTP bearer authentication with JWT access tokens
//!
//! The generated document is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::items::{ItemRequest, ItemResponse};
use crate::inbound::http::offers::{
    CreateOfferRequest, IncomingOfferResponse, OfferResponse, ProposerResponse,
    ResolveOfferRequest,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users::{
    Link, LoginRequest, ProfileResponse, RegisterRequest, RegisteredResponse, TokenResponse,
    UpdateProfileRequest,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Access token issued by POST /api/v1/auth/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Game exchange API",
        description = "Accounts, a shared game catalogue and two-party trade offers."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_current_user,
        crate::inbound::http::users::list_user_items,
        crate::inbound::http::items::list_items,
        crate::inbound::http::items::list_my_items,
        crate::inbound::http::items::create_item,
        crate::inbound::http::items::get_item,
        crate::inbound::http::items::update_item,
        crate::inbound::http::items::delete_item,
        crate::inbound::http::offers::create_offer,
        crate::inbound::http::offers::list_incoming_offers,
        crate::inbound::http::offers::resolve_offer,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RegisterRequest,
        RegisteredResponse,
        LoginRequest,
        TokenResponse,
        UpdateProfileRequest,
        ProfileResponse,
        Link,
        ItemRequest,
        ItemResponse,
        CreateOfferRequest,
        ResolveOfferRequest,
        OfferResponse,
        ProposerResponse,
        IncomingOfferResponse,
    )),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "users", description = "Profiles and per-user listings"),
        (name = "items", description = "The shared game catalogue"),
        (name = "offers", description = "Two-party trade offers"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI document structure.

    use super::*;
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // Note: utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn openapi_error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
        assert_object_schema_has_field(error_schema, "traceId");
    }

    #[rstest]
    #[case("/api/v1/auth/register")]
    #[case("/api/v1/auth/login")]
    #[case("/api/v1/users/me")]
    #[case("/api/v1/users/{id}/items")]
    #[case("/api/v1/items")]
    #[case("/api/v1/items/me")]
    #[case("/api/v1/items/{id}")]
    #[case("/api/v1/offers")]
    #[case("/api/v1/offers/incoming")]
    #[case("/api/v1/offers/{id}")]
    #[case("/health/ready")]
    #[case("/health/live")]
    fn every_route_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(matches!(
            components.security_schemes.get("BearerAuth"),
            Some(SecurityScheme::Http(_))
        ));
    }
}
