//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. The
//! wrappers here mirror their serialised shape and are registered under the
//! domain type names.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// A trade offer breaks a business rule.
    #[schema(rename = "invalid_offer")]
    InvalidOffer,
    /// The trade offer is no longer pending.
    #[schema(rename = "already_processed")]
    AlreadyProcessed,
    /// The email belongs to another account.
    #[schema(rename = "duplicate_email")]
    DuplicateEmail,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Login failed.
    #[schema(rename = "invalid_credentials")]
    InvalidCredentials,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// A concurrent change invalidated the request.
    #[schema(rename = "conflict")]
    Conflict,
    /// Storage is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "forbidden")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "Not item owner")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "0b9f8a3e-3c43-4b8e-9d1a-0c1d8f8f6a41")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::PartialSchema;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn error_schema_is_named_after_domain_type() {
        // utoipa replaces :: with . in schema names
        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
        assert_eq!(ErrorCodeSchema::name(), "crate.domain.ErrorCode");
    }

    #[test]
    fn error_schema_uses_wire_field_names() {
        let schema_json = schema_to_json::<ErrorSchema>();
        assert!(schema_json.contains("traceId"), "missing traceId");
        assert!(schema_json.contains("details"), "missing details");
    }

    #[rstest]
    #[case(crate::domain::Error::invalid_request("x"))]
    #[case(crate::domain::Error::invalid_offer("x"))]
    #[case(crate::domain::Error::already_processed("x"))]
    #[case(crate::domain::Error::duplicate_email("x"))]
    #[case(crate::domain::Error::unauthorized("x"))]
    #[case(crate::domain::Error::invalid_credentials("x"))]
    #[case(crate::domain::Error::forbidden("x"))]
    #[case(crate::domain::Error::not_found("x"))]
    #[case(crate::domain::Error::conflict("x"))]
    #[case(crate::domain::Error::service_unavailable("x"))]
    #[case(crate::domain::Error::internal("x"))]
    fn every_wire_code_is_documented(#[case] error: crate::domain::Error) {
        let wire = serde_json::to_value(error.code()).expect("serialise code");
        let code = wire.as_str().expect("code is a string");
        assert!(
            schema_to_json::<ErrorCodeSchema>().contains(&format!("\"{code}\"")),
            "missing {code}"
        );
    }
}
