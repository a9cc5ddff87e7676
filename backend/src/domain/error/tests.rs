//! Tests for domain error construction and serialisation.

use super::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case(Error::invalid_request("x"), ErrorCode::InvalidRequest)]
#[case(Error::invalid_offer("x"), ErrorCode::InvalidOffer)]
#[case(Error::already_processed("x"), ErrorCode::AlreadyProcessed)]
#[case(Error::duplicate_email("x"), ErrorCode::DuplicateEmail)]
#[case(Error::unauthorized("x"), ErrorCode::Unauthorized)]
#[case(Error::invalid_credentials("x"), ErrorCode::InvalidCredentials)]
#[case(Error::forbidden("x"), ErrorCode::Forbidden)]
#[case(Error::not_found("x"), ErrorCode::NotFound)]
#[case(Error::conflict("x"), ErrorCode::Conflict)]
#[case(Error::service_unavailable("x"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("x"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
    assert_eq!(error.message(), "x");
}

#[rstest]
fn serialises_camel_case_and_skips_empty_fields() {
    let error = Error::forbidden("Not item owner");
    let value = serde_json::to_value(&error).expect("serialise error");
    assert_eq!(
        value,
        json!({ "code": "forbidden", "message": "Not item owner" })
    );
}

#[rstest]
fn serialises_trace_id_and_details_when_present() {
    let error = Error::invalid_request("bad")
        .with_trace_id("00000000-0000-0000-0000-000000000000")
        .with_details(json!({ "field": "name" }));
    let value = serde_json::to_value(&error).expect("serialise error");
    assert_eq!(value["traceId"], "00000000-0000-0000-0000-000000000000");
    assert_eq!(value["details"]["field"], "name");
}

#[tokio::test]
async fn captures_trace_id_in_scope() {
    let trace_id: TraceId = "00000000-0000-0000-0000-000000000001"
        .parse()
        .expect("valid uuid");
    let error = TraceId::scope(trace_id, async { Error::conflict("stale") }).await;
    assert_eq!(error.trace_id(), Some("00000000-0000-0000-0000-000000000001"));
}

#[rstest]
fn no_trace_id_outside_scope() {
    assert!(Error::internal("boom").trace_id().is_none());
}
