//! Tests for domain error construction and its wire format.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::unauthorized("login required"), ErrorCode::Unauthorized)]
#[case(Error::forbidden("nope"), ErrorCode::Forbidden)]
#[case(Error::not_found("User not found"), ErrorCode::NotFound)]
#[case(Error::service_unavailable("store down"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn trace_id_is_absent_out_of_scope() {
    assert!(Error::internal("boom").trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_trace_id_in_scope(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id.parse().expect("valid UUID");
    let error = TraceId::scope(trace_id, async { Error::not_found("User not found") }).await;

    assert_eq!(error.trace_id(), Some(expected_trace_id.as_str()));
}

#[rstest]
fn serialises_message_under_error_key(expected_trace_id: String) {
    let error = Error::invalid_request("name must not be empty")
        .with_trace_id(expected_trace_id)
        .with_details(json!({ "field": "name" }));

    let value = serde_json::to_value(&error).expect("serialise error");
    assert_eq!(
        value,
        json!({
            "error": "name must not be empty",
            "code": "invalid_request",
            "traceId": TRACE_ID,
            "details": { "field": "name" },
        })
    );
}

#[rstest]
fn omits_optional_fields_when_absent() {
    let value = serde_json::to_value(Error::forbidden("denied")).expect("serialise error");
    assert_eq!(value, json!({ "error": "denied", "code": "forbidden" }));
}

#[rstest]
fn deserialisation_rejects_blank_messages() {
    let result: Result<Error, _> =
        serde_json::from_value(json!({ "error": " ", "code": "not_found" }));
    assert!(result.is_err());
}

#[rstest]
#[tokio::test]
async fn deserialisation_does_not_adopt_ambient_trace(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id.parse().expect("valid UUID");
    let error = TraceId::scope(trace_id, async {
        serde_json::from_value::<Error>(json!({ "error": "gone", "code": "not_found" }))
            .expect("valid payload")
    })
    .await;

    assert!(error.trace_id().is_none());
}
