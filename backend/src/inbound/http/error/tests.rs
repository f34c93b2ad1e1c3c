//! Status mapping and redaction coverage for the HTTP error adapter.

use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::rstest;
use serde_json::Value;

use crate::domain::{Error, ErrorCode};

#[rstest]
#[case(ErrorCode::InvalidRequest, StatusCode::BAD_REQUEST)]
#[case(ErrorCode::NotFound, StatusCode::NOT_FOUND)]
#[case(ErrorCode::Conflict, StatusCode::CONFLICT)]
#[case(ErrorCode::ServiceUnavailable, StatusCode::SERVICE_UNAVAILABLE)]
#[case(ErrorCode::InternalError, StatusCode::INTERNAL_SERVER_ERROR)]
fn every_code_has_a_stable_status(#[case] code: ErrorCode, #[case] expected: StatusCode) {
    assert_eq!(Error::new(code, "boom").status_code(), expected);
}

#[actix_web::test]
async fn internal_messages_are_redacted_in_the_body() {
    let error = Error::internal("driver said: socket closed at 10.0.0.3");
    let response = error.error_response();
    let body = to_bytes(response.into_body()).await.expect("body bytes");
    let value: Value = serde_json::from_slice(&body).expect("error payload");
    assert_eq!(
        value.get("message").and_then(Value::as_str),
        Some("Internal server error")
    );
    assert_eq!(
        value.get("code").and_then(Value::as_str),
        Some("internal_error")
    );
}

#[actix_web::test]
async fn client_facing_codes_keep_their_message_and_details() {
    let error = Error::invalid_request("email must look like local@domain")
        .with_details(serde_json::json!({ "field": "email" }));
    let response = error.error_response();
    let body = to_bytes(response.into_body()).await.expect("body bytes");
    let value: Value = serde_json::from_slice(&body).expect("error payload");
    assert_eq!(
        value.get("message").and_then(Value::as_str),
        Some("email must look like local@domain")
    );
    assert_eq!(
        value
            .get("details")
            .and_then(|d| d.get("field"))
            .and_then(Value::as_str),
        Some("email")
    );
}
