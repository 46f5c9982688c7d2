//! Tests for HTTP error mapping.

use super::*;
use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then, when};
use serde_json::{Value, json};

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[fixture]
fn storage_failure(expected_trace_id: String) -> Error {
    Error::internal("user store write failed: disk full")
        .with_trace_id(expected_trace_id)
        .with_details(json!({"store": "memory"}))
}

#[fixture]
fn invalid_field(expected_trace_id: String) -> Error {
    Error::invalid_request("Invalid age.")
        .with_trace_id(expected_trace_id)
        .with_details(json!({"field": "age", "code": "invalid_field"}))
}

#[rstest]
#[case(Error::invalid_request("Invalid email."), StatusCode::BAD_REQUEST)]
#[case(
    Error::unsupported_media_type("unsupported content type"),
    StatusCode::UNSUPPORTED_MEDIA_TYPE
)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), status);
}

async fn error_body(
    error: Error,
    expected_status: StatusCode,
    expected_trace_id: Option<&str>,
) -> Value {
    let response = ResponseError::error_response(&error);
    assert_eq!(response.status(), expected_status);

    let header = response.headers().get(TRACE_ID_HEADER);
    match expected_trace_id {
        Some(expected) => {
            let trace_id = header
                .expect("trace header is set by error_response")
                .to_str()
                .expect("trace header is valid UTF-8");
            assert_eq!(trace_id, expected);
        }
        None => assert!(header.is_none(), "trace header should not be present"),
    }

    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    serde_json::from_slice(&bytes).expect("error body is JSON")
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(
    storage_failure: Error,
    expected_trace_id: String,
) {
    let body = error_body(
        storage_failure,
        StatusCode::INTERNAL_SERVER_ERROR,
        Some(expected_trace_id.as_str()),
    )
    .await;

    assert_eq!(
        body,
        json!({
            "code": "internal_error",
            "error": "Internal Server Error",
            "traceId": TRACE_ID,
        })
    );
}

#[rstest]
#[actix_web::test]
async fn validation_errors_keep_message_and_details(
    invalid_field: Error,
    expected_trace_id: String,
) {
    let body = error_body(
        invalid_field,
        StatusCode::BAD_REQUEST,
        Some(expected_trace_id.as_str()),
    )
    .await;

    assert_eq!(body["error"], "Invalid age.");
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"], json!({"field": "age", "code": "invalid_field"}));
}

#[rstest]
#[actix_web::test]
async fn error_without_trace_id_omits_trace_header() {
    let error = Error::invalid_request("Invalid username.");

    let body = error_body(error, StatusCode::BAD_REQUEST, None).await;
    assert!(body.get("traceId").is_none());
    assert!(body.get("details").is_none());
}

#[given("an unsupported media type error code")]
fn an_unsupported_media_type_error_code() -> ErrorCode {
    ErrorCode::UnsupportedMediaType
}

#[when("the adapter maps the code to an HTTP status")]
fn the_adapter_maps_the_code_to_http_status(code: ErrorCode) -> StatusCode {
    super::status_for(code)
}

#[then("the status is 415 Unsupported Media Type")]
fn the_status_is_415(status: StatusCode) {
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[given("an internal error template")]
fn an_internal_error_template() -> (ErrorCode, &'static str) {
    (ErrorCode::InternalError, "user store connection failed: refused")
}

#[when("the adapter redacts the client payload")]
fn the_adapter_redacts_the_client_payload(template: (ErrorCode, &'static str)) -> String {
    let (code, message) = template;
    let error = if let ErrorCode::InternalError = code {
        Error::internal(message)
    } else {
        Error::invalid_request(message)
    }
    .with_trace_id(TRACE_ID)
    .with_details(json!({"secret": true}));

    super::redact_if_internal(&error).message().to_owned()
}

#[then("clients see the generic internal error message")]
fn clients_see_the_generic_internal_error_message(message: String) {
    assert_eq!(message, INTERNAL_ERROR_MESSAGE);
}

#[rstest]
fn unsupported_media_type_maps_to_415() {
    let code = an_unsupported_media_type_error_code();
    let status = the_adapter_maps_the_code_to_http_status(code);
    the_status_is_415(status);
}

#[rstest]
fn internal_messages_never_reach_clients() {
    let template = an_internal_error_template();
    let message = the_adapter_redacts_the_client_payload(template);
    clients_see_the_generic_internal_error_message(message);
}

#[test]
fn from_actix_error_is_redacted_internal_error() {
    use actix_web::error;

    let actix_err = error::ErrorBadRequest("boom");
    let err: Error = actix_err.into();

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), INTERNAL_ERROR_MESSAGE);
    assert_eq!(err.details(), None);
}
