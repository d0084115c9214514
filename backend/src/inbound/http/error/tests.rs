//! Tests for HTTP error mapping.

use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::{FieldViolation, ViolationLocation};

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

async fn body_of(error: &Error) -> (StatusCode, Option<String>, Value) {
    let response = ResponseError::error_response(error);
    let status = response.status();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body()).await.expect("read body");
    let value = serde_json::from_slice(&bytes).expect("json body");
    (status, header, value)
}

#[rstest]
#[case(ErrorCode::BadRequest, StatusCode::BAD_REQUEST)]
#[case(ErrorCode::UnprocessableEntity, StatusCode::UNPROCESSABLE_ENTITY)]
#[case(ErrorCode::Conflict, StatusCode::CONFLICT)]
#[case(ErrorCode::NotFound, StatusCode::NOT_FOUND)]
#[case(ErrorCode::MethodNotAllowed, StatusCode::METHOD_NOT_ALLOWED)]
#[case(ErrorCode::NotAcceptable, StatusCode::NOT_ACCEPTABLE)]
#[case(ErrorCode::InternalServerError, StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] code: ErrorCode, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&Error::bare(code)), status);
}

#[rstest]
#[actix_web::test]
async fn validation_error_carries_details_and_trace_header() {
    let error = Error::bare(ErrorCode::UnprocessableEntity)
        .with_trace_id(TRACE_ID)
        .with_violations([FieldViolation::validation(
            "age must be at most 150",
            "age",
            ViolationLocation::Body,
        )
        .with_constraints(json!({ "max": 150 }))]);

    let (status, header, body) = body_of(&error).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    assert_eq!(
        body,
        json!({
            "code": "UNPROCESSABLE_ENTITY",
            "message": "Validation failed",
            "traceId": TRACE_ID,
            "errors": [{
                "code": "VALIDATION_ERROR",
                "reason": "age must be at most 150",
                "field": "age",
                "location": "body",
                "constraints": { "max": 150 }
            }]
        })
    );
}

#[rstest]
#[actix_web::test]
async fn internal_error_is_redacted() {
    let error = Error::internal("connection string leaked").with_trace_id(TRACE_ID);

    let (status, _, body) = body_of(&error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({
            "code": "INTERNAL_SERVER_ERROR",
            "message": "Unexpected error",
            "traceId": TRACE_ID,
        })
    );
}

#[rstest]
#[actix_web::test]
async fn missing_trace_id_omits_header_but_keeps_field() {
    let (_, header, body) = body_of(&Error::not_found("User not found")).await;

    assert!(header.is_none());
    assert_eq!(body.get("traceId"), Some(&json!("")));
    assert!(body.get("errors").is_none());
}
