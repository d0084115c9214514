//! Handler tests against mocked driving ports.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::http::header::{ACCEPT, CONTENT_TYPE, LOCATION};
use actix_web::{App, test as actix_test, web};
use chrono::NaiveDate;
use rstest::rstest;
use serde_json::{Value, json};

use crate::Trace;
use crate::domain::ports::{MockUsersCommand, MockUsersQuery};
use crate::domain::{
    CareerHistory, Error, ErrorCode, FieldViolation, Period, TRACE_ID_HEADER, User, UserId,
};
use crate::inbound::http::configure_api;
use crate::inbound::http::state::HttpState;

fn sample_user(id: i64) -> User {
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).expect("valid date");
    User {
        id: Some(UserId::new(id)),
        name: "Taro Yamada".to_owned(),
        age: 30,
        birthday: date(1994, 4, 1),
        height: Some(170.4),
        zip_code: Some("123-4567".to_owned()),
        career_histories: vec![CareerHistory {
            id: Some(5),
            title: "Engineer".to_owned(),
            period: Period {
                from: date(2018, 4, 1),
                to: date(2021, 3, 31),
            },
        }],
        created_at: "2026-02-24 10:30:00".to_owned(),
        updated_at: "2026-02-24 10:30:00".to_owned(),
    }
}

async fn call(
    command: MockUsersCommand,
    query: MockUsersQuery,
    request: actix_test::TestRequest,
) -> actix_web::dev::ServiceResponse {
    let state = HttpState::new(Arc::new(command), Arc::new(query));
    let app = actix_test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .wrap(Trace)
            .configure(configure_api),
    )
    .await;
    actix_test::call_service(&app, request.to_request()).await
}

async fn error_body(response: actix_web::dev::ServiceResponse) -> Value {
    actix_test::read_body_json(response).await
}

#[rstest]
#[actix_web::test]
async fn list_returns_envelope_with_page_meta() {
    let mut query = MockUsersQuery::new();
    query
        .expect_list_users()
        .withf(|q| q.name.as_deref() == Some("Taro") && q.limit == 1 && q.offset == 0)
        .times(1)
        .return_once(|_| Ok(vec![sample_user(1)]));
    query.expect_count_users().times(1).return_once(|_| Ok(2));

    let response = call(
        MockUsersCommand::new(),
        query,
        actix_test::TestRequest::get().uri("/api/v1/users?name=Taro&limit=1"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["count"], json!(2));
    assert_eq!(
        body["page"],
        json!({ "offset": 0, "limit": 1, "total": 2, "hasNext": true })
    );
    assert_eq!(body["users"][0]["birthday"], json!("1994/04/01"));
}

#[rstest]
#[actix_web::test]
async fn list_with_non_numeric_limit_is_type_mismatch() {
    let mut query = MockUsersQuery::new();
    query.expect_list_users().times(0);

    let response = call(
        MockUsersCommand::new(),
        query,
        actix_test::TestRequest::get().uri("/api/v1/users?limit=ten"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = error_body(response).await;
    assert_eq!(body["errors"][0]["field"], json!("limit"));
    assert_eq!(body["errors"][0]["location"], json!("query"));
    assert_eq!(body["errors"][0]["reason"], json!("Type mismatch"));
}

#[rstest]
#[actix_web::test]
async fn create_returns_location_of_new_user() {
    let mut command = MockUsersCommand::new();
    command
        .expect_create_user()
        .withf(|payload| payload.name.as_deref() == Some("Taro Yamada"))
        .times(1)
        .return_once(|_| Ok(UserId::new(7)));

    let response = call(
        command,
        MockUsersQuery::new(),
        actix_test::TestRequest::post()
            .uri("/api/v1/users")
            .set_json(json!({ "name": "Taro Yamada", "age": 30, "birthday": "1994/04/01" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
        Some("/api/v1/users/7")
    );
    let body = actix_test::read_body(response).await;
    assert!(body.is_empty());
}

#[rstest]
#[actix_web::test]
async fn malformed_json_is_bad_request_on_body() {
    let mut command = MockUsersCommand::new();
    command.expect_create_user().times(0);

    let response = call(
        command,
        MockUsersQuery::new(),
        actix_test::TestRequest::post()
            .uri("/api/v1/users")
            .insert_header((CONTENT_TYPE, "application/json"))
            .set_payload("{\"name\": "),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let trace_id = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .expect("trace id header");
    let body = error_body(response).await;
    assert_eq!(body["code"], json!("BAD_REQUEST"));
    assert_eq!(body["traceId"], json!(trace_id));
    assert_eq!(
        body["errors"],
        json!([{
            "code": "VALIDATION_ERROR",
            "reason": "Malformed JSON or invalid format",
            "location": "body"
        }])
    );
}

#[rstest]
#[case(Error::conflict("Duplicate resource").with_violations([FieldViolation::duplicate("name")]), StatusCode::CONFLICT)]
#[case(Error::unprocessable("Invalid period"), StatusCode::UNPROCESSABLE_ENTITY)]
#[case(Error::internal("database down"), StatusCode::INTERNAL_SERVER_ERROR)]
#[actix_web::test]
async fn create_maps_domain_errors_to_status(#[case] error: Error, #[case] status: StatusCode) {
    let mut command = MockUsersCommand::new();
    command
        .expect_create_user()
        .times(1)
        .return_once(move |_| Err(error));

    let response = call(
        command,
        MockUsersQuery::new(),
        actix_test::TestRequest::post()
            .uri("/api/v1/users")
            .set_json(json!({ "name": "Taro Yamada" })),
    )
    .await;

    assert_eq!(response.status(), status);
}

#[rstest]
#[actix_web::test]
async fn update_returns_no_content() {
    let mut command = MockUsersCommand::new();
    command
        .expect_update_user()
        .withf(|id, payload| *id == UserId::new(3) && payload.age == Some(31))
        .times(1)
        .return_once(|_, _| Ok(()));

    let response = call(
        command,
        MockUsersQuery::new(),
        actix_test::TestRequest::put()
            .uri("/api/v1/users/3")
            .set_json(json!({ "age": 31 })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[rstest]
#[actix_web::test]
async fn delete_returns_no_content() {
    let mut command = MockUsersCommand::new();
    command
        .expect_delete_user()
        .times(1)
        .return_once(|_| Ok(()));

    let response = call(
        command,
        MockUsersQuery::new(),
        actix_test::TestRequest::delete().uri("/api/v1/users/3"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[rstest]
#[actix_web::test]
async fn get_returns_user_representation() {
    let mut query = MockUsersQuery::new();
    query
        .expect_get_user()
        .times(1)
        .return_once(|id| Ok(sample_user(id.as_i64())));

    let response = call(
        MockUsersCommand::new(),
        query,
        actix_test::TestRequest::get().uri("/api/v1/users/4"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["id"], json!(4));
    assert_eq!(body["careerHistories"][0]["period"]["to"], json!("2021/03/31"));
}

#[rstest]
#[actix_web::test]
async fn non_numeric_path_id_is_type_mismatch() {
    let mut query = MockUsersQuery::new();
    query.expect_get_user().times(0);

    let response = call(
        MockUsersCommand::new(),
        query,
        actix_test::TestRequest::get().uri("/api/v1/users/abc"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = error_body(response).await;
    assert_eq!(
        body["errors"],
        json!([{
            "code": "VALIDATION_ERROR",
            "reason": "Type mismatch",
            "field": "user_id",
            "location": "path",
            "constraints": { "invalidValue": "abc", "expectedType": "int64" }
        }])
    );
}

#[rstest]
#[case(actix_test::TestRequest::patch().uri("/api/v1/users/1"), StatusCode::METHOD_NOT_ALLOWED, "METHOD_NOT_ALLOWED")]
#[case(actix_test::TestRequest::delete().uri("/api/v1/users"), StatusCode::METHOD_NOT_ALLOWED, "METHOD_NOT_ALLOWED")]
#[case(actix_test::TestRequest::get().uri("/api/v1/widgets"), StatusCode::NOT_FOUND, "NOT_FOUND")]
#[actix_web::test]
async fn unmatched_requests_use_catch_all_errors(
    #[case] request: actix_test::TestRequest,
    #[case] status: StatusCode,
    #[case] code: &str,
) {
    let response = call(MockUsersCommand::new(), MockUsersQuery::new(), request).await;

    assert_eq!(response.status(), status);
    let body = error_body(response).await;
    assert_eq!(body["code"], json!(code));
}

#[rstest]
#[actix_web::test]
async fn accept_without_json_is_not_acceptable() {
    let mut query = MockUsersQuery::new();
    query.expect_get_user().times(0);

    let response = call(
        MockUsersCommand::new(),
        query,
        actix_test::TestRequest::get()
            .uri("/api/v1/users/1")
            .insert_header((ACCEPT, "application/xml")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
    let body = error_body(response).await;
    assert_eq!(body["code"], json!(ErrorCode::NotAcceptable));
    assert_eq!(body["message"], json!("Not acceptable"));
}
