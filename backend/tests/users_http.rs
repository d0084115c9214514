//! End-to-end behaviour of the users API over the in-memory repository.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::LOCATION;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use mockable::DefaultClock;
use rstest::rstest;
use serde_json::{Value, json};

use user_registry::Trace;
use user_registry::domain::UserService;
use user_registry::inbound::http::configure_api;
use user_registry::inbound::http::state::HttpState;
use user_registry::outbound::memory::InMemoryUserRepository;

fn registry_app() -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let service = Arc::new(UserService::new(
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(DefaultClock),
    ));
    App::new()
        .app_data(web::Data::new(HttpState::new(service.clone(), service)))
        .wrap(Trace)
        .configure(configure_api)
}

fn taro() -> Value {
    json!({
        "name": "Taro Yamada",
        "age": 30,
        "birthday": "1994/04/01",
        "height": 170.44,
        "zipCode": "123-4567",
        "careerHistories": [
            { "title": "Engineer", "period": { "from": "2010/04/01", "to": "2015/03/31" } },
            { "title": "Lead", "period": { "from": "2015/04/01", "to": "2020/03/31" } }
        ]
    })
}

fn named(name: &str) -> Value {
    json!({ "name": name, "age": 20, "birthday": "2000/01/01" })
}

#[rstest]
#[actix_web::test]
async fn created_user_reads_back_with_rounded_height() {
    let app = test::init_service(registry_app()).await;

    let created = test::call_service(
        &app,
        TestRequest::post().uri("/api/v1/users").set_json(taro()).to_request(),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let location = created
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .expect("location header");
    assert_eq!(location, "/api/v1/users/1");

    let body: Value = test::call_and_read_body_json(
        &app,
        TestRequest::get().uri(&location).to_request(),
    )
    .await;
    assert_eq!(body["name"], json!("Taro Yamada"));
    assert_eq!(body["height"], json!(170.4));
    assert_eq!(body["birthday"], json!("1994/04/01"));
    let ids: Vec<_> = body["careerHistories"]
        .as_array()
        .expect("histories")
        .iter()
        .map(|h| h["id"].clone())
        .collect();
    assert_eq!(ids, vec![json!(1), json!(2)]);
}

#[rstest]
#[actix_web::test]
async fn duplicate_name_conflicts() {
    let app = test::init_service(registry_app()).await;
    let first = test::call_service(
        &app,
        TestRequest::post().uri("/api/v1/users").set_json(taro()).to_request(),
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = test::call_service(
        &app,
        TestRequest::post().uri("/api/v1/users").set_json(taro()).to_request(),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(second).await;
    assert_eq!(body["code"], json!("CONFLICT"));
    assert_eq!(body["errors"][0]["code"], json!("DUPLICATE"));
    assert_eq!(body["errors"][0]["field"], json!("name"));
}

#[rstest]
#[actix_web::test]
async fn missing_required_fields_are_bad_request() {
    let app = test::init_service(registry_app()).await;

    let res = test::call_service(
        &app,
        TestRequest::post()
            .uri("/api/v1/users")
            .set_json(json!({ "height": 170.0 }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    let fields: Vec<_> = body["errors"]
        .as_array()
        .expect("violations")
        .iter()
        .map(|v| v["field"].clone())
        .collect();
    assert_eq!(fields, vec![json!("name"), json!("age"), json!("birthday")]);
    assert!(!body["traceId"].as_str().unwrap_or_default().is_empty());
}

#[rstest]
#[actix_web::test]
async fn update_ending_before_start_is_invalid_period() {
    let app = test::init_service(registry_app()).await;
    test::call_service(
        &app,
        TestRequest::post().uri("/api/v1/users").set_json(taro()).to_request(),
    )
    .await;

    let res = test::call_service(
        &app,
        TestRequest::put()
            .uri("/api/v1/users/1")
            .set_json(json!({ "careerHistories": [{ "id": 2, "period": { "to": "2009/01/01" } }] }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], json!("Invalid period"));
    assert_eq!(body["errors"][0]["code"], json!("INVALID_PERIOD"));
}

#[rstest]
#[actix_web::test]
async fn partial_update_touches_only_supplied_fields() {
    let app = test::init_service(registry_app()).await;
    test::call_service(
        &app,
        TestRequest::post().uri("/api/v1/users").set_json(taro()).to_request(),
    )
    .await;

    let res = test::call_service(
        &app,
        TestRequest::put()
            .uri("/api/v1/users/1")
            .set_json(json!({
                "age": 31,
                "careerHistories": [
                    { "id": 1, "title": "Senior Engineer" },
                    { "title": "Manager", "period": { "from": "2020/04/01", "to": "2024/03/31" } }
                ]
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let body: Value =
        test::call_and_read_body_json(&app, TestRequest::get().uri("/api/v1/users/1").to_request())
            .await;
    assert_eq!(body["age"], json!(31));
    assert_eq!(body["name"], json!("Taro Yamada"));
    let entries: Vec<_> = body["careerHistories"]
        .as_array()
        .expect("histories")
        .iter()
        .map(|h| (h["id"].clone(), h["title"].clone(), h["period"]["from"].clone()))
        .collect();
    assert_eq!(
        entries,
        vec![
            (json!(1), json!("Senior Engineer"), json!("2010/04/01")),
            (json!(2), json!("Lead"), json!("2015/04/01")),
            (json!(3), json!("Manager"), json!("2020/04/01")),
        ]
    );
}

#[rstest]
#[actix_web::test]
async fn update_of_unknown_user_is_bad_request() {
    let app = test::init_service(registry_app()).await;

    let res = test::call_service(
        &app,
        TestRequest::put()
            .uri("/api/v1/users/42")
            .set_json(json!({ "age": 31 }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], json!("Invalid user_id"));
}

#[rstest]
#[actix_web::test]
async fn deleted_user_is_not_found() {
    let app = test::init_service(registry_app()).await;
    test::call_service(
        &app,
        TestRequest::post().uri("/api/v1/users").set_json(taro()).to_request(),
    )
    .await;

    let deleted = test::call_service(
        &app,
        TestRequest::delete().uri("/api/v1/users/1").to_request(),
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    let again = test::call_service(
        &app,
        TestRequest::delete().uri("/api/v1/users/1").to_request(),
    )
    .await;
    assert_eq!(again.status(), StatusCode::NO_CONTENT);

    let res = test::call_service(&app, TestRequest::get().uri("/api/v1/users/1").to_request()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], json!("User not found"));
}

#[rstest]
#[case("/api/v1/users?limit=0&offset=1", vec!["Hanako", "Jiro"], 3)]
#[case("/api/v1/users?limit=1&offset=1", vec!["Hanako"], 3)]
#[case("/api/v1/users?name=ro", vec!["Taro", "Jiro"], 2)]
#[case("/api/v1/users?limit=0&offset=5", vec![], 3)]
#[actix_web::test]
async fn list_pages_in_id_order(
    #[case] uri: &str,
    #[case] expected: Vec<&str>,
    #[case] total: u64,
) {
    let app = test::init_service(registry_app()).await;
    for name in ["Taro", "Hanako", "Jiro"] {
        let res = test::call_service(
            &app,
            TestRequest::post().uri("/api/v1/users").set_json(named(name)).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let body: Value = test::call_and_read_body_json(&app, TestRequest::get().uri(uri).to_request()).await;
    let names: Vec<_> = body["users"]
        .as_array()
        .expect("users")
        .iter()
        .filter_map(|u| u["name"].as_str())
        .collect();
    assert_eq!(names, expected);
    assert_eq!(body["count"], json!(total));
    assert_eq!(body["page"]["total"], json!(total));
}

#[rstest]
#[actix_web::test]
async fn out_of_range_limit_is_query_violation() {
    let app = test::init_service(registry_app()).await;

    let res = test::call_service(
        &app,
        TestRequest::get().uri("/api/v1/users?limit=101").to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["errors"][0]["field"], json!("limit"));
    assert_eq!(body["errors"][0]["location"], json!("query"));
}
