//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] gathers the users and health endpoints together with the
//! payload, response and error schemas they reference. Swagger UI serves it
//! at `/docs` in debug builds and `openapi-dump` prints it for tooling.

use utoipa::OpenApi;

use crate::domain::{
    CareerHistoryPayload, CareerHistoryUpdatePayload, ErrorCode, ErrorResponse, FieldViolation,
    PeriodPayload, PeriodUpdatePayload, UserCreatePayload, UserUpdatePayload, ViolationCode,
    ViolationLocation,
};
use crate::inbound::http::users_dto::{
    CareerHistoryResponse, PageMeta, PeriodResponse, UserListResponse, UserResponse,
};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "User registry API",
        description = "Users with nested career histories, validated and merged server side."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::users::get_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        UserCreatePayload,
        CareerHistoryPayload,
        PeriodPayload,
        UserUpdatePayload,
        CareerHistoryUpdatePayload,
        PeriodUpdatePayload,
        UserResponse,
        CareerHistoryResponse,
        PeriodResponse,
        UserListResponse,
        PageMeta,
        ErrorResponse,
        ErrorCode,
        FieldViolation,
        ViolationCode,
        ViolationLocation,
    )),
    tags(
        (name = "users", description = "User and career history management"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
