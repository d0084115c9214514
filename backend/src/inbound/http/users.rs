//! Users API handlers.
//!
//! ```text
//! GET    /api/v1/users?name=Taro&limit=10&offset=0
//! POST   /api/v1/users                {"name":"Taro Yamada","age":30,"birthday":"1994/04/01"}
//! PUT    /api/v1/users/{user_id}      {"careerHistories":[{"id":5,"title":"Lead"}]}
//! DELETE /api/v1/users/{user_id}
//! GET    /api/v1/users/{user_id}
//! ```

use actix_web::http::header;
use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::domain::{ErrorResponse, UserCreatePayload, UserId, UserListQuery, UserUpdatePayload};
use crate::inbound::http::ApiResult;
use crate::inbound::http::extractors::AcceptsJson;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users_dto::{UserListResponse, UserResponse};

/// Location of a created user.
fn user_location(id: UserId) -> String {
    format!("/api/v1/users/{id}")
}

/// List users, optionally filtered by a name substring.
///
/// `limit=0` returns every match after `offset`.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(UserListQuery),
    responses(
        (status = 200, description = "Matching users", body = UserListResponse),
        (status = 400, description = "Malformed query", body = ErrorResponse),
        (status = 406, description = "JSON not acceptable", body = ErrorResponse),
        (status = 422, description = "Invalid query", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    _accepts: AcceptsJson,
    state: web::Data<HttpState>,
    query: web::Query<UserListQuery>,
) -> ApiResult<web::Json<UserListResponse>> {
    let query = query.into_inner();
    let users = state.users_query.list_users(&query).await?;
    let total = state.users_query.count_users(&query).await?;
    Ok(web::Json(UserListResponse::new(&query, total, users)))
}

/// Create a user with its career histories.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = UserCreatePayload,
    responses(
        (status = 201, description = "User created", headers(("Location" = String, description = "URI of the new user"))),
        (status = 400, description = "Malformed or incomplete body", body = ErrorResponse),
        (status = 406, description = "JSON not acceptable", body = ErrorResponse),
        (status = 409, description = "Name already exists", body = ErrorResponse),
        (status = 422, description = "Field or period rule violated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    _accepts: AcceptsJson,
    state: web::Data<HttpState>,
    payload: web::Json<UserCreatePayload>,
) -> ApiResult<HttpResponse> {
    let id = state.users_command.create_user(payload.into_inner()).await?;
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, user_location(id)))
        .finish())
}

/// Apply a sparse update to a user.
///
/// Career history entries with a known `id` are patched field by field;
/// entries without one are appended and must be complete.
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}",
    params(("user_id" = i64, Path, description = "User identifier")),
    request_body = UserUpdatePayload,
    responses(
        (status = 204, description = "User updated"),
        (status = 400, description = "Malformed body or unknown user", body = ErrorResponse),
        (status = 406, description = "JSON not acceptable", body = ErrorResponse),
        (status = 409, description = "Name already exists", body = ErrorResponse),
        (status = 422, description = "Field or period rule violated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{user_id}")]
pub async fn update_user(
    _accepts: AcceptsJson,
    state: web::Data<HttpState>,
    user_id: web::Path<i64>,
    payload: web::Json<UserUpdatePayload>,
) -> ApiResult<HttpResponse> {
    state
        .users_command
        .update_user(UserId::new(user_id.into_inner()), payload.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete a user; unknown identifiers succeed.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}",
    params(("user_id" = i64, Path, description = "User identifier")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Non-numeric identifier", body = ErrorResponse),
        (status = 406, description = "JSON not acceptable", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{user_id}")]
pub async fn delete_user(
    _accepts: AcceptsJson,
    state: web::Data<HttpState>,
    user_id: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .users_command
        .delete_user(UserId::new(user_id.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Fetch one user with its career histories.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    params(("user_id" = i64, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 400, description = "Non-numeric identifier", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 406, description = "JSON not acceptable", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{user_id}")]
pub async fn get_user(
    _accepts: AcceptsJson,
    state: web::Data<HttpState>,
    user_id: web::Path<i64>,
) -> ApiResult<web::Json<UserResponse>> {
    let user = state
        .users_query
        .get_user(UserId::new(user_id.into_inner()))
        .await?;
    Ok(web::Json(UserResponse::from(user)))
}

#[cfg(test)]
mod tests;
