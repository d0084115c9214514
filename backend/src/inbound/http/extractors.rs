//! Extractor configuration and request-shape rejections.
//!
//! Actix rejects malformed bodies, non-numeric path segments and unparseable
//! query strings before a handler runs. The handlers registered here turn
//! those rejections into the same [`Error`] payload the domain produces, so
//! clients see one error shape regardless of where a request failed.

use std::collections::HashMap;
use std::future::{Ready, ready};

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::http::header::ACCEPT;
use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, web};
use serde_json::json;
use tracing::debug;

use crate::domain::error::messages;
use crate::domain::{Error, FieldViolation, ViolationKind, ViolationLocation};
use crate::inbound::http::ApiResult;

/// Type name reported for numeric parameters.
pub const EXPECTED_INTEGER: &str = "int64";

/// Query parameters that must parse as integers.
const NUMERIC_QUERY_PARAMS: [&str; 2] = ["limit", "offset"];

/// Collection path served under `/api/v1`.
const USERS_PATH: &str = "/api/v1/users";

fn type_mismatch(field: &str, value: &str, location: ViolationLocation) -> FieldViolation {
    FieldViolation::validation(messages::TYPE_MISMATCH, field, location)
        .with_kind(ViolationKind::Structural)
        .with_constraints(json!({
            "invalidValue": value,
            "expectedType": EXPECTED_INTEGER,
        }))
}

/// Error for a body that is not valid JSON for the target payload.
#[must_use]
pub fn malformed_body(error: &JsonPayloadError) -> Error {
    debug!(%error, "request body rejected");
    Error::bad_request(messages::VALIDATION_FAILED).with_violations([FieldViolation::structural(
        messages::MALFORMED_JSON,
        ViolationLocation::Body,
    )])
}

/// Error for path segments that do not parse as their declared type.
#[must_use]
pub fn path_mismatch(error: &PathError, req: &HttpRequest) -> Error {
    debug!(%error, path = req.path(), "path parameter rejected");
    let violations = req
        .match_info()
        .iter()
        .filter(|(_, value)| value.parse::<i64>().is_err())
        .map(|(name, value)| type_mismatch(name, value, ViolationLocation::Path));
    Error::bad_request(messages::VALIDATION_FAILED).with_violations(violations)
}

/// Error for query strings that cannot be decoded into the target type.
#[must_use]
pub fn query_mismatch(error: &QueryPayloadError, req: &HttpRequest) -> Error {
    debug!(%error, query = req.query_string(), "query string rejected");
    let params = web::Query::<HashMap<String, String>>::from_query(req.query_string())
        .map(web::Query::into_inner)
        .unwrap_or_default();
    let mut violations: Vec<FieldViolation> = NUMERIC_QUERY_PARAMS
        .iter()
        .filter_map(|name| {
            params
                .get(*name)
                .filter(|value| value.parse::<i64>().is_err())
                .map(|value| type_mismatch(name, value, ViolationLocation::Query))
        })
        .collect();
    if violations.is_empty() {
        violations.push(FieldViolation::structural(
            messages::TYPE_MISMATCH,
            ViolationLocation::Query,
        ));
    }
    Error::bad_request(messages::VALIDATION_FAILED).with_violations(violations)
}

/// JSON body configuration used by every `/api/v1` handler.
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|error, _req| malformed_body(&error).into())
}

/// Path configuration used by every `/api/v1` handler.
#[must_use]
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|error, req| path_mismatch(&error, req).into())
}

/// Query configuration used by every `/api/v1` handler.
#[must_use]
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|error, req| query_mismatch(&error, req).into())
}

/// Whether `path` names the users collection or one user.
fn is_users_resource(path: &str) -> bool {
    let Some(rest) = path.strip_prefix(USERS_PATH) else {
        return false;
    };
    let rest = rest.strip_suffix('/').unwrap_or(rest);
    match rest.strip_prefix('/') {
        None => rest.is_empty(),
        Some(segment) => !segment.is_empty() && !segment.contains('/'),
    }
}

/// Classify a request no route accepted.
///
/// Known resources requested with an unsupported verb yield
/// `METHOD_NOT_ALLOWED`; everything else is `NOT_FOUND`.
#[must_use]
pub fn unmatched(req: &HttpRequest) -> Error {
    if is_users_resource(req.path()) {
        debug!(method = %req.method(), path = req.path(), "verb not supported");
        return Error::method_not_allowed();
    }
    debug!(method = %req.method(), path = req.path(), "no route matched");
    Error::not_found(messages::NOT_FOUND)
}

/// Default service of the `/api/v1` scope.
pub async fn fallback(req: HttpRequest) -> ApiResult<HttpResponse> {
    Err(unmatched(&req))
}

fn admits_json(media_range: &str) -> bool {
    let essence = media_range
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    matches!(essence.as_str(), "*/*" | "application/*" | "application/json")
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Extractor rejecting requests whose `Accept` header excludes JSON.
///
/// A missing header admits everything.
#[derive(Debug, Clone, Copy)]
pub struct AcceptsJson;

impl FromRequest for AcceptsJson {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let values: Vec<_> = req.headers().get_all(ACCEPT).collect();
        if values.is_empty() {
            return ready(Ok(Self));
        }
        let acceptable = values.iter().any(|value| {
            value
                .to_str()
                .map(|raw| raw.split(',').any(admits_json))
                .unwrap_or(false)
        });
        if acceptable {
            ready(Ok(Self))
        } else {
            debug!(path = req.path(), "client does not accept JSON");
            ready(Err(Error::not_acceptable()))
        }
    }
}
