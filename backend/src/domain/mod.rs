//! Domain primitives, rule engine and use cases.
//!
//! Purpose: hold everything that decides whether a user request is valid and
//! what it changes, independent of HTTP and storage. Adapters reach the
//! domain only through [`ports`].
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: the single typed abort of a failed request.
//! - [`FieldViolation`]: one field-scoped failure; many may ride on an abort.
//! - [`User`] and [`CareerHistory`]: the aggregate and its owned entries.
//! - [`UserCreatePayload`], [`UserUpdatePayload`], [`UserListQuery`]: inbound
//!   shapes checked by [`validation::validate`] against the rule tables in
//!   [`constraints`].
//! - [`UserService`]: implements the user driving ports.

pub mod constraints;
pub mod error;
pub mod error_classifier;
pub mod merge;
pub mod period;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod user_payloads;
pub mod user_service;
pub mod validation;
pub mod violation;

pub use self::error::{Error, ErrorCode};
pub use self::error_classifier::ErrorResponse;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    CareerHistory, Period, User, UserId, format_timestamp, height_to_decimal, round_height,
    stored_height,
};
pub use self::user_payloads::{
    CareerHistoryPayload, CareerHistoryUpdatePayload, DEFAULT_LIMIT, PeriodPayload,
    PeriodUpdatePayload, UserChanges, UserCreatePayload, UserListQuery, UserUpdatePayload,
};
pub use self::user_service::UserService;
pub use self::violation::{FieldViolation, ViolationCode, ViolationKind, ViolationLocation};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use user_registry::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::not_found("User not found"))
/// }
/// # assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
