//! HTTP inbound adapter exposing the users REST resource.

use actix_web::web;

pub mod error;
pub mod extractors;
pub mod health;
pub mod state;
pub mod users;
pub mod users_dto;

pub use error::ApiResult;

/// Register the `/api/v1` scope with its extractor configuration.
///
/// Requests that match no route, or a route without the requested verb, are
/// answered by [`extractors::fallback`].
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use user_registry::inbound::http::configure_api;
///
/// let app = App::new().configure(configure_api);
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .app_data(extractors::json_config())
            .app_data(extractors::path_config())
            .app_data(extractors::query_config())
            .service(users::list_users)
            .service(users::create_user)
            .service(users::update_user)
            .service(users::delete_user)
            .service(users::get_user)
            .default_service(web::to(extractors::fallback)),
    );
}
