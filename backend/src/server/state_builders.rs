//! Builders wiring the user service to a repository adapter.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::info;

use user_registry::domain::UserService;
use user_registry::domain::ports::UserRepository;
use user_registry::inbound::http::state::HttpState;
use user_registry::outbound::memory::InMemoryUserRepository;
use user_registry::outbound::persistence::DieselUserRepository;

use super::ServerConfig;

fn service_state<R>(repo: R, clock: Arc<dyn Clock>) -> HttpState
where
    R: UserRepository + 'static,
{
    let service = Arc::new(UserService::new(Arc::new(repo), clock));
    HttpState::new(service.clone(), service)
}

/// Build handler state: PostgreSQL when a pool is configured, memory otherwise.
pub fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let state = match &config.db_pool {
        Some(pool) => service_state(DieselUserRepository::new(pool.clone()), clock),
        None => {
            info!("no database configured; users are kept in memory");
            service_state(InMemoryUserRepository::new(), clock)
        }
    };
    web::Data::new(state)
}
