//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use backend::Trace;
#[cfg(debug_assertions)]
use backend::doc::ApiDoc;
use backend::domain::RegistrationService;
use backend::domain::ports::UserStore;
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::registration::register;
use backend::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Build the HTTP state over `store` using the configured hasher and
/// validator.
fn build_http_state<S>(config: &ServerConfig, store: Arc<S>) -> web::Data<HttpState>
where
    S: UserStore + 'static,
{
    let service = RegistrationService::with_parts(store, config.hasher, config.validator);
    web::Data::new(HttpState::new(Arc::new(service)))
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(register)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server backed by `store`.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server<S>(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
    store: Arc<S>,
) -> std::io::Result<Server>
where
    S: UserStore + 'static,
{
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config, store);

    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .bind(config.bind_addr)?
    .run();

    info!(
        bind_addr = %config.bind_addr,
        hashing_mode = ?config.hasher.mode(),
        unknown_fields = ?config.validator.unknown_fields(),
        "registration server listening"
    );
    health_state.mark_ready();
    Ok(server)
}
