//! Backend entry-point: loads settings, installs logging and serves the
//! registration API.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use backend::config::RegistrationSettings;
use backend::inbound::http::health::HealthState;
use backend::outbound::memory::InMemoryUserStore;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        RegistrationSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let config = ServerConfig::from_settings(&settings).wrap_err("invalid settings")?;

    let health_state = web::Data::new(HealthState::new());
    let store = Arc::new(InMemoryUserStore::new());
    let server = create_server(health_state, config, store)
        .wrap_err_with(|| format!("failed to bind {}", config.bind_addr()))?;
    server.await.wrap_err("server terminated with an error")
}
