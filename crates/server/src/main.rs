//! Grafana Cloud credential engine development host

use std::{process, sync::Arc};

use salvo::{affix_state::inject, prelude::*, trailing_slash::remove_slash};
use tracing::{error, info};

use grafana_cloud_secrets::{Backend, cache::HttpClientFactory, storage::InMemoryStorage};

use crate::{config::ServerConfig, state::State};

mod cloud_config;
mod config;
mod creds;
mod extensions;
mod healthcheck;
mod lease_table;
mod leases;
mod observability;
mod roles;
mod router;
mod shutdown;
mod state;
#[cfg(test)]
mod test_helpers;

#[tokio::main]
pub async fn main() {
    let config = ServerConfig::load().unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for config errors"
        )]
        {
            eprintln!("Configuration error: {e}");
        }

        process::exit(1);
    });

    if let Err(init_error) = observability::init(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialise, must use eprintln"
        )]
        {
            eprintln!("Logging error: {init_error}");
        }

        process::exit(1);
    }

    let factory = match HttpClientFactory::new(config.upstream.timeout()) {
        Ok(factory) => factory,
        Err(init_error) => {
            error!("failed to build http client: {init_error}");

            process::exit(1);
        }
    };

    let backend = Backend::new(Arc::new(InMemoryStorage::new()), Arc::new(factory));

    let addr = config.socket_addr();

    info!("Starting server on {addr}");

    let listener = TcpListener::new(addr).bind().await;

    let router = Router::new()
        .hoop(CatchPanic::new())
        .hoop(remove_slash())
        .hoop(observability::request_logging)
        .hoop(inject(State::from_backend(backend, config.leases.policy())))
        .push(router::app_router());

    let server = Server::new(listener);

    let handle = server.handle();

    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    server.serve(router).await;
}
