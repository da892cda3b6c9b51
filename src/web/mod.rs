mod handlers;

use crate::config::Config;
use anyhow::Context;
use axum::{extract::Request, routing::get, Router, ServiceExt};
use request_logger::{sink, LoggerConfig};
use std::{
    net::{AddrParseError, SocketAddr},
    str::FromStr,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    normalize_path::NormalizePath,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
};
use tracing::{debug, info};

pub async fn run(config: Config) -> anyhow::Result<()> {
    let listen_address =
        parse_listen_addr(&config.listen_address).context("Invalid listen address")?;

    let app = router(config.logger.with_log_values(sink::tracing_sink));
    let app = NormalizePath::trim_trailing_slash(app);

    info!("Listening on {listen_address}");

    let listener = TcpListener::bind(listen_address).await?;
    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(async {
        tokio::signal::ctrl_c().await.ok();
        debug!("Shutting down web task");
    })
    .await?;

    Ok(())
}

pub fn router(logger: LoggerConfig) -> Router {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/health", get(handlers::health))
        .route("/echo", get(handlers::echo))
        .route("/status/:code", get(handlers::status))
        .route("/fail", get(handlers::fail))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(logger.into_layer())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}

pub fn parse_listen_addr(addr: &str) -> Result<SocketAddr, AddrParseError> {
    if addr.starts_with(':') {
        SocketAddr::from_str(&format!("0.0.0.0{addr}"))
    } else {
        SocketAddr::from_str(addr)
    }
}
