use crate::{error::Error, Result};
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use serde::Serialize;

#[derive(Serialize)]
pub struct EchoResponse {
    pub params: Vec<(String, String)>,
}

pub async fn ping() -> &'static str {
    "pong"
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn echo(Query(params): Query<Vec<(String, String)>>) -> Json<EchoResponse> {
    Json(EchoResponse { params })
}

pub async fn status(Path(code): Path<u16>) -> Result<StatusCode> {
    StatusCode::from_u16(code).map_err(|_| Error::InvalidParam(format!("unknown status {code}")))
}

pub async fn fail() -> Result<()> {
    Err(Error::Upstream("simulated upstream failure".to_owned()))
}
