//! Ready-made `log_values` sinks.

use crate::{Exchange, RequestLoggerParams};
use std::{
    io::{self, Write},
    sync::{Mutex, PoisonError},
};
use tracing::{info, warn};

/// Emits every record as a single `info` event with structured fields.
pub fn tracing_sink(_exchange: &Exchange<'_>, params: RequestLoggerParams) {
    let ms = params.latency.as_secs_f64() * 1000.0;

    info!(
        http.protocol = params.protocol.as_str(),
        http.remote_ip = params.remote_ip.as_str(),
        http.host = params.host.as_str(),
        http.method = params.method.as_str(),
        http.uri = params.uri.as_str(),
        http.path = params.uri_path.as_str(),
        http.request_id = params.request_id.as_str(),
        http.referer = params.referer.as_str(),
        http.user_agent = params.user_agent.as_str(),
        http.status = params.status,
        http.error = params.error.as_str(),
        http.content_length = params.content_length.as_str(),
        http.response_size = params.response_size,
        http.latency_ms = ms,
        http.headers = ?params.headers,
        http.query_params = ?params.query_params,
        "HTTP {} {} {} processed in {ms:.2}ms",
        params.method,
        params.uri,
        params.status,
    );
}

/// Writes every record as one line of JSON.
///
/// Write failures are reported through `tracing` and otherwise ignored.
pub fn json_sink<W>(writer: W) -> impl Fn(&Exchange<'_>, RequestLoggerParams) + Send + Sync + 'static
where
    W: Write + Send + 'static,
{
    let writer = Mutex::new(writer);

    move |_: &Exchange<'_>, params: RequestLoggerParams| {
        let mut writer = writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = write_json_line(&mut *writer, &params) {
            warn!("Could not write request log: {err}");
        }
    }
}

fn write_json_line(writer: &mut impl Write, params: &RequestLoggerParams) -> io::Result<()> {
    serde_json::to_writer(&mut *writer, params)?;
    writer.write_all(b"\n")?;
    writer.flush()
}
