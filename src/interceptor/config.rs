use super::{exchange::Exchange, record::RequestLoggerParams, service::RequestLoggerLayer};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

/// Decides whether a finished exchange should be left out of the log.
pub type Skipper = Arc<dyn Fn(&Exchange<'_>) -> bool + Send + Sync>;

/// Receives the values extracted from every exchange that was not skipped.
pub type LogValuesFn = Arc<dyn Fn(&Exchange<'_>, RequestLoggerParams) + Send + Sync>;

/// Selects which values the request logger extracts. Every toggle is off by default.
///
/// The toggles and name lists can be loaded from JSON (camelCase keys); the
/// skipper and the sink can only be set from code.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggerConfig {
    #[serde(skip)]
    pub skipper: Option<Skipper>,
    /// Requests to these exact paths are not logged
    pub skip_paths: Vec<String>,
    #[serde(skip)]
    pub log_values: Option<LogValuesFn>,

    pub log_latency: bool,
    /// `HTTP/1.1`, `HTTP/2.0`, ...
    pub log_protocol: bool,
    /// `X-Forwarded-For`, then `X-Real-Ip`, then the peer address
    pub log_remote_ip: bool,
    pub log_host: bool,
    pub log_method: bool,
    /// Path and query, e.g. `/api/v1/users?name=kai`
    pub log_uri: bool,
    /// Path only, e.g. `/api/v1/users`
    pub log_uri_path: bool,
    /// `X-Request-Id` header of the request, or of the response if the request had none
    pub log_request_id: bool,
    pub log_referer: bool,
    pub log_user_agent: bool,
    pub log_status: bool,
    /// Private errors attached by handlers, or the inner service's error
    pub log_error: bool,
    /// Request `Content-Length` header value
    pub log_content_length: bool,
    /// Response body length, `-1` if unknown
    pub log_response_size: bool,
    /// Request headers to copy, by name
    pub log_headers: Vec<String>,
    /// Query parameters to copy, by name
    pub log_query_params: Vec<String>,
}

impl LoggerConfig {
    pub fn with_skipper<F>(mut self, skipper: F) -> Self
    where
        F: Fn(&Exchange<'_>) -> bool + Send + Sync + 'static,
    {
        self.skipper = Some(Arc::new(skipper));
        self
    }

    pub fn with_log_values<F>(mut self, log_values: F) -> Self
    where
        F: Fn(&Exchange<'_>, RequestLoggerParams) + Send + Sync + 'static,
    {
        self.log_values = Some(Arc::new(log_values));
        self
    }

    pub fn skip_path(mut self, path: impl Into<String>) -> Self {
        self.skip_paths.push(path.into());
        self
    }

    pub fn into_layer(self) -> RequestLoggerLayer {
        RequestLoggerLayer::new(self)
    }
}

impl fmt::Debug for LoggerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerConfig")
            .field("skipper", &self.skipper.is_some())
            .field("skip_paths", &self.skip_paths)
            .field("log_values", &self.log_values.is_some())
            .field("log_latency", &self.log_latency)
            .field("log_protocol", &self.log_protocol)
            .field("log_remote_ip", &self.log_remote_ip)
            .field("log_host", &self.log_host)
            .field("log_method", &self.log_method)
            .field("log_uri", &self.log_uri)
            .field("log_uri_path", &self.log_uri_path)
            .field("log_request_id", &self.log_request_id)
            .field("log_referer", &self.log_referer)
            .field("log_user_agent", &self.log_user_agent)
            .field("log_status", &self.log_status)
            .field("log_error", &self.log_error)
            .field("log_content_length", &self.log_content_length)
            .field("log_response_size", &self.log_response_size)
            .field("log_headers", &self.log_headers)
            .field("log_query_params", &self.log_query_params)
            .finish()
    }
}
