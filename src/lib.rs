//! Request logging for `axum`/`tower` services.
//!
//! [`RequestLoggerLayer`] runs the wrapped service once per request, then
//! extracts the values selected in [`LoggerConfig`] into a
//! [`RequestLoggerParams`] and hands it to the configured `log_values` sink.
//!
//! ```no_run
//! use axum::{routing::get, Router};
//! use request_logger::{sink, LoggerConfig};
//!
//! let config = LoggerConfig {
//!     log_method: true,
//!     log_uri: true,
//!     log_status: true,
//!     log_latency: true,
//!     ..Default::default()
//! }
//! .skip_path("/health")
//! .with_log_values(sink::tracing_sink);
//!
//! let app: Router = Router::new()
//!     .route("/", get(|| async { "hello" }))
//!     .layer(config.into_layer());
//! ```

mod handler_error;
mod interceptor;
pub mod sink;

pub use handler_error::{ErrorKind, HandlerError, HandlerErrors};
pub use interceptor::{
    Exchange, LogValuesFn, LoggerConfig, RequestHead, RequestLogger, RequestLoggerLayer,
    RequestLoggerParams, ResponseView, Skipper,
};
