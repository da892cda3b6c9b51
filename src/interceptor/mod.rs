mod config;
mod exchange;
mod record;
mod service;

pub use config::{LogValuesFn, LoggerConfig, Skipper};
pub use exchange::{Exchange, RequestHead, ResponseView};
pub use record::RequestLoggerParams;
pub use service::{RequestLogger, RequestLoggerLayer};
