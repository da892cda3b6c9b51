use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::time::Duration;

/// Values extracted from a single exchange. Fields whose toggle is off keep
/// their zero value.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestLoggerParams {
    pub start_time: DateTime<Utc>,
    #[serde(rename = "latencyMs", serialize_with = "serialize_millis")]
    pub latency: Duration,
    pub protocol: String,
    #[serde(rename = "remoteIP")]
    pub remote_ip: String,
    pub host: String,
    pub method: String,
    pub uri: String,
    pub uri_path: String,
    #[serde(rename = "requestID")]
    pub request_id: String,
    pub referer: String,
    pub user_agent: String,
    pub status: u16,
    pub error: String,
    pub content_length: String,
    pub response_size: i64,
    pub headers: IndexMap<String, Vec<String>>,
    pub query_params: IndexMap<String, Vec<String>>,
}

impl RequestLoggerParams {
    pub fn new(start_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            ..Default::default()
        }
    }
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
}
