use anyhow::Context;
use request_logger::LoggerConfig;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    #[serde(default = "default_logger")]
    pub logger: LoggerConfig,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;
        serde_json::from_str(&contents).context("Config deserialization error")
    }
}

fn default_listen_address() -> String {
    String::from("0.0.0.0:8025")
}

fn default_logger() -> LoggerConfig {
    LoggerConfig {
        skip_paths: vec!["/health".to_owned()],
        log_latency: true,
        log_remote_ip: true,
        log_method: true,
        log_uri: true,
        log_request_id: true,
        log_status: true,
        log_error: true,
        log_response_size: true,
        ..Default::default()
    }
}
