use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use carewise_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use serde::Serialize;
use toml::Value;

use crate::commands::{CommandResult, EXIT_CONFIG};

#[derive(Debug, Serialize)]
struct ConfigEntry {
    key: &'static str,
    value: String,
    source: String,
}

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                EXIT_CONFIG,
            );
        }
    };

    let entries = effective_entries(&config);
    let data = serde_json::to_value(&entries).ok();
    CommandResult::success_with_data(
        "config",
        "effective config (source precedence: env > file > default)",
        data,
    )
}

fn effective_entries(config: &AppConfig) -> Vec<ConfigEntry> {
    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_key: &str| {
        field_source(key_path, Some(env_key), config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let admin_token = config
        .server
        .admin_token
        .as_ref()
        .map(|token| redact_token(token.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());

    vec![
        ConfigEntry {
            key: "database.url",
            value: config.database.url.clone(),
            source: source("database.url", "CAREWISE_DATABASE_URL"),
        },
        ConfigEntry {
            key: "database.max_connections",
            value: config.database.max_connections.to_string(),
            source: source("database.max_connections", "CAREWISE_DATABASE_MAX_CONNECTIONS"),
        },
        ConfigEntry {
            key: "database.timeout_secs",
            value: config.database.timeout_secs.to_string(),
            source: source("database.timeout_secs", "CAREWISE_DATABASE_TIMEOUT_SECS"),
        },
        ConfigEntry {
            key: "server.bind_address",
            value: config.server.bind_address.clone(),
            source: source("server.bind_address", "CAREWISE_SERVER_BIND_ADDRESS"),
        },
        ConfigEntry {
            key: "server.port",
            value: config.server.port.to_string(),
            source: source("server.port", "CAREWISE_SERVER_PORT"),
        },
        ConfigEntry {
            key: "server.graceful_shutdown_secs",
            value: config.server.graceful_shutdown_secs.to_string(),
            source: source("server.graceful_shutdown_secs", "CAREWISE_SERVER_GRACEFUL_SHUTDOWN_SECS"),
        },
        ConfigEntry {
            key: "server.admin_token",
            value: admin_token,
            source: source("server.admin_token", "CAREWISE_SERVER_ADMIN_TOKEN"),
        },
        ConfigEntry {
            key: "reminders.alert_window_days",
            value: config.reminders.alert_window_days.to_string(),
            source: source("reminders.alert_window_days", "CAREWISE_REMINDERS_ALERT_WINDOW_DAYS"),
        },
        ConfigEntry {
            key: "logging.level",
            value: config.logging.level.clone(),
            source: source("logging.level", "CAREWISE_LOGGING_LEVEL"),
        },
        ConfigEntry {
            key: "logging.format",
            value: serde_json::to_value(config.logging.format)
                .ok()
                .and_then(|value| value.as_str().map(str::to_string))
                .unwrap_or_default(),
            source: source("logging.format", "CAREWISE_LOGGING_FORMAT"),
        },
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("carewise.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/carewise.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: Option<&str>,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_key {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

/// Keeps the first four characters so operators can tell tokens apart.
fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    let prefix: String = trimmed.chars().take(4).collect();
    format!("{prefix}***")
}
