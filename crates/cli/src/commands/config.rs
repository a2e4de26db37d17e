use std::env;
use std::fs;
use std::path::Path;

use salesai_core::config::{resolve_config_path, AppConfig, LoadOptions};
use salesai_core::errors::ApplicationError;
use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use toml::Value;

use super::CommandResult;

/// Criteria have no environment overrides.
const NO_ENV: &[&str] = &[];

#[derive(Debug, Serialize)]
struct ConfigEntry {
    key: &'static str,
    value: JsonValue,
    source: String,
}

pub fn run(config_path: Option<&Path>) -> CommandResult {
    let options = LoadOptions {
        config_path: config_path.map(Path::to_path_buf),
        require_file: config_path.is_some(),
        ..LoadOptions::default()
    };
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => return CommandResult::from_error("config", &ApplicationError::from(error)),
    };

    let config_file_path = resolve_config_path(config_path);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let entry = |key: &'static str, value: JsonValue, env_keys: &[&str]| ConfigEntry {
        key,
        value,
        source: field_source(key, env_keys, config_file_doc.as_ref(), config_file_path.as_deref()),
    };

    let sales = &config.criteria.sales;
    let bcg = &config.criteria.bcg;
    let lifecycle = &config.criteria.lifecycle;
    let entries = vec![
        entry("criteria.sales.premium", json!(sales.premium), NO_ENV),
        entry("criteria.sales.high", json!(sales.high), NO_ENV),
        entry("criteria.sales.medium", json!(sales.medium), NO_ENV),
        entry("criteria.bcg.high_growth_rate", json!(bcg.high_growth_rate), NO_ENV),
        entry("criteria.bcg.high_share_sales", json!(bcg.high_share_sales), NO_ENV),
        entry("criteria.lifecycle.introduction_sales", json!(lifecycle.introduction_sales), NO_ENV),
        entry(
            "criteria.lifecycle.introduction_growth",
            json!(lifecycle.introduction_growth),
            NO_ENV,
        ),
        entry("criteria.lifecycle.growth_rate", json!(lifecycle.growth_rate), NO_ENV),
        entry("criteria.lifecycle.growth_year_rate", json!(lifecycle.growth_year_rate), NO_ENV),
        entry("criteria.lifecycle.growth_sales", json!(lifecycle.growth_sales), NO_ENV),
        entry("criteria.lifecycle.maturity_sales", json!(lifecycle.maturity_sales), NO_ENV),
        entry(
            "criteria.lifecycle.maturity_growth_band",
            json!(lifecycle.maturity_growth_band),
            NO_ENV,
        ),
        entry(
            "criteria.lifecycle.maturity_stability",
            json!(lifecycle.maturity_stability),
            NO_ENV,
        ),
        entry(
            "criteria.lifecycle.decline_growth_rate",
            json!(lifecycle.decline_growth_rate),
            NO_ENV,
        ),
        entry("criteria.lifecycle.decline_year_rate", json!(lifecycle.decline_year_rate), NO_ENV),
        entry(
            "criteria.lifecycle.revival_growth_rate",
            json!(lifecycle.revival_growth_rate),
            NO_ENV,
        ),
        entry("batch.parallel", json!(config.batch.parallel), &["SALESAI_BATCH_PARALLEL"]),
        entry(
            "batch.min_parallel_len",
            json!(config.batch.min_parallel_len),
            &["SALESAI_BATCH_MIN_PARALLEL_LEN"],
        ),
        entry("cache.enabled", json!(config.cache.enabled), &["SALESAI_CACHE_ENABLED"]),
        entry("cache.max_entries", json!(config.cache.max_entries), &["SALESAI_CACHE_MAX_ENTRIES"]),
        entry(
            "logging.level",
            json!(config.logging.level),
            &["SALESAI_LOGGING_LEVEL", "SALESAI_LOG_LEVEL"],
        ),
        entry(
            "logging.format",
            json!(config.logging.format),
            &["SALESAI_LOGGING_FORMAT", "SALESAI_LOG_FORMAT"],
        ),
    ];

    CommandResult::success_with_data(
        "config",
        "effective config (source precedence: env > file > default)",
        Some(json!({
            "config_file": config_file_path.map(|path| path.display().to_string()),
            "entries": entries,
        })),
    )
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
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
