use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::segmentation::{
    SegmentationCriteria, DEFAULT_CACHE_ENTRIES, DEFAULT_CRITERIA, DEFAULT_MIN_PARALLEL_LEN,
};

pub const DEFAULT_CONFIG_FILE: &str = "salesai.toml";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub criteria: SegmentationCriteria,
    pub batch: BatchConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct BatchConfig {
    pub parallel: bool,
    pub min_parallel_len: usize,
}

#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub enabled: bool,
    pub max_entries: usize,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub batch_parallel: Option<bool>,
    pub cache_enabled: Option<bool>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            criteria: DEFAULT_CRITERIA,
            batch: BatchConfig { parallel: true, min_parallel_len: DEFAULT_MIN_PARALLEL_LEN },
            cache: CacheConfig { enabled: false, max_entries: DEFAULT_CACHE_ENTRIES },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

/// Copies every `Some` field of a patch section onto the live config section.
macro_rules! apply_fields {
    ($target:expr, $patch:expr, [$($field:ident),+ $(,)?]) => {
        $(
            if let Some(value) = $patch.$field {
                $target.$field = value;
            }
        )+
    };
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(criteria) = patch.criteria {
            if let Some(sales) = criteria.sales {
                apply_fields!(self.criteria.sales, sales, [premium, high, medium]);
            }
            if let Some(bcg) = criteria.bcg {
                apply_fields!(self.criteria.bcg, bcg, [high_growth_rate, high_share_sales]);
            }
            if let Some(lifecycle) = criteria.lifecycle {
                apply_fields!(
                    self.criteria.lifecycle,
                    lifecycle,
                    [
                        introduction_sales,
                        introduction_growth,
                        growth_rate,
                        growth_year_rate,
                        growth_sales,
                        maturity_sales,
                        maturity_growth_band,
                        maturity_stability,
                        decline_growth_rate,
                        decline_year_rate,
                        revival_growth_rate,
                    ]
                );
            }
        }

        if let Some(batch) = patch.batch {
            apply_fields!(self.batch, batch, [parallel, min_parallel_len]);
        }

        if let Some(cache) = patch.cache {
            apply_fields!(self.cache, cache, [enabled, max_entries]);
        }

        if let Some(logging) = patch.logging {
            apply_fields!(self.logging, logging, [level, format]);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("SALESAI_BATCH_PARALLEL") {
            self.batch.parallel = parse_bool("SALESAI_BATCH_PARALLEL", &value)?;
        }
        if let Some(value) = read_env("SALESAI_BATCH_MIN_PARALLEL_LEN") {
            self.batch.min_parallel_len = parse_usize("SALESAI_BATCH_MIN_PARALLEL_LEN", &value)?;
        }

        if let Some(value) = read_env("SALESAI_CACHE_ENABLED") {
            self.cache.enabled = parse_bool("SALESAI_CACHE_ENABLED", &value)?;
        }
        if let Some(value) = read_env("SALESAI_CACHE_MAX_ENTRIES") {
            self.cache.max_entries = parse_usize("SALESAI_CACHE_MAX_ENTRIES", &value)?;
        }

        let log_level =
            read_env("SALESAI_LOGGING_LEVEL").or_else(|| read_env("SALESAI_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SALESAI_LOGGING_FORMAT").or_else(|| read_env("SALESAI_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(parallel) = overrides.batch_parallel {
            self.batch.parallel = parallel;
        }
        if let Some(enabled) = overrides.cache_enabled {
            self.cache.enabled = enabled;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.criteria.validate().map_err(|error| ConfigError::Validation(error.to_string()))?;
        validate_cache(&self.cache)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// Locate the config file: the explicit path if given, else the first of
/// `salesai.toml` and `config/salesai.toml` that exists.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from("config").join(DEFAULT_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_cache(cache: &CacheConfig) -> Result<(), ConfigError> {
    if cache.enabled && cache.max_entries == 0 {
        return Err(ConfigError::Validation(
            "cache.max_entries must be greater than zero when the cache is enabled".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() }),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigPatch {
    criteria: Option<CriteriaPatch>,
    batch: Option<BatchPatch>,
    cache: Option<CachePatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CriteriaPatch {
    sales: Option<SalesPatch>,
    bcg: Option<BcgPatch>,
    lifecycle: Option<LifecyclePatch>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SalesPatch {
    premium: Option<i64>,
    high: Option<i64>,
    medium: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct BcgPatch {
    high_growth_rate: Option<f64>,
    high_share_sales: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LifecyclePatch {
    introduction_sales: Option<i64>,
    introduction_growth: Option<f64>,
    growth_rate: Option<f64>,
    growth_year_rate: Option<f64>,
    growth_sales: Option<i64>,
    maturity_sales: Option<i64>,
    maturity_growth_band: Option<f64>,
    maturity_stability: Option<f64>,
    decline_growth_rate: Option<f64>,
    decline_year_rate: Option<f64>,
    revival_growth_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct BatchPatch {
    parallel: Option<bool>,
    min_parallel_len: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CachePatch {
    enabled: Option<bool>,
    max_entries: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
    use crate::segmentation::DEFAULT_CRITERIA;

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    fn write_config(dir: &TempDir, contents: &str) -> Result<std::path::PathBuf, String> {
        let path = dir.path().join("salesai.toml");
        fs::write(&path, contents).map_err(|err| err.to_string())?;
        Ok(path)
    }

    #[test]
    fn defaults_use_dashboard_criteria() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.criteria == DEFAULT_CRITERIA, "criteria should default to dashboard values")?;
        ensure(config.batch.parallel, "batch evaluation should default to parallel")?;
        ensure(!config.cache.enabled, "profile cache should be opt-in")?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_SALESAI_PREMIUM", "150000000");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = write_config(
                &dir,
                r#"
[criteria.sales]
premium = ${TEST_SALESAI_PREMIUM}
"#,
            )?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.criteria.sales.premium == 150_000_000,
                "premium breakpoint should be loaded from environment",
            )?;
            ensure(
                config.criteria.sales.high == DEFAULT_CRITERIA.sales.high,
                "untouched breakpoints keep their defaults",
            )
        })();

        clear_vars(&["TEST_SALESAI_PREMIUM"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SALESAI_LOG_LEVEL", "warn");
        env::set_var("SALESAI_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )
        })();

        clear_vars(&["SALESAI_LOG_LEVEL", "SALESAI_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SALESAI_CACHE_MAX_ENTRIES", "250");
        env::set_var("SALESAI_BATCH_PARALLEL", "false");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = write_config(
                &dir,
                r#"
[batch]
parallel = true
min_parallel_len = 8

[cache]
enabled = false
max_entries = 100

[logging]
level = "warn"
"#,
            )?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    log_level: Some("debug".to_string()),
                    cache_enabled: Some(true),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.batch.min_parallel_len == 8, "file value should beat the default")?;
            ensure(!config.batch.parallel, "env value should beat the file")?;
            ensure(config.cache.max_entries == 250, "env max entries should beat the file")?;
            ensure(config.cache.enabled, "override should beat the file")?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")
        })();

        clear_vars(&["SALESAI_CACHE_MAX_ENTRIES", "SALESAI_BATCH_PARALLEL"]);
        result
    }

    #[test]
    fn invalid_env_override_names_the_key() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SALESAI_BATCH_MIN_PARALLEL_LEN", "many");

        let result = match AppConfig::load(LoadOptions::default()) {
            Ok(_) => Err("expected invalid env override but load succeeded".to_string()),
            Err(error) => ensure(
                matches!(
                    error,
                    ConfigError::InvalidEnvOverride { ref key, .. }
                        if key == "SALESAI_BATCH_MIN_PARALLEL_LEN"
                ),
                "error should name the offending variable",
            ),
        };

        clear_vars(&["SALESAI_BATCH_MIN_PARALLEL_LEN"]);
        result
    }

    #[test]
    fn validation_rejects_unordered_breakpoints() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = write_config(
            &dir,
            r#"
[criteria.sales]
high = 200000000
"#,
        )?;

        let error = match AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() }) {
            Ok(_) => return Err("expected validation failure but config load succeeded".to_string()),
            Err(error) => error,
        };
        let has_message = matches!(
            error,
            ConfigError::Validation(ref message) if message.contains("criteria.sales")
        );
        ensure(has_message, "validation failure should mention criteria.sales")
    }

    #[test]
    fn unknown_keys_are_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = write_config(&dir, "[batch]\nthreads = 4\n")?;

        let result = AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() });
        ensure(
            matches!(result, Err(ConfigError::ParseFile { .. })),
            "unknown keys should fail parsing",
        )
    }

    #[test]
    fn missing_required_file_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let result = AppConfig::load(LoadOptions {
            config_path: Some(dir.path().join("absent.toml")),
            require_file: true,
            ..LoadOptions::default()
        });
        ensure(
            matches!(result, Err(ConfigError::MissingConfigFile(_))),
            "a required but absent file should fail",
        )
    }
}
