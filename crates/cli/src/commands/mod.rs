pub mod classify;
pub mod config;
pub mod stats;

use std::path::Path;

use salesai_core::config::{AppConfig, LoadOptions};
use salesai_core::errors::ApplicationError;
use salesai_core::ingest::{filter_by_manager, load_records_file};
use salesai_core::segmentation::{BatchEvaluator, BatchReport, Classifier, ProfileCache};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        Self::failure(
            command,
            error.error_class(),
            format!("{} ({error})", error.user_message()),
            error.exit_code(),
        )
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn load_config(config_path: Option<&Path>) -> Result<AppConfig, ApplicationError> {
    let options = LoadOptions {
        config_path: config_path.map(Path::to_path_buf),
        require_file: config_path.is_some(),
        ..LoadOptions::default()
    };
    Ok(AppConfig::load(options)?)
}

/// Load, filter and evaluate an input file under the effective config.
pub(crate) fn evaluate_input(
    command: &str,
    config: &AppConfig,
    input: &Path,
    manager: Option<&str>,
) -> Result<BatchReport, ApplicationError> {
    let mut records = load_records_file(input)?;
    let loaded = records.len();
    if let Some(manager) = manager {
        records = filter_by_manager(records, manager);
    }

    info!(
        event_name = "cli.classify.loaded",
        command,
        input = %input.display(),
        loaded,
        selected = records.len(),
        "customer records loaded"
    );

    let classifier = Classifier::new(config.criteria);
    let cache = config.cache.enabled.then(|| ProfileCache::with_capacity(config.cache.max_entries));

    let mut evaluator = BatchEvaluator::new(&classifier)
        .with_parallelism(config.batch.parallel, config.batch.min_parallel_len);
    if let Some(cache) = cache.as_ref() {
        evaluator = evaluator.with_cache(cache);
    }

    Ok(evaluator.evaluate_raw(records))
}
