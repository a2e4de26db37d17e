use std::path::{Path, PathBuf};

use clap::Args;
use salesai_core::segmentation::SegmentationStats;
use serde_json::json;

use super::{evaluate_input, load_config, CommandResult};

const COMMAND: &str = "stats";

#[derive(Clone, Debug, Args)]
pub struct StatsArgs {
    #[arg(long, help = "Customer export to summarize (.csv or .json)")]
    pub input: PathBuf,
    #[arg(long, help = "Only include customers of this manager")]
    pub manager: Option<String>,
}

pub fn run(config_path: Option<&Path>, args: &StatsArgs) -> CommandResult {
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(error) => return CommandResult::from_error(COMMAND, &error),
    };

    let report = match evaluate_input(COMMAND, &config, &args.input, args.manager.as_deref()) {
        Ok(report) => report,
        Err(error) => return CommandResult::from_error(COMMAND, &error),
    };

    let rejected = report.failure_count();
    let profiles = report.into_profiles();
    let stats = SegmentationStats::from_profiles(&profiles);

    let message = format!(
        "summarized {} customers, average potential {} ({} rejected)",
        stats.total, stats.average_potential_score, rejected
    );
    let data = json!({ "stats": stats, "rejected": rejected });
    CommandResult::success_with_data(COMMAND, message, Some(data))
}
