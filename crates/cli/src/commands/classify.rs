use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use salesai_core::domain::profile::{CustomerProfile, PatternId, RecommendedAction};
use salesai_core::domain::segment::{
    BcgSegment, LifecycleStage, PotentialLevel, RiskLevel, SalesSegment,
};
use salesai_core::segmentation::{generate_comment, BatchReport, CommentContext, RecordFailure};
use serde::Serialize;
use serde_json::json;

use super::{evaluate_input, load_config, CommandResult};

const COMMAND: &str = "classify";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ContextArg {
    #[default]
    Comprehensive,
    Bcg,
    Sales,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

#[derive(Clone, Debug, Args)]
pub struct ClassifyArgs {
    #[arg(long, help = "Customer export to classify (.csv or .json)")]
    pub input: PathBuf,
    #[arg(long, help = "Only classify customers of this manager")]
    pub manager: Option<String>,
    #[arg(long, value_enum, default_value_t, help = "Segment view used for the comment suffix")]
    pub context: ContextArg,
    #[arg(long, value_enum, default_value_t, help = "Emit the JSON envelope or one line per customer")]
    pub format: OutputFormat,
}

impl ContextArg {
    fn comment_context(self, profile: &CustomerProfile) -> CommentContext {
        match self {
            Self::Comprehensive => CommentContext::Comprehensive,
            Self::Bcg => CommentContext::Bcg(profile.bcg_segment),
            Self::Sales => CommentContext::Sales(profile.sales_segment),
        }
    }
}

/// Flattened view of a profile as reported to operators.
#[derive(Debug, Serialize)]
struct ClassifiedCustomer<'a> {
    account_code: &'a str,
    account_name: &'a str,
    manager: Option<&'a str>,
    sales_segment: SalesSegment,
    bcg_segment: BcgSegment,
    lifecycle_stage: LifecycleStage,
    growth_3_month_rate: f64,
    growth_year_ago_rate: f64,
    potential_score: u8,
    potential_level: PotentialLevel,
    risk_level: RiskLevel,
    primary_pattern: Option<PatternId>,
    matched_patterns: Vec<PatternId>,
    comment: String,
    recommended_actions: &'a [RecommendedAction],
}

impl<'a> ClassifiedCustomer<'a> {
    fn new(profile: &'a CustomerProfile, context: ContextArg) -> Self {
        let recommendation = generate_comment(profile, context.comment_context(profile));
        Self {
            account_code: profile.account_code(),
            account_name: profile.account_name(),
            manager: profile.record.manager.as_deref(),
            sales_segment: profile.sales_segment,
            bcg_segment: profile.bcg_segment,
            lifecycle_stage: profile.lifecycle_stage,
            growth_3_month_rate: round_rate(profile.growth_3_month_rate),
            growth_year_ago_rate: round_rate(profile.growth_year_ago_rate),
            potential_score: profile.potential_score,
            potential_level: profile.potential_level(),
            risk_level: profile.risk_level,
            primary_pattern: profile.primary_pattern().map(|pattern| pattern.id),
            matched_patterns: profile.matched_patterns.iter().map(|pattern| pattern.id).collect(),
            comment: recommendation.text,
            recommended_actions: &profile.recommended_actions,
        }
    }
}

pub fn run(config_path: Option<&Path>, args: &ClassifyArgs) -> CommandResult {
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(error) => return CommandResult::from_error(COMMAND, &error),
    };

    let report = match evaluate_input(COMMAND, &config, &args.input, args.manager.as_deref()) {
        Ok(report) => report,
        Err(error) => return CommandResult::from_error(COMMAND, &error),
    };

    match args.format {
        OutputFormat::Json => json_result(&report, args.context),
        OutputFormat::Text => CommandResult { exit_code: 0, output: render_text(&report, args.context) },
    }
}

fn json_result(report: &BatchReport, context: ContextArg) -> CommandResult {
    let customers: Vec<ClassifiedCustomer<'_>> =
        report.profiles().map(|profile| ClassifiedCustomer::new(profile, context)).collect();
    let failures: Vec<&RecordFailure> = report.failures().collect();

    let message = format!(
        "classified {} customers ({} rejected)",
        customers.len(),
        failures.len()
    );
    let data = json!({
        "evaluated_at": report.evaluated_at,
        "customers": customers,
        "rejected": failures,
    });
    CommandResult::success_with_data(COMMAND, message, Some(data))
}

fn render_text(report: &BatchReport, context: ContextArg) -> String {
    let mut lines = Vec::with_capacity(report.entries.len());
    for entry in &report.entries {
        match entry {
            Ok(profile) => {
                let customer = ClassifiedCustomer::new(profile, context);
                lines.push(format!(
                    "{} {} | {} / {} / {} | score {} | risk {} | {}",
                    customer.account_code,
                    customer.account_name,
                    customer.sales_segment.as_str(),
                    customer.bcg_segment.as_str(),
                    customer.lifecycle_stage.as_str(),
                    customer.potential_score,
                    customer.risk_level.as_str(),
                    customer.comment,
                ));
            }
            Err(failure) => {
                lines.push(format!(
                    "#{} {} | rejected: {}",
                    failure.index, failure.account_code, failure.reason
                ));
            }
        }
    }
    lines.join("\n")
}

fn round_rate(rate: f64) -> f64 {
    (rate * 100.0).round() / 100.0
}
