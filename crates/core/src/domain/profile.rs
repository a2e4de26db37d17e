use serde::{Deserialize, Serialize};

use super::customer::CustomerRecord;
use super::segment::{
    BcgSegment, LifecycleStage, PotentialLevel, Priority, RiskLevel, SalesSegment, TimeHorizon,
};

/// Named behavioural pattern the engine looks for in a profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternId {
    ExplosiveGrowth,
    PremiumCustomer,
    RecoveryTrend,
    HighRisk,
    GrowthPotential,
    StablePartner,
    DigitalCandidate,
}

impl PatternId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExplosiveGrowth => "explosive_growth",
            Self::PremiumCustomer => "premium_customer",
            Self::RecoveryTrend => "recovery_trend",
            Self::HighRisk => "high_risk",
            Self::GrowthPotential => "growth_potential",
            Self::StablePartner => "stable_partner",
            Self::DigitalCandidate => "digital_candidate",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedPattern {
    pub id: PatternId,
    pub priority: Priority,
    pub time_horizon: TimeHorizon,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    PatternBased,
    RiskMitigation,
    BcgStrategy,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedAction {
    pub kind: ActionKind,
    pub priority: Priority,
    pub time_horizon: TimeHorizon,
    pub description: String,
    pub category: String,
}

/// Derived view of a customer. Built fresh on every classification and never
/// mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub record: CustomerRecord,
    /// Percent change vs. three months prior, 0 when there were no recent sales.
    pub growth_3_month_rate: f64,
    pub growth_year_ago_rate: f64,
    pub sales_stability: f64,
    pub sales_segment: SalesSegment,
    pub bcg_segment: BcgSegment,
    pub lifecycle_stage: LifecycleStage,
    /// Every pattern that fired, in table declaration order.
    pub matched_patterns: Vec<MatchedPattern>,
    pub potential_score: u8,
    pub risk_level: RiskLevel,
    pub recommended_actions: Vec<RecommendedAction>,
}

impl CustomerProfile {
    pub fn account_code(&self) -> &str {
        &self.record.account_code
    }

    pub fn account_name(&self) -> &str {
        &self.record.account_name
    }

    pub fn potential_level(&self) -> PotentialLevel {
        PotentialLevel::from_score(self.potential_score)
    }

    /// Highest-priority match; ties resolve to the earlier table entry.
    pub fn primary_pattern(&self) -> Option<&MatchedPattern> {
        // `max_by_key` keeps the last maximum, so scan in reverse.
        self.matched_patterns.iter().rev().max_by_key(|pattern| pattern.priority)
    }
}
