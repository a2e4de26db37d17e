use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse bucket of absolute recent-month sales volume.
///
/// Variants are declared in ascending order so the derived `Ord` gives
/// `Low < Medium < High < Premium`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesSegment {
    Low,
    Medium,
    High,
    Premium,
}

impl SalesSegment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Premium => "premium",
        }
    }
}

/// BCG quadrant, repurposed to bucket customers by growth and sales share.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BcgSegment {
    Star,
    CashCow,
    QuestionMark,
    Dog,
}

impl BcgSegment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Star => "star",
            Self::CashCow => "cash-cow",
            Self::QuestionMark => "question-mark",
            Self::Dog => "dog",
        }
    }

    pub fn from_axes(high_growth: bool, high_share: bool) -> Self {
        match (high_growth, high_share) {
            (true, true) => Self::Star,
            (false, true) => Self::CashCow,
            (true, false) => Self::QuestionMark,
            (false, false) => Self::Dog,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStage {
    Introduction,
    Growth,
    Maturity,
    Decline,
    Revival,
    Stable,
}

impl LifecycleStage {
    pub const ALL: [LifecycleStage; 6] = [
        Self::Introduction,
        Self::Growth,
        Self::Maturity,
        Self::Decline,
        Self::Revival,
        Self::Stable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Introduction => "introduction",
            Self::Growth => "growth",
            Self::Maturity => "maturity",
            Self::Decline => "decline",
            Self::Revival => "revival",
            Self::Stable => "stable",
        }
    }

    /// Starting point of the additive potential score.
    pub fn base_potential(&self) -> i32 {
        match self {
            Self::Introduction => 40,
            Self::Growth => 35,
            Self::Revival => 30,
            Self::Stable => 20,
            Self::Maturity => 15,
            Self::Decline => 10,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Urgency of a pattern or recommended action. Ascending declaration order,
/// so `Critical` compares greatest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeHorizon {
    Immediate,
    ShortTerm,
    MediumTerm,
    LongTerm,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PotentialLevel {
    High,
    Medium,
    Low,
}

impl PotentialLevel {
    pub fn from_score(score: u8) -> Self {
        if score >= 70 {
            Self::High
        } else if score >= 40 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

macro_rules! display_via_as_str {
    ($($ty:ty),+) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })+
    };
}

display_via_as_str!(SalesSegment, BcgSegment, LifecycleStage, RiskLevel);
