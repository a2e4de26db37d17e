//! Fixed rule table of behavioural patterns
//!
//! A pattern matches when its predicate holds and the customer's lifecycle
//! stage is one the pattern applies to. Every matching rule is collected, in
//! table order.

use crate::domain::profile::{MatchedPattern, PatternId};
use crate::domain::segment::LifecycleStage::{
    self, Decline, Growth, Introduction, Maturity, Revival, Stable,
};
use crate::domain::segment::{Priority, TimeHorizon};

/// Inputs a pattern predicate may look at.
#[derive(Debug, Clone, Copy)]
pub struct PatternFacts {
    pub recent_month_sales: i64,
    pub growth_vs_3_month: i64,
    pub growth_vs_year_ago: i64,
    pub growth_3_month_rate: f64,
    pub growth_year_ago_rate: f64,
    pub unique_products: u32,
    pub lifecycle_stage: LifecycleStage,
}

#[derive(Debug, Clone, Copy)]
pub struct AiPattern {
    pub id: PatternId,
    pub stages: &'static [LifecycleStage],
    pub priority: Priority,
    pub time_horizon: TimeHorizon,
    condition: fn(&PatternFacts) -> bool,
}

impl AiPattern {
    pub fn matches(&self, facts: &PatternFacts) -> bool {
        self.stages.contains(&facts.lifecycle_stage) && (self.condition)(facts)
    }

    fn as_match(&self) -> MatchedPattern {
        MatchedPattern { id: self.id, priority: self.priority, time_horizon: self.time_horizon }
    }
}

pub const AI_PATTERNS: &[AiPattern] = &[
    AiPattern {
        id: PatternId::ExplosiveGrowth,
        stages: &[Introduction, Growth],
        priority: Priority::Critical,
        time_horizon: TimeHorizon::Immediate,
        condition: explosive_growth,
    },
    AiPattern {
        id: PatternId::PremiumCustomer,
        stages: &[Maturity, Growth],
        priority: Priority::High,
        time_horizon: TimeHorizon::LongTerm,
        condition: premium_customer,
    },
    AiPattern {
        id: PatternId::RecoveryTrend,
        stages: &[Revival],
        priority: Priority::Medium,
        time_horizon: TimeHorizon::MediumTerm,
        condition: recovery_trend,
    },
    AiPattern {
        id: PatternId::HighRisk,
        stages: &[Decline],
        priority: Priority::Critical,
        time_horizon: TimeHorizon::Immediate,
        condition: high_risk,
    },
    AiPattern {
        id: PatternId::GrowthPotential,
        stages: &[Introduction, Growth],
        priority: Priority::Medium,
        time_horizon: TimeHorizon::ShortTerm,
        condition: growth_potential,
    },
    AiPattern {
        id: PatternId::StablePartner,
        stages: &[Maturity, Stable],
        priority: Priority::Low,
        time_horizon: TimeHorizon::LongTerm,
        condition: stable_partner,
    },
    AiPattern {
        id: PatternId::DigitalCandidate,
        stages: &[Maturity, Stable],
        priority: Priority::Medium,
        time_horizon: TimeHorizon::MediumTerm,
        condition: digital_candidate,
    },
];

fn explosive_growth(f: &PatternFacts) -> bool {
    f.growth_3_month_rate > 50.0 && f.growth_year_ago_rate > 30.0
}

fn premium_customer(f: &PatternFacts) -> bool {
    f.recent_month_sales >= 100_000_000 && f.growth_3_month_rate > 10.0
}

fn recovery_trend(f: &PatternFacts) -> bool {
    f.growth_vs_3_month > 0 && f.growth_vs_year_ago < 0 && f.growth_3_month_rate > 20.0
}

fn high_risk(f: &PatternFacts) -> bool {
    f.growth_3_month_rate < -20.0 && f.growth_year_ago_rate < -15.0
}

fn growth_potential(f: &PatternFacts) -> bool {
    f.recent_month_sales < 50_000_000 && f.growth_3_month_rate > 30.0
}

fn stable_partner(f: &PatternFacts) -> bool {
    f.recent_month_sales >= 50_000_000 && f.growth_3_month_rate.abs() < 10.0
}

fn digital_candidate(f: &PatternFacts) -> bool {
    f.recent_month_sales >= 30_000_000
        && f.growth_3_month_rate.abs() < 5.0
        && f.unique_products >= 3
}

pub fn match_patterns(facts: &PatternFacts) -> Vec<MatchedPattern> {
    AI_PATTERNS.iter().filter(|pattern| pattern.matches(facts)).map(AiPattern::as_match).collect()
}

/// Recommendation sentence attached to a matched pattern.
pub fn pattern_comment(id: PatternId, potential_score: u8) -> String {
    match id {
        PatternId::ExplosiveGrowth => {
            format!("🚀 폭발적 성장세, 전략적 파트너십 우선 검토 [잠재력: {potential_score}점]")
        }
        PatternId::PremiumCustomer => {
            "💎 프리미엄 핵심고객, VIP 서비스 강화 및 장기 가치 극대화".to_string()
        }
        PatternId::RecoveryTrend => "🔄 회복세 강화 중, 추가 투자 기회 포착 및 모멘텀 유지".to_string(),
        PatternId::HighRisk => "🚨 고위험 고객, 긴급 관계 복구 및 손실 최소화 전략".to_string(),
        PatternId::GrowthPotential => "🌱 성장 잠재력 우수, 맞춤형 확장 지원 및 집중 투자".to_string(),
        PatternId::StablePartner => {
            "🤝 신뢰할 수 있는 파트너, 장기 관계 유지 및 효율성 극대화".to_string()
        }
        PatternId::DigitalCandidate => "🔧 디지털 솔루션 후보, 혁신적 서비스 제안 기회".to_string(),
    }
}
