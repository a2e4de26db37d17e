//! Customer classification and potential scoring

use crate::domain::customer::CustomerRecord;
use crate::domain::profile::{ActionKind, CustomerProfile, MatchedPattern, RecommendedAction};
use crate::domain::segment::{
    BcgSegment, LifecycleStage, Priority, RiskLevel, SalesSegment, TimeHorizon,
};

use super::criteria::SegmentationCriteria;
use super::patterns::{match_patterns, pattern_comment, PatternFacts};

/// Growth and stability ratios derived from a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedRates {
    pub growth_3_month_rate: f64,
    pub growth_year_ago_rate: f64,
    pub sales_stability: f64,
}

/// Percentage change relative to current sales.
///
/// Zero current sales yields 0 rather than an undefined ratio. This is a
/// policy choice of the dashboard, not an identity.
pub fn growth_rate(delta: i64, current_sales: i64) -> f64 {
    if current_sales > 0 {
        delta as f64 / current_sales as f64 * 100.0
    } else {
        0.0
    }
}

/// Annualized recent month against the trailing total; above 1 means the
/// recent run-rate is accelerating.
pub fn sales_stability(recent_month_sales: i64, total_sales: i64) -> f64 {
    if total_sales > 0 {
        (recent_month_sales as f64 * 12.0) / total_sales as f64
    } else {
        0.0
    }
}

pub fn derive_rates(record: &CustomerRecord) -> DerivedRates {
    DerivedRates {
        growth_3_month_rate: growth_rate(record.growth_vs_3_month, record.recent_month_sales),
        growth_year_ago_rate: growth_rate(record.growth_vs_year_ago, record.recent_month_sales),
        sales_stability: sales_stability(record.recent_month_sales, record.total_sales),
    }
}

/// Size bonus bands for the potential score, highest first. Fixed at the
/// default tier breakpoints so the score stays aligned with the pattern
/// table when tier criteria are customized.
pub const SCORE_SIZE_BANDS: [(i64, i32); 3] =
    [(100_000_000, 20), (50_000_000, 15), (10_000_000, 10)];

/// Pure classifier over an injected set of thresholds.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    criteria: SegmentationCriteria,
}

impl Classifier {
    pub fn new(criteria: SegmentationCriteria) -> Self {
        Self { criteria }
    }

    pub fn criteria(&self) -> &SegmentationCriteria {
        &self.criteria
    }

    /// Derive the full profile for one record. Total: never fails.
    pub fn classify(&self, record: &CustomerRecord) -> CustomerProfile {
        let rates = derive_rates(record);
        let sales_segment = self.sales_segment(record.recent_month_sales);
        let bcg_segment = self.bcg_segment(record);
        let lifecycle_stage = self.lifecycle_stage(record, &rates);

        let matched_patterns = match_patterns(&PatternFacts {
            recent_month_sales: record.recent_month_sales,
            growth_vs_3_month: record.growth_vs_3_month,
            growth_vs_year_ago: record.growth_vs_year_ago,
            growth_3_month_rate: rates.growth_3_month_rate,
            growth_year_ago_rate: rates.growth_year_ago_rate,
            unique_products: record.unique_products,
            lifecycle_stage,
        });

        let potential_score = self.potential_score(
            lifecycle_stage,
            rates.growth_3_month_rate,
            record.recent_month_sales,
            record.unique_products,
            matched_patterns.len(),
        );
        let risk_level = assess_risk(&rates, lifecycle_stage);
        let recommended_actions =
            recommended_actions(&matched_patterns, risk_level, bcg_segment, potential_score);

        CustomerProfile {
            record: record.clone(),
            growth_3_month_rate: rates.growth_3_month_rate,
            growth_year_ago_rate: rates.growth_year_ago_rate,
            sales_stability: rates.sales_stability,
            sales_segment,
            bcg_segment,
            lifecycle_stage,
            matched_patterns,
            potential_score,
            risk_level,
            recommended_actions,
        }
    }

    /// Step function over recent sales; breakpoints are inclusive lower bounds.
    pub fn sales_segment(&self, recent_month_sales: i64) -> SalesSegment {
        let breakpoints = &self.criteria.sales;
        if recent_month_sales >= breakpoints.premium {
            SalesSegment::Premium
        } else if recent_month_sales >= breakpoints.high {
            SalesSegment::High
        } else if recent_month_sales >= breakpoints.medium {
            SalesSegment::Medium
        } else {
            SalesSegment::Low
        }
    }

    pub fn bcg_segment(&self, record: &CustomerRecord) -> BcgSegment {
        let bcg = &self.criteria.bcg;
        let year_over_year = record.year_over_year_growth_rate.unwrap_or(0.0);
        let half_year = record.half_year_growth_rate.unwrap_or(0.0);
        let average_growth = (year_over_year + half_year) / 2.0;

        BcgSegment::from_axes(
            average_growth > bcg.high_growth_rate,
            record.recent_month_sales >= bcg.high_share_sales,
        )
    }

    /// First matching guard wins. The guards overlap near their boundaries,
    /// so the order below is load-bearing.
    pub fn lifecycle_stage(&self, record: &CustomerRecord, rates: &DerivedRates) -> LifecycleStage {
        let c = &self.criteria.lifecycle;
        let sales = record.recent_month_sales;
        let g3 = rates.growth_3_month_rate;
        let gy = rates.growth_year_ago_rate;

        if sales < c.introduction_sales && g3 > c.introduction_growth {
            LifecycleStage::Introduction
        } else if g3 > c.growth_rate && gy > c.growth_year_rate && sales >= c.growth_sales {
            LifecycleStage::Growth
        } else if sales >= c.maturity_sales
            && g3.abs() < c.maturity_growth_band
            && rates.sales_stability > c.maturity_stability
        {
            LifecycleStage::Maturity
        } else if g3 < c.decline_growth_rate && gy < c.decline_year_rate {
            LifecycleStage::Decline
        } else if record.growth_vs_3_month > 0
            && record.growth_vs_year_ago <= 0
            && g3 > c.revival_growth_rate
        {
            LifecycleStage::Revival
        } else {
            LifecycleStage::Stable
        }
    }

    /// Additive 0..=100 score.
    pub fn potential_score(
        &self,
        stage: LifecycleStage,
        growth_3_month_rate: f64,
        recent_month_sales: i64,
        unique_products: u32,
        matched_pattern_count: usize,
    ) -> u8 {
        let mut score = stage.base_potential();

        score += if growth_3_month_rate > 30.0 {
            25
        } else if growth_3_month_rate > 15.0 {
            15
        } else if growth_3_month_rate > 5.0 {
            10
        } else if growth_3_month_rate < -10.0 {
            -15
        } else {
            0
        };

        score += SCORE_SIZE_BANDS
            .iter()
            .find(|(floor, _)| recent_month_sales >= *floor)
            .map_or(0, |(_, bonus)| *bonus);

        score += if unique_products >= 5 {
            10
        } else if unique_products >= 3 {
            5
        } else {
            0
        };

        let pattern_bonus =
            i32::try_from(matched_pattern_count).unwrap_or(i32::MAX).saturating_mul(5);
        score = score.saturating_add(pattern_bonus);

        score.clamp(0, 100) as u8
    }
}

/// High risk is checked first, so the medium band only sees records that
/// cleared both high-risk thresholds.
pub fn assess_risk(rates: &DerivedRates, stage: LifecycleStage) -> RiskLevel {
    if rates.growth_3_month_rate < -20.0 || rates.growth_year_ago_rate < -15.0 {
        RiskLevel::High
    } else if rates.growth_3_month_rate < -5.0 || stage == LifecycleStage::Decline {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

fn recommended_actions(
    patterns: &[MatchedPattern],
    risk_level: RiskLevel,
    bcg_segment: BcgSegment,
    potential_score: u8,
) -> Vec<RecommendedAction> {
    let mut actions: Vec<RecommendedAction> = patterns
        .iter()
        .map(|pattern| RecommendedAction {
            kind: ActionKind::PatternBased,
            priority: pattern.priority,
            time_horizon: pattern.time_horizon,
            description: pattern_comment(pattern.id, potential_score),
            category: pattern.id.as_str().to_string(),
        })
        .collect();

    if risk_level == RiskLevel::High {
        actions.push(RecommendedAction {
            kind: ActionKind::RiskMitigation,
            priority: Priority::Critical,
            time_horizon: TimeHorizon::Immediate,
            description: "긴급 관계 복구 프로그램 실행".to_string(),
            category: "risk_management".to_string(),
        });
    }

    actions.push(bcg_strategy(bcg_segment));

    // Stable sort keeps table order among equal priorities.
    actions.sort_by(|a, b| b.priority.cmp(&a.priority));
    actions
}

fn bcg_strategy(segment: BcgSegment) -> RecommendedAction {
    let (priority, time_horizon, description, category) = match segment {
        BcgSegment::Star => (
            Priority::High,
            TimeHorizon::LongTerm,
            "⭐ 스타 고객 투자 확대 및 시장 리더십 강화",
            "investment_expansion",
        ),
        BcgSegment::CashCow => (
            Priority::Medium,
            TimeHorizon::LongTerm,
            "🐄 현금 확보 최적화 및 효율성 극대화",
            "efficiency_optimization",
        ),
        BcgSegment::QuestionMark => (
            Priority::Medium,
            TimeHorizon::MediumTerm,
            "❓ 선택적 투자 및 성장 잠재력 검증",
            "selective_investment",
        ),
        BcgSegment::Dog => (
            Priority::Low,
            TimeHorizon::ShortTerm,
            "🐕 포트폴리오 재조정 및 효율성 중심 관리",
            "portfolio_optimization",
        ),
    };

    RecommendedAction {
        kind: ActionKind::BcgStrategy,
        priority,
        time_horizon,
        description: description.to_string(),
        category: category.to_string(),
    }
}
