//! Recommendation text for a classified customer

use serde::{Deserialize, Serialize};

use crate::domain::profile::{CustomerProfile, PatternId};
use crate::domain::segment::{
    BcgSegment, LifecycleStage, PotentialLevel, RiskLevel, SalesSegment, TimeHorizon,
};

use super::patterns::pattern_comment;

/// Segment view the comment is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "segment")]
pub enum CommentContext {
    #[default]
    Comprehensive,
    Bcg(BcgSegment),
    Sales(SalesSegment),
}

/// What selected the base sentence of a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum CommentSource {
    Pattern(PatternId),
    Lifecycle(LifecycleStage),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub text: String,
    pub source: CommentSource,
    pub potential_level: PotentialLevel,
    pub time_horizon: Option<TimeHorizon>,
    pub risk_level: RiskLevel,
}

pub fn generate_comment(profile: &CustomerProfile, context: CommentContext) -> Recommendation {
    let primary = profile.primary_pattern();

    let (base, source) = match primary {
        Some(pattern) => {
            (pattern_comment(pattern.id, profile.potential_score), CommentSource::Pattern(pattern.id))
        }
        None => (
            lifecycle_comment(profile.lifecycle_stage).to_string(),
            CommentSource::Lifecycle(profile.lifecycle_stage),
        ),
    };

    let potential_level = profile.potential_level();
    let time_horizon = primary.map(|pattern| pattern.time_horizon);

    let mut text = base;
    text.push_str(segment_suffix(context));
    text.push_str(potential_tag(potential_level));
    text.push_str(horizon_suffix(time_horizon));
    text.push_str(risk_glyph(profile.risk_level));

    Recommendation {
        text,
        source,
        potential_level,
        time_horizon,
        risk_level: profile.risk_level,
    }
}

pub fn lifecycle_comment(stage: LifecycleStage) -> &'static str {
    match stage {
        LifecycleStage::Introduction => "🌱 도입기 고객, 관계 구축 및 성장 지원",
        LifecycleStage::Growth => "📈 성장기 고객, 확장 기회 적극 포착",
        LifecycleStage::Maturity => "💎 성숙기 고객, 가치 극대화 및 관계 심화",
        LifecycleStage::Decline => "📉 쇠퇴기 고객, 회복 전략 수립 필요",
        LifecycleStage::Revival => "🔄 재활성화 고객, 회복 모멘텀 지원",
        LifecycleStage::Stable => "⚖️ 안정기 고객, 안정적 관계 유지 및 효율적 관리",
    }
}

fn segment_suffix(context: CommentContext) -> &'static str {
    match context {
        CommentContext::Comprehensive => "",
        CommentContext::Bcg(BcgSegment::Star) => " (스타전략)",
        CommentContext::Bcg(BcgSegment::CashCow) => " (수익최적화)",
        CommentContext::Bcg(BcgSegment::QuestionMark) => " (선택투자)",
        CommentContext::Bcg(BcgSegment::Dog) => " (효율관리)",
        CommentContext::Sales(SalesSegment::Premium) => " (프리미엄)",
        CommentContext::Sales(SalesSegment::High) => " (중요고객)",
        CommentContext::Sales(SalesSegment::Medium) => " (성장대상)",
        CommentContext::Sales(SalesSegment::Low) => " (기회발굴)",
    }
}

fn potential_tag(level: PotentialLevel) -> &'static str {
    match level {
        PotentialLevel::High => " [고잠재력]",
        PotentialLevel::Medium => " [중잠재력]",
        PotentialLevel::Low => " [저잠재력]",
    }
}

fn horizon_suffix(horizon: Option<TimeHorizon>) -> &'static str {
    match horizon {
        Some(TimeHorizon::Immediate) => " (즉시실행)",
        Some(TimeHorizon::ShortTerm) => " (단기집중)",
        Some(TimeHorizon::MediumTerm) => " (중기전략)",
        Some(TimeHorizon::LongTerm) => " (장기관리)",
        None => " (표준관리)",
    }
}

fn risk_glyph(risk: RiskLevel) -> &'static str {
    match risk {
        RiskLevel::High => " ⚠️",
        RiskLevel::Medium => " ⚡",
        RiskLevel::Low => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::CustomerRecord;
    use crate::segmentation::Classifier;

    fn profile(sales: i64, vs_3_month: i64, vs_year_ago: i64) -> CustomerProfile {
        Classifier::default().classify(
            &CustomerRecord::new("C-1", "Test")
                .with_recent_month_sales(sales)
                .with_growth(vs_3_month, vs_year_ago),
        )
    }

    #[test]
    fn stable_customer_gets_lifecycle_fallback() {
        let recommendation =
            generate_comment(&profile(42_770_000, 1_870_000, 3_060_000), CommentContext::default());

        assert_eq!(recommendation.source, CommentSource::Lifecycle(LifecycleStage::Stable));
        assert_eq!(recommendation.time_horizon, None);
        assert_eq!(
            recommendation.text,
            "⚖️ 안정기 고객, 안정적 관계 유지 및 효율적 관리 [저잠재력] (표준관리)"
        );
    }

    #[test]
    fn pattern_comment_carries_horizon_and_risk() {
        // Revival with a negative year-over-year delta and 25% 3-month growth.
        let recommendation =
            generate_comment(&profile(20_000_000, 5_000_000, -4_000_000), CommentContext::default());

        assert_eq!(recommendation.source, CommentSource::Pattern(PatternId::RecoveryTrend));
        assert_eq!(recommendation.time_horizon, Some(TimeHorizon::MediumTerm));
        assert_eq!(recommendation.risk_level, RiskLevel::High);
        assert!(recommendation.text.starts_with("🔄 회복세 강화 중"));
        assert!(recommendation.text.ends_with(" (중기전략) ⚠️"));
    }

    #[test]
    fn segment_context_adds_suffix() {
        let p = profile(42_770_000, 1_870_000, 3_060_000);

        let bcg = generate_comment(&p, CommentContext::Bcg(BcgSegment::Dog));
        assert!(bcg.text.contains(" (효율관리) [저잠재력]"));

        let sales = generate_comment(&p, CommentContext::Sales(SalesSegment::Medium));
        assert!(sales.text.contains(" (성장대상) [저잠재력]"));
    }

    #[test]
    fn high_potential_tag_at_seventy() {
        let p = profile(5_000_000, 3_000_000, 2_000_000);
        assert!(p.potential_score >= 70);

        let recommendation = generate_comment(&p, CommentContext::Comprehensive);
        assert_eq!(recommendation.potential_level, PotentialLevel::High);
        assert!(recommendation.text.contains(" [고잠재력] (즉시실행)"));
    }

    #[test]
    fn medium_risk_glyph() {
        // -7% over three months, flat year: stable stage, medium risk.
        let recommendation =
            generate_comment(&profile(20_000_000, -1_400_000, 0), CommentContext::Comprehensive);
        assert_eq!(recommendation.risk_level, RiskLevel::Medium);
        assert!(recommendation.text.ends_with(" ⚡"));
    }
}
