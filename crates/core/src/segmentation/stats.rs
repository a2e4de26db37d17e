//! Portfolio-level rollup of classified customers

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::profile::CustomerProfile;
use crate::domain::segment::{BcgSegment, LifecycleStage, RiskLevel, SalesSegment};

pub const TOP_PERFORMER_MIN_SCORE: u8 = 80;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopPerformer {
    pub account_code: String,
    pub account_name: String,
    pub potential_score: u8,
    pub lifecycle_stage: LifecycleStage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskCustomer {
    pub account_code: String,
    pub account_name: String,
    pub risk_level: RiskLevel,
    /// Three-month growth rate rounded to a whole percent.
    pub growth_rate: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct SegmentationStats {
    pub total: usize,
    pub by_lifecycle: BTreeMap<LifecycleStage, usize>,
    pub by_sales_segment: BTreeMap<SalesSegment, usize>,
    pub by_bcg_segment: BTreeMap<BcgSegment, usize>,
    pub by_risk_level: BTreeMap<RiskLevel, usize>,
    pub average_potential_score: u8,
    pub top_performers: Vec<TopPerformer>,
    pub risk_customers: Vec<RiskCustomer>,
}

impl SegmentationStats {
    pub fn from_profiles(profiles: &[CustomerProfile]) -> Self {
        let mut stats = Self {
            total: profiles.len(),
            by_risk_level: [RiskLevel::High, RiskLevel::Medium, RiskLevel::Low]
                .into_iter()
                .map(|level| (level, 0))
                .collect(),
            ..Self::default()
        };
        let mut score_sum: u64 = 0;

        for profile in profiles {
            *stats.by_lifecycle.entry(profile.lifecycle_stage).or_default() += 1;
            *stats.by_sales_segment.entry(profile.sales_segment).or_default() += 1;
            *stats.by_bcg_segment.entry(profile.bcg_segment).or_default() += 1;
            *stats.by_risk_level.entry(profile.risk_level).or_default() += 1;
            score_sum += u64::from(profile.potential_score);

            if profile.potential_score >= TOP_PERFORMER_MIN_SCORE {
                stats.top_performers.push(TopPerformer {
                    account_code: profile.account_code().to_owned(),
                    account_name: profile.account_name().to_owned(),
                    potential_score: profile.potential_score,
                    lifecycle_stage: profile.lifecycle_stage,
                });
            }

            if profile.risk_level == RiskLevel::High {
                stats.risk_customers.push(RiskCustomer {
                    account_code: profile.account_code().to_owned(),
                    account_name: profile.account_name().to_owned(),
                    risk_level: profile.risk_level,
                    growth_rate: profile.growth_3_month_rate.round() as i64,
                });
            }
        }

        if !profiles.is_empty() {
            let average = (score_sum as f64 / profiles.len() as f64).round();
            stats.average_potential_score = average.clamp(0.0, 100.0) as u8;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::CustomerRecord;
    use crate::segmentation::Classifier;

    fn classify(code: &str, sales: i64, vs_3_month: i64, vs_year_ago: i64) -> CustomerProfile {
        Classifier::default().classify(
            &CustomerRecord::new(code, format!("Customer {code}"))
                .with_recent_month_sales(sales)
                .with_growth(vs_3_month, vs_year_ago),
        )
    }

    #[test]
    fn empty_portfolio_averages_to_zero() {
        let stats = SegmentationStats::from_profiles(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.average_potential_score, 0);
        assert!(stats.by_lifecycle.is_empty());
        assert!(stats.top_performers.is_empty());
        assert_eq!(stats.by_risk_level.len(), 3);
        assert!(stats.by_risk_level.values().all(|count| *count == 0));
    }

    #[test]
    fn every_risk_level_is_reported_even_when_empty() {
        let stats =
            SegmentationStats::from_profiles(&[classify("C", 10_500_000, -540_000, -2_790_000)]);

        assert_eq!(stats.by_risk_level.get(&RiskLevel::High), Some(&1));
        assert_eq!(stats.by_risk_level.get(&RiskLevel::Medium), Some(&0));
        assert_eq!(stats.by_risk_level.get(&RiskLevel::Low), Some(&0));

        let json = serde_json::to_value(&stats).expect("stats serialize");
        assert_eq!(json["by_risk_level"]["medium"], 0);
        assert_eq!(json["by_risk_level"]["low"], 0);
    }

    #[test]
    fn counts_partition_the_portfolio() {
        let profiles = vec![
            classify("A", 42_770_000, 1_870_000, 3_060_000),
            classify("B", 19_340_000, 3_680_000, 2_270_000),
            classify("C", 10_500_000, -540_000, -2_790_000),
            classify("D", 0, 0, 0),
        ];
        let stats = SegmentationStats::from_profiles(&profiles);

        assert_eq!(stats.total, 4);
        for counts in [
            stats.by_lifecycle.values().sum::<usize>(),
            stats.by_sales_segment.values().sum::<usize>(),
            stats.by_bcg_segment.values().sum::<usize>(),
            stats.by_risk_level.values().sum::<usize>(),
        ] {
            assert_eq!(counts, 4);
        }
        assert_eq!(stats.by_lifecycle.get(&LifecycleStage::Growth), Some(&1));
        assert_eq!(stats.by_lifecycle.get(&LifecycleStage::Stable), Some(&3));
    }

    #[test]
    fn average_is_rounded_mean_of_scores() {
        let profiles = vec![classify("A", 42_770_000, 1_870_000, 3_060_000), classify("B", 0, 0, 0)];
        let expected = ((f64::from(profiles[0].potential_score) + f64::from(profiles[1].potential_score))
            / 2.0)
            .round() as u8;

        assert_eq!(SegmentationStats::from_profiles(&profiles).average_potential_score, expected);
    }

    #[test]
    fn high_risk_customers_listed_with_rounded_rate() {
        let profiles = vec![classify("C", 10_500_000, -540_000, -2_790_000)];
        let stats = SegmentationStats::from_profiles(&profiles);

        assert_eq!(stats.risk_customers.len(), 1);
        assert_eq!(stats.risk_customers[0].account_code, "C");
        assert_eq!(stats.risk_customers[0].growth_rate, -5);
    }

    #[test]
    fn top_performers_need_score_of_eighty() {
        // Introduction 40 + growth 25 + products 10 + two patterns 10.
        let strong = Classifier::default().classify(
            &CustomerRecord::new("S", "Strong")
                .with_recent_month_sales(5_000_000)
                .with_growth(3_000_000, 2_000_000)
                .with_unique_products(5),
        );
        let weak = classify("W", 42_770_000, 1_870_000, 3_060_000);
        assert_eq!(strong.potential_score, 85);

        let stats = SegmentationStats::from_profiles(&[strong, weak]);
        let listed: Vec<&str> = stats.top_performers.iter().map(|p| p.account_code.as_str()).collect();
        assert_eq!(listed, vec!["S"]);
        assert_eq!(stats.top_performers[0].lifecycle_stage, LifecycleStage::Introduction);
    }
}
