//! Threshold tables for tiering, BCG placement, and lifecycle staging

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Inclusive lower bounds of the sales tiers, in KRW.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalesBreakpoints {
    pub premium: i64,
    pub high: i64,
    pub medium: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BcgCriteria {
    /// Average long-run growth (%) above which a customer counts as high growth.
    pub high_growth_rate: f64,
    /// Recent-month sales at or above which a customer counts as high share.
    pub high_share_sales: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LifecycleCriteria {
    pub introduction_sales: i64,
    pub introduction_growth: f64,
    pub growth_rate: f64,
    pub growth_year_rate: f64,
    pub growth_sales: i64,
    pub maturity_sales: i64,
    pub maturity_growth_band: f64,
    pub maturity_stability: f64,
    pub decline_growth_rate: f64,
    pub decline_year_rate: f64,
    pub revival_growth_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentationCriteria {
    pub sales: SalesBreakpoints,
    pub bcg: BcgCriteria,
    pub lifecycle: LifecycleCriteria,
}

pub const DEFAULT_CRITERIA: SegmentationCriteria = SegmentationCriteria {
    sales: SalesBreakpoints { premium: 100_000_000, high: 50_000_000, medium: 10_000_000 },
    bcg: BcgCriteria { high_growth_rate: 20.0, high_share_sales: 50_000_000 },
    lifecycle: LifecycleCriteria {
        introduction_sales: 10_000_000,
        introduction_growth: 30.0,
        growth_rate: 15.0,
        growth_year_rate: 10.0,
        growth_sales: 10_000_000,
        maturity_sales: 50_000_000,
        maturity_growth_band: 10.0,
        maturity_stability: 0.8,
        decline_growth_rate: -10.0,
        decline_year_rate: -5.0,
        revival_growth_rate: 10.0,
    },
};

impl Default for SegmentationCriteria {
    fn default() -> Self {
        DEFAULT_CRITERIA
    }
}

impl SegmentationCriteria {
    pub fn validate(&self) -> Result<(), DomainError> {
        let sales = &self.sales;
        if !(sales.premium > sales.high && sales.high > sales.medium && sales.medium > 0) {
            return Err(DomainError::InvariantViolation(format!(
                "criteria.sales breakpoints must be positive and strictly descending \
                 (premium {} > high {} > medium {})",
                sales.premium, sales.high, sales.medium
            )));
        }

        if self.bcg.high_share_sales <= 0 {
            return Err(DomainError::InvariantViolation(
                "criteria.bcg.high_share_sales must be greater than zero".to_string(),
            ));
        }

        let lifecycle = &self.lifecycle;
        let rates = [
            ("criteria.bcg.high_growth_rate", self.bcg.high_growth_rate),
            ("criteria.lifecycle.introduction_growth", lifecycle.introduction_growth),
            ("criteria.lifecycle.growth_rate", lifecycle.growth_rate),
            ("criteria.lifecycle.growth_year_rate", lifecycle.growth_year_rate),
            ("criteria.lifecycle.maturity_growth_band", lifecycle.maturity_growth_band),
            ("criteria.lifecycle.maturity_stability", lifecycle.maturity_stability),
            ("criteria.lifecycle.decline_growth_rate", lifecycle.decline_growth_rate),
            ("criteria.lifecycle.decline_year_rate", lifecycle.decline_year_rate),
            ("criteria.lifecycle.revival_growth_rate", lifecycle.revival_growth_rate),
        ];
        if let Some((name, _)) = rates.iter().find(|(_, value)| !value.is_finite()) {
            return Err(DomainError::InvariantViolation(format!("{name} must be a finite number")));
        }

        if lifecycle.maturity_growth_band < 0.0 {
            return Err(DomainError::InvariantViolation(
                "criteria.lifecycle.maturity_growth_band must not be negative".to_string(),
            ));
        }

        Ok(())
    }
}
