//! Listing criteria for the SET main board and the mai board, the key
//! figures they are checked against, and the readiness tiering.

use crate::metrics::FinancialMetrics;
use crate::utils::{format_grouped, latest_value, latest_values, round2};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Most recent years summed into the cumulative profit figure.
pub const CUMULATIVE_PROFIT_YEARS: usize = 3;

/// Quantitative thresholds of one listing market, in baht.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EligibilityCriteria {
    pub market: String,
    pub market_label: String,
    pub min_equity: f64,
    pub min_cumulative_profit: f64,
    pub min_latest_profit: f64,
    /// Declared by the listing rules but not extracted from statements, so
    /// it is never checked.
    pub min_paid_capital: f64,
    pub min_track_record_years: u32,
}

impl EligibilityCriteria {
    pub fn set() -> Self {
        Self {
            market: "SET".to_string(),
            market_label: "ตลาดหลักทรัพย์แห่งประเทศไทย".to_string(),
            min_equity: 800_000_000.0,
            min_cumulative_profit: 125_000_000.0,
            min_latest_profit: 75_000_000.0,
            min_paid_capital: 300_000_000.0,
            min_track_record_years: 3,
        }
    }

    pub fn mai() -> Self {
        Self {
            market: "mai".to_string(),
            market_label: "ตลาดหลักทรัพย์ เอ็ม เอ ไอ".to_string(),
            min_equity: 100_000_000.0,
            min_cumulative_profit: 40_000_000.0,
            min_latest_profit: 25_000_000.0,
            min_paid_capital: 50_000_000.0,
            min_track_record_years: 2,
        }
    }
}

/// The primary (SET) and secondary (mai) criteria sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MarketCriteria {
    pub set: EligibilityCriteria,
    pub mai: EligibilityCriteria,
}

impl Default for MarketCriteria {
    fn default() -> Self {
        Self {
            set: EligibilityCriteria::set(),
            mai: EligibilityCriteria::mai(),
        }
    }
}

/// Eligibility inputs, already converted to baht.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KeyFigures {
    pub latest_profit: f64,
    pub latest_profit_year: Option<i32>,
    pub cumulative_profit: f64,
    pub shareholders_equity: f64,
    pub track_record_years: u32,
    /// True when the latest-year profit is positive. The name is kept for
    /// compatibility; it does not look at the cumulative figure.
    pub has_cumulative_profit: bool,
    pub unit_multiplier: f64,
}

impl KeyFigures {
    pub fn from_metrics(metrics: &FinancialMetrics) -> Self {
        let multiplier = metrics.unit_multiplier;

        let latest = latest_value(&metrics.net_profit);
        let latest_profit = latest.map_or(0.0, |(_, v)| v * multiplier);
        let cumulative_profit: f64 = latest_values(&metrics.net_profit, CUMULATIVE_PROFIT_YEARS)
            .iter()
            .sum::<f64>()
            * multiplier;
        let shareholders_equity =
            latest_value(&metrics.shareholders_equity).map_or(0.0, |(_, v)| v * multiplier);

        Self {
            latest_profit,
            latest_profit_year: latest.map(|(year, _)| year),
            cumulative_profit,
            shareholders_equity,
            track_record_years: metrics.net_profit.len() as u32,
            has_cumulative_profit: latest_profit > 0.0,
            unit_multiplier: multiplier,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Equity,
    LatestProfit,
    CumulativeProfit,
    TrackRecord,
    Profitable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CriterionCheck {
    pub kind: CheckKind,
    pub name: String,
    pub required: f64,
    pub actual: f64,
    pub passed: bool,
    /// `max(required - actual, 0)`; 1 for a failed profitability check.
    pub gap: f64,
}

impl CriterionCheck {
    fn at_least(kind: CheckKind, name: String, required: f64, actual: f64) -> Self {
        Self {
            kind,
            name,
            required,
            actual,
            passed: actual >= required,
            gap: (required - actual).max(0.0),
        }
    }

    fn flag(kind: CheckKind, name: String, actual: bool) -> Self {
        Self {
            kind,
            name,
            required: 1.0,
            actual: if actual { 1.0 } else { 0.0 },
            passed: actual,
            gap: if actual { 0.0 } else { 1.0 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MarketAssessment {
    pub market: String,
    pub market_label: String,
    pub passed: bool,
    pub pass_count: usize,
    pub total_checks: usize,
    pub pass_percentage: f64,
    pub checks: Vec<CriterionCheck>,
}

impl MarketAssessment {
    pub fn check(&self, kind: CheckKind) -> Option<&CriterionCheck> {
        self.checks.iter().find(|c| c.kind == kind)
    }
}

/// Runs the five checks of one market against the key figures.
pub fn evaluate_market(figures: &KeyFigures, criteria: &EligibilityCriteria) -> MarketAssessment {
    let millions = |v: f64| format_grouped(v / 1_000_000.0);

    let checks = vec![
        CriterionCheck::at_least(
            CheckKind::Equity,
            format!("ส่วนของผู้ถือหุ้น ≥ {} ล้านบาท", millions(criteria.min_equity)),
            criteria.min_equity,
            figures.shareholders_equity,
        ),
        CriterionCheck::at_least(
            CheckKind::LatestProfit,
            format!(
                "กำไรสุทธิปีล่าสุด ≥ {} ล้านบาท",
                millions(criteria.min_latest_profit)
            ),
            criteria.min_latest_profit,
            figures.latest_profit,
        ),
        CriterionCheck::at_least(
            CheckKind::CumulativeProfit,
            format!(
                "กำไรสุทธิรวม 2-3 ปีล่าสุด ≥ {} ล้านบาท",
                millions(criteria.min_cumulative_profit)
            ),
            criteria.min_cumulative_profit,
            figures.cumulative_profit,
        ),
        CriterionCheck::at_least(
            CheckKind::TrackRecord,
            format!(
                "ผลการดำเนินงานต่อเนื่อง ≥ {} ปี",
                criteria.min_track_record_years
            ),
            f64::from(criteria.min_track_record_years),
            f64::from(figures.track_record_years),
        ),
        CriterionCheck::flag(
            CheckKind::Profitable,
            "มีกำไรสุทธิในปีล่าสุด".to_string(),
            figures.has_cumulative_profit,
        ),
    ];

    let pass_count = checks.iter().filter(|c| c.passed).count();
    let total_checks = checks.len();

    MarketAssessment {
        market: criteria.market.clone(),
        market_label: criteria.market_label.clone(),
        passed: pass_count == total_checks,
        pass_count,
        total_checks,
        pass_percentage: round2(pass_count as f64 / total_checks as f64 * 100.0),
        checks,
    }
}

/// Pass count on the secondary market needed for the "nearly ready" tier.
pub const NEARLY_READY_MIN_PASSES: usize = 3;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessLevel {
    #[schemars(description = "Meets every SET main board check")]
    SetReady,

    #[schemars(description = "Meets every mai check but not SET")]
    MaiReady,

    #[schemars(description = "Meets at least three of the five mai checks")]
    NearlyReady,

    #[schemars(description = "Meets fewer than three mai checks")]
    NeedsDevelopment,
}

impl ReadinessLevel {
    /// First match wins: SET, then mai, then the mai pass count.
    pub fn determine(set: &MarketAssessment, mai: &MarketAssessment) -> Self {
        if set.passed {
            ReadinessLevel::SetReady
        } else if mai.passed {
            ReadinessLevel::MaiReady
        } else if mai.pass_count >= NEARLY_READY_MIN_PASSES {
            ReadinessLevel::NearlyReady
        } else {
            ReadinessLevel::NeedsDevelopment
        }
    }

    pub fn score(&self) -> u32 {
        match self {
            ReadinessLevel::SetReady => 100,
            ReadinessLevel::MaiReady => 75,
            ReadinessLevel::NearlyReady => 50,
            ReadinessLevel::NeedsDevelopment => 25,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReadinessLevel::SetReady => "พร้อมสำหรับ SET",
            ReadinessLevel::MaiReady => "พร้อมสำหรับ mai",
            ReadinessLevel::NearlyReady => "ใกล้พร้อม",
            ReadinessLevel::NeedsDevelopment => "ต้องพัฒนาเพิ่มเติม",
        }
    }
}

impl fmt::Display for ReadinessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
