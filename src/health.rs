//! Financial-health score: banded ratio checks on the latest available year,
//! independent of listing eligibility.

use crate::metrics::FinancialMetrics;
use crate::schema::FiscalSeries;
use crate::utils::{latest_value, round2};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum HealthItemKey {
    Roa,
    Roe,
    CurrentRatio,
    DebtToEquity,
    DebtToAssets,
    GrossMargin,
    NetMargin,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Excellent,
    Fair,
    NeedsImprovement,
    NoData,
}

impl Band {
    pub fn label(&self) -> &'static str {
        match self {
            Band::Excellent => "ดีมาก",
            Band::Fair => "พอใช้",
            Band::NeedsImprovement => "ต้องปรับปรุง",
            Band::NoData => "ไม่มีข้อมูล",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum HealthLevel {
    VeryGood,
    Good,
    Fair,
    NeedsImprovement,
}

impl HealthLevel {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 80.0 {
            HealthLevel::VeryGood
        } else if percentage >= 60.0 {
            HealthLevel::Good
        } else if percentage >= 40.0 {
            HealthLevel::Fair
        } else {
            HealthLevel::NeedsImprovement
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthLevel::VeryGood => "ดีมาก",
            HealthLevel::Good => "ดี",
            HealthLevel::Fair => "พอใช้",
            HealthLevel::NeedsImprovement => "ต้องปรับปรุง",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HealthItem {
    pub key: HealthItemKey,
    pub label: String,
    pub value: Option<f64>,
    pub year: Option<i32>,
    pub score: u32,
    pub max_score: u32,
    pub band: Band,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FinancialHealth {
    pub score: u32,
    pub max_score: u32,
    pub percentage: f64,
    pub level: HealthLevel,
    pub breakdown: Vec<HealthItem>,
}

impl FinancialHealth {
    pub fn item(&self, key: HealthItemKey) -> Option<&HealthItem> {
        self.breakdown.iter().find(|i| i.key == key)
    }
}

/// How a ratio value maps onto the full / partial / zero bands.
#[derive(Debug, Clone, Copy)]
enum Scale {
    /// Higher is better: `>= full` scores full, `>= partial` scores partial.
    AtLeast { full: f64, partial: f64 },
    /// Lower is better: `<= full` scores full, `<= partial` scores partial.
    AtMost { full: f64, partial: f64 },
    /// Current-ratio window.
    Liquidity,
}

impl Scale {
    fn band(&self, value: f64) -> Band {
        let (full, partial) = match *self {
            Scale::AtLeast { full, partial } => (value >= full, value >= partial),
            Scale::AtMost { full, partial } => (value <= full, value <= partial),
            Scale::Liquidity => (
                (1.2..=3.0).contains(&value),
                (1.0..1.2).contains(&value) || (value > 3.0 && value <= 5.0),
            ),
        };
        if full {
            Band::Excellent
        } else if partial {
            Band::Fair
        } else {
            Band::NeedsImprovement
        }
    }
}

fn score_item(
    key: HealthItemKey,
    label: &str,
    series: &FiscalSeries,
    max_points: u32,
    scale: Scale,
) -> HealthItem {
    let Some((year, value)) = latest_value(series) else {
        return HealthItem {
            key,
            label: label.to_string(),
            value: None,
            year: None,
            score: 0,
            max_score: 0,
            band: Band::NoData,
        };
    };

    let band = scale.band(value);
    let score = match band {
        Band::Excellent => max_points,
        Band::Fair => max_points.saturating_sub(1).max(1),
        Band::NeedsImprovement | Band::NoData => 0,
    };

    HealthItem {
        key,
        label: label.to_string(),
        value: Some(value),
        year: Some(year),
        score,
        max_score: max_points,
        band,
    }
}

pub fn assess_financial_health(metrics: &FinancialMetrics) -> FinancialHealth {
    let breakdown = vec![
        score_item(
            HealthItemKey::Roa,
            "ROA",
            &metrics.roa,
            2,
            Scale::AtLeast { full: 8.0, partial: 3.0 },
        ),
        score_item(
            HealthItemKey::Roe,
            "ROE",
            &metrics.roe,
            2,
            Scale::AtLeast { full: 15.0, partial: 8.0 },
        ),
        score_item(
            HealthItemKey::CurrentRatio,
            "อัตราส่วนทุนหมุนเวียน",
            &metrics.current_ratio,
            2,
            Scale::Liquidity,
        ),
        score_item(
            HealthItemKey::DebtToEquity,
            "D/E Ratio",
            &metrics.debt_to_equity,
            2,
            Scale::AtMost { full: 1.0, partial: 1.5 },
        ),
        score_item(
            HealthItemKey::DebtToAssets,
            "หนี้สินต่อสินทรัพย์รวม",
            &metrics.debt_to_assets,
            2,
            Scale::AtMost { full: 0.6, partial: 0.75 },
        ),
        score_item(
            HealthItemKey::GrossMargin,
            "Gross Margin",
            &metrics.gross_margin,
            1,
            Scale::AtLeast { full: 25.0, partial: 15.0 },
        ),
        score_item(
            HealthItemKey::NetMargin,
            "Net Margin",
            &metrics.net_profit_margin,
            1,
            Scale::AtLeast { full: 12.0, partial: 6.0 },
        ),
    ];

    let score: u32 = breakdown.iter().map(|i| i.score).sum();
    let max_score: u32 = breakdown.iter().map(|i| i.max_score).sum();
    let percentage = if max_score > 0 {
        round2(f64::from(score) / f64::from(max_score) * 100.0)
    } else {
        0.0
    };

    FinancialHealth {
        score,
        max_score,
        percentage,
        level: HealthLevel::from_percentage(percentage),
        breakdown,
    }
}
