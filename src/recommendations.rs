use crate::eligibility::{CheckKind, MarketAssessment};
use crate::health::{Band, FinancialHealth, HealthItemKey};
use crate::utils::{format_grouped, format_thb};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Recommendation {
    pub category: String,
    pub priority: Priority,
    pub message: String,
}

impl Recommendation {
    fn new(category: &str, priority: Priority, message: String) -> Self {
        Self {
            category: category.to_string(),
            priority,
            message,
        }
    }
}

/// Remediation steps for the failed checks of `market` (the secondary
/// board) plus advisories for weak liquidity, leverage and returns. Ordered
/// high to medium to low; equal priorities keep their generation order.
pub fn build_recommendations(
    market: &MarketAssessment,
    health: &FinancialHealth,
) -> Vec<Recommendation> {
    let mut recommendations: Vec<Recommendation> = market
        .checks
        .iter()
        .filter(|check| !check.passed && check.gap > 0.0)
        .map(|check| {
            let gap = check.gap;
            match check.kind {
                CheckKind::Equity => Recommendation::new(
                    "ส่วนของผู้ถือหุ้น",
                    Priority::High,
                    format!("เพิ่มส่วนของผู้ถือหุ้นอีก {}", format_thb(gap)),
                ),
                CheckKind::LatestProfit => Recommendation::new(
                    "กำไรสุทธิ",
                    Priority::High,
                    format!("เพิ่มกำไรสุทธิปีล่าสุดอีก {}", format_thb(gap)),
                ),
                CheckKind::CumulativeProfit => Recommendation::new(
                    "กำไรสะสม",
                    Priority::Medium,
                    format!("เพิ่มกำไรสุทธิรวมย้อนหลังอีก {}", format_thb(gap)),
                ),
                CheckKind::TrackRecord => Recommendation::new(
                    "ผลการดำเนินงาน",
                    Priority::Medium,
                    format!(
                        "สร้างผลการดำเนินงานต่อเนื่องเพิ่มอีก {} ปี",
                        format_grouped(gap)
                    ),
                ),
                CheckKind::Profitable => Recommendation::new(
                    "ความสามารถในการทำกำไร",
                    Priority::High,
                    "ปรับปรุงผลการดำเนินงานให้มีกำไรสุทธิในปีล่าสุด".to_string(),
                ),
            }
        })
        .collect();

    let advisories = [
        (
            HealthItemKey::CurrentRatio,
            "สภาพคล่อง",
            Priority::Medium,
            "ปรับปรุงสภาพคล่อง ให้อัตราส่วนทุนหมุนเวียนอยู่ระหว่าง 1.2 ถึง 3.0 เท่า",
        ),
        (
            HealthItemKey::DebtToEquity,
            "โครงสร้างเงินทุน",
            Priority::Medium,
            "ลดภาระหนี้สิน ให้ D/E Ratio ไม่เกิน 1.5 เท่า",
        ),
        (
            HealthItemKey::Roe,
            "ผลตอบแทน",
            Priority::Low,
            "เพิ่มผลตอบแทนต่อส่วนของผู้ถือหุ้น (ROE) ให้ไม่ต่ำกว่า 8%",
        ),
    ];
    for (key, category, priority, message) in advisories {
        if health
            .item(key)
            .is_some_and(|item| item.band == Band::NeedsImprovement)
        {
            recommendations.push(Recommendation::new(category, priority, message.to_string()));
        }
    }

    recommendations.sort_by_key(|r| r.priority);
    recommendations
}
