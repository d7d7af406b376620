//! Markdown rendering of an assessment for human review.

use crate::eligibility::{CheckKind, MarketAssessment};
use crate::engine::AssessmentResult;
use crate::health::FinancialHealth;
use crate::project::UNNAMED_COMPANY;
use crate::utils::{be_to_ce, format_grouped, format_thb};

impl AssessmentResult {
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        let company = self.company_name.as_deref().unwrap_or(UNNAMED_COMPANY);
        output.push_str(&format!("# IPO Readiness - {}\n\n", company));
        output.push_str(&format!(
            "**Readiness:** {} ({}/100)\n\n",
            self.readiness_label, self.readiness_score
        ));

        output.push_str("## Key Figures\n\n");
        let kf = &self.key_figures;
        match kf.latest_profit_year {
            Some(year) => output.push_str(&format!(
                "- Latest net profit ({} / {}): {}\n",
                year,
                be_to_ce(year),
                format_thb(kf.latest_profit)
            )),
            None => output.push_str("- Latest net profit: n/a\n"),
        }
        output.push_str(&format!(
            "- Cumulative net profit: {}\n",
            format_thb(kf.cumulative_profit)
        ));
        output.push_str(&format!(
            "- Shareholders' equity: {}\n",
            format_thb(kf.shareholders_equity)
        ));
        output.push_str(&format!(
            "- Track record: {} years\n",
            kf.track_record_years
        ));
        output.push_str(&format!(
            "- Unit multiplier: x{}\n\n",
            format_grouped(kf.unit_multiplier)
        ));

        write_market(&mut output, &self.set_assessment);
        write_market(&mut output, &self.mai_assessment);
        write_health(&mut output, &self.financial_health);

        output.push_str("## Recommendations\n\n");
        if self.recommendations.is_empty() {
            output.push_str("- None\n");
        }
        for rec in &self.recommendations {
            output.push_str(&format!(
                "- [{}] {}: {}\n",
                rec.priority, rec.category, rec.message
            ));
        }

        output
    }
}

fn write_market(output: &mut String, market: &MarketAssessment) {
    output.push_str(&format!(
        "## {} ({}) - {}/{} passed\n\n",
        market.market, market.market_label, market.pass_count, market.total_checks
    ));
    output.push_str("| Criterion | Actual | Result |\n|---|---|---|\n");
    for check in &market.checks {
        let actual = match check.kind {
            CheckKind::TrackRecord => format!("{} ปี", format_grouped(check.actual)),
            CheckKind::Profitable if check.passed => "ใช่".to_string(),
            CheckKind::Profitable => "ไม่ใช่".to_string(),
            _ => format_thb(check.actual),
        };
        let mark = if check.passed { "PASS" } else { "FAIL" };
        output.push_str(&format!("| {} | {} | {} |\n", check.name, actual, mark));
    }
    output.push('\n');
}

fn write_health(output: &mut String, health: &FinancialHealth) {
    output.push_str(&format!(
        "## Financial Health - {} ({}/{}, {}%)\n\n",
        health.level.label(),
        health.score,
        health.max_score,
        health.percentage
    ));
    output.push_str("| Item | Value | Band | Score |\n|---|---|---|---|\n");
    for item in &health.breakdown {
        let value = item
            .value
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "-".to_string());
        output.push_str(&format!(
            "| {} | {} | {} | {}/{} |\n",
            item.label,
            value,
            item.band.label(),
            item.score,
            item.max_score
        ));
    }
    output.push('\n');
}
