//! Ratio series and unit-scale detection over an aggregated dataset.

use crate::schema::{line_items, AggregatedDataset, FiscalSeries, StatementKind};
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Figures below this are read as millions of baht.
pub const MILLIONS_CEILING: f64 = 50_000.0;
/// Figures below this (and not below [`MILLIONS_CEILING`]) are read as
/// thousands of baht.
pub const THOUSANDS_CEILING: f64 = 50_000_000.0;

/// Computed metric series. Monetary series are in the units of the source
/// files; ratios and margins are unitless or percentages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FinancialMetrics {
    pub roa: FiscalSeries,
    pub roe: FiscalSeries,
    pub current_ratio: FiscalSeries,
    pub debt_to_equity: FiscalSeries,
    pub debt_to_assets: FiscalSeries,
    pub gross_margin: FiscalSeries,
    pub net_profit_margin: FiscalSeries,

    pub total_revenue: FiscalSeries,
    pub gross_profit: FiscalSeries,
    pub net_profit: FiscalSeries,
    pub total_assets: FiscalSeries,
    pub total_liabilities: FiscalSeries,
    pub shareholders_equity: FiscalSeries,

    #[schemars(description = "Multiplier converting source figures to baht (1, 1,000 or 1,000,000)")]
    pub unit_multiplier: f64,
}

impl FinancialMetrics {
    pub fn compute(dataset: &AggregatedDataset) -> Self {
        let income = |key| dataset.series_or_empty(StatementKind::Income, key);
        let balance = |key| dataset.series_or_empty(StatementKind::Balance, key);

        let total_revenue = income(line_items::TOTAL_REVENUE);
        let gross_profit = income(line_items::GROSS_PROFIT);
        let net_profit = income(line_items::NET_PROFIT);
        let total_assets = balance(line_items::TOTAL_ASSETS);
        let total_liabilities = balance(line_items::TOTAL_LIABILITIES);
        let shareholders_equity = balance(line_items::SHAREHOLDERS_EQUITY);

        let extracted_or = |key: &str, derive: &dyn Fn() -> FiscalSeries| {
            match dataset.series(StatementKind::Ratio, key) {
                Some(series) if !series.is_empty() => series.clone(),
                _ => derive(),
            }
        };

        let roa = extracted_or(line_items::ROA, &|| {
            percentage_series(&net_profit, &total_assets)
        });
        let roe = extracted_or(line_items::ROE, &|| {
            percentage_series(&net_profit, &shareholders_equity)
        });
        let current_ratio = extracted_or(line_items::CURRENT_RATIO, &FiscalSeries::new);
        let debt_to_equity = extracted_or(line_items::DEBT_TO_EQUITY, &|| {
            ratio_series(&total_liabilities, &shareholders_equity)
        });
        let debt_to_assets = extracted_or(line_items::DEBT_TO_ASSETS, &|| {
            ratio_series(&total_liabilities, &total_assets)
        });

        let gross_margin = percentage_series(&gross_profit, &total_revenue);
        let net_profit_margin = percentage_series(&net_profit, &total_revenue);

        let unit_multiplier =
            detect_unit_multiplier(&[&total_assets, &shareholders_equity, &total_revenue]);

        Self {
            roa,
            roe,
            current_ratio,
            debt_to_equity,
            debt_to_assets,
            gross_margin,
            net_profit_margin,
            total_revenue,
            gross_profit,
            net_profit,
            total_assets,
            total_liabilities,
            shareholders_equity,
            unit_multiplier,
        }
    }
}

/// `numerator / denominator` per year, skipping years where the denominator
/// is missing or zero.
pub fn ratio_series(numerator: &FiscalSeries, denominator: &FiscalSeries) -> FiscalSeries {
    numerator
        .iter()
        .filter_map(|(year, num)| match denominator.get(year) {
            Some(den) if *den != 0.0 => Some((*year, num / den)),
            _ => None,
        })
        .collect()
}

/// [`ratio_series`] expressed as a percentage.
pub fn percentage_series(numerator: &FiscalSeries, denominator: &FiscalSeries) -> FiscalSeries {
    ratio_series(numerator, denominator)
        .into_iter()
        .map(|(year, ratio)| (year, ratio * 100.0))
        .collect()
}

/// Infers whether figures are stated in millions, thousands or baht from the
/// largest positive value across the given series.
pub fn detect_unit_multiplier(series: &[&FiscalSeries]) -> f64 {
    let max_positive = series
        .iter()
        .flat_map(|s| s.values())
        .copied()
        .filter(|v| *v > 0.0)
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))));

    let multiplier = match max_positive {
        None => 1.0,
        Some(max) if max < MILLIONS_CEILING => 1_000_000.0,
        Some(max) if max < THOUSANDS_CEILING => 1_000.0,
        Some(_) => 1.0,
    };

    debug!(
        "Unit detection: max positive value {:?} -> multiplier {}",
        max_positive, multiplier
    );
    multiplier
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{StatementSection, DEFAULT_FISCAL_YEARS};

    fn series(pairs: &[(i32, f64)]) -> FiscalSeries {
        pairs.iter().copied().collect()
    }

    fn insert(section: &mut StatementSection, key: &str, pairs: &[(i32, f64)]) {
        section.insert(key.to_string(), series(pairs));
    }

    #[test]
    fn test_unit_detection_boundaries() {
        let at = |v: f64| detect_unit_multiplier(&[&series(&[(2567, v)])]);
        assert_eq!(at(49_999.0), 1_000_000.0);
        assert_eq!(at(50_000.0), 1_000.0);
        assert_eq!(at(49_999_999.0), 1_000.0);
        assert_eq!(at(50_000_000.0), 1.0);
    }

    #[test]
    fn test_unit_detection_ignores_non_positive_values() {
        assert_eq!(detect_unit_multiplier(&[]), 1.0);
        assert_eq!(
            detect_unit_multiplier(&[&series(&[(2566, -90_000_000.0), (2567, 0.0)])]),
            1.0
        );
        let mixed = series(&[(2566, -90_000_000.0), (2567, 1_200.0)]);
        assert_eq!(detect_unit_multiplier(&[&mixed]), 1_000_000.0);
    }

    #[test]
    fn test_unit_detection_uses_max_across_series() {
        let assets = series(&[(2567, 40_000.0)]);
        let revenue = series(&[(2567, 60_000.0)]);
        assert_eq!(detect_unit_multiplier(&[&assets, &revenue]), 1_000.0);
    }

    #[test]
    fn test_ratio_series_skips_zero_and_missing_denominators() {
        let num = series(&[(2565, 10.0), (2566, 20.0), (2567, 30.0)]);
        let den = series(&[(2565, 0.0), (2567, 60.0)]);
        assert_eq!(ratio_series(&num, &den), series(&[(2567, 0.5)]));
        assert_eq!(percentage_series(&num, &den), series(&[(2567, 50.0)]));
    }

    #[test]
    fn test_extracted_ratios_take_precedence_over_derivation() {
        let mut dataset = AggregatedDataset::new(DEFAULT_FISCAL_YEARS.to_vec());
        insert(&mut dataset.ratios, line_items::DEBT_TO_EQUITY, &[(2567, 0.8)]);
        insert(&mut dataset.balance_sheet, line_items::TOTAL_LIABILITIES, &[(2567, 300.0)]);
        insert(&mut dataset.balance_sheet, line_items::SHAREHOLDERS_EQUITY, &[(2567, 200.0)]);
        insert(&mut dataset.balance_sheet, line_items::TOTAL_ASSETS, &[(2567, 500.0)]);

        let metrics = FinancialMetrics::compute(&dataset);

        assert_eq!(metrics.debt_to_equity, series(&[(2567, 0.8)]));
        assert_eq!(metrics.debt_to_assets, series(&[(2567, 0.6)]));
        assert!(metrics.current_ratio.is_empty());
    }

    #[test]
    fn test_returns_derived_from_statements_when_missing() {
        let mut dataset = AggregatedDataset::new(DEFAULT_FISCAL_YEARS.to_vec());
        insert(&mut dataset.income_statement, line_items::NET_PROFIT, &[(2567, 50.0)]);
        insert(&mut dataset.balance_sheet, line_items::TOTAL_ASSETS, &[(2567, 1000.0)]);
        insert(&mut dataset.balance_sheet, line_items::SHAREHOLDERS_EQUITY, &[(2567, 250.0)]);

        let metrics = FinancialMetrics::compute(&dataset);

        assert_eq!(metrics.roa, series(&[(2567, 5.0)]));
        assert_eq!(metrics.roe, series(&[(2567, 20.0)]));
    }

    #[test]
    fn test_margins_always_recomputed() {
        let mut dataset = AggregatedDataset::new(DEFAULT_FISCAL_YEARS.to_vec());
        insert(&mut dataset.ratios, line_items::NET_PROFIT_MARGIN_PCT, &[(2567, 99.0)]);
        insert(&mut dataset.income_statement, line_items::TOTAL_REVENUE, &[(2566, 0.0), (2567, 400.0)]);
        insert(&mut dataset.income_statement, line_items::GROSS_PROFIT, &[(2566, 10.0), (2567, 100.0)]);
        insert(&mut dataset.income_statement, line_items::NET_PROFIT, &[(2567, 40.0)]);

        let metrics = FinancialMetrics::compute(&dataset);

        assert_eq!(metrics.gross_margin, series(&[(2567, 25.0)]));
        assert_eq!(metrics.net_profit_margin, series(&[(2567, 10.0)]));
    }

    #[test]
    fn test_empty_dataset_gives_empty_metrics() {
        let dataset = AggregatedDataset::new(DEFAULT_FISCAL_YEARS.to_vec());
        let metrics = FinancialMetrics::compute(&dataset);
        assert!(metrics.roa.is_empty());
        assert!(metrics.debt_to_equity.is_empty());
        assert!(metrics.gross_margin.is_empty());
        assert_eq!(metrics.unit_multiplier, 1.0);
    }
}
