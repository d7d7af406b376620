use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Fiscal year (Buddhist era by default) to value. A year is only present
/// when a source cell or a derivation produced a finite number.
pub type FiscalSeries = BTreeMap<i32, f64>;

/// Line-item key to its fiscal series. Empty series are never stored.
pub type StatementSection = BTreeMap<String, FiscalSeries>;

/// Fiscal years the default configuration operates over (2020-2024 CE).
pub const DEFAULT_FISCAL_YEARS: [i32; 5] = [2563, 2564, 2565, 2566, 2567];

/// Line-item keys shared by layouts, the aggregator and the metrics engine.
pub mod line_items {
    pub const ROA: &str = "roa";
    pub const ROE: &str = "roe";
    pub const CURRENT_RATIO: &str = "current_ratio";
    pub const DEBT_TO_EQUITY: &str = "debt_to_equity";
    pub const DEBT_TO_ASSETS: &str = "debt_to_assets";
    pub const GROSS_PROFIT_MARGIN_PCT: &str = "gross_profit_margin_pct";
    pub const NET_PROFIT_MARGIN_PCT: &str = "net_profit_margin_pct";

    pub const TOTAL_REVENUE: &str = "total_revenue";
    pub const GROSS_PROFIT: &str = "gross_profit";
    pub const NET_PROFIT: &str = "net_profit";

    pub const TOTAL_ASSETS: &str = "total_assets";
    pub const TOTAL_LIABILITIES: &str = "total_liabilities";
    pub const SHAREHOLDERS_EQUITY: &str = "shareholders_equity";
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    #[schemars(description = "Financial ratio sheet (ROA, ROE, liquidity and leverage ratios)")]
    Ratio,

    #[schemars(description = "Income statement (revenue, gross profit, net profit)")]
    Income,

    #[schemars(description = "Balance sheet / statement of financial position")]
    Balance,
}

impl StatementKind {
    pub const ALL: [StatementKind; 3] = [
        StatementKind::Ratio,
        StatementKind::Income,
        StatementKind::Balance,
    ];
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatementKind::Ratio => "ratio",
            StatementKind::Income => "income",
            StatementKind::Balance => "balance",
        };
        f.write_str(label)
    }
}

/// The three statement sections extracted from a single workbook.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedSections {
    pub ratios: StatementSection,
    pub income_statement: StatementSection,
    pub balance_sheet: StatementSection,
}

impl ExtractedSections {
    pub fn section(&self, kind: StatementKind) -> &StatementSection {
        match kind {
            StatementKind::Ratio => &self.ratios,
            StatementKind::Income => &self.income_statement,
            StatementKind::Balance => &self.balance_sheet,
        }
    }

    pub fn section_mut(&mut self, kind: StatementKind) -> &mut StatementSection {
        match kind {
            StatementKind::Ratio => &mut self.ratios,
            StatementKind::Income => &mut self.income_statement,
            StatementKind::Balance => &mut self.balance_sheet,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ratios.is_empty() && self.income_statement.is_empty() && self.balance_sheet.is_empty()
    }
}

/// The merged multi-file, multi-year financial picture of one company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AggregatedDataset {
    #[schemars(description = "The fixed, ascending fiscal-year window the analysis operates over")]
    pub years: Vec<i32>,

    #[schemars(description = "First company name found across the uploaded files")]
    pub company_name: Option<String>,

    pub ratios: StatementSection,
    pub income_statement: StatementSection,
    pub balance_sheet: StatementSection,
}

impl AggregatedDataset {
    pub fn new(years: Vec<i32>) -> Self {
        Self {
            years,
            company_name: None,
            ratios: StatementSection::new(),
            income_statement: StatementSection::new(),
            balance_sheet: StatementSection::new(),
        }
    }

    pub fn section(&self, kind: StatementKind) -> &StatementSection {
        match kind {
            StatementKind::Ratio => &self.ratios,
            StatementKind::Income => &self.income_statement,
            StatementKind::Balance => &self.balance_sheet,
        }
    }

    pub fn section_mut(&mut self, kind: StatementKind) -> &mut StatementSection {
        match kind {
            StatementKind::Ratio => &mut self.ratios,
            StatementKind::Income => &mut self.income_statement,
            StatementKind::Balance => &mut self.balance_sheet,
        }
    }

    /// Series for a line item, `None` when the item was never extracted.
    pub fn series(&self, kind: StatementKind, key: &str) -> Option<&FiscalSeries> {
        self.section(kind).get(key)
    }

    /// Series for a line item, or an empty series when absent.
    pub fn series_or_empty(&self, kind: StatementKind, key: &str) -> FiscalSeries {
        self.series(kind, key).cloned().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.ratios.is_empty() && self.income_statement.is_empty() && self.balance_sheet.is_empty()
    }
}
