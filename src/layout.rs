//! Named cell layouts describing where each financial line item lives in an
//! uploaded statement workbook.

use crate::error::Result;
use crate::schema::{line_items, StatementKind};
use crate::utils::cell_position;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKey {
    #[schemars(description = "Modern OOXML workbook (.xlsx) exported by the registry portal")]
    Standard,

    #[schemars(description = "Legacy binary workbook (.xls) with shifted rows and columns")]
    Legacy,
}

impl LayoutKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutKey::Standard => "standard",
            LayoutKey::Legacy => "legacy",
        }
    }
}

impl fmt::Display for LayoutKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coordinates of one statement type: one column per fiscal year (in year
/// order) and one 1-based row per line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SectionLayout {
    #[schemars(description = "Column letters, one per fiscal year in ascending year order")]
    pub columns: Vec<String>,

    #[schemars(description = "Line-item key to its 1-based spreadsheet row")]
    pub rows: BTreeMap<String, u32>,
}

impl SectionLayout {
    fn new(columns: &[&str], rows: &[(&str, u32)]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|(key, row)| (key.to_string(), *row))
                .collect(),
        }
    }

    fn validate(&self) -> Result<()> {
        for column in &self.columns {
            for row in self.rows.values() {
                cell_position(*row, column)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CellLayout {
    pub ratio: SectionLayout,
    pub income: SectionLayout,
    pub balance: SectionLayout,
}

impl CellLayout {
    pub fn section(&self, kind: StatementKind) -> &SectionLayout {
        match kind {
            StatementKind::Ratio => &self.ratio,
            StatementKind::Income => &self.income,
            StatementKind::Balance => &self.balance,
        }
    }

    pub fn standard() -> Self {
        Self {
            ratio: SectionLayout::new(
                &["B", "C", "D", "E", "F", "G"],
                &[
                    (line_items::ROA, 7),
                    (line_items::ROE, 8),
                    (line_items::GROSS_PROFIT_MARGIN_PCT, 9),
                    (line_items::CURRENT_RATIO, 12),
                    (line_items::DEBT_TO_EQUITY, 22),
                    (line_items::DEBT_TO_ASSETS, 23),
                ],
            ),
            income: SectionLayout::new(
                &["B", "D", "F", "H", "J"],
                &[
                    (line_items::TOTAL_REVENUE, 7),
                    (line_items::GROSS_PROFIT, 9),
                    (line_items::NET_PROFIT, 14),
                ],
            ),
            balance: SectionLayout::new(
                &["B", "D", "F", "H", "J"],
                &[
                    (line_items::TOTAL_ASSETS, 11),
                    (line_items::TOTAL_LIABILITIES, 14),
                    (line_items::SHAREHOLDERS_EQUITY, 15),
                ],
            ),
        }
    }

    pub fn legacy() -> Self {
        Self {
            ratio: SectionLayout::new(
                &["C", "D", "E", "F", "G"],
                &[
                    (line_items::ROA, 6),
                    (line_items::ROE, 7),
                    (line_items::GROSS_PROFIT_MARGIN_PCT, 8),
                    (line_items::NET_PROFIT_MARGIN_PCT, 9),
                    (line_items::CURRENT_RATIO, 11),
                    (line_items::DEBT_TO_ASSETS, 16),
                    (line_items::DEBT_TO_EQUITY, 18),
                ],
            ),
            income: SectionLayout::new(
                &["C", "E", "G", "I", "K"],
                &[(line_items::TOTAL_REVENUE, 6), (line_items::NET_PROFIT, 12)],
            ),
            balance: SectionLayout::new(
                &["C", "E", "G", "I", "K"],
                &[
                    (line_items::TOTAL_ASSETS, 9),
                    (line_items::SHAREHOLDERS_EQUITY, 13),
                ],
            ),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for kind in StatementKind::ALL {
            self.section(kind).validate()?;
        }
        Ok(())
    }
}

/// Catalog of named layouts. Lookups for unregistered names fall back to the
/// standard layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LayoutRegistry {
    layouts: BTreeMap<String, CellLayout>,
}

impl Default for LayoutRegistry {
    fn default() -> Self {
        let mut layouts = BTreeMap::new();
        layouts.insert(LayoutKey::Standard.as_str().to_string(), CellLayout::standard());
        layouts.insert(LayoutKey::Legacy.as_str().to_string(), CellLayout::legacy());
        Self { layouts }
    }
}

impl LayoutRegistry {
    /// Registers (or replaces) a named layout.
    pub fn with_layout(mut self, name: impl Into<String>, layout: CellLayout) -> Self {
        self.layouts.insert(name.into(), layout);
        self
    }

    pub fn get(&self, name: &str) -> &CellLayout {
        self.layouts
            .get(name)
            .or_else(|| self.layouts.get(LayoutKey::Standard.as_str()))
            .unwrap_or_else(standard_fallback)
    }

    pub fn for_key(&self, key: LayoutKey) -> &CellLayout {
        self.get(key.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layouts.keys().map(String::as_str)
    }

    pub fn validate(&self) -> Result<()> {
        for layout in self.layouts.values() {
            layout.validate()?;
        }
        Ok(())
    }
}

fn standard_fallback<'a>() -> &'a CellLayout {
    static STANDARD: std::sync::OnceLock<CellLayout> = std::sync::OnceLock::new();
    STANDARD.get_or_init(CellLayout::standard)
}
