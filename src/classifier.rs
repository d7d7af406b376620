use crate::schema::StatementKind;
use crate::workbook::Sheet;
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Rows scanned for header keywords.
pub const HEADER_ROWS: u32 = 8;
/// Columns (A-D) scanned for header keywords.
pub const HEADER_COLUMNS: u32 = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KeywordRule {
    pub kind: StatementKind,

    #[schemars(description = "Substrings matched case-insensitively; any match selects this statement type")]
    pub keywords: Vec<String>,
}

impl KeywordRule {
    pub fn new(kind: StatementKind, keywords: &[&str]) -> Self {
        Self {
            kind,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    fn matches(&self, text: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| text.contains(k.to_lowercase().as_str()))
    }
}

/// Keyword rules in priority order. The first rule that matches the header
/// text wins; the sheet name is only consulted when no rule matches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClassifierRules {
    pub rules: Vec<KeywordRule>,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            rules: vec![
                KeywordRule::new(StatementKind::Ratio, &["อัตราส่วน", "ratio"]),
                KeywordRule::new(StatementKind::Income, &["กำไร", "income", "profit"]),
                KeywordRule::new(StatementKind::Balance, &["ฐานะ", "balance", "สินทรัพย์รวม"]),
            ],
        }
    }
}

impl ClassifierRules {
    pub fn classify(&self, sheet: &Sheet) -> Option<StatementKind> {
        let header = header_text(sheet);
        let kind = self
            .match_text(&header)
            .or_else(|| self.match_text(&sheet.name.to_lowercase()));

        match kind {
            Some(kind) => debug!("Sheet '{}' classified as {}", sheet.name, kind),
            None => debug!("Sheet '{}' did not match any statement keywords", sheet.name),
        }
        kind
    }

    fn match_text(&self, text: &str) -> Option<StatementKind> {
        if text.is_empty() {
            return None;
        }
        self.rules
            .iter()
            .find(|rule| rule.matches(text))
            .map(|rule| rule.kind)
    }
}

/// Lowercased, space-joined text of the non-empty cells in the header block.
fn header_text(sheet: &Sheet) -> String {
    let mut parts = Vec::new();
    for row in 0..HEADER_ROWS {
        for col in 0..HEADER_COLUMNS {
            if let Some(value) = sheet.get(row, col) {
                parts.push(value.to_string().to_lowercase());
            }
        }
    }
    parts.join(" ")
}
