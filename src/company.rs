//! Best-effort company name detection. Never fails; `None` means no
//! plausible name was found.

use crate::classifier::ClassifierRules;
use crate::schema::StatementKind;
use crate::workbook::{CellValue, Workbook};

const NAME_ROWS: [u32; 3] = [1, 2, 3];
const NAME_COLUMNS: [&str; 7] = ["C", "B", "A", "D", "E", "F", "G"];
const MAX_SHEETS: usize = 2;
const MIN_NAME_CHARS: usize = 6;

const COMPANY_MARKERS: [&str; 4] = ["จำกัด", "บริษัท", "มหาชน", "Ltd"];
const HEADER_PREFIXES: [&str; 3] = [
    "อัตราส่วนทางการเงิน - ",
    "อัตราส่วนทางการเงินที่สำคัญ ",
    "อัตราส่วน - ",
];

pub fn extract_company_name(workbook: &Workbook, rules: &ClassifierRules) -> Option<String> {
    // Ratio sheets first (the registry export prints the name above the
    // ratio table), otherwise the first sheet.
    let mut candidates = Vec::new();
    for sheet in &workbook.sheets {
        if rules.classify(sheet) == Some(StatementKind::Ratio) {
            candidates.insert(0, sheet);
        } else if candidates.is_empty() {
            candidates.push(sheet);
        }
    }

    for sheet in candidates.into_iter().take(MAX_SHEETS) {
        for row in NAME_ROWS {
            for column in NAME_COLUMNS {
                if let Some(CellValue::Text(text)) = sheet.cell(row, column) {
                    let trimmed = text.trim();
                    if looks_like_company(trimmed) {
                        return Some(clean_company_name(trimmed));
                    }
                }
            }
        }
    }

    None
}

fn looks_like_company(text: &str) -> bool {
    if text.chars().count() < MIN_NAME_CHARS {
        return false;
    }
    contains_thai(text)
        || COMPANY_MARKERS.iter().any(|m| text.contains(m))
        || word_start(text, "company").is_some()
        || word_start(text, "public").is_some()
}

fn contains_thai(text: &str) -> bool {
    text.chars().any(|c| ('\u{0E00}'..='\u{0E7F}').contains(&c))
}

/// Byte offset of the first ASCII case-insensitive occurrence of `word` that
/// does not directly follow another letter. `word` must be lowercase ASCII.
fn word_start(text: &str, word: &str) -> Option<usize> {
    let mut prev: Option<char> = None;
    for (idx, ch) in text.char_indices() {
        let at_boundary = prev.map_or(true, |p| !p.is_alphabetic());
        let head = text.get(idx..idx + word.len());
        if at_boundary && head.is_some_and(|h| h.eq_ignore_ascii_case(word)) {
            return Some(idx);
        }
        prev = Some(ch);
    }
    None
}

fn clean_company_name(text: &str) -> String {
    let mut name = if let Some(idx) = text.find("บริษัท") {
        &text[idx..]
    } else if let Some(tail) = word_start(text, "company").and_then(|idx| text.get(idx..)) {
        tail
    } else {
        text
    }
    .to_string();

    for prefix in HEADER_PREFIXES {
        if name.contains(prefix) {
            name = name.replace(prefix, "").trim().to_string();
        }
    }
    name
}
