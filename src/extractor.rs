use crate::layout::SectionLayout;
use crate::schema::{FiscalSeries, StatementSection};
use crate::workbook::{CellValue, Sheet};
use log::debug;

/// Numeric value of a cell: numbers pass through, text is parsed after
/// stripping thousands separators. Everything else is absent.
pub fn coerce_number(value: Option<&CellValue>) -> Option<f64> {
    let number = match value? {
        CellValue::Number(n) => *n,
        CellValue::Text(s) => s.replace(',', "").trim().parse::<f64>().ok()?,
        CellValue::Bool(_) | CellValue::Date(_) | CellValue::Error(_) => return None,
    };
    number.is_finite().then_some(number)
}

/// Typed cell accessor: `(sheet, row, column) -> optional number`.
pub fn numeric_cell(sheet: &Sheet, row: u32, column: &str) -> Option<f64> {
    coerce_number(sheet.cell(row, column))
}

/// Reads one value per (column, year) pair for every line item in the
/// layout. Columns are paired with years positionally; items that yield no
/// value at all are left out of the section.
pub fn extract_section(sheet: &Sheet, layout: &SectionLayout, years: &[i32]) -> StatementSection {
    let mut section = StatementSection::new();

    for (key, row) in &layout.rows {
        let series: FiscalSeries = layout
            .columns
            .iter()
            .zip(years)
            .filter_map(|(column, year)| numeric_cell(sheet, *row, column).map(|v| (*year, v)))
            .collect();

        if !series.is_empty() {
            section.insert(key.clone(), series);
        }
    }

    debug!(
        "Extracted {} of {} line items from sheet '{}'",
        section.len(),
        layout.rows.len(),
        sheet.name
    );

    section
}
