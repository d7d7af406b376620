use crate::company::extract_company_name;
use crate::config::AnalyzerConfig;
use crate::error::{IpoReadinessError, Result};
use crate::extractor::extract_section;
use crate::layout::CellLayout;
use crate::schema::{
    line_items, AggregatedDataset, ExtractedSections, FiscalSeries, StatementKind,
    StatementSection,
};
use crate::workbook::{Upload, Workbook, WorkbookLoader};
use log::{debug, info, warn};

/// Builds one [`AggregatedDataset`] from any number of uploaded workbooks.
pub struct Aggregator<'a> {
    config: &'a AnalyzerConfig,
    loader: WorkbookLoader,
    dataset: AggregatedDataset,
}

impl<'a> Aggregator<'a> {
    pub fn new(config: &'a AnalyzerConfig) -> Self {
        Self {
            config,
            loader: WorkbookLoader::new(config.max_upload_bytes),
            dataset: AggregatedDataset::new(config.years.clone()),
        }
    }

    /// Loads, classifies and extracts one upload, then merges it into the
    /// running dataset.
    pub fn add_upload(&mut self, upload: &Upload) -> Result<()> {
        let loaded = self.loader.load(upload)?;
        let layout = self.config.layouts.for_key(loaded.layout);

        if self.dataset.company_name.is_none() {
            self.dataset.company_name =
                extract_company_name(&loaded.workbook, &self.config.classifier);
            match &self.dataset.company_name {
                Some(name) => info!("Company name detected in '{}': {}", upload.filename, name),
                None => debug!("No company name found in '{}'", upload.filename),
            }
        }

        let sections = self.extract_workbook(&loaded.workbook, layout);
        if sections.is_empty() {
            warn!(
                "No recognizable statement data in '{}' (sheets: {:?})",
                upload.filename,
                loaded.workbook.sheet_names()
            );
        }

        self.merge(sections);
        Ok(())
    }

    /// Per-sheet extraction. When several sheets classify to the same
    /// statement type, the last one wins.
    pub fn extract_workbook(&self, workbook: &Workbook, layout: &CellLayout) -> ExtractedSections {
        let mut sections = ExtractedSections::default();

        for sheet in &workbook.sheets {
            let Some(kind) = self.config.classifier.classify(sheet) else {
                debug!("Skipping unclassified sheet '{}'", sheet.name);
                continue;
            };
            let extracted = extract_section(sheet, layout.section(kind), &self.dataset.years);
            *sections.section_mut(kind) = extracted;
        }

        sections
    }

    pub fn merge(&mut self, sections: ExtractedSections) {
        for kind in StatementKind::ALL {
            merge_section(self.dataset.section_mut(kind), sections.section(kind));
        }
    }

    /// Applies the derivations and hands over the finished dataset.
    pub fn finish(mut self) -> AggregatedDataset {
        fill_derived_values(&mut self.dataset);
        log_summary(&self.dataset);
        self.dataset
    }
}

/// Runs the whole aggregation over a batch of uploads.
pub fn aggregate_uploads(uploads: &[Upload], config: &AnalyzerConfig) -> Result<AggregatedDataset> {
    if uploads.is_empty() {
        return Err(IpoReadinessError::NoInput);
    }

    let mut aggregator = Aggregator::new(config);
    for (idx, upload) in uploads.iter().enumerate() {
        info!("Processing file {} of {}: {}", idx + 1, uploads.len(), upload.filename);
        aggregator.add_upload(upload)?;
    }

    Ok(aggregator.finish())
}

/// Overlays incoming year values onto the existing series; incoming values
/// win when both report the same year.
pub fn merge_section(target: &mut StatementSection, source: &StatementSection) {
    for (key, series) in source {
        if series.is_empty() {
            continue;
        }
        let existing = target.entry(key.clone()).or_default();
        existing.extend(series.iter().map(|(year, value)| (*year, *value)));
    }
}

pub fn fill_derived_values(dataset: &mut AggregatedDataset) {
    derive_gross_profit(dataset);
    derive_total_liabilities(dataset);
}

/// `gross_profit = revenue * margin / 100` when the income statement has no
/// gross profit of its own.
pub fn derive_gross_profit(dataset: &mut AggregatedDataset) {
    if dataset.income_statement.contains_key(line_items::GROSS_PROFIT) {
        return;
    }
    let (Some(revenue), Some(margin)) = (
        dataset.series(StatementKind::Income, line_items::TOTAL_REVENUE),
        dataset.series(StatementKind::Ratio, line_items::GROSS_PROFIT_MARGIN_PCT),
    ) else {
        return;
    };

    let derived: FiscalSeries = revenue
        .iter()
        .filter_map(|(year, rev)| margin.get(year).map(|m| (*year, rev * m / 100.0)))
        .collect();

    if !derived.is_empty() {
        debug!("Derived gross profit for {} years", derived.len());
        dataset
            .income_statement
            .insert(line_items::GROSS_PROFIT.to_string(), derived);
    }
}

/// `total_liabilities = assets - equity` when the balance sheet has no
/// liabilities line of its own.
pub fn derive_total_liabilities(dataset: &mut AggregatedDataset) {
    if dataset.balance_sheet.contains_key(line_items::TOTAL_LIABILITIES) {
        return;
    }
    let (Some(assets), Some(equity)) = (
        dataset.series(StatementKind::Balance, line_items::TOTAL_ASSETS),
        dataset.series(StatementKind::Balance, line_items::SHAREHOLDERS_EQUITY),
    ) else {
        return;
    };

    let derived: FiscalSeries = assets
        .iter()
        .filter_map(|(year, asset)| equity.get(year).map(|eq| (*year, asset - eq)))
        .collect();

    if !derived.is_empty() {
        debug!("Derived total liabilities for {} years", derived.len());
        dataset
            .balance_sheet
            .insert(line_items::TOTAL_LIABILITIES.to_string(), derived);
    }
}

fn log_summary(dataset: &AggregatedDataset) {
    for kind in StatementKind::ALL {
        let section = dataset.section(kind);
        if section.is_empty() {
            debug!("No {} data extracted", kind);
            continue;
        }
        for (key, series) in section {
            debug!(
                "{} / {}: {} years {:?}",
                kind,
                key,
                series.len(),
                series.keys().collect::<Vec<_>>()
            );
        }
    }
}
