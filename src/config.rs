use crate::classifier::ClassifierRules;
use crate::eligibility::{EligibilityCriteria, MarketCriteria};
use crate::error::{IpoReadinessError, Result};
use crate::layout::LayoutRegistry;
use crate::schema::DEFAULT_FISCAL_YEARS;
use crate::workbook::DEFAULT_MAX_UPLOAD_BYTES;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Everything the pipeline treats as fixed rules: the fiscal-year window,
/// cell layouts, classifier keywords and listing criteria. Built once and
/// shared by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AnalyzerConfig {
    #[schemars(
        description = "Ascending fiscal years matched positionally to each layout's columns (Buddhist era by default)"
    )]
    pub years: Vec<i32>,

    pub layouts: LayoutRegistry,

    pub classifier: ClassifierRules,

    pub criteria: MarketCriteria,

    #[schemars(description = "Uploads larger than this are rejected before parsing")]
    pub max_upload_bytes: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            years: DEFAULT_FISCAL_YEARS.to_vec(),
            layouts: LayoutRegistry::default(),
            classifier: ClassifierRules::default(),
            criteria: MarketCriteria::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl AnalyzerConfig {
    /// Parses and validates a JSON configuration; omitted fields keep their
    /// defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AnalyzerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.years.is_empty() {
            return Err(IpoReadinessError::InvalidConfig(
                "At least one fiscal year is required".to_string(),
            ));
        }
        if self.years.windows(2).any(|w| w[0] >= w[1]) {
            return Err(IpoReadinessError::InvalidConfig(format!(
                "Fiscal years must be strictly ascending, got {:?}",
                self.years
            )));
        }
        if self.max_upload_bytes == 0 {
            return Err(IpoReadinessError::InvalidConfig(
                "max_upload_bytes must be greater than zero".to_string(),
            ));
        }
        if self.classifier.rules.is_empty() {
            return Err(IpoReadinessError::InvalidConfig(
                "Classifier needs at least one keyword rule".to_string(),
            ));
        }

        self.layouts.validate()?;
        validate_criteria(&self.criteria.set)?;
        validate_criteria(&self.criteria.mai)?;

        Ok(())
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = schemars::schema_for!(AnalyzerConfig);
        serde_json::to_string_pretty(&schema)
    }
}

fn validate_criteria(criteria: &EligibilityCriteria) -> Result<()> {
    let thresholds = [
        ("min_equity", criteria.min_equity),
        ("min_cumulative_profit", criteria.min_cumulative_profit),
        ("min_latest_profit", criteria.min_latest_profit),
        ("min_paid_capital", criteria.min_paid_capital),
    ];
    for (name, value) in thresholds {
        if !value.is_finite() || value < 0.0 {
            return Err(IpoReadinessError::InvalidConfig(format!(
                "{} criterion {} must be a non-negative number, got {}",
                criteria.market, name, value
            )));
        }
    }
    Ok(())
}
