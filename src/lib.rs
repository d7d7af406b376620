//! # IPO Readiness
//!
//! Reads multi-year financial statements out of uploaded Excel workbooks and
//! assesses whether a Thai company meets the quantitative listing criteria of
//! the SET main board or the mai board.
//!
//! ## Pipeline
//!
//! - **Loader**: `.xls` and `.xlsx` bytes become an in-memory grid of typed cells
//! - **Classifier**: each sheet is recognized as a ratio, income or balance statement
//! - **Extractor**: fixed cell layouts turn recognized sheets into per-year series
//! - **Aggregator**: several files are merged into one dataset, then gaps are derived
//! - **Engine**: ratios, eligibility checks, a health score and recommendations
//!
//! ## Example
//!
//! ```rust,ignore
//! use ipo_readiness::*;
//!
//! let bytes = std::fs::read("statements.xlsx")?;
//! let analysis = analyze_uploads(&[Upload::new("statements.xlsx", bytes)])?;
//!
//! println!("{}", analysis.assessment.readiness_label);
//! println!("{}", analysis.assessment.to_markdown());
//! ```

pub mod classifier;
pub mod company;
pub mod config;
pub mod eligibility;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod health;
pub mod ingestion;
pub mod layout;
pub mod metrics;
pub mod project;
pub mod recommendations;
pub mod report;
pub mod schema;
pub mod utils;
pub mod workbook;

pub use classifier::{ClassifierRules, KeywordRule};
pub use company::extract_company_name;
pub use config::AnalyzerConfig;
pub use eligibility::{
    CheckKind, CriterionCheck, EligibilityCriteria, KeyFigures, MarketAssessment,
    MarketCriteria, ReadinessLevel,
};
pub use engine::{AssessmentEngine, AssessmentResult};
pub use error::{IpoReadinessError, Result};
pub use health::{Band, FinancialHealth, HealthItem, HealthItemKey, HealthLevel};
pub use ingestion::{aggregate_uploads, Aggregator};
pub use layout::{CellLayout, LayoutKey, LayoutRegistry, SectionLayout};
pub use metrics::FinancialMetrics;
pub use project::{
    save_assessment, AssessmentRecord, AssessmentStore, InMemoryAssessmentStore,
    ProjectPhase, ProjectStatus, ProjectSummary, RiskLevel,
};
pub use recommendations::{Priority, Recommendation};
pub use schema::*;
pub use utils::{be_to_ce, ce_to_be, format_thb};
pub use workbook::{CellValue, Sheet, Upload, Workbook, WorkbookLoader};

use log::{debug, info};
use serde::{Deserialize, Serialize};

/// The merged input data together with the assessment computed from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub dataset: AggregatedDataset,
    pub assessment: AssessmentResult,
}

#[derive(Default)]
pub struct IpoReadinessAnalyzer {
    config: AnalyzerConfig,
}

impl IpoReadinessAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn analyze(&self, uploads: &[Upload]) -> Result<Analysis> {
        info!("Analyzing {} uploaded file(s)", uploads.len());
        debug!(
            "Fiscal years {:?}, layouts {:?}",
            self.config.years,
            self.config.layouts.names().collect::<Vec<_>>()
        );

        let dataset = aggregate_uploads(uploads, &self.config)?;
        let assessment = AssessmentEngine::new(&self.config.criteria).assess(&dataset);

        Ok(Analysis {
            dataset,
            assessment,
        })
    }
}

/// Runs the full pipeline with the default configuration.
pub fn analyze_uploads(uploads: &[Upload]) -> Result<Analysis> {
    IpoReadinessAnalyzer::default().analyze(uploads)
}
