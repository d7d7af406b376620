use crate::eligibility::{
    evaluate_market, KeyFigures, MarketAssessment, MarketCriteria, ReadinessLevel,
};
use crate::health::{assess_financial_health, FinancialHealth};
use crate::metrics::FinancialMetrics;
use crate::recommendations::{build_recommendations, Recommendation};
use crate::schema::AggregatedDataset;
use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Complete outcome of one readiness assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AssessmentResult {
    pub company_name: Option<String>,
    pub readiness_level: ReadinessLevel,
    #[schemars(description = "100 (SET), 75 (mai), 50 (nearly ready) or 25")]
    pub readiness_score: u32,
    pub readiness_label: String,
    pub set_assessment: MarketAssessment,
    pub mai_assessment: MarketAssessment,
    pub financial_health: FinancialHealth,
    #[schemars(description = "Eligibility inputs in baht after unit scaling")]
    pub key_figures: KeyFigures,
    pub metrics: FinancialMetrics,
    #[schemars(description = "Ordered high to low priority")]
    pub recommendations: Vec<Recommendation>,
}

impl AssessmentResult {
    pub fn is_set_eligible(&self) -> bool {
        self.set_assessment.passed
    }

    pub fn is_mai_eligible(&self) -> bool {
        self.mai_assessment.passed
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = schemars::schema_for!(AssessmentResult);
        serde_json::to_string_pretty(&schema)
    }
}

/// Turns an aggregated dataset into an [`AssessmentResult`]. Missing data
/// degrades the result but never fails it.
pub struct AssessmentEngine<'a> {
    criteria: &'a MarketCriteria,
}

impl<'a> AssessmentEngine<'a> {
    pub fn new(criteria: &'a MarketCriteria) -> Self {
        Self { criteria }
    }

    pub fn assess(&self, dataset: &AggregatedDataset) -> AssessmentResult {
        let metrics = FinancialMetrics::compute(dataset);
        let key_figures = KeyFigures::from_metrics(&metrics);
        debug!(
            "Key figures: latest profit {:.0}, cumulative {:.0}, equity {:.0}, {} years",
            key_figures.latest_profit,
            key_figures.cumulative_profit,
            key_figures.shareholders_equity,
            key_figures.track_record_years
        );

        let set_assessment = evaluate_market(&key_figures, &self.criteria.set);
        let mai_assessment = evaluate_market(&key_figures, &self.criteria.mai);
        let readiness_level = ReadinessLevel::determine(&set_assessment, &mai_assessment);

        let financial_health = assess_financial_health(&metrics);
        let recommendations = build_recommendations(&mai_assessment, &financial_health);

        info!(
            "Assessment complete: {} (SET {}/{}, mai {}/{}, health {}%)",
            readiness_level,
            set_assessment.pass_count,
            set_assessment.total_checks,
            mai_assessment.pass_count,
            mai_assessment.total_checks,
            financial_health.percentage
        );

        AssessmentResult {
            company_name: dataset.company_name.clone(),
            readiness_level,
            readiness_score: readiness_level.score(),
            readiness_label: readiness_level.label().to_string(),
            set_assessment,
            mai_assessment,
            financial_health,
            key_figures,
            metrics,
            recommendations,
        }
    }
}
