//! Mapping an assessment onto a portfolio project, and the persistence seam
//! that stores it.

use crate::eligibility::ReadinessLevel;
use crate::engine::AssessmentResult;
use crate::error::{IpoReadinessError, Result};
use crate::utils::truncate_chars;
use chrono::{DateTime, Utc};
use log::info;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

pub const UNNAMED_COMPANY: &str = "บริษัทไม่ระบุชื่อ";
pub const MILESTONE_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
pub enum ProjectPhase {
    #[serde(rename = "Filing Prep")]
    FilingPrep,
    #[serde(rename = "Pre-Audit")]
    PreAudit,
    #[serde(rename = "Internal Audit")]
    InternalAudit,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
pub enum ProjectStatus {
    #[serde(rename = "On Track")]
    OnTrack,
    #[serde(rename = "At Risk")]
    AtRisk,
    Delayed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProjectSummary {
    pub client: String,
    pub phase: ProjectPhase,
    pub status: ProjectStatus,
    pub risk: RiskLevel,
    pub readiness_score: u32,
    pub next_milestone: String,
}

impl ProjectSummary {
    pub fn from_assessment(result: &AssessmentResult) -> Self {
        let first_recommendation = |fallback: &str| {
            result
                .recommendations
                .first()
                .map(|r| truncate_chars(&r.message, MILESTONE_MAX_CHARS))
                .unwrap_or_else(|| fallback.to_string())
        };

        let (phase, status, risk, next_milestone) = match result.readiness_level {
            ReadinessLevel::SetReady => (
                ProjectPhase::FilingPrep,
                ProjectStatus::OnTrack,
                RiskLevel::Low,
                "พร้อมยื่น SET".to_string(),
            ),
            ReadinessLevel::MaiReady => (
                ProjectPhase::FilingPrep,
                ProjectStatus::OnTrack,
                RiskLevel::Low,
                "พร้อมยื่น mai".to_string(),
            ),
            ReadinessLevel::NearlyReady => (
                ProjectPhase::PreAudit,
                ProjectStatus::AtRisk,
                RiskLevel::Medium,
                first_recommendation("ปรับปรุงเกณฑ์ IPO"),
            ),
            ReadinessLevel::NeedsDevelopment => (
                ProjectPhase::InternalAudit,
                ProjectStatus::Delayed,
                RiskLevel::High,
                first_recommendation("พัฒนาเพิ่มเติม"),
            ),
        };

        let client = result
            .company_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(UNNAMED_COMPANY)
            .to_string();

        Self {
            client,
            phase,
            status,
            risk,
            readiness_score: result.readiness_score,
            next_milestone,
        }
    }
}

/// What gets handed to an [`AssessmentStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AssessmentRecord {
    pub project: ProjectSummary,
    pub set_eligible: bool,
    pub mai_eligible: bool,
    pub readiness_level: ReadinessLevel,
    #[schemars(description = "Serialized AssessmentResult")]
    pub snapshot: String,
    pub created_at: DateTime<Utc>,
}

impl AssessmentRecord {
    pub fn from_assessment(result: &AssessmentResult) -> Result<Self> {
        Ok(Self {
            project: ProjectSummary::from_assessment(result),
            set_eligible: result.is_set_eligible(),
            mai_eligible: result.is_mai_eligible(),
            readiness_level: result.readiness_level,
            snapshot: result.to_json()?,
            created_at: Utc::now(),
        })
    }
}

pub trait AssessmentStore: Send + Sync {
    /// Persists the record and returns its identifier.
    fn save(&self, record: AssessmentRecord) -> Result<u64>;
}

/// Keeps records in memory; identifiers start at 1.
#[derive(Debug, Default)]
pub struct InMemoryAssessmentStore {
    records: RwLock<Vec<AssessmentRecord>>,
}

impl InMemoryAssessmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: u64) -> Option<AssessmentRecord> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.records.read().ok()?.get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AssessmentStore for InMemoryAssessmentStore {
    fn save(&self, record: AssessmentRecord) -> Result<u64> {
        let mut records = self
            .records
            .write()
            .map_err(|e| IpoReadinessError::StoreError(e.to_string()))?;
        let id = records.len() as u64 + 1;
        info!(
            "Storing assessment #{} for '{}' ({})",
            id, record.project.client, record.readiness_level
        );
        records.push(record);
        Ok(id)
    }
}

/// Maps the result to a record and saves it.
pub fn save_assessment(store: &dyn AssessmentStore, result: &AssessmentResult) -> Result<u64> {
    store.save(AssessmentRecord::from_assessment(result)?)
}
