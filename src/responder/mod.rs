//! Pluggable source of the "AI" answers (judge analysis, argument simulation,
//! win prediction, OCR, drafting, eCourt lookups).
//!
//! Handlers validate input, enforce roles and compute any fixed figures; the
//! [`Responder`] only turns a well-formed request into content of the right shape. [`CannedResponder`]
//! returns fixed, deterministic content.

mod canned;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::Result;

pub use canned::CannedResponder;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeJudgeRequest {
    pub judge_id: String,
    pub case_type: String,
    #[serde(default)]
    pub uploaded_pdf: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeAnalysis {
    pub judge_name: String,
    pub tendencies: Vec<String>,
    pub successful_arguments: Vec<String>,
    pub avoidance_points: Vec<String>,
    pub recent_orders: Vec<String>,
    pub suggested_strategy: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JudgeProfile {
    Strict,
    Liberal,
    Conservative,
    #[serde(other)]
    Neutral,
}

impl Default for JudgeProfile {
    fn default() -> Self {
        JudgeProfile::Neutral
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatorRequest {
    pub argument: String,
    #[serde(default)]
    pub case_type: String,
    #[serde(default)]
    pub judge_profile: JudgeProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatorResponse {
    pub judge_response: String,
    pub feedback: Vec<String>,
    pub improvement_suggestions: Vec<String>,
    pub score: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinPredictionRequest {
    #[serde(default)]
    pub case_details: String,
    #[serde(default)]
    pub case_type: String,
    #[serde(default)]
    pub judge_id: String,
    pub evidence_strength: f64,
    pub precedent_support: f64,
    #[serde(default)]
    pub uploaded_files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinFactors {
    pub risk_factors: Vec<String>,
    pub mitigation_strategies: Vec<String>,
    pub key_success_factors: Vec<String>,
    pub recommended_actions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Aadhaar,
    Pan,
    LandRecord,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrRequest {
    pub image_base64: String,
    pub document_type: DocumentType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrResponse {
    pub extracted_data: BTreeMap<String, String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Pending,
    Disposed,
    Adjourned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: String,
    pub case_number: String,
    pub title: String,
    pub stage: String,
    pub next_hearing_date: NaiveDate,
    pub judge_name: String,
    pub party_details: String,
    pub status: CaseStatus,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDraftRequest {
    pub case_id: String,
    pub draft_type: String,
    #[serde(default)]
    pub voice_input: Option<String>,
    #[serde(default)]
    pub manual_input: Option<String>,
    #[serde(default)]
    pub template_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraftContent {
    pub content: String,
    pub compliance_issues: Vec<String>,
    pub suggestions: Vec<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Responder: Send + Sync {
    async fn analyze_judge(&self, request: &AnalyzeJudgeRequest) -> Result<JudgeAnalysis>;

    async fn simulate_argument(&self, request: &SimulatorRequest) -> Result<SimulatorResponse>;

    async fn win_factors(&self, request: &WinPredictionRequest) -> Result<WinFactors>;

    async fn extract_document(&self, request: &OcrRequest) -> Result<OcrResponse>;

    async fn list_cases(&self, crn_number: &str) -> Result<Vec<Case>>;

    async fn draft(&self, request: &CreateDraftRequest, now: DateTime<Utc>) -> Result<DraftContent>;
}
