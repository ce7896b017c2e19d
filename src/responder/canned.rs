use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;

use super::{
    AnalyzeJudgeRequest, Case, CaseStatus, CreateDraftRequest, DocumentType, DraftContent,
    JudgeAnalysis, JudgeProfile, OcrRequest, OcrResponse, Responder, SimulatorRequest,
    SimulatorResponse, WinFactors, WinPredictionRequest,
};
use crate::error::AppError;
use crate::Result;

const OCR_CONFIDENCE: f64 = 0.95;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CannedResponder;

#[async_trait]
impl Responder for CannedResponder {
    async fn analyze_judge(&self, request: &AnalyzeJudgeRequest) -> Result<JudgeAnalysis> {
        Ok(JudgeAnalysis {
            judge_name: format!("Hon'ble Justice {}", request.judge_id),
            tendencies: strings(&[
                "Expects precise citations to binding precedent",
                "Strict about procedural compliance",
                "Reads documentary evidence closely",
            ]),
            successful_arguments: strings(&[
                "Procedural lapses by the opposing side",
                "Well-supported constitutional grounds",
                "Mitigating circumstances backed by records",
            ]),
            avoidance_points: strings(&[
                "Emotional appeals without legal basis",
                "Repeating points already on record",
                "Citing overruled judgments",
            ]),
            recent_orders: strings(&[
                format!("Decided a comparable {} matter last month", request.case_type).as_str(),
                "Dismissed applications filed without sufficient grounds",
            ]),
            suggested_strategy: format!(
                "Lead with precedent directly on point for this {} matter, keep submissions short and confirm every procedural step is documented.",
                request.case_type
            ),
        })
    }

    async fn simulate_argument(&self, request: &SimulatorRequest) -> Result<SimulatorResponse> {
        let (judge_response, score) = match request.judge_profile {
            JudgeProfile::Strict => (
                "Counsel, which statutory provision supports this? Cite the section and the precedent.",
                6.0,
            ),
            JudgeProfile::Liberal => (
                "The argument has merit. Address the wider constitutional implications as well.",
                8.0,
            ),
            JudgeProfile::Conservative => (
                "Noted, counsel. Show how this fits the settled interpretation of the law.",
                7.0,
            ),
            JudgeProfile::Neutral => (
                "Your submission is noted. Can you place specific case law on record in support?",
                7.5,
            ),
        };

        Ok(SimulatorResponse {
            judge_response: judge_response.to_string(),
            feedback: strings(&[
                "Clear opening",
                "Needs more specific citations",
                "Anticipate the counter-arguments",
            ]),
            improvement_suggestions: strings(&[
                "Cite Supreme Court judgments on point",
                "Prepare for procedural objections",
                "Tighten the structure of the submission",
            ]),
            score,
        })
    }

    async fn win_factors(&self, _request: &WinPredictionRequest) -> Result<WinFactors> {
        Ok(WinFactors {
            risk_factors: strings(&[
                "Witness testimony may not hold under cross-examination",
                "Delays in filing",
                "Limited precedent in this jurisdiction",
            ]),
            mitigation_strategies: strings(&[
                "Prepare witnesses thoroughly",
                "File supporting documents early",
                "Consider settlement talks",
            ]),
            key_success_factors: strings(&[
                "Strong documentary evidence",
                "Clear legal precedent",
            ]),
            recommended_actions: strings(&[
                "Gather additional evidence",
                "Prepare a comprehensive case brief",
                "Review recent similar judgments",
            ]),
        })
    }

    async fn extract_document(&self, request: &OcrRequest) -> Result<OcrResponse> {
        let fields: &[(&str, &str)] = match request.document_type {
            DocumentType::Aadhaar => &[
                ("name", "John Doe"),
                ("aadhaarNumber", "XXXX-XXXX-9012"),
                ("dateOfBirth", "01/01/1990"),
                ("gender", "Male"),
                ("address", "12 Station Road, Pune, Maharashtra - 411001"),
            ],
            DocumentType::Pan => &[
                ("name", "John Doe"),
                ("panNumber", "ABCDE1234F"),
                ("dateOfBirth", "01/01/1990"),
                ("fatherName", "Richard Doe"),
            ],
            DocumentType::LandRecord => &[
                ("surveyNumber", "123/1A"),
                ("khataNumber", "456"),
                ("landArea", "2.5"),
                ("landType", "Agricultural"),
                ("ownerName", "John Doe"),
                ("village", "Sample Village"),
                ("district", "Pune"),
                ("state", "Maharashtra"),
            ],
        };

        Ok(OcrResponse {
            extracted_data: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            confidence: OCR_CONFIDENCE,
        })
    }

    async fn list_cases(&self, crn_number: &str) -> Result<Vec<Case>> {
        let hearing = |y, m, d| {
            NaiveDate::from_ymd_opt(y, m, d)
                .ok_or_else(|| AppError::InternalError(format!("invalid hearing date {}-{}-{}", y, m, d)))
        };

        Ok(vec![
            Case {
                id: format!("{}-1", crn_number),
                case_number: "CRL.A. 123/2024".into(),
                title: "State vs. John Doe".into(),
                stage: "Arguments".into(),
                next_hearing_date: hearing(2024, 2, 15)?,
                judge_name: "Hon'ble Justice Smith".into(),
                party_details: "State of XYZ vs John Doe".into(),
                status: CaseStatus::Pending,
            },
            Case {
                id: format!("{}-2", crn_number),
                case_number: "CIV.A. 456/2024".into(),
                title: "ABC Corp vs. XYZ Ltd".into(),
                stage: "Evidence".into(),
                next_hearing_date: hearing(2024, 2, 20)?,
                judge_name: "Hon'ble Justice Johnson".into(),
                party_details: "ABC Corporation vs XYZ Limited".into(),
                status: CaseStatus::Adjourned,
            },
        ])
    }

    async fn draft(&self, request: &CreateDraftRequest, now: DateTime<Utc>) -> Result<DraftContent> {
        let facts = request
            .manual_input
            .as_deref()
            .or(request.voice_input.as_deref())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("[Facts to be filled]");
        let date = now.format("%d/%m/%Y");

        let content = match request.draft_type.as_str() {
            "application" => format!(
                "BEFORE THE HON'BLE COURT\n\nIN THE MATTER OF: {case}\n\nAPPLICATION UNDER SECTION ___\n\n\
                 MOST RESPECTFULLY SHOWETH:\n\n1. That the facts of the case are as follows:\n{facts}\n\n\
                 PRAYER:\nIt is prayed that this Hon'ble Court may be pleased to grant the relief sought.\n\n\
                 Date: {date}\n\nAdvocate for Applicant",
                case = request.case_id,
            ),
            "petition" => format!(
                "PETITION UNDER ARTICLE ___ OF THE CONSTITUTION\n\nIN THE MATTER OF: {case}\n\n\
                 MOST RESPECTFULLY SHOWETH:\n\n1. {facts}\n\n\
                 PRAYER:\nIt is prayed that this Hon'ble Court may issue an appropriate writ, order or direction.\n\n\
                 Date: {date}\n\nPetitioner",
                case = request.case_id,
            ),
            _ => format!(
                "LEGAL DOCUMENT\n\nIN THE MATTER OF: {case}\n\n{facts}\n\nDate: {date}\n\nAdvocate",
                case = request.case_id,
            ),
        };

        Ok(DraftContent {
            content,
            compliance_issues: strings(&[
                "Section references are missing",
                "Verification clause is missing",
            ]),
            suggestions: strings(&[
                "Add relevant case law citations",
                "Include specific dates and amounts",
                "Check the court's formatting rules",
            ]),
        })
    }
}
