//! Wire types for the NurseNote HTTP API.
//!
//! Parsed notes and stored records are served in the shape defined by `nursenote-core`; only the
//! envelopes live here.

use nursenote_core::{VisitNoteRequest, VisitRecordSummary};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use nursenote_core::{
    Assessment, CarePlanDraft, ParsedResponse, PlanOfCare, SoapNote, VisitRecord,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Raw model output to parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ParseReq {
    #[serde(default)]
    pub text: String,
}

/// Visit details as the visit form submits them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateReq {
    pub user_name: String,
    pub diagnosis: String,
    pub nurses: Vec<String>,
    /// `YYYY-MM-DD`
    #[schema(example = "2024-01-15")]
    pub visit_date: String,
    /// `HH:MM`
    #[schema(example = "14:00")]
    pub start_time: String,
    /// `HH:MM`
    #[schema(example = "15:00")]
    pub end_time: String,
    pub chief_complaint: String,
    pub s_text: String,
    pub o_text: String,
}

impl From<GenerateReq> for VisitNoteRequest {
    fn from(req: GenerateReq) -> Self {
        Self {
            patient_name: req.user_name,
            diagnosis: req.diagnosis,
            nurses: req.nurses,
            visit_date: req.visit_date,
            start_time: req.start_time,
            end_time: req.end_time,
            chief_complaint: req.chief_complaint,
            s_text: req.s_text,
            o_text: req.o_text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ListRecordsRes {
    pub records: Vec<VisitRecordSummary>,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_req_uses_form_keys() {
        let req: GenerateReq = serde_json::from_value(serde_json::json!({
            "userName": "山田 太郎",
            "diagnosis": "統合失調症",
            "nurses": ["山田", "佐藤"],
            "visitDate": "2024-01-15",
            "startTime": "14:00",
            "endTime": "15:00",
            "sText": "眠れない",
            "oText": "表情硬い"
        }))
        .unwrap();

        let visit = VisitNoteRequest::from(req);
        assert_eq!(visit.patient_name, "山田 太郎");
        assert_eq!(visit.nurses, ["山田", "佐藤"]);
        assert_eq!(visit.visit_date, "2024-01-15");
        assert_eq!(visit.chief_complaint, "");
        assert_eq!(visit.s_text, "眠れない");
        assert_eq!(visit.o_text, "表情硬い");
    }

    #[test]
    fn test_parse_req_defaults_text() {
        let req: ParseReq = serde_json::from_str("{}").unwrap();
        assert_eq!(req.text, "");
    }
}
