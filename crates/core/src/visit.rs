//! Stored visit records.

use crate::prompt::VisitContext;
use crate::records::{CarePlanDraft, ParsedResponse, SoapNote};
use chrono::{DateTime, Utc};
use nursenote_types::VisitDate;
use nursenote_uuid::RecordId;
use serde::{Deserialize, Serialize};

/// A visit that has been generated but not yet assigned an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVisitRecord {
    pub patient_name: String,
    pub diagnosis: String,
    pub nurses: Vec<String>,
    pub visit_date: VisitDate,
    pub start_time: String,
    pub end_time: String,
    pub chief_complaint: String,
    pub s_text: String,
    pub o_text: String,
    pub output: String,
    pub parsed: ParsedResponse,
}

impl NewVisitRecord {
    /// Pairs the validated visit input with what the model produced for it.
    pub fn new(context: &VisitContext, output: String, parsed: ParsedResponse) -> Self {
        Self {
            patient_name: context.patient_name().to_owned(),
            diagnosis: context.diagnosis().to_owned(),
            nurses: context.nurses().as_slice().to_vec(),
            visit_date: context.visit_date(),
            start_time: context.window().start().to_string(),
            end_time: context.window().end().to_string(),
            chief_complaint: context.chief_complaint().to_owned(),
            s_text: context.s_text().to_owned(),
            o_text: context.o_text().to_owned(),
            output,
            parsed,
        }
    }

    pub(crate) fn into_record(self, id: RecordId, created_at: DateTime<Utc>) -> VisitRecord {
        VisitRecord {
            id,
            patient_name: self.patient_name,
            diagnosis: self.diagnosis,
            nurses: self.nurses,
            visit_date: self.visit_date,
            start_time: self.start_time,
            end_time: self.end_time,
            chief_complaint: self.chief_complaint,
            s_text: self.s_text,
            o_text: self.o_text,
            output: self.output,
            soap_output: self.parsed.soap,
            plan_output: self.parsed.plan,
            created_at,
        }
    }
}

/// One persisted visit: the nurse's input, the raw model output and the parsed records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct VisitRecord {
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub id: RecordId,
    pub patient_name: String,
    pub diagnosis: String,
    #[serde(default)]
    pub nurses: Vec<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "2024-01-15"))]
    pub visit_date: VisitDate,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub chief_complaint: String,
    #[serde(default)]
    pub s_text: String,
    #[serde(default)]
    pub o_text: String,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub soap_output: SoapNote,
    #[serde(default)]
    pub plan_output: CarePlanDraft,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub created_at: DateTime<Utc>,
}

/// List view of a [`VisitRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct VisitRecordSummary {
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub id: RecordId,
    pub patient_name: String,
    pub diagnosis: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "2024-01-15"))]
    pub visit_date: VisitDate,
    pub start_time: String,
    pub end_time: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub created_at: DateTime<Utc>,
}

impl From<&VisitRecord> for VisitRecordSummary {
    fn from(record: &VisitRecord) -> Self {
        Self {
            id: record.id,
            patient_name: record.patient_name.clone(),
            diagnosis: record.diagnosis.clone(),
            visit_date: record.visit_date,
            start_time: record.start_time.clone(),
            end_time: record.end_time.clone(),
            created_at: record.created_at,
        }
    }
}
