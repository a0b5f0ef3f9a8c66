//! Structured records carved out of a model response.
//!
//! Every field is a plain `String` defaulting to `""`. A field that could not be extracted is
//! empty, never absent, so consumers such as form renderers can index into these records
//! unconditionally.
//!
//! Deserialisation is lenient in the same way: missing keys become `""`. The key layout written
//! by the earlier backend (`s`/`o`/`a`/`p` and Japanese sub-keys) is accepted through aliases.

use serde::{Deserialize, Serialize};

/// SOAP note for one visit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default)]
pub struct SoapNote {
    #[serde(alias = "s")]
    pub subjective: String,
    #[serde(alias = "o")]
    pub objective: String,
    #[serde(alias = "a")]
    pub assessment: Assessment,
    #[serde(alias = "p")]
    pub plan_of_care: PlanOfCare,
}

/// The four fixed sub-fields of the "A" section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default)]
pub struct Assessment {
    #[serde(alias = "症状推移")]
    pub symptom_progression: String,
    #[serde(alias = "リスク評価")]
    pub risk_assessment: String,
    #[serde(alias = "背景要因")]
    pub background_factors: String,
    #[serde(alias = "次回観察ポイント")]
    pub next_observation_points: String,
}

/// The two fixed sub-fields of the "P" section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default)]
pub struct PlanOfCare {
    #[serde(alias = "本日実施した援助")]
    pub today_interventions: String,
    #[serde(alias = "次回以降の方針")]
    pub future_policy: String,
}

/// Draft of the nursing-care plan document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default)]
pub struct CarePlanDraft {
    #[serde(alias = "長期目標")]
    pub long_term_goal: String,
    #[serde(alias = "短期目標")]
    pub short_term_goal: String,
    #[serde(alias = "看護援助の方針")]
    pub nursing_policy: String,
}

/// Both records produced from one model response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default)]
pub struct ParsedResponse {
    pub soap: SoapNote,
    pub plan: CarePlanDraft,
}

impl ParsedResponse {
    /// Every leaf field with its dotted name, in document order.
    pub fn fields(&self) -> [(&'static str, &str); 11] {
        let soap = &self.soap;
        let plan = &self.plan;
        [
            ("soap.subjective", soap.subjective.as_str()),
            ("soap.objective", soap.objective.as_str()),
            (
                "soap.assessment.symptom_progression",
                soap.assessment.symptom_progression.as_str(),
            ),
            (
                "soap.assessment.risk_assessment",
                soap.assessment.risk_assessment.as_str(),
            ),
            (
                "soap.assessment.background_factors",
                soap.assessment.background_factors.as_str(),
            ),
            (
                "soap.assessment.next_observation_points",
                soap.assessment.next_observation_points.as_str(),
            ),
            (
                "soap.plan_of_care.today_interventions",
                soap.plan_of_care.today_interventions.as_str(),
            ),
            (
                "soap.plan_of_care.future_policy",
                soap.plan_of_care.future_policy.as_str(),
            ),
            ("plan.long_term_goal", plan.long_term_goal.as_str()),
            ("plan.short_term_goal", plan.short_term_goal.as_str()),
            ("plan.nursing_policy", plan.nursing_policy.as_str()),
        ]
    }

    /// Dotted names of the leaf fields that came out empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.fields()
            .into_iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_serialises_every_key_as_empty_string() {
        let value = serde_json::to_value(ParsedResponse::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "soap": {
                    "subjective": "",
                    "objective": "",
                    "assessment": {
                        "symptom_progression": "",
                        "risk_assessment": "",
                        "background_factors": "",
                        "next_observation_points": ""
                    },
                    "plan_of_care": {
                        "today_interventions": "",
                        "future_policy": ""
                    }
                },
                "plan": {
                    "long_term_goal": "",
                    "short_term_goal": "",
                    "nursing_policy": ""
                }
            })
        );
    }

    #[test]
    fn test_deserialise_fills_missing_keys() {
        let note: SoapNote = serde_json::from_value(json!({ "subjective": "眠れない" })).unwrap();
        assert_eq!(note.subjective, "眠れない");
        assert_eq!(note.objective, "");
        assert_eq!(note.assessment, Assessment::default());
    }

    #[test]
    fn test_deserialise_accepts_legacy_layout() {
        let note: SoapNote = serde_json::from_value(json!({
            "s": "不安が強い",
            "o": "表情硬い",
            "a": { "症状推移": "横ばい", "リスク評価": "低い" },
            "p": { "本日実施した援助": "傾聴", "次回以降の方針": "継続観察" }
        }))
        .unwrap();
        assert_eq!(note.subjective, "不安が強い");
        assert_eq!(note.objective, "表情硬い");
        assert_eq!(note.assessment.symptom_progression, "横ばい");
        assert_eq!(note.assessment.risk_assessment, "低い");
        assert_eq!(note.assessment.background_factors, "");
        assert_eq!(note.plan_of_care.today_interventions, "傾聴");
        assert_eq!(note.plan_of_care.future_policy, "継続観察");

        let plan: CarePlanDraft = serde_json::from_value(json!({
            "長期目標": "地域で安定して生活できる",
            "短期目標": "睡眠リズムが整う"
        }))
        .unwrap();
        assert_eq!(plan.long_term_goal, "地域で安定して生活できる");
        assert_eq!(plan.short_term_goal, "睡眠リズムが整う");
        assert_eq!(plan.nursing_policy, "");
    }

    #[test]
    fn test_missing_fields_lists_empty_leaves() {
        let mut parsed = ParsedResponse::default();
        assert_eq!(parsed.missing_fields().len(), 11);

        parsed.soap.subjective = "x".into();
        parsed.plan.nursing_policy = "y".into();
        let missing = parsed.missing_fields();
        assert_eq!(missing.len(), 9);
        assert!(!missing.contains(&"soap.subjective"));
        assert!(!missing.contains(&"plan.nursing_policy"));
        assert!(missing.contains(&"soap.assessment.risk_assessment"));
    }
}
