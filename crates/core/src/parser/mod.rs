//! Parser for model-generated visit notes.
//!
//! The model is asked for a fixed template, but what comes back drifts: headings arrive bold or
//! plain, with full-width or ASCII parentheses, with or without a trailing colon, and the visit
//! information block from the prompt is sometimes echoed back verbatim. [`parse_response`]
//! tolerates all of that and never fails; anything it cannot locate comes back as `""`.
//!
//! Parsing runs in four steps:
//!
//! 1. normalise line endings, trim, and remove every `【訪問情報】` block;
//! 2. split the text into a SOAP half and a care-plan half at the first care-plan marker;
//! 3. extract each field by trying the heading variants in [`sections`] in order;
//! 4. trim each value and drop horizontal-rule lines left at its end.

mod sections;

use crate::constants::{CARE_PLAN_BRACKET_MARKER, CARE_PLAN_MARKDOWN_MARKER, VISIT_INFO_HEADING};
use crate::records::{Assessment, CarePlanDraft, ParsedResponse, PlanOfCare, SoapNote};
use sections::PatternChain;

/// Parse a model response into a SOAP note and a care-plan draft.
///
/// Total over all inputs: every string, including empty and whitespace-only strings, yields a
/// fully populated [`ParsedResponse`]. The function is pure.
pub fn parse_response(text: &str) -> ParsedResponse {
    if text.trim().is_empty() {
        return ParsedResponse::default();
    }

    let cleaned = pre_clean(text);
    let (soap_text, plan_text) = split_sections(&cleaned);

    ParsedResponse {
        soap: parse_soap(soap_text),
        plan: parse_care_plan(plan_text),
    }
}

fn pre_clean(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    strip_visit_info(normalized.trim()).trim().to_string()
}

/// Removes every visit-information block.
///
/// A block runs from its heading to the next heading-like line (kept) or the end of the text.
/// Only line starts count, so heading-like text inside the block's own lines is removed with it.
fn strip_visit_info(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(VISIT_INFO_HEADING) {
        out.push_str(&rest[..start]);
        let body_start = start + VISIT_INFO_HEADING.len();
        let end = sections::VISIT_INFO_END
            .find_at(rest, body_start)
            .map_or(rest.len(), |m| m.start());
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}

/// Splits at the first markdown care-plan marker, else the first bracket marker.
///
/// The marker itself belongs to neither half. Without a marker the care-plan half is empty.
fn split_sections(text: &str) -> (&str, &str) {
    for marker in [CARE_PLAN_MARKDOWN_MARKER, CARE_PLAN_BRACKET_MARKER] {
        if let Some(index) = text.find(marker) {
            return (text[..index].trim(), text[index + marker.len()..].trim());
        }
    }
    (text, "")
}

fn parse_soap(text: &str) -> SoapNote {
    let assessment = sections::ASSESSMENT.capture(text).unwrap_or_default();
    let plan_of_care = sections::PLAN_OF_CARE.capture(text).unwrap_or_default();

    SoapNote {
        subjective: extract(&sections::SUBJECTIVE, text),
        objective: extract(&sections::OBJECTIVE, text),
        assessment: Assessment {
            symptom_progression: extract(&sections::SYMPTOM_PROGRESSION, assessment),
            risk_assessment: extract(&sections::RISK_ASSESSMENT, assessment),
            background_factors: extract(&sections::BACKGROUND_FACTORS, assessment),
            next_observation_points: extract(&sections::NEXT_OBSERVATION_POINTS, assessment),
        },
        plan_of_care: PlanOfCare {
            today_interventions: extract(&sections::TODAY_INTERVENTIONS, plan_of_care),
            future_policy: extract(&sections::FUTURE_POLICY, plan_of_care),
        },
    }
}

fn parse_care_plan(text: &str) -> CarePlanDraft {
    let mut values = sections::CARE_PLAN_FIELDS
        .iter()
        .map(|chain| extract(chain, text));

    CarePlanDraft {
        long_term_goal: values.next().unwrap_or_default(),
        short_term_goal: values.next().unwrap_or_default(),
        nursing_policy: values.next().unwrap_or_default(),
    }
}

fn extract(chain: &PatternChain, text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    chain.capture(text).map(clean_value).unwrap_or_default()
}

fn clean_value(value: &str) -> String {
    let mut value = value.trim();
    while let Some(rule) = sections::TRAILING_RULE.find(value) {
        value = value[..rule.start()].trim_end();
    }
    value.to_string()
}
