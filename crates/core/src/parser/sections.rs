//! Heading pattern table for the response parser.
//!
//! Each field owns a [`PatternChain`]: an ordered list of heading/boundary pairs, most specific
//! first. Supporting a new heading variant means adding a row to the relevant table.
//!
//! The regex engine has no lookaround, so a row is split in two: the `heading` regex consumes the
//! heading line (and the newlines after it), and the `boundary` regex locates where the body
//! stops. The body never includes the boundary match itself.

use crate::constants::CARE_PLAN_LABELS;
use regex::Regex;
use std::sync::LazyLock;

/// Body terminator used inside the assessment block: the next bracket sub-heading, bold or not.
const SUBSECTION_END: &str = r"\n\s*(?:\*\*)?【";

/// Care-plan markers. The body of a plan-of-care field never runs past them.
const CARE_PLAN_START: &str = r"\n\s*###\s*訪問看護計画書|\n\s*【看護計画書】";

/// Horizontal rules, markdown (`---`) or box-drawing (`───`).
const RULE_LINE: &str = r"\n\s*(?:---|─{3,})";

const SUBJECTIVE_ROWS: &[(&str, &str)] = &[
    (
        r"(?i)\*\*S[（(]主観[）)]\*\*\s*\n+",
        r"(?i)\n\s*\*\*O[（(]客観[）)]\*\*",
    ),
    (r"(?i)S[（(]主観[）)]\s*[:：]?\s*\n+", r"(?i)\n\s*O[（(]客観[）)]"),
];

const OBJECTIVE_ROWS: &[(&str, &str)] = &[
    (
        r"(?i)\*\*O[（(]客観[）)]\*\*\s*\n+",
        r"(?i)\n\s*\*\*A[（(]アセスメント[）)]\*\*",
    ),
    (
        r"(?i)O[（(]客観[）)]\s*[:：]?\s*\n+",
        r"(?i)\n\s*A[（(]アセスメント[）)]",
    ),
];

const ASSESSMENT_ROWS: &[(&str, &str)] = &[
    (
        r"(?i)\*\*A[（(]アセスメント[）)]\*\*\s*\n+",
        r"(?i)\n\s*###\s*P[（(]計画[）)]|\n\s*\*\*P[（(]計画[）)]\*\*",
    ),
    (
        r"(?i)A[（(]アセスメント[）)]\s*[:：]?\s*\n+",
        r"(?i)\n\s*P[（(]計画[）)]",
    ),
];

const SYMPTOM_PROGRESSION_ROWS: &[(&str, &str)] = &[
    (r"\*\*【症状推移】\*\*\s*\n+", SUBSECTION_END),
    (r"【症状推移】\s*\n+", SUBSECTION_END),
];

// The template writes 【リスク評価（自殺・他害・服薬）】 but the parenthetical is not always kept.
const RISK_ASSESSMENT_ROWS: &[(&str, &str)] = &[
    (
        r"\*\*【リスク評価(?:[（(][^）)\n]*[）)])?】\*\*\s*\n+",
        SUBSECTION_END,
    ),
    (
        r"【リスク評価(?:[（(][^）)\n]*[）)])?】\s*\n+",
        SUBSECTION_END,
    ),
];

const BACKGROUND_FACTORS_ROWS: &[(&str, &str)] = &[
    (r"\*\*【背景要因】\*\*\s*\n+", SUBSECTION_END),
    (r"【背景要因】\s*\n+", SUBSECTION_END),
];

const NEXT_OBSERVATION_POINTS_ROWS: &[(&str, &str)] = &[
    (r"\*\*【次回観察ポイント】\*\*\s*\n+", SUBSECTION_END),
    (r"【次回観察ポイント】\s*\n+", SUBSECTION_END),
];

/// Heading rows of the plan-of-care block. Boundaries are filled in at compile time.
const PLAN_OF_CARE_HEADINGS: &[&str] = &[
    r"(?i)###\s*P[（(]計画[）)]\s*\n+",
    r"(?i)\*\*P[（(]計画[）)]\*\*\s*\n+",
    r"(?i)P[（(]計画[）)]\s*[:：]?\s*\n+",
];

pub(crate) static SUBJECTIVE: LazyLock<PatternChain> =
    LazyLock::new(|| PatternChain::from_rows(SUBJECTIVE_ROWS));

pub(crate) static OBJECTIVE: LazyLock<PatternChain> =
    LazyLock::new(|| PatternChain::from_rows(OBJECTIVE_ROWS));

pub(crate) static ASSESSMENT: LazyLock<PatternChain> =
    LazyLock::new(|| PatternChain::from_rows(ASSESSMENT_ROWS));

pub(crate) static SYMPTOM_PROGRESSION: LazyLock<PatternChain> =
    LazyLock::new(|| PatternChain::from_rows(SYMPTOM_PROGRESSION_ROWS));

pub(crate) static RISK_ASSESSMENT: LazyLock<PatternChain> =
    LazyLock::new(|| PatternChain::from_rows(RISK_ASSESSMENT_ROWS));

pub(crate) static BACKGROUND_FACTORS: LazyLock<PatternChain> =
    LazyLock::new(|| PatternChain::from_rows(BACKGROUND_FACTORS_ROWS));

pub(crate) static NEXT_OBSERVATION_POINTS: LazyLock<PatternChain> =
    LazyLock::new(|| PatternChain::from_rows(NEXT_OBSERVATION_POINTS_ROWS));

pub(crate) static PLAN_OF_CARE: LazyLock<PatternChain> = LazyLock::new(|| {
    // The plain heading has no markdown to anchor on, so it also stops at a bare
    // 訪問看護計画書 title line.
    let plain_end = format!(r"\n\s*訪問看護計画書|{CARE_PLAN_START}");
    PatternChain::new(vec![
        SectionPattern::compile(PLAN_OF_CARE_HEADINGS[0], CARE_PLAN_START),
        SectionPattern::compile(PLAN_OF_CARE_HEADINGS[1], CARE_PLAN_START),
        SectionPattern::compile(PLAN_OF_CARE_HEADINGS[2], &plain_end),
    ])
});

pub(crate) static TODAY_INTERVENTIONS: LazyLock<PatternChain> = LazyLock::new(|| {
    let end = format!(r"\n\s*(?:\*\*)?【次回以降の方針】|{RULE_LINE}|{CARE_PLAN_START}");
    PatternChain::new(vec![
        SectionPattern::compile(r"\*\*【本日実施した援助】\*\*\s*\n+", &end),
        SectionPattern::compile(r"【本日実施した援助】\s*\n+", &end),
    ])
});

pub(crate) static FUTURE_POLICY: LazyLock<PatternChain> = LazyLock::new(|| {
    let end = format!("{RULE_LINE}|{CARE_PLAN_START}");
    PatternChain::new(vec![
        SectionPattern::compile(r"\*\*【次回以降の方針】\*\*\s*\n+", &end),
        SectionPattern::compile(r"【次回以降の方針】\s*\n+", &end),
    ])
});

/// One chain per care-plan label, in [`CARE_PLAN_LABELS`] order.
///
/// Each field is bounded by the heading of the field after it, written in the same style; the
/// last field runs to the next bracket heading or the end of the text.
pub(crate) static CARE_PLAN_FIELDS: LazyLock<Vec<PatternChain>> = LazyLock::new(|| {
    CARE_PLAN_LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let label = regex::escape(label);
            let next = CARE_PLAN_LABELS.get(i + 1).map(|next| regex::escape(next));
            let (bold_end, plain_end) = match next {
                Some(next) => (
                    format!(r"\n\s*\*\*{next}[:：]\*\*"),
                    format!(r"\n\s*{next}[:：]"),
                ),
                None => (r"\n\s*【".to_string(), r"\n\s*【".to_string()),
            };
            PatternChain::new(vec![
                SectionPattern::compile(&format!(r"\*\*{label}[:：]\*\*\s*\n+"), &bold_end),
                SectionPattern::compile(&format!(r"{label}[:：]\s*\n+"), &plain_end),
            ])
        })
        .collect()
});

/// Where an echoed visit-information block stops: the next line that looks like a heading.
pub(crate) static VISIT_INFO_END: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\n\s*(?:【|#|\*\*|[SOAP][（(]|-{3,}|─{3,}|訪問看護計画書)")
});

/// Horizontal-rule lines left dangling at the end of a captured value.
pub(crate) static TRAILING_RULE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\n\s*(?:-{3,}|─{3,})\s*\z"));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("section patterns are compiled-in literals")
}

/// One way a heading can appear, and where the body that follows it stops.
pub(crate) struct SectionPattern {
    heading: Regex,
    boundary: Regex,
}

impl SectionPattern {
    fn compile(heading: &str, boundary: &str) -> Self {
        Self {
            heading: compile(heading),
            boundary: compile(boundary),
        }
    }

    /// Returns the raw body after the first heading match that has at least one character of
    /// body, or `None` when the heading never appears.
    ///
    /// The body ends at the first boundary match found at least one character past its start,
    /// or at the end of `text`.
    pub(crate) fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        let mut from = 0;
        while let Some(heading) = self.heading.find_at(text, from) {
            let start = heading.end();
            if let Some(first) = text[start..].chars().next() {
                let probe = start + first.len_utf8();
                let end = self
                    .boundary
                    .find_at(text, probe)
                    .map_or(text.len(), |m| m.start());
                return Some(&text[start..end]);
            }
            // Heading sits at the very end of the text; look for a later one.
            let step = text[heading.start()..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);
            from = heading.start() + step;
        }
        None
    }
}

/// Ordered alternatives for one field; the first pattern whose heading matches wins.
pub(crate) struct PatternChain(Vec<SectionPattern>);

impl PatternChain {
    fn new(patterns: Vec<SectionPattern>) -> Self {
        Self(patterns)
    }

    fn from_rows(rows: &[(&str, &str)]) -> Self {
        Self(
            rows.iter()
                .map(|(heading, boundary)| SectionPattern::compile(heading, boundary))
                .collect(),
        )
    }

    pub(crate) fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.0.iter().find_map(|pattern| pattern.capture(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_table_compiles() {
        let chains: [&LazyLock<PatternChain>; 10] = [
            &SUBJECTIVE,
            &OBJECTIVE,
            &ASSESSMENT,
            &SYMPTOM_PROGRESSION,
            &RISK_ASSESSMENT,
            &BACKGROUND_FACTORS,
            &NEXT_OBSERVATION_POINTS,
            &PLAN_OF_CARE,
            &TODAY_INTERVENTIONS,
            &FUTURE_POLICY,
        ];
        for chain in chains {
            assert!(!chain.0.is_empty());
        }
        assert_eq!(CARE_PLAN_FIELDS.len(), CARE_PLAN_LABELS.len());
        assert!(VISIT_INFO_END.is_match("\n【次】"));
        assert!(TRAILING_RULE.is_match("本文\n---"));
    }

    #[test]
    fn test_capture_stops_at_boundary() {
        let pattern = SectionPattern::compile(r"【A】\s*\n+", r"\n\s*【");
        assert_eq!(pattern.capture("【A】\n一行目\n二行目\n【B】\n別"), Some("一行目\n二行目"));
    }

    #[test]
    fn test_capture_runs_to_end_without_boundary() {
        let pattern = SectionPattern::compile(r"【A】\s*\n+", r"\n\s*【");
        assert_eq!(pattern.capture("前置き\n【A】\n\n本文"), Some("本文"));
    }

    #[test]
    fn test_capture_requires_body_after_heading() {
        let pattern = SectionPattern::compile(r"【A】\s*\n+", r"\n\s*【");
        assert_eq!(pattern.capture("本文\n【A】\n"), None);
        assert_eq!(pattern.capture("本文のみ"), None);
    }

    #[test]
    fn test_capture_boundary_is_searched_past_first_body_char() {
        // A body that starts with what looks like the boundary still gets one character.
        let pattern = SectionPattern::compile(r"X\n", r"\n");
        assert_eq!(pattern.capture("X\n\nrest\nmore"), Some("\nrest"));
    }

    #[test]
    fn test_chain_prefers_earlier_rows() {
        let chain = PatternChain::from_rows(&[
            (r"\*\*H\*\*\n", r"\n\s*\*\*"),
            (r"H\n", r"\n\s*END"),
        ]);
        assert_eq!(chain.capture("**H**\nbold\n**next"), Some("bold"));
        assert_eq!(chain.capture("H\nplain\nEND"), Some("plain"));
    }

    #[test]
    fn test_risk_heading_parenthetical_is_optional() {
        let text = "【リスク評価】\n低い";
        assert_eq!(RISK_ASSESSMENT.capture(text), Some("低い"));
        let text = "【リスク評価(自殺・他害)】\n低い";
        assert_eq!(RISK_ASSESSMENT.capture(text), Some("低い"));
    }
}
