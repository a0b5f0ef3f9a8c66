//! Constants used throughout the NurseNote core crate.
//!
//! Storage names, configuration defaults and the heading literals of the model output template
//! live here so the parser, the prompt builder and the store agree on them.

/// Default root directory for visit record storage when none is configured.
pub const DEFAULT_VISIT_DATA_DIR: &str = "visit_data";

/// Directory name, under the data root, holding the sharded visit records.
pub const RECORDS_DIR_NAME: &str = "records";

/// Filename of a stored visit record.
pub const VISIT_JSON_FILENAME: &str = "visit.json";

/// Default language model.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-mini";

/// Default API base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Enough for a full SOAP note plus care plan.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 3000;

/// Attempts per generation call, first try included.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Heading of the echoed visit-information block stripped before parsing.
pub const VISIT_INFO_HEADING: &str = "【訪問情報】";

/// Markdown heading that starts the care-plan half of the model output.
pub const CARE_PLAN_MARKDOWN_MARKER: &str = "### 訪問看護計画書";

/// Bracket heading that starts the care-plan half when no markdown heading is present.
pub const CARE_PLAN_BRACKET_MARKER: &str = "【看護計画書】";

/// Care-plan field labels, in the order the template emits them.
pub const CARE_PLAN_LABELS: [&str; 3] = ["長期目標", "短期目標", "看護援助の方針"];

/// Placeholder for an empty nurse list in the prompt.
pub const UNSPECIFIED_PLACEHOLDER: &str = "（未指定）";

/// Placeholder for an empty chief complaint in the prompt.
pub const NO_COMPLAINT_PLACEHOLDER: &str = "（特になし）";

/// Placeholder for empty S or O text in the prompt.
pub const NOT_RECORDED_PLACEHOLDER: &str = "（記載なし）";
