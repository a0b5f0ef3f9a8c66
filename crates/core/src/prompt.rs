//! Prompt construction for visit-note generation.
//!
//! [`VisitNoteRequest`] is the raw form submission. [`VisitContext::from_request`] validates it
//! once, and [`build_prompt`] renders the validated context into the fixed template whose
//! headings [`crate::parser::parse_response`] understands.

use crate::constants::{
    NOT_RECORDED_PLACEHOLDER, NO_COMPLAINT_PLACEHOLDER, UNSPECIFIED_PLACEHOLDER,
};
use crate::{NoteError, NoteResult};
use nursenote_types::{ClockTime, NurseNames, RequiredText, VisitDate, VisitWindow};
use serde::{Deserialize, Serialize};

/// Raw visit details as submitted by the visit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisitNoteRequest {
    pub patient_name: String,
    pub diagnosis: String,
    pub nurses: Vec<String>,
    /// `YYYY-MM-DD`
    pub visit_date: String,
    /// `HH:MM`
    pub start_time: String,
    /// `HH:MM`
    pub end_time: String,
    pub chief_complaint: String,
    pub s_text: String,
    pub o_text: String,
}

/// A validated visit, ready to be rendered into a prompt or stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitContext {
    patient_name: RequiredText,
    diagnosis: RequiredText,
    nurses: NurseNames,
    visit_date: VisitDate,
    window: VisitWindow,
    chief_complaint: String,
    s_text: String,
    o_text: String,
}

impl VisitContext {
    /// Validates a raw request.
    ///
    /// Free-text fields are trimmed. Messages for missing fields are in Japanese because they
    /// are shown to nurses as-is.
    ///
    /// # Errors
    ///
    /// - `NoteError::InvalidInput` if the patient name, diagnosis, visit date or either time is
    ///   missing, or if both S and O are empty.
    /// - `NoteError::Types` if the date or a time is present but malformed.
    pub fn from_request(request: VisitNoteRequest) -> NoteResult<Self> {
        let patient_name = RequiredText::new("patient_name", &request.patient_name)
            .map_err(|_| NoteError::InvalidInput("利用者名は必須です。".into()))?;
        let diagnosis = RequiredText::new("diagnosis", &request.diagnosis)
            .map_err(|_| NoteError::InvalidInput("主疾患は必須です。".into()))?;

        if request.visit_date.trim().is_empty() {
            return Err(NoteError::InvalidInput("訪問日は必須です。".into()));
        }
        if request.start_time.trim().is_empty() || request.end_time.trim().is_empty() {
            return Err(NoteError::InvalidInput(
                "訪問時間（開始・終了）は必須です。".into(),
            ));
        }

        let s_text = request.s_text.trim().to_owned();
        let o_text = request.o_text.trim().to_owned();
        if s_text.is_empty() && o_text.is_empty() {
            return Err(NoteError::InvalidInput(
                "SまたはOのいずれか一方は必須です。".into(),
            ));
        }

        let visit_date = VisitDate::parse(&request.visit_date)?;
        let window = VisitWindow::new(
            ClockTime::parse(&request.start_time)?,
            ClockTime::parse(&request.end_time)?,
        );

        Ok(Self {
            patient_name,
            diagnosis,
            nurses: request.nurses.iter().collect(),
            visit_date,
            window,
            chief_complaint: request.chief_complaint.trim().to_owned(),
            s_text,
            o_text,
        })
    }

    pub fn patient_name(&self) -> &str {
        self.patient_name.as_str()
    }

    pub fn diagnosis(&self) -> &str {
        self.diagnosis.as_str()
    }

    pub fn nurses(&self) -> &NurseNames {
        &self.nurses
    }

    pub fn visit_date(&self) -> VisitDate {
        self.visit_date
    }

    pub fn window(&self) -> VisitWindow {
        self.window
    }

    pub fn chief_complaint(&self) -> &str {
        &self.chief_complaint
    }

    pub fn s_text(&self) -> &str {
        &self.s_text
    }

    pub fn o_text(&self) -> &str {
        &self.o_text
    }
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() { placeholder } else { value }
}

/// Renders the generation prompt for a validated visit.
pub fn build_prompt(context: &VisitContext) -> String {
    let user_name = context.patient_name();
    let diagnosis = context.diagnosis();
    let nurses = context
        .nurses()
        .joined()
        .unwrap_or_else(|| UNSPECIFIED_PLACEHOLDER.to_owned());
    let visit_date = context.visit_date().format_ja();
    let visit_time = context.window().format_range();
    let chief_complaint = or_placeholder(context.chief_complaint(), NO_COMPLAINT_PLACEHOLDER);
    let s_text = or_placeholder(context.s_text(), NOT_RECORDED_PLACEHOLDER);
    let o_text = or_placeholder(context.o_text(), NOT_RECORDED_PLACEHOLDER);

    format!(
        "\
あなたは精神科訪問看護の記録支援に特化したAIアシスタントです。
以下の情報を基に、SOAP記録と訪問看護計画書を生成してください。

【入力情報】
利用者名：{user_name}
主疾患：{diagnosis}
担当看護師：{nurses}
訪問日：{visit_date}
訪問時間：{visit_time}
主訴：{chief_complaint}
S（主観）：{s_text}
O（客観）：{o_text}

────────────────────────
【出力要件】
以下の形式で必ず出力してください。
プレースホルダー（「出力待ち」「N/A」「特になし」など）は一切使用しないでください。
各セクション・サブセクションには必ず具体的な内容を含めてください。

────────────────────────
SOAP

S（主観）
{{ここにSの内容を記載。利用者本人の語り口で自然に記述し、複数行でも可}}

O（客観）
{{ここにOの内容を記載。看護師の観察語で客観的に記述し、複数行でも可}}

A（アセスメント）
【症状推移】
{{今日の状態と最近の経過を1〜3文でまとめる。S/Oに出てきた症状（気分、不安、睡眠、食欲、希死念慮、活動量、整容、生活状況など）を踏まえて具体的に記述。}}

【リスク評価（自殺・他害・服薬）】
{{S/Oに含まれるリスク要素（希死念慮、他害傾向、怠薬、生活リズムの乱れ等）を基に1〜3文で分析。リスクが低い場合も「現時点では高くないと考えられるが、〜には留意が必要である」など臨床的に自然な表現で記述。}}

【背景要因】
{{心理的・生活的背景、ストレス因子、環境要因（睡眠・人間関係・家族状況・生活リズム・活動性など）を1〜3文でまとめる。}}

【次回観察ポイント】
{{症状の変化、不安・睡眠・服薬・整容・活動量・生活リズム・対人関係・再燃兆候など、次回訪問で確認すべき点を1〜3文で記載する。}}

P（計画）
【本日実施した援助】
{{本日の訪問で実施した具体的援助（睡眠衛生指導、服薬確認、セルフケア支援、傾聴など）を2〜4文で記述する。}}

【次回以降の方針】
{{次回以降の援助・観察の方向性を2〜4文で具体的に記述する。}}

────────────────────────
訪問看護計画書
【看護計画書】

長期目標：
{{1文で利用者の安定した生活・症状管理に向けた長期目標を書く。}}

短期目標：
{{1〜2文で症状改善や生活リズム、睡眠、服薬管理などに関する短期目標を書く。}}

看護援助の方針：
{{3〜5文で、精神科訪問看護として行う援助（セルフケア支援、服薬支援、心理教育、再燃兆候の観察、生活リズム調整など）の方針を記述する。}}

────────────────────────
【訪問情報】
訪問日：{visit_date}
訪問時間：{visit_time}
担当看護師：{nurses}
主疾患：{diagnosis}

────────────────────────
【重要な注意事項】
- 精神科訪問看護に適した臨床的な日本語で記述すること
- 提供されたSとOの情報を基に記述し、事実を捏造しないこと
- 「〜の可能性」「〜と考えられる」など臨床的曖昧性を許容すること
- 診断名の追加や強い因果関係の断定は避けること
- 不安 → 睡眠 → 生活リズム → 服薬 の優先順位を必要に応じて反映すること
- すべてのセクションに必ず具体的な内容を含め、空欄や抽象的表現にしないこと
"
    )
}
