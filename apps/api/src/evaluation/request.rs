//! Evaluation Request Builder: combines criteria, document, language and the
//! current date into one outbound request.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::evaluation::criteria::NormalizedCriteria;
use crate::evaluation::document::EncodedDocument;
use crate::evaluation::prompts::{EVALUATION_PROMPT_TEMPLATE, EVALUATION_SYSTEM_TEMPLATE};

/// Language every textual field of the result must be written in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Hindi,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Hindi => "hindi",
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
        }
    }

    pub fn output_instruction(&self) -> String {
        format!(
            "Provide all text fields in {} language.",
            self.display_name()
        )
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "english" | "en" => Ok(Language::English),
            "hindi" | "hi" => Ok(Language::Hindi),
            other => Err(format!("unsupported language '{other}'")),
        }
    }
}

/// "Today" as seen by the evaluator, plus one worked duration example.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalContext {
    pub now: DateTime<Utc>,
    /// Elapsed months from `EXAMPLE_ANCHOR` to `now`, one decimal.
    pub example_months: String,
    /// Elapsed years from `EXAMPLE_ANCHOR` to `now`, one decimal.
    pub example_years: String,
}

/// Start of the worked "Aug 2023 - Present" example.
pub const EXAMPLE_ANCHOR: (i32, u32, u32) = (2023, 8, 1);

const SECONDS_PER_DAY: f64 = 86_400.0;

impl TemporalContext {
    pub fn at(now: DateTime<Utc>) -> Self {
        let (y, m, d) = EXAMPLE_ANCHOR;
        let anchor = NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| Utc.from_utc_datetime(&naive))
            .unwrap_or(now);
        let days = (now - anchor).num_seconds() as f64 / SECONDS_PER_DAY;

        Self {
            now,
            example_months: format!("{:.1}", days / 30.0),
            example_years: format!("{:.1}", days / 365.0),
        }
    }

    /// `M/YYYY`, e.g. `8/2024`.
    pub fn month_year(&self) -> String {
        format!("{}/{}", self.now.month(), self.now.year())
    }

    /// Long-form date, e.g. `August 1, 2024`.
    pub fn today(&self) -> String {
        self.now.format("%B %-d, %Y").to_string()
    }
}

/// One outbound evaluation. Built, submitted once, then dropped.
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    pub document: EncodedDocument,
    pub criteria_summary: String,
    pub target_language: Language,
    pub temporal_context: TemporalContext,
    /// Instruction block holding the temporal calibration and language rule.
    pub system_prompt: String,
    /// Criteria plus the exact JSON shape expected back.
    pub user_prompt: String,
}

pub fn build_request(
    criteria: &NormalizedCriteria,
    document: EncodedDocument,
    language: Language,
    now: DateTime<Utc>,
) -> EvaluationRequest {
    let temporal_context = TemporalContext::at(now);
    let criteria_summary = criteria.summary();
    let language_instruction = language.output_instruction();

    let system_prompt = EVALUATION_SYSTEM_TEMPLATE
        .replace("{current_month_year}", &temporal_context.month_year())
        .replace("{example_months}", &temporal_context.example_months)
        .replace("{example_years}", &temporal_context.example_years)
        .replace("{today}", &temporal_context.today())
        .replace("{language_instruction}", &language_instruction);

    // Criteria text is substituted last: placeholders inside it stay literal.
    let user_prompt = EVALUATION_PROMPT_TEMPLATE
        .replace("{language_instruction}", &language_instruction)
        .replace("{criteria_summary}", &criteria_summary);

    EvaluationRequest {
        document,
        criteria_summary,
        target_language: language,
        temporal_context,
        system_prompt,
        user_prompt,
    }
}
