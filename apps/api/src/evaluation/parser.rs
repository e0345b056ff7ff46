//! Result Parser: turns the evaluator's free-form answer into a `ResumeAnalysisResult`.
//!
//! Two tiers: a strict decode of the JSON object (fenced or bare), and, when that
//! fails for any reason, a fallback result whose summary is the untouched raw text.
//! `parse` therefore never fails.

use thiserror::Error;
use tracing::warn;

use crate::evaluation::request::Language;
use crate::evaluation::result::ResumeAnalysisResult;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Why strict decoding failed. Internal only: it is logged, never surfaced.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed or mistyped JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("value out of range: {0}")]
    OutOfRange(String),
}

/// How a result was produced.
#[derive(Debug)]
pub enum ParseOutcome {
    Parsed(ResumeAnalysisResult),
    Fallback {
        result: ResumeAnalysisResult,
        reason: DecodeError,
    },
}

impl ParseOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ParseOutcome::Fallback { .. })
    }

    pub fn into_result(self) -> ResumeAnalysisResult {
        match self {
            ParseOutcome::Parsed(result) => result,
            ParseOutcome::Fallback { result, .. } => result,
        }
    }
}

/// Parses `raw_text`, falling back to a degraded result that keeps the text.
pub fn parse(raw_text: &str, language: Language) -> ParseOutcome {
    match decode(raw_text) {
        Ok(result) => ParseOutcome::Parsed(result),
        Err(reason) => {
            warn!(
                "Evaluator answer to {language} request is not analysis JSON ({} bytes), using fallback: {reason}",
                raw_text.len()
            );
            ParseOutcome::Fallback {
                result: ResumeAnalysisResult::fallback(raw_text),
                reason,
            }
        }
    }
}

/// Strict decode: schema via serde, ranges via `check_ranges`.
pub fn decode(raw_text: &str) -> Result<ResumeAnalysisResult, DecodeError> {
    let json = extract_json(raw_text);
    let result: ResumeAnalysisResult = serde_json::from_str(json)?;
    result.check_ranges().map_err(DecodeError::OutOfRange)?;
    Ok(result)
}

/// Locates the JSON payload inside an evaluator answer.
///
/// A ```json fence anywhere in the text wins, even when surrounded by prose.
/// Otherwise a text that is itself wrapped in a bare ``` fence is unwrapped.
/// Otherwise the whole (trimmed) text is returned.
fn extract_json(text: &str) -> &str {
    if let Some(start) = text.find(JSON_FENCE) {
        let body = &text[start + JSON_FENCE.len()..];
        return match body.find(FENCE) {
            Some(end) => body[..end].trim(),
            None => body.trim(),
        };
    }

    let trimmed = text.trim();
    trimmed
        .strip_prefix(FENCE)
        .and_then(|s| s.strip_suffix(FENCE))
        .map(str::trim)
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::result::{EducationAnalysis, ExperienceAnalysis, KeywordMatch, TechStackMatch};

    const SCENARIO_JSON: &str = r#"{"overallScore":82,"keywordMatches":[{"keyword":"python","found":true}],"experienceAnalysis":{"years":"3","relevance":"high","score":80},"techStackAnalysis":[{"tech":"docker","found":true}],"educationAnalysis":{"degreeFound":true,"relevance":"match","score":90},"strengths":["strong backend"],"weaknesses":[],"improvementSuggestions":["add cloud cert"],"summaryFeedback":"Good fit."}"#;

    fn scenario_result() -> ResumeAnalysisResult {
        ResumeAnalysisResult {
            overall_score: 82,
            keyword_matches: vec![KeywordMatch {
                keyword: "python".to_string(),
                found: true,
                context: None,
            }],
            experience_analysis: ExperienceAnalysis {
                years: "3".to_string(),
                relevance: "high".to_string(),
                score: 80,
            },
            tech_stack_analysis: vec![TechStackMatch {
                tech: "docker".to_string(),
                found: true,
                expertise: None,
            }],
            education_analysis: EducationAnalysis {
                degree_found: true,
                relevance: "match".to_string(),
                score: 90,
            },
            strengths: vec!["strong backend".to_string()],
            weaknesses: vec![],
            improvement_suggestions: vec!["add cloud cert".to_string()],
            summary_feedback: "Good fit.".to_string(),
        }
    }

    fn with_overall_score(score: i64) -> String {
        SCENARIO_JSON.replace("\"overallScore\":82", &format!("\"overallScore\":{score}"))
    }

    #[test]
    fn test_bare_json_parses() {
        let outcome = parse(SCENARIO_JSON, Language::English);
        assert!(!outcome.is_fallback());
        assert_eq!(outcome.into_result(), scenario_result());
    }

    #[test]
    fn test_fenced_json_inside_prose_parses() {
        let text = format!(
            "Here is the analysis you asked for:\n```json\n{SCENARIO_JSON}\n```\nLet me know if you need more."
        );
        assert_eq!(parse(&text, Language::English).into_result(), scenario_result());
    }

    #[test]
    fn test_bare_fence_wrapping_whole_answer_parses() {
        let text = format!("```\n{SCENARIO_JSON}\n```");
        assert_eq!(parse(&text, Language::English).into_result(), scenario_result());
    }

    #[test]
    fn test_optional_fields_are_kept() {
        let json = SCENARIO_JSON.replace(
            r#"{"keyword":"python","found":true}"#,
            r#"{"keyword":"python","found":true,"context":"5 years of Django"}"#,
        );
        let result = parse(&json, Language::English).into_result();
        assert_eq!(
            result.keyword_matches[0].context.as_deref(),
            Some("5 years of Django")
        );
    }

    #[test]
    fn test_prose_falls_back_with_raw_text() {
        let text = "I couldn't process this as JSON, sorry.";
        let outcome = parse(text, Language::English);
        assert!(outcome.is_fallback());
        let result = outcome.into_result();
        assert_eq!(result.overall_score, 0);
        assert_eq!(result.summary_feedback, text);
        assert!(result.keyword_matches.is_empty());
    }

    #[test]
    fn test_fallback_keeps_the_entire_original_text_not_the_fence_body() {
        let text = "Partial answer:\n```json\n{\"overallScore\": 50\n```";
        let result = parse(text, Language::Hindi).into_result();
        assert_eq!(result.summary_feedback, text);
    }

    #[test]
    fn test_missing_required_field_falls_back() {
        let json = SCENARIO_JSON.replace(r#","summaryFeedback":"Good fit.""#, "");
        let outcome = parse(&json, Language::English);
        assert!(matches!(
            outcome,
            ParseOutcome::Fallback {
                reason: DecodeError::Json(_),
                ..
            }
        ));
    }

    #[test]
    fn test_wrong_type_falls_back() {
        let json = SCENARIO_JSON.replace(r#""strengths":["strong backend"]"#, r#""strengths":"strong backend""#);
        assert!(parse(&json, Language::English).is_fallback());
    }

    #[test]
    fn test_score_boundaries() {
        assert_eq!(decode(&with_overall_score(0)).unwrap().overall_score, 0);
        assert_eq!(decode(&with_overall_score(100)).unwrap().overall_score, 100);
        assert!(parse(&with_overall_score(-1), Language::English).is_fallback());
        assert!(matches!(
            decode(&with_overall_score(101)),
            Err(DecodeError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_nested_score_out_of_range_falls_back() {
        let json = SCENARIO_JSON.replace(r#""score":90"#, r#""score":120"#);
        assert!(parse(&json, Language::English).is_fallback());
    }

    #[test]
    fn test_fallback_is_deterministic() {
        let text = "not json at all {";
        let first = parse(text, Language::English).into_result();
        let second = parse(text, Language::English).into_result();
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn test_empty_text_falls_back() {
        let result = parse("", Language::English).into_result();
        assert_eq!(result.summary_feedback, "");
        assert_eq!(result.overall_score, 0);
    }
}
