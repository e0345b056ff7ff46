//! The structured analysis returned to callers, with its schema checks and
//! the degraded fallback used when the evaluator's answer cannot be decoded.

use serde::{Deserialize, Serialize};

/// Upper bound for every score field. Scores are unsigned, so zero is the lower bound.
pub const MAX_SCORE: u8 = 100;

const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordMatch {
    pub keyword: String,
    pub found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceAnalysis {
    pub years: String,
    pub relevance: String,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechStackMatch {
    pub tech: String,
    pub found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expertise: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationAnalysis {
    pub degree_found: bool,
    pub relevance: String,
    pub score: u8,
}

/// Full evaluation of one resume against one set of criteria.
/// Every field is required when decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeAnalysisResult {
    pub overall_score: u8,
    pub keyword_matches: Vec<KeywordMatch>,
    pub experience_analysis: ExperienceAnalysis,
    pub tech_stack_analysis: Vec<TechStackMatch>,
    pub education_analysis: EducationAnalysis,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub improvement_suggestions: Vec<String>,
    pub summary_feedback: String,
}

impl ResumeAnalysisResult {
    /// Degraded result carrying the evaluator's raw answer as the summary.
    pub fn fallback(raw_text: &str) -> Self {
        Self {
            overall_score: 0,
            keyword_matches: vec![],
            experience_analysis: ExperienceAnalysis {
                years: UNKNOWN.to_string(),
                relevance: UNKNOWN.to_string(),
                score: 0,
            },
            tech_stack_analysis: vec![],
            education_analysis: EducationAnalysis {
                degree_found: false,
                relevance: UNKNOWN.to_string(),
                score: 0,
            },
            strengths: vec![],
            weaknesses: vec![],
            improvement_suggestions: vec![],
            summary_feedback: raw_text.to_string(),
        }
    }

    /// Checks the value ranges serde cannot express: every score must be at most 100.
    pub fn check_ranges(&self) -> Result<(), String> {
        let scores = [
            ("overallScore", self.overall_score),
            ("experienceAnalysis.score", self.experience_analysis.score),
            ("educationAnalysis.score", self.education_analysis.score),
        ];
        for (field, value) in scores {
            if value > MAX_SCORE {
                return Err(format!("{field} is {value}, expected 0..={MAX_SCORE}"));
            }
        }
        Ok(())
    }
}
