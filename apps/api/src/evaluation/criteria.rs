//! Criteria Normalizer: trims and validates the job criteria a user entered.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Criteria exactly as the user entered them. List entries may be blank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCriteria {
    pub keywords: Vec<String>,
    #[serde(default)]
    pub required_experience: String,
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub additional_attributes: String,
}

impl Default for RawCriteria {
    /// The form state a new user starts from: one empty row per list.
    fn default() -> Self {
        Self {
            keywords: vec![String::new()],
            required_experience: "1 year".to_string(),
            tech_stack: vec![String::new()],
            degree: "Bachelor's degree".to_string(),
            additional_attributes: String::new(),
        }
    }
}

/// Criteria that passed normalization: both lists hold at least one non-blank entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedCriteria {
    keywords: Vec<String>,
    required_experience: String,
    tech_stack: Vec<String>,
    degree: String,
    additional_attributes: String,
}

impl NormalizedCriteria {
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn required_experience(&self) -> &str {
        &self.required_experience
    }

    pub fn tech_stack(&self) -> &[String] {
        &self.tech_stack
    }

    pub fn degree(&self) -> &str {
        &self.degree
    }

    pub fn additional_attributes(&self) -> &str {
        &self.additional_attributes
    }

    /// Renders every criteria field by label, including empty ones.
    pub fn summary(&self) -> String {
        format!(
            "Keywords: {}\n\
             Required Experience: {}\n\
             Tech Stack: {}\n\
             Required Degree: {}\n\
             Additional Requirements: {}",
            self.keywords.join(", "),
            self.required_experience,
            self.tech_stack.join(", "),
            self.degree,
            self.additional_attributes,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationReason {
    EmptyKeywords,
    EmptyTechStack,
}

impl ValidationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationReason::EmptyKeywords => "empty_keywords",
            ValidationReason::EmptyTechStack => "empty_tech_stack",
        }
    }
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid criteria: {reason}")]
pub struct ValidationError {
    pub reason: ValidationReason,
}

/// Trims list entries, drops blank ones, and rejects criteria with an empty
/// keyword or tech-stack list. Keywords are checked first.
pub fn normalize(raw: &RawCriteria) -> Result<NormalizedCriteria, ValidationError> {
    let keywords = clean_list(&raw.keywords);
    if keywords.is_empty() {
        return Err(ValidationError {
            reason: ValidationReason::EmptyKeywords,
        });
    }

    let tech_stack = clean_list(&raw.tech_stack);
    if tech_stack.is_empty() {
        return Err(ValidationError {
            reason: ValidationReason::EmptyTechStack,
        });
    }

    Ok(NormalizedCriteria {
        keywords,
        required_experience: raw.required_experience.clone(),
        tech_stack,
        degree: raw.degree.clone(),
        additional_attributes: raw.additional_attributes.clone(),
    })
}

fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
