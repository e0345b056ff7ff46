//! Evaluation Orchestrator: the public entry point of the evaluation pipeline.
//!
//! Flow: normalize → encode → build request → submit → parse.
//!
//! Validation and missing credentials fail before any I/O, including reading
//! the document. Transport failures propagate. Parse failures never do: the
//! parser degrades to a fallback result.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use crate::evaluation::criteria::{normalize, RawCriteria, ValidationError, ValidationReason};
use crate::evaluation::document::{encode_document, Document, EncodingError};
use crate::evaluation::parser::parse;
use crate::evaluation::request::{build_request, Language};
use crate::evaluation::result::ResumeAnalysisResult;
use crate::llm_client::{require_credential, LlmClient, LlmError};
use crate::notify::Notifier;

/// Every failure an evaluation can surface to its caller.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("an evaluator credential is required")]
    Auth,

    #[error("evaluator request failed: {message}")]
    Transport {
        /// `None` when no HTTP response was received at all.
        status: Option<u16>,
        message: String,
    },

    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

impl From<LlmError> for EvaluationError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::MissingCredential => EvaluationError::Auth,
            LlmError::Api { status, message } => EvaluationError::Transport {
                status: Some(status),
                message,
            },
            other => EvaluationError::Transport {
                status: None,
                message: other.to_string(),
            },
        }
    }
}

impl EvaluationError {
    /// The short message shown to the user for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            EvaluationError::Validation(e) => match e.reason {
                ValidationReason::EmptyKeywords => "Please add at least one keyword in the criteria",
                ValidationReason::EmptyTechStack => {
                    "Please add at least one technology in the criteria"
                }
            },
            EvaluationError::Auth => "Please enter your evaluator API key in settings",
            EvaluationError::Transport { .. } => "Failed to analyze resume. Please try again.",
            EvaluationError::Encoding(_) => "The resume document could not be read.",
        }
    }
}

/// Runs evaluations. Stateless between calls; clone freely.
#[derive(Clone)]
pub struct Evaluator {
    llm: LlmClient,
    notifier: Arc<dyn Notifier>,
}

impl Evaluator {
    pub fn new(llm: LlmClient, notifier: Arc<dyn Notifier>) -> Self {
        Self { llm, notifier }
    }

    /// Evaluates `document` against `criteria`, with "today" taken from the system clock.
    pub async fn evaluate(
        &self,
        document: &Document,
        criteria: &RawCriteria,
        credential: Option<&str>,
        language: Language,
    ) -> Result<ResumeAnalysisResult, EvaluationError> {
        self.evaluate_at(document, criteria, credential, language, Utc::now())
            .await
    }

    /// Same as `evaluate` with an explicit "today".
    pub async fn evaluate_at(
        &self,
        document: &Document,
        criteria: &RawCriteria,
        credential: Option<&str>,
        language: Language,
        now: DateTime<Utc>,
    ) -> Result<ResumeAnalysisResult, EvaluationError> {
        let outcome = self
            .run(document, criteria, credential, language, now)
            .await;
        if let Err(e) = &outcome {
            self.notifier.notify_error(e.user_message());
        }
        outcome
    }

    async fn run(
        &self,
        document: &Document,
        criteria: &RawCriteria,
        credential: Option<&str>,
        language: Language,
        now: DateTime<Utc>,
    ) -> Result<ResumeAnalysisResult, EvaluationError> {
        let criteria = normalize(criteria)?;
        let credential = require_credential(credential)?;

        info!(
            "Evaluating '{}' ({language}) against {} keywords, {} technologies",
            document.filename,
            criteria.keywords().len(),
            criteria.tech_stack().len()
        );

        let encoded = encode_document(document).await?;
        let request = build_request(&criteria, encoded, language, now);
        let raw = self.llm.submit(&request, Some(credential)).await?;

        let outcome = parse(&raw, language);
        let fallback = outcome.is_fallback();
        let result = outcome.into_result();
        info!(
            "Evaluation of '{}' finished: score={}, fallback={fallback}",
            document.filename, result.overall_score
        );
        Ok(result)
    }
}
