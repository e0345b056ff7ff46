// Resume evaluation pipeline.
// Flow: criteria normalization → document encoding → request building →
//       evaluator call (llm_client) → result parsing with fallback.

pub mod criteria;
pub mod document;
pub mod handlers;
pub mod orchestrator;
pub mod parser;
pub mod prompts;
pub mod request;
pub mod result;
