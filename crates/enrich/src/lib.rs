//! Enrichment layer - prompt rendering and model-response validation
//!
//! This crate turns a per-entity feature snapshot into a natural-language
//! prompt, and turns the generative model's raw text back into a validated
//! enrichment record:
//! 1. **Prompt rendering** (`prompt`) - fill the task template from a `FeatureRow`
//! 2. **Model invocation** (`llm`) - opaque `text -> text` seam owned by the caller
//! 3. **Response validation** (`response`) - fence-strip, parse, taxonomy-check
//!
//! # Safety Principle
//!
//! The model is strictly a text generator. Every categorical value it emits
//! is checked against the closed [`Taxonomy`]; anything outside it is
//! discarded field-by-field rather than trusted. Bad model output can never
//! fail the pipeline - it degrades to an absent field.

pub mod llm;
pub mod prompt;
pub mod response;
pub mod runtime;
pub mod taxonomy;

pub use llm::GenerativeModel;
pub use prompt::{PromptBuilder, PromptError};
pub use response::{EnrichmentResult, ResponseValidator};
pub use runtime::EnrichmentRuntime;
pub use taxonomy::Taxonomy;
