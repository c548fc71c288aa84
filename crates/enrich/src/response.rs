//! Strict parsing and validation of generative-model responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::taxonomy::Taxonomy;

/// One validated enrichment record. Every field is independently either a
/// valid value or absent; an out-of-taxonomy value in one field never
/// invalidates its siblings. Serializes with the report column names the
/// pipeline merges back into the feature table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentResult {
    #[serde(rename = "Behaviour Pattern")]
    pub behavior_pattern: Option<String>,
    #[serde(rename = "Likely Stage")]
    pub likely_stage: Option<String>,
    #[serde(rename = "Playbook Focus")]
    pub playbook_focus: Option<String>,
    #[serde(rename = "Urgency")]
    pub urgency: Option<String>,
    #[serde(rename = "Subject Line")]
    pub subject_line: Option<String>,
    #[serde(rename = "Opening Line")]
    pub opening_line: Option<String>,
}

impl EnrichmentResult {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Validates raw model output against a closed [`Taxonomy`].
#[derive(Clone, Debug)]
pub struct ResponseValidator {
    taxonomy: Taxonomy,
}

impl ResponseValidator {
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self { taxonomy }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Parses model text into an [`EnrichmentResult`]. Never fails: empty
    /// input, invalid JSON, or a non-object payload all collapse to the
    /// all-absent record, and out-of-taxonomy values are nulled one field
    /// at a time.
    pub fn parse_and_validate(&self, text: &str) -> EnrichmentResult {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return EnrichmentResult::default();
        }

        let body = strip_code_fence(trimmed);
        let parsed: Value = match serde_json::from_str(body) {
            Ok(parsed) => parsed,
            Err(error) => {
                warn!(%error, "model response was not valid JSON; discarding");
                return EnrichmentResult::default();
            }
        };
        let Some(object) = parsed.as_object() else {
            warn!("model response was not a JSON object; discarding");
            return EnrichmentResult::default();
        };

        let field =
            |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);

        EnrichmentResult {
            behavior_pattern: self.checked(field("behavior_pattern"), "behavior_pattern", |t, v| {
                t.allows_behavior(v)
            }),
            likely_stage: self
                .checked(field("likely_stage"), "likely_stage", |t, v| t.allows_stage(v)),
            playbook_focus: self
                .checked(field("playbook_focus"), "playbook_focus", |t, v| t.allows_focus(v)),
            urgency: self.checked(field("urgency"), "urgency", |t, v| t.allows_urgency(v)),
            subject_line: field("subject_line"),
            opening_line: field("opening_line"),
        }
    }

    fn checked(
        &self,
        value: Option<String>,
        field: &str,
        allows: impl Fn(&Taxonomy, &str) -> bool,
    ) -> Option<String> {
        match value {
            Some(label) if allows(&self.taxonomy, &label) => Some(label),
            Some(label) => {
                debug!(field, label = %label, "value outside configured taxonomy; nulled");
                None
            }
            None => None,
        }
    }
}

/// Extracts the inner span of the first well-formed triple-backtick fence,
/// tolerating a `json` language tag. Input that does not open with a fence,
/// or opens one that never closes, passes through unchanged.
fn strip_code_fence(text: &str) -> &str {
    let Some(after_open) = text.strip_prefix("```") else {
        return text;
    };
    let body = after_open.strip_prefix("json").unwrap_or(after_open);

    match body.find("```") {
        Some(close) => body[..close].trim(),
        None => text,
    }
}
