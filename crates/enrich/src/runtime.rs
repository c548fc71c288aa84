use anyhow::Result;

use cohort_core::FeatureRow;

use crate::llm::GenerativeModel;
use crate::prompt::PromptBuilder;
use crate::response::{EnrichmentResult, ResponseValidator};

/// Per-entity enrichment pipeline: render the prompt, invoke the model,
/// validate the response. State is immutable after construction, so one
/// runtime can serve concurrent callers; entities have no cross-ordering
/// dependency.
pub struct EnrichmentRuntime {
    prompts: PromptBuilder,
    validator: ResponseValidator,
}

impl EnrichmentRuntime {
    pub fn new(prompts: PromptBuilder, validator: ResponseValidator) -> Self {
        Self { prompts, validator }
    }

    pub fn prompts(&self) -> &PromptBuilder {
        &self.prompts
    }

    pub fn validator(&self) -> &ResponseValidator {
        &self.validator
    }

    /// Model transport errors propagate; response *content* problems never
    /// do - they degrade to absent fields in the result.
    pub async fn enrich(
        &self,
        row: &FeatureRow,
        model: &dyn GenerativeModel,
    ) -> Result<EnrichmentResult> {
        let prompt = self.prompts.render(row)?;
        let response = model.generate(&prompt).await?;
        Ok(self.validator.parse_and_validate(&response))
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{bail, Result};
    use async_trait::async_trait;

    use cohort_core::FeatureRow;

    use super::EnrichmentRuntime;
    use crate::llm::GenerativeModel;
    use crate::prompt::PromptBuilder;
    use crate::response::ResponseValidator;
    use crate::taxonomy::Taxonomy;

    struct CannedModel(&'static str);

    #[async_trait]
    impl GenerativeModel for CannedModel {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingModel;

    #[async_trait]
    impl GenerativeModel for FailingModel {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            bail!("model unavailable")
        }
    }

    fn runtime() -> EnrichmentRuntime {
        let prompts = PromptBuilder::new("Segment company {{ ID }}", None).unwrap();
        EnrichmentRuntime::new(prompts, ResponseValidator::new(Taxonomy::default()))
    }

    #[tokio::test]
    async fn enriches_a_row_end_to_end() {
        let runtime = runtime();
        let row = FeatureRow::new().with("id", 42.0);
        let model = CannedModel("```json\n{\"urgency\": \"nurture\"}\n```");

        let result = runtime.enrich(&row, &model).await.unwrap();
        assert_eq!(result.urgency.as_deref(), Some("nurture"));
    }

    #[tokio::test]
    async fn garbage_model_output_yields_the_empty_record_not_an_error() {
        let runtime = runtime();
        let row = FeatureRow::new().with("id", 1.0);
        let model = CannedModel("sorry, I cannot help with that");

        let result = runtime.enrich(&row, &model).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn model_transport_errors_propagate() {
        let runtime = runtime();
        let row = FeatureRow::new().with("id", 1.0);

        assert!(runtime.enrich(&row, &FailingModel).await.is_err());
    }
}
