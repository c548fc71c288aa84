use anyhow::Result;
use async_trait::async_trait;

/// The generative model as an opaque `text -> text` collaborator. Transport,
/// retries, and timeouts all live behind the implementation.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}
