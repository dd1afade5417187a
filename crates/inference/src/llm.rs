use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Stable provider name for logs.
    fn name(&self) -> &'static str;
}
