pub mod gemini;
pub mod terms;

use async_trait::async_trait;

#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}
