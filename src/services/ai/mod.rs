pub mod intent;
pub mod ollama;
pub mod openai;

use async_trait::async_trait;

/// Text-completion oracle. One prompt in, free text out; no retries.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;
}
