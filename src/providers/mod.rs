mod anthropic;
mod factory;
mod open_ai;

pub use anthropic::AnthropicProvider;
pub use factory::ProviderFactory;
pub use open_ai::OpenAIProvider;

use async_trait::async_trait;
use std::error::Error;

/// A text completion backend used by the last extraction stage
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Get the provider name (e.g., "openai", "anthropic")
    fn provider_name(&self) -> &str;

    /// Send `prompt` and return the model's reply text
    async fn complete(&self, prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>>;
}

/// JSON body of a reply, without the Markdown fence models like to add
pub(crate) fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the language tag line ("```json")
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
