//! LLM completion client implementations for Colloquy.
//!
//! All providers implement the `colloquy_core::Provider` trait.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use colloquy_config::AppConfig;
use colloquy_core::error::ProviderError;

/// Build the completion client described by the configuration.
pub fn build_from_config(config: &AppConfig) -> Result<OpenAiCompatProvider, ProviderError> {
    let api_key = config
        .api_key
        .clone()
        .ok_or_else(|| ProviderError::NotConfigured("no completion API key configured".into()))?;
    OpenAiCompatProvider::new("openai", &config.api_url, api_key)
}
