//! LLM Provider implementations for Nova.
//!
//! All providers implement the `nova_core::Provider` trait.
//! `provider_from_config` selects the correct backend based on
//! configuration.

pub mod gemini;
pub mod ollama;

pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;

use std::sync::Arc;
use nova_config::{AppConfig, ProviderKind};
use nova_core::error::ProviderError;
use nova_core::provider::Provider;

/// Build the active provider from configuration.
pub fn provider_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    match config.provider {
        ProviderKind::Gemini => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                ProviderError::NotConfigured(
                    "gemini selected but no API key available (set GEMINI_API_KEY)".into(),
                )
            })?;
            Ok(Arc::new(
                GeminiProvider::new(api_key).with_model(&config.gemini_model),
            ))
        }
        ProviderKind::Ollama => Ok(Arc::new(
            OllamaProvider::new(&config.ollama_host).with_model(&config.ollama_model),
        )),
    }
}
