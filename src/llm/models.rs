//! Centralized model definitions for all LLM providers

use super::anthropic::AnthropicModel;
use super::openai::OpenAIModel;
use super::{AnthropicService, LlmService, OpenAIService};
use std::sync::Arc;

/// LLM provider enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Anthropic,
    OpenAI,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::OpenAI, Provider::Anthropic];

    /// Environment variable holding this provider's API key
    pub fn api_key_env_var(self) -> &'static str {
        match self {
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
        }
    }
}

/// Model definition with metadata
#[derive(Debug, Clone)]
pub struct ModelDef {
    /// User-facing model ID (e.g., "gpt-4o")
    pub id: &'static str,
    pub provider: Provider,
    /// Factory function to create the service from an API key and optional gateway
    pub factory: fn(&str, Option<&str>) -> Arc<dyn LlmService>,
}

/// Get all available model definitions
pub fn all_models() -> &'static [ModelDef] {
    &[
        ModelDef {
            id: "gpt-4o",
            provider: Provider::OpenAI,
            factory: |api_key, gateway| {
                Arc::new(OpenAIService::new(
                    api_key.to_string(),
                    OpenAIModel::GPT4o,
                    gateway,
                ))
            },
        },
        ModelDef {
            id: "gpt-4o-mini",
            provider: Provider::OpenAI,
            factory: |api_key, gateway| {
                Arc::new(OpenAIService::new(
                    api_key.to_string(),
                    OpenAIModel::GPT4oMini,
                    gateway,
                ))
            },
        },
        ModelDef {
            id: "gpt-4.1",
            provider: Provider::OpenAI,
            factory: |api_key, gateway| {
                Arc::new(OpenAIService::new(
                    api_key.to_string(),
                    OpenAIModel::GPT41,
                    gateway,
                ))
            },
        },
        ModelDef {
            id: "claude-4.5-sonnet",
            provider: Provider::Anthropic,
            factory: |api_key, gateway| {
                Arc::new(AnthropicService::new(
                    api_key.to_string(),
                    AnthropicModel::Claude45Sonnet,
                    gateway,
                ))
            },
        },
        ModelDef {
            id: "claude-4.5-haiku",
            provider: Provider::Anthropic,
            factory: |api_key, gateway| {
                Arc::new(AnthropicService::new(
                    api_key.to_string(),
                    AnthropicModel::Claude45Haiku,
                    gateway,
                ))
            },
        },
    ]
}
