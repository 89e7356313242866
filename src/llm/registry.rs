//! Model registry for managing available LLM providers

use super::openai::OpenAIModel;
use super::{all_models, LlmService, LoggingService, ModelDef, OpenAIService, Provider};
use std::collections::HashMap;
use std::sync::Arc;

/// Model used when nothing else is configured
pub const PREFERRED_DEFAULT_MODEL: &str = "gpt-4o";

/// Sampling temperature used when none is configured
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Configuration for LLM providers
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    /// Gateway base URL; when set every model is reachable through it
    pub gateway: Option<String>,
    /// Default model ID
    pub default_model: Option<String>,
    pub temperature: Option<f32>,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. `DEFAULT_MODEL` and `LLM_TEMPERATURE`
    /// take precedence over the `OPENAI_*` spellings.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let temperature = non_empty("LLM_TEMPERATURE")
            .or_else(|| non_empty("OPENAI_TEMPERATURE"))
            .and_then(|raw| match raw.trim().parse::<f32>() {
                Ok(t) => Some(t),
                Err(e) => {
                    tracing::warn!(value = %raw, error = %e, "Ignoring unparsable temperature");
                    None
                }
            });

        Self {
            anthropic_api_key: non_empty("ANTHROPIC_API_KEY"),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            gateway: non_empty("LLM_GATEWAY"),
            default_model: non_empty("DEFAULT_MODEL").or_else(|| non_empty("OPENAI_MODEL")),
            temperature,
        }
    }

    pub fn temperature(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }
}

/// Registry of available LLM models
pub struct ModelRegistry {
    services: HashMap<String, Arc<dyn LlmService>>,
    default_model: String,
}

impl ModelRegistry {
    pub fn new(config: &LlmConfig) -> Self {
        let mut services: HashMap<String, Arc<dyn LlmService>> = HashMap::new();

        for model_def in all_models() {
            if let Some(service) = Self::try_create_model(model_def, config) {
                services.insert(model_def.id.to_string(), service);
            }
        }

        let preferred = |services: &HashMap<String, Arc<dyn LlmService>>| {
            if services.contains_key(PREFERRED_DEFAULT_MODEL) {
                Some(PREFERRED_DEFAULT_MODEL.to_string())
            } else {
                // Fall back to the first defined model that is available
                all_models()
                    .iter()
                    .find(|m| services.contains_key(m.id))
                    .map(|m| m.id.to_string())
            }
        };

        let default_model = match config.default_model.as_deref() {
            Some(id) if services.contains_key(id) => id.to_string(),
            Some(id) => {
                if let Some(service) = Self::try_create_passthrough(id, config) {
                    services.insert(id.to_string(), service);
                    id.to_string()
                } else {
                    let fallback = preferred(&services);
                    tracing::warn!(
                        requested = %id,
                        fallback = ?fallback,
                        "Configured default model is unavailable"
                    );
                    fallback.unwrap_or_else(|| id.to_string())
                }
            }
            None => preferred(&services).unwrap_or_else(|| PREFERRED_DEFAULT_MODEL.to_string()),
        };

        Self {
            services,
            default_model,
        }
    }

    /// Model ids outside the catalog go to `OpenAI` unchanged, as long as an
    /// `OpenAI` key or a gateway is configured
    fn try_create_passthrough(model_id: &str, config: &LlmConfig) -> Option<Arc<dyn LlmService>> {
        let api_key = if config.gateway.is_some() {
            "implicit".to_string()
        } else {
            config.openai_api_key.clone()?
        };

        let service = OpenAIService::new(
            api_key,
            OpenAIModel::Custom(model_id.to_string()),
            config.gateway.as_deref(),
        );
        Some(Arc::new(LoggingService::new(Arc::new(service))))
    }

    /// Try to create a model service, validating prerequisites
    fn try_create_model(model_def: &ModelDef, config: &LlmConfig) -> Option<Arc<dyn LlmService>> {
        // In gateway mode the gateway handles authentication
        let api_key = if config.gateway.is_some() {
            "implicit".to_string()
        } else {
            match model_def.provider {
                Provider::Anthropic => config.anthropic_api_key.as_ref()?,
                Provider::OpenAI => config.openai_api_key.as_ref()?,
            }
            .clone()
        };

        let service = (model_def.factory)(&api_key, config.gateway.as_deref());
        Some(Arc::new(LoggingService::new(service)))
    }

    /// Get a model by ID
    pub fn get(&self, model_id: &str) -> Option<Arc<dyn LlmService>> {
        self.services.get(model_id).cloned()
    }

    /// Get the default model
    pub fn default(&self) -> Option<Arc<dyn LlmService>> {
        self.get(&self.default_model)
    }

    pub fn default_model_id(&self) -> &str {
        &self.default_model
    }

    /// List all available model IDs
    pub fn available_models(&self) -> Vec<String> {
        let mut models: Vec<_> = self.services.keys().cloned().collect();
        models.sort();
        models
    }

    pub fn has_models(&self) -> bool {
        !self.services.is_empty()
    }
}
