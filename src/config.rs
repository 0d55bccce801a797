//! Configuration for the chat completions adapter

use std::path::Path;
use std::sync::RwLock;

use log::{debug, error};
use serde::{Deserialize, Serialize};

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Source of the per-call generation settings.
/// The adapter asks again on every call, so changes apply to the next request.
pub trait GenerationSettings: Send + Sync
{   /// Selected model identifier
    fn chat_model(&self) -> String;
    /// Root address of the backend, with or without trailing slash
    fn api_base_url(&self) -> String;
    fn temperature(&self) -> f64;
}

/// Adapter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdapterConfig
{   /// Model name
    pub model: String
  , /// API base URL
    pub api_base_url: String
  , /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f64
}

fn default_temperature() -> f64
{   DEFAULT_TEMPERATURE
}

impl Default for AdapterConfig
{   fn default() -> Self
    {   AdapterConfig
        {   model: DEFAULT_MODEL.to_string()
          , api_base_url: DEFAULT_API_BASE_URL.to_string()
          , temperature: DEFAULT_TEMPERATURE
        }
    }
}

impl AdapterConfig
{   pub fn new(
      model: impl Into<String>
    , api_base_url: impl Into<String>
    , temperature: f64
    ) -> Self
    {   AdapterConfig
        {   model: model.into()
          , api_base_url: api_base_url.into()
          , temperature
        }
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> crate::Result<Self>
    {   let config: AdapterConfig = serde_json::from_str(json)
          .map_err(|e| {
            error!("Config parse error: {}", e);
            crate::Error::InvalidConfiguration(e.to_string())
          })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> crate::Result<Self>
    {   let path = path.as_ref();
        debug!("Loading adapter config from {}", path.display());
        let json = std::fs::read_to_string(path)
          .map_err(|e| {
            error!("Cannot read {}: {}", path.display(), e);
            crate::Error::InvalidConfiguration(
              format!("{}: {}", path.display(), e)
            )
          })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> crate::Result<()>
    {   check_settings(&self.model, &self.api_base_url, self.temperature)
    }
}

/// Model and base URL must be non-empty and the temperature finite;
/// serde_json would otherwise write NaN or inf as `null`
pub(crate) fn check_settings(
  model: &str
, api_base_url: &str
, temperature: f64
) -> crate::Result<()>
{   if model.trim().is_empty()
    {   return Err(crate::Error::InvalidConfiguration(
          "model identifier is empty".to_string()
        ));
    }
    if api_base_url.trim().is_empty()
    {   return Err(crate::Error::InvalidConfiguration(
          "API base URL is empty".to_string()
        ));
    }
    if !temperature.is_finite()
    {   return Err(crate::Error::InvalidConfiguration(
          format!("temperature must be finite, got {}", temperature)
        ));
    }
    Ok(())
}

impl GenerationSettings for AdapterConfig
{   fn chat_model(&self) -> String
    {   self.model.clone()
    }

    fn api_base_url(&self) -> String
    {   self.api_base_url.clone()
    }

    fn temperature(&self) -> f64
    {   self.temperature
    }
}

/// Configuration that can be swapped while adapters are in use
#[derive(Debug, Default)]
pub struct SharedConfig
{   inner: RwLock<AdapterConfig>
}

impl SharedConfig
{   pub fn new(config: AdapterConfig) -> Self
    {   SharedConfig
        {   inner: RwLock::new(config)
        }
    }

    /// Replace the settings; the next generate call sees the new values.
    /// An invalid config is rejected and the current one stays.
    pub fn update(&self, config: AdapterConfig) -> crate::Result<()>
    {   config.validate().map_err(|e| {
          error!("Rejecting config update: {}", e);
          e
        })?;
        debug!("Updating shared config, model: {}", config.model);
        let mut guard = self.inner.write()
          .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = config;
        Ok(())
    }

    pub fn snapshot(&self) -> AdapterConfig
    {   self.inner.read()
          .unwrap_or_else(|poisoned| poisoned.into_inner())
          .clone()
    }
}

impl GenerationSettings for SharedConfig
{   fn chat_model(&self) -> String
    {   self.snapshot().model
    }

    fn api_base_url(&self) -> String
    {   self.snapshot().api_base_url
    }

    fn temperature(&self) -> f64
    {   self.snapshot().temperature
    }
}

impl<T: GenerationSettings + ?Sized> GenerationSettings for std::sync::Arc<T>
{   fn chat_model(&self) -> String
    {   (**self).chat_model()
    }

    fn api_base_url(&self) -> String
    {   (**self).api_base_url()
    }

    fn temperature(&self) -> f64
    {   (**self).temperature()
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn json_config_defaults_temperature()
    {   let config = AdapterConfig::from_json_str(
          r#"{"model":"llama3","api_base_url":"http://localhost:11434/v1"}"#
        ).unwrap();
        assert_eq!(
          config,
          AdapterConfig::new("llama3", "http://localhost:11434/v1", 0.7)
        );
    }

    #[test]
    fn empty_model_is_rejected()
    {   let result = AdapterConfig::from_json_str(
          r#"{"model":"","api_base_url":"http://h/v1","temperature":0.1}"#
        );
        assert!(matches!(result, Err(crate::Error::InvalidConfiguration(_))));
    }

    #[test]
    fn broken_json_is_a_configuration_error()
    {   let result = AdapterConfig::from_json_str("{model:");
        assert!(matches!(result, Err(crate::Error::InvalidConfiguration(_))));
    }

    #[test]
    fn missing_file_is_a_configuration_error()
    {   let result = AdapterConfig::load("does/not/exist.json");
        assert!(matches!(result, Err(crate::Error::InvalidConfiguration(_))));
    }

    #[test]
    fn shared_config_reflects_updates()
    {   let shared = SharedConfig::new(AdapterConfig::default());
        assert_eq!(shared.chat_model(), "gpt-4o-mini");

        shared.update(AdapterConfig::new("mistral-small", "http://h/", 0.2))
          .unwrap();
        assert_eq!(shared.chat_model(), "mistral-small");
        assert_eq!(shared.api_base_url(), "http://h/");
        assert_eq!(shared.temperature(), 0.2);
    }

    #[test]
    fn shared_config_keeps_old_values_on_bad_update()
    {   let shared = SharedConfig::new(AdapterConfig::default());
        let result = shared.update(
          AdapterConfig::new("m", "http://h/", f64::NAN)
        );
        assert!(matches!(result, Err(crate::Error::InvalidConfiguration(_))));
        assert_eq!(shared.snapshot(), AdapterConfig::default());
    }

    #[test]
    fn infinite_temperature_is_rejected()
    {   let result = AdapterConfig::new("m", "http://h/", f64::INFINITY)
          .validate();
        assert!(matches!(result, Err(crate::Error::InvalidConfiguration(_))));
    }
}
