//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

use ensemble_domain::Model;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("server port cannot be 0")]
    InvalidPort,

    #[error("database url cannot be empty")]
    EmptyDatabaseUrl,

    #[error("model name cannot be empty")]
    EmptyModelName,
}

/// Raw HTTP server configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServerConfig {
    /// Address to bind the listener to
    pub bind: String,
    pub port: u16,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

impl FileServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// Raw per-provider configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Environment variable name for the API key
    pub api_key_env: String,
    /// Direct API key (not recommended — use env var instead)
    pub api_key: Option<String>,
    /// Base URL override, for proxies and compatible endpoints
    pub base_url: Option<String>,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            api_key_env: String::new(),
            api_key: None,
            base_url: None,
        }
    }
}

impl FileProviderConfig {
    fn with_key_env(env: &str) -> Self {
        Self {
            api_key_env: env.to_string(),
            ..Self::default()
        }
    }

    /// Resolve the effective provider settings. A key given directly in
    /// the file wins; otherwise the configured environment variable is
    /// consulted.
    pub fn resolve(&self) -> ProviderConfig {
        let api_key = self
            .api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok().filter(|k| !k.is_empty()));
        ProviderConfig {
            api_key,
            base_url: self.base_url.clone(),
        }
    }
}

/// Raw providers section from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    pub openai: FileProviderConfig,
    pub anthropic: FileProviderConfig,
    pub google: FileProviderConfig,
}

impl Default for FileProvidersConfig {
    fn default() -> Self {
        Self {
            openai: FileProviderConfig::with_key_env("OPENAI_API_KEY"),
            anthropic: FileProviderConfig::with_key_env("ANTHROPIC_API_KEY"),
            google: FileProviderConfig::with_key_env("GOOGLE_AI_API_KEY"),
        }
    }
}

impl FileProvidersConfig {
    pub fn resolve(&self) -> ProvidersConfig {
        ProvidersConfig {
            openai: self.openai.resolve(),
            anthropic: self.anthropic.resolve(),
            google: self.google.resolve(),
        }
    }
}

/// Effective settings for one provider after env resolution
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

/// Effective settings for all providers after env resolution
#[derive(Debug, Clone, Default)]
pub struct ProvidersConfig {
    pub openai: ProviderConfig,
    pub anthropic: ProviderConfig,
    pub google: ProviderConfig,
}

/// Raw model selection from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelsConfig {
    /// Models queried when an orchestration request names none
    pub defaults: Vec<String>,
    /// Model used to synthesize the fan-out responses
    pub synthesizer: Model,
    /// Model backing the interview coach
    pub coach: Model,
}

impl Default for FileModelsConfig {
    fn default() -> Self {
        Self {
            defaults: Vec::new(),
            synthesizer: Model::default_synthesizer(),
            coach: Model::default_coach(),
        }
    }
}

impl FileModelsConfig {
    /// Parse the configured default model list, falling back to the
    /// built-in trio when the list is empty.
    pub fn default_models(&self) -> Vec<Model> {
        if self.defaults.is_empty() {
            Model::default_models()
        } else {
            self.defaults
                .iter()
                .map(|s| s.parse().unwrap_or_else(|_| Model::Custom(s.clone())))
                .collect()
        }
    }
}

/// Raw database configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDatabaseConfig {
    /// sqlx connection string
    pub url: String,
}

impl Default for FileDatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://ensemble.db?mode=rwc".to_string(),
        }
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// HTTP server settings
    pub server: FileServerConfig,
    /// Provider credentials and endpoints
    pub providers: FileProvidersConfig,
    /// Model selection
    pub models: FileModelsConfig,
    /// Storage settings
    pub database: FileDatabaseConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidPort);
        }

        if self.database.url.trim().is_empty() {
            return Err(ConfigValidationError::EmptyDatabaseUrl);
        }

        for model in &self.models.defaults {
            if model.trim().is_empty() {
                return Err(ConfigValidationError::EmptyModelName);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[server]
bind = "0.0.0.0"
port = 9000

[providers.openai]
api_key = "sk-inline"
base_url = "https://proxy.internal/v1"

[models]
defaults = ["gpt-4o", "claude-sonnet-4"]
synthesizer = "claude-sonnet-4"
coach = "gpt-4o-mini"

[database]
url = "sqlite::memory:"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen_addr(), "0.0.0.0:9000");
        assert_eq!(config.providers.openai.api_key.as_deref(), Some("sk-inline"));
        assert_eq!(config.models.synthesizer, Model::ClaudeSonnet4);
        assert_eq!(config.models.default_models().len(), 2);
        assert_eq!(config.database.url, "sqlite::memory:");
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[server]
port = 3000
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 3000);
        // Defaults should apply
        assert_eq!(config.server.bind, "127.0.0.1");
        assert_eq!(config.models.synthesizer, Model::Gpt4o);
        assert_eq!(config.models.coach, Model::Gpt4oMini);
        assert_eq!(config.providers.openai.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_default_model_list_falls_back_to_builtin_trio() {
        let config = FileModelsConfig::default();
        assert_eq!(config.default_models(), Model::default_models());
    }

    #[test]
    fn test_inline_api_key_wins_over_env() {
        let file = FileProviderConfig {
            api_key_env: "ENSEMBLE_TEST_UNSET_VAR".to_string(),
            api_key: Some("sk-direct".to_string()),
            base_url: None,
        };
        let resolved = file.resolve();
        assert_eq!(resolved.api_key.as_deref(), Some("sk-direct"));
    }

    #[test]
    fn test_validate_zero_port() {
        let toml_str = r#"
[server]
port = 0
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidPort)
        ));
    }

    #[test]
    fn test_validate_empty_model_name() {
        let toml_str = r#"
[models]
defaults = ["gpt-4o", ""]
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::EmptyModelName)
        ));
    }
}
