//! Model value object representing an external completion model

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Available completion models (Value Object)
///
/// This is a domain concept representing the AI models an orchestration
/// request can fan out to. Unknown identifiers are carried as `Custom`
/// so a request for a model we have no pricing for still runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    // GPT models
    Gpt4o,
    Gpt4oMini,
    // Claude models
    ClaudeSonnet4,
    Claude3Opus,
    Claude3Sonnet,
    Claude3Haiku,
    // Gemini models
    GeminiUltra,
    // Custom
    Custom(String),
}

impl Model {
    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        match self {
            Model::Gpt4o => "gpt-4o",
            Model::Gpt4oMini => "gpt-4o-mini",
            Model::ClaudeSonnet4 => "claude-sonnet-4",
            Model::Claude3Opus => "claude-3-opus",
            Model::Claude3Sonnet => "claude-3-sonnet",
            Model::Claude3Haiku => "claude-3-haiku",
            Model::GeminiUltra => "gemini-ultra",
            Model::Custom(s) => s,
        }
    }

    /// Get the default set of models for an orchestration run
    pub fn default_models() -> Vec<Model> {
        vec![Model::Gpt4o, Model::ClaudeSonnet4, Model::GeminiUltra]
    }

    /// The model used for synthesis unless configured otherwise
    pub fn default_synthesizer() -> Model {
        Model::Gpt4o
    }

    /// The model used for interview coaching unless configured otherwise
    pub fn default_coach() -> Model {
        Model::Gpt4oMini
    }

    /// Check if this is a GPT model
    pub fn is_gpt(&self) -> bool {
        match self {
            Model::Gpt4o | Model::Gpt4oMini => true,
            Model::Custom(id) => id.starts_with("gpt-"),
            _ => false,
        }
    }

    /// Check if this is a Claude model
    pub fn is_claude(&self) -> bool {
        match self {
            Model::ClaudeSonnet4
            | Model::Claude3Opus
            | Model::Claude3Sonnet
            | Model::Claude3Haiku => true,
            Model::Custom(id) => id.starts_with("claude-"),
            _ => false,
        }
    }

    /// Check if this is a Gemini model
    pub fn is_gemini(&self) -> bool {
        match self {
            Model::GeminiUltra => true,
            Model::Custom(id) => id.starts_with("gemini-"),
            _ => false,
        }
    }

    /// Approximate price in USD per 1K tokens
    ///
    /// Unknown/custom models fall back to a flat rate so cost totals
    /// stay defined for every entry in a response.
    pub fn price_per_1k_tokens(&self) -> f64 {
        match self {
            Model::Gpt4o => 0.03,
            Model::Gpt4oMini => 0.0015,
            Model::ClaudeSonnet4 => 0.018,
            Model::Claude3Opus => 0.075,
            Model::Claude3Sonnet => 0.018,
            Model::Claude3Haiku => 0.0025,
            Model::GeminiUltra => 0.02,
            Model::Custom(_) => 0.01,
        }
    }

    /// Cost in USD for the given total token count
    pub fn cost_for_tokens(&self, tokens: u32) -> f64 {
        (tokens as f64 / 1000.0) * self.price_per_1k_tokens()
    }
}

impl Default for Model {
    /// Returns the default model (GPT-4o)
    fn default() -> Self {
        Model::Gpt4o
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "gpt-4o" => Model::Gpt4o,
            "gpt-4o-mini" => Model::Gpt4oMini,
            "claude-sonnet-4" => Model::ClaudeSonnet4,
            "claude-3-opus" => Model::Claude3Opus,
            "claude-3-sonnet" => Model::Claude3Sonnet,
            "claude-3-haiku" => Model::Claude3Haiku,
            "gemini-ultra" => Model::GeminiUltra,
            other => Model::Custom(other.to_string()),
        })
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().expect("model parsing is infallible"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_roundtrip() {
        let models = Model::default_models();
        for model in models {
            let s = model.to_string();
            let parsed: Model = s.parse().unwrap();
            assert_eq!(model, parsed);
        }
    }

    #[test]
    fn test_custom_model() {
        let model: Model = "local-llama-70b".parse().unwrap();
        assert_eq!(model, Model::Custom("local-llama-70b".to_string()));
        assert_eq!(model.to_string(), "local-llama-70b");
    }

    #[test]
    fn test_model_family_detection() {
        assert!(Model::Gpt4oMini.is_gpt());
        assert!(Model::ClaudeSonnet4.is_claude());
        assert!(Model::GeminiUltra.is_gemini());
        assert!(!Model::ClaudeSonnet4.is_gpt());
    }

    #[test]
    fn test_cost_for_tokens() {
        // 1000 tokens of gpt-4o at $0.03/1K
        assert!((Model::Gpt4o.cost_for_tokens(1000) - 0.03).abs() < 1e-9);
        // Custom models use the flat fallback rate
        let custom: Model = "whatever".parse().unwrap();
        assert!((custom.cost_for_tokens(2000) - 0.02).abs() < 1e-9);
    }
}
