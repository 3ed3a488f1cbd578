//! Model-to-provider routing

use super::ProviderKind;
use ensemble_domain::Model;

/// Pick the provider family responsible for a model.
///
/// Custom model ids with no recognizable family prefix are routed to
/// OpenAI, which covers the common case of OpenAI-compatible proxies.
pub fn provider_for(model: &Model) -> ProviderKind {
    if model.is_claude() {
        ProviderKind::Anthropic
    } else if model.is_gemini() {
        ProviderKind::Google
    } else {
        ProviderKind::OpenAi
    }
}
