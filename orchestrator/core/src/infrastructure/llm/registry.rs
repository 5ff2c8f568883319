// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

// Chat Provider Factory
//
// Turns a ProviderConfig into a concrete ChatProvider adapter.

use crate::domain::config::ProviderConfig;
use crate::domain::llm::ChatProvider;
use std::sync::Arc;
use tracing::info;

use super::echo::EchoProvider;
use super::ollama::OllamaChatProvider;

/// Build the adapter named by `config.provider`
pub fn create_provider(config: &ProviderConfig) -> anyhow::Result<Arc<dyn ChatProvider>> {
    match config.provider.as_str() {
        "echo" => {
            info!("Using echo chat provider");
            Ok(Arc::new(EchoProvider::new()))
        }
        "ollama" => {
            info!(
                "Using Ollama chat provider at {} (model {})",
                config.endpoint, config.model
            );
            let provider = OllamaChatProvider::new(config.endpoint.clone(), config.model.clone())?
                .with_temperature(config.temperature)
                .with_api_key(config.resolved_api_key()?);
            Ok(Arc::new(provider))
        }
        other => anyhow::bail!("Unsupported chat provider type: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_known_providers() {
        let mut config = ProviderConfig::dexter();
        assert_eq!(create_provider(&config).unwrap().name(), "echo");

        config.provider = "ollama".to_string();
        assert_eq!(create_provider(&config).unwrap().name(), "ollama");
    }

    #[test]
    fn test_unknown_provider_fails() {
        let mut config = ProviderConfig::partner();
        config.provider = "carrier-pigeon".to_string();
        assert!(create_provider(&config).is_err());
    }
}
