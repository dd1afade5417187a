//! Provider chain with the rule classifier as the floor. `classify` is
//! infallible: every provider error is logged and skipped, and the rule
//! result is returned unchanged when no provider succeeds.

use anyhow::Result;
use tracing::{debug, warn};

use shoprank_core::config::InferenceConfig;
use shoprank_core::{BehaviorProfile, IntentClassification};

use crate::llm::LlmClient;
use crate::parse::parse_classification;
use crate::prompt::build_prompt;
use crate::providers::HttpProvider;

pub struct InferenceAdapter {
    providers: Vec<Box<dyn LlmClient>>,
}

impl InferenceAdapter {
    pub fn new(providers: Vec<Box<dyn LlmClient>>) -> Self {
        Self { providers }
    }

    /// Empty when inference is disabled; `classify` then always returns the
    /// rule result.
    pub fn from_config(config: &InferenceConfig) -> Result<Self> {
        if !config.enabled {
            return Ok(Self::new(Vec::new()));
        }
        let providers = config
            .providers
            .iter()
            .map(|provider| {
                HttpProvider::from_config(provider).map(|p| Box::new(p) as Box<dyn LlmClient>)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(providers))
    }

    pub fn is_configured(&self) -> bool {
        !self.providers.is_empty()
    }

    /// Tries providers in order; the first completion that yields text wins.
    /// Unparseable fields in that text keep the `rule_result` values.
    pub async fn classify(
        &self,
        profile: &BehaviorProfile,
        rule_result: IntentClassification,
    ) -> IntentClassification {
        if self.providers.is_empty() {
            return rule_result;
        }

        let prompt = build_prompt(profile);
        for provider in &self.providers {
            match provider.complete(&prompt).await {
                Ok(text) => {
                    debug!(provider = provider.name(), "inference provider succeeded");
                    return parse_classification(&text, &rule_result);
                }
                Err(error) => {
                    warn!(
                        provider = provider.name(),
                        error = %error,
                        "inference provider failed, trying next"
                    );
                }
            }
        }

        debug!("all inference providers failed, using rule classification");
        rule_result
    }
}
