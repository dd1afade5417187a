//! HTTP-backed `LlmClient` implementations for the supported provider
//! endpoint shapes. Each call is bounded by the configured timeout; a
//! non-success status or an empty completion is an error.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};

use shoprank_core::config::{ProviderConfig, ProviderKind};

use crate::llm::LlmClient;

const ANTHROPIC_API_VERSION: &str = "2023-06-01";

pub struct HttpProvider {
    kind: ProviderKind,
    client: Client,
    model: String,
    api_key: Option<SecretString>,
    base_url: String,
    max_tokens: u32,
}

impl HttpProvider {
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build inference http client")?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| default_base_url(config.kind).to_string());

        Ok(Self {
            kind: config.kind,
            client,
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
            max_tokens: config.max_tokens,
        })
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_ref()
            .map(|key| key.expose_secret())
            .ok_or_else(|| anyhow!("provider {} has no api key configured", self.name()))
    }

    async fn complete_openai(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [{"role": "user", "content": prompt}],
        });
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(self.api_key()?)
            .json(&body)
            .send()
            .await
            .context("openai request failed")?;
        let payload = check_status(response).await?;
        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("openai response had no message content"))
    }

    async fn complete_anthropic(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [{"role": "user", "content": prompt}],
        });
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", self.api_key()?)
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .json(&body)
            .send()
            .await
            .context("anthropic request failed")?;
        let payload = check_status(response).await?;
        payload["content"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("anthropic response had no text content"))
    }

    async fn complete_ollama(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .context("ollama request failed")?;
        let payload = check_status(response).await?;
        payload["response"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("ollama response had no response field"))
    }
}

fn default_base_url(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::OpenAi => "https://api.openai.com",
        ProviderKind::Anthropic => "https://api.anthropic.com",
        ProviderKind::Ollama => "http://localhost:11434",
    }
}

async fn check_status(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!("provider returned {status}: {}", body.chars().take(200).collect::<String>());
    }
    response.json::<Value>().await.context("provider returned non-json body")
}

#[async_trait]
impl LlmClient for HttpProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let text = match self.kind {
            ProviderKind::OpenAi => self.complete_openai(prompt).await?,
            ProviderKind::Anthropic => self.complete_anthropic(prompt).await?,
            ProviderKind::Ollama => self.complete_ollama(prompt).await?,
        };
        if text.trim().is_empty() {
            bail!("provider {} returned an empty completion", self.name());
        }
        Ok(text)
    }

    fn name(&self) -> &'static str {
        match self.kind {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Ollama => "ollama",
        }
    }
}
