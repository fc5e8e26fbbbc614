use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use kcal_core::insights::{
    InsightConfig, InsightProvider, Insights, SYSTEM_PROMPT, daily_prompt, monthly_prompt,
    parse_insights,
};
use kcal_core::models::{DailySummary, MonthlySummary};

/// Insight provider backed by any server speaking the OpenAI
/// `/v1/chat/completions` API.
pub struct OpenAiInsightClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl OpenAiInsightClient {
    /// Returns `Ok(None)` when no API key is configured.
    pub fn from_config(config: &InsightConfig) -> Result<Option<Self>> {
        if !config.enabled() {
            return Ok(None);
        }
        let api_key = config.api_key.clone().unwrap_or_default();
        let client = reqwest::Client::builder()
            .user_agent(format!(
                "kcal-cli/{} (energy tracker)",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Some(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        }))
    }

    async fn chat_completion(&self, prompt: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: Some(0.3),
            response_format: Some(ResponseFormat {
                kind: "json_object".to_string(),
            }),
        };

        debug!(model = %self.model, base_url = %self.base_url, "Requesting insights");
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to reach insight API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Insight API error {status}: {body}");
        }

        let chat: ChatCompletionResponse = response
            .json()
            .await
            .context("Failed to parse insight API response")?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .context("Insight API returned no choices")
    }
}

#[async_trait]
impl InsightProvider for OpenAiInsightClient {
    async fn daily_insights(&self, summary: &DailySummary) -> Result<Insights> {
        let reply = self.chat_completion(&daily_prompt(summary)?).await?;
        parse_insights(&reply)
    }

    async fn monthly_insights(&self, summary: &MonthlySummary) -> Result<Insights> {
        let reply = self.chat_completion(&monthly_prompt(summary)?).await?;
        parse_insights(&reply)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_without_key() {
        let config = InsightConfig::default();
        assert!(OpenAiInsightClient::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_enabled_with_key() {
        let config = InsightConfig {
            api_key: Some("sk-test".to_string()),
            base_url: "http://localhost:9/".to_string(),
            ..InsightConfig::default()
        };
        let client = OpenAiInsightClient::from_config(&config).unwrap().unwrap();
        assert_eq!(client.base_url, "http://localhost:9");
    }

    #[test]
    fn test_request_shape() {
        let request = ChatCompletionRequest {
            model: "m".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "hi".to_string(),
            }],
            temperature: None,
            response_format: Some(ResponseFormat {
                kind: "json_object".to_string(),
            }),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["response_format"]["type"], "json_object");
        assert!(json.get("temperature").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"{\"insights\":[\"ok\"]}"}}]}"#;
        let chat: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        let content = chat.choices[0].message.content.as_deref().unwrap();
        assert_eq!(parse_insights(content).unwrap().insights, vec!["ok"]);
    }

    #[tokio::test]
    #[ignore = "requires KCAL_INSIGHTS_API_KEY and network access"]
    async fn test_live_daily_insights() {
        let config = crate::config::insight_config_from(|key| std::env::var(key).ok());
        let client = OpenAiInsightClient::from_config(&config).unwrap().unwrap();
        let today = chrono::Local::now().date_naive();
        let summary = kcal_core::daily::summarize_day(today, &[], &[], None, None, today);
        let insights = client.daily_insights(&summary).await.unwrap();
        assert!(!insights.is_empty());
    }
}
