//! Optional narrative insights attached to summaries.
//!
//! A provider is handed a finished summary and returns free-text insights.
//! Provider failures never reach the caller: the report simply comes back
//! without insights.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{DailySummary, MonthlySummary};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for an insight provider. Built once and passed to the
/// provider constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl InsightConfig {
    /// True when an API key is present and non-blank.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insights {
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub trends: Vec<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
}

impl Insights {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.insights.is_empty()
            && self.recommendations.is_empty()
            && self.trends.is_empty()
            && self.achievements.is_empty()
    }
}

#[async_trait]
pub trait InsightProvider: Send + Sync {
    async fn daily_insights(&self, summary: &DailySummary) -> Result<Insights>;

    async fn monthly_insights(&self, summary: &MonthlySummary) -> Result<Insights>;
}

/// A summary plus whatever insights the provider managed to produce.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report<T> {
    pub summary: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<Insights>,
}

pub async fn build_daily_report(
    summary: DailySummary,
    provider: Option<&dyn InsightProvider>,
) -> Report<DailySummary> {
    let insights = match provider {
        Some(provider) => match provider.daily_insights(&summary).await {
            Ok(insights) => Some(insights),
            Err(e) => {
                warn!(date = %summary.date, error = %format!("{e:#}"), "Daily insights unavailable");
                None
            }
        },
        None => None,
    };
    Report { summary, insights }
}

pub async fn build_monthly_report(
    summary: MonthlySummary,
    provider: Option<&dyn InsightProvider>,
) -> Report<MonthlySummary> {
    let insights = match provider {
        Some(provider) => match provider.monthly_insights(&summary).await {
            Ok(insights) => Some(insights),
            Err(e) => {
                warn!(error = %format!("{e:#}"), "Monthly insights unavailable");
                None
            }
        },
        None => None,
    };
    Report { summary, insights }
}

/// Instructions sent ahead of every summary.
pub const SYSTEM_PROMPT: &str = "You are a nutrition and fitness coach. \
Reply with a single JSON object with the keys \"insights\", \"recommendations\", \
\"trends\" and \"achievements\", each an array of short strings. \
Do not add any other text.";

pub fn daily_prompt(summary: &DailySummary) -> Result<String> {
    let body = serde_json::to_string_pretty(summary).context("Failed to serialize daily summary")?;
    Ok(format!(
        "Here is my energy balance for {}. Positive calorie_deficit means I ate less than my target.\n{body}",
        summary.date
    ))
}

pub fn monthly_prompt(summary: &MonthlySummary) -> Result<String> {
    let body =
        serde_json::to_string_pretty(summary).context("Failed to serialize monthly summary")?;
    Ok(format!(
        "Here is my monthly energy balance summary. accuracy_index compares my real weight change \
         with the change predicted from calories.\n{body}"
    ))
}

/// Parse a model reply into [`Insights`].
///
/// Accepts a bare JSON object or one wrapped in a Markdown code fence.
pub fn parse_insights(reply: &str) -> Result<Insights> {
    let trimmed = reply.trim();
    let start = trimmed.find('{');
    let end = trimmed.rfind('}');
    let (Some(start), Some(end)) = (start, end) else {
        bail!("Insight reply contains no JSON object");
    };
    if end < start {
        bail!("Insight reply contains no JSON object");
    }
    serde_json::from_str(&trimmed[start..=end]).context("Failed to parse insight reply")
}

/// Provider with a canned answer, for tests and offline use.
#[derive(Debug, Clone, Default)]
pub struct StaticInsights {
    pub insights: Insights,
    pub fail: bool,
}

impl StaticInsights {
    #[must_use]
    pub fn new(insights: Insights) -> Self {
        Self {
            insights,
            fail: false,
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            insights: Insights::default(),
            fail: true,
        }
    }
}

#[async_trait]
impl InsightProvider for StaticInsights {
    async fn daily_insights(&self, _summary: &DailySummary) -> Result<Insights> {
        if self.fail {
            bail!("static insight provider configured to fail");
        }
        Ok(self.insights.clone())
    }

    async fn monthly_insights(&self, _summary: &MonthlySummary) -> Result<Insights> {
        if self.fail {
            bail!("static insight provider configured to fail");
        }
        Ok(self.insights.clone())
    }
}
