use async_trait::async_trait;
use std::time::Duration;

use crate::api::errors::GrayReleaseError;

/// Raw answer of the rule configuration endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleResponse {
    pub status_code: u16,
    pub body: String,
}

impl RuleResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Network primitive used to download the gray rule.
#[async_trait]
pub trait RuleFetcher {
    async fn fetch(&self) -> Result<RuleResponse, GrayReleaseError>;
}

pub struct HttpRuleFetcher {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRuleFetcher {
    pub fn new(endpoint: String, timeout: Duration) -> Result<HttpRuleFetcher, GrayReleaseError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpRuleFetcher { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RuleFetcher for HttpRuleFetcher {
    async fn fetch(&self) -> Result<RuleResponse, GrayReleaseError> {
        let response = self.client.get(&self.endpoint).send().await?;
        let status_code = response.status().as_u16();
        let body = response.text().await?;

        Ok(RuleResponse { status_code, body })
    }
}
