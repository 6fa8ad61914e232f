//! HTTP Skill Handler - Implementation of SkillHandler over JSON/HTTP.
//!
//! Each skill is reached at its own endpoint. A turn is posted as JSON to
//! `{endpoint}/begin` or `{endpoint}/continue` and the skill answers with a
//! `SkillReply`.
//!
//! # Configuration
//!
//! ```ignore
//! let handler = HttpSkillHandler::new(Duration::from_secs(10))?
//!     .with_endpoint(SkillEndpoint::new("calendar", "https://skills.example.com/calendar")
//!         .with_api_key(key));
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use std::collections::HashMap;
use std::time::Duration;

use crate::ports::{SkillError, SkillHandler, SkillReply, SkillTurn};

/// Where one skill lives.
#[derive(Debug, Clone)]
pub struct SkillEndpoint {
    pub skill_id: String,
    pub base_url: String,
    api_key: Option<Secret<String>>,
}

impl SkillEndpoint {
    pub fn new(skill_id: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            skill_id: skill_id.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    /// Sets the bearer key sent with every request.
    pub fn with_api_key(mut self, api_key: Secret<String>) -> Self {
        self.api_key = Some(api_key);
        self
    }

    fn url(&self, operation: &str) -> String {
        format!("{}/{}", self.base_url, operation)
    }
}

/// Skill handler that talks to remote skills over HTTP.
pub struct HttpSkillHandler {
    endpoints: HashMap<String, SkillEndpoint>,
    client: Client,
    timeout: Duration,
}

impl HttpSkillHandler {
    /// Creates a handler whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, SkillError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SkillError::unavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            endpoints: HashMap::new(),
            client,
            timeout,
        })
    }

    pub fn with_endpoint(mut self, endpoint: SkillEndpoint) -> Self {
        self.endpoints.insert(endpoint.skill_id.clone(), endpoint);
        self
    }

    fn endpoint(&self, skill_id: &str) -> Result<&SkillEndpoint, SkillError> {
        self.endpoints
            .get(skill_id)
            .ok_or_else(|| SkillError::UnknownSkill(skill_id.to_string()))
    }

    async fn post(
        &self,
        skill_id: &str,
        operation: &str,
        turn: &SkillTurn,
    ) -> Result<SkillReply, SkillError> {
        let endpoint = self.endpoint(skill_id)?;

        let mut request = self
            .client
            .post(endpoint.url(operation))
            .header("Content-Type", "application/json")
            .json(turn);
        if let Some(key) = &endpoint.api_key {
            request = request.header("Authorization", format!("Bearer {}", key.expose_secret()));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SkillError::Timeout {
                    timeout_ms: self.timeout.as_millis() as u64,
                }
            } else if e.is_connect() {
                SkillError::unavailable(format!("Connection failed: {}", e))
            } else {
                SkillError::unavailable(e.to_string())
            }
        })?;

        let response = Self::check_status(response).await?;
        response
            .json::<SkillReply>()
            .await
            .map_err(|e| SkillError::InvalidResponse(e.to_string()))
    }

    async fn check_status(response: Response) -> Result<Response, SkillError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status.is_server_error() || status.as_u16() == 429 {
            Err(SkillError::unavailable(format!("HTTP {}: {}", status, body)))
        } else {
            Err(SkillError::InvalidResponse(format!("HTTP {}: {}", status, body)))
        }
    }
}

#[async_trait]
impl SkillHandler for HttpSkillHandler {
    async fn begin(&self, skill_id: &str, turn: &SkillTurn) -> Result<SkillReply, SkillError> {
        self.post(skill_id, "begin", turn).await
    }

    async fn continue_skill(
        &self,
        skill_id: &str,
        turn: &SkillTurn,
    ) -> Result<SkillReply, SkillError> {
        self.post(skill_id, "continue", turn).await
    }
}
