//! ServiceNow Table API backend.
//!
//! Work items are incidents addressed by `sys_id`; candidates are users
//! addressed by `sys_id`.

use super::{CommitResult, OpenItem, TicketingError, TicketingSystem};
use crate::config::ServiceNowConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

const INCIDENT_TABLE: &str = "/api/now/table/incident";

/// Incident state set on commit ("In Progress")
const STATE_IN_PROGRESS: &str = "2";

/// Maximum open incidents fetched per candidate
const OPEN_ITEMS_LIMIT: u32 = 200;

#[derive(Deserialize)]
struct SingleResult {
    result: Value,
}

#[derive(Deserialize)]
struct ListResult {
    result: Vec<IncidentRow>,
}

#[derive(Deserialize)]
struct IncidentRow {
    sys_id: String,
    #[serde(default)]
    priority: Option<String>,
}

/// Ticketing backend speaking the ServiceNow REST Table API.
pub struct ServiceNowTicketing {
    base_url: String,
    username: String,
    password: String,
    client: Client,
    timeout: Duration,
}

impl ServiceNowTicketing {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TicketingError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TicketingError::Configuration(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
            client,
            timeout,
        })
    }

    /// Build a client from configuration, reading the password from the
    /// environment variable named by `password_env`.
    pub fn from_config(config: &ServiceNowConfig, timeout: Duration) -> Result<Self, TicketingError> {
        let password = std::env::var(&config.password_env).map_err(|_| {
            TicketingError::Configuration(format!(
                "environment variable {} is not set",
                config.password_env
            ))
        })?;
        Self::new(&config.instance_url, &config.username, password, timeout)
    }

    fn map_send_error(&self, e: reqwest::Error) -> TicketingError {
        if e.is_timeout() {
            TicketingError::Timeout(self.timeout.as_millis() as u64)
        } else {
            TicketingError::Network(e.to_string())
        }
    }

    async fn upstream_error(response: reqwest::Response) -> TicketingError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "no response body".to_string());
        TicketingError::Upstream { status, message }
    }

    /// Extract a reference field that may be `""`, a string, or `{"value": ...}`
    fn reference_value(field: Option<&Value>) -> Option<String> {
        let raw = match field? {
            Value::String(s) => s.clone(),
            Value::Object(map) => map.get("value")?.as_str()?.to_string(),
            _ => return None,
        };
        if raw.is_empty() {
            None
        } else {
            Some(raw)
        }
    }
}

#[async_trait]
impl TicketingSystem for ServiceNowTicketing {
    async fn get_holder(&self, item_id: &str) -> Result<Option<String>, TicketingError> {
        let url = format!("{}{}/{}", self.base_url, INCIDENT_TABLE, item_id);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .query(&[("sysparm_fields", "sys_id,number,assigned_to")])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(TicketingError::NotFound(item_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(Self::upstream_error(response).await);
        }

        let body: SingleResult = response.json().await.map_err(|e| {
            TicketingError::InvalidResponse(format!("Failed to parse incident: {}", e))
        })?;

        Ok(Self::reference_value(body.result.get("assigned_to")))
    }

    async fn commit_assignment(
        &self,
        item_id: &str,
        candidate_id: &str,
    ) -> Result<CommitResult, TicketingError> {
        let url = format!("{}{}/{}", self.base_url, INCIDENT_TABLE, item_id);
        let payload = json!({
            "assigned_to": candidate_id,
            "state": STATE_IN_PROGRESS,
            "work_notes": format!(
                "Auto-assigned by assignd at {}",
                chrono::Utc::now().to_rfc3339()
            ),
        });

        let response = self
            .client
            .patch(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Accept", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        match response.status() {
            s if s.is_success() => Ok(CommitResult::Committed),
            StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => {
                Ok(CommitResult::Conflict { holder: None })
            }
            StatusCode::NOT_FOUND => Err(TicketingError::NotFound(item_id.to_string())),
            _ => Err(Self::upstream_error(response).await),
        }
    }

    async fn list_open_items(&self, candidate_id: &str) -> Result<Vec<OpenItem>, TicketingError> {
        let url = format!("{}{}", self.base_url, INCIDENT_TABLE);
        let query = format!("assigned_to={}^active=true", candidate_id);
        let limit = OPEN_ITEMS_LIMIT.to_string();

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .query(&[
                ("sysparm_query", query.as_str()),
                ("sysparm_fields", "sys_id,number,priority"),
                ("sysparm_limit", limit.as_str()),
            ])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            return Err(Self::upstream_error(response).await);
        }

        let body: ListResult = response.json().await.map_err(|e| {
            TicketingError::InvalidResponse(format!("Failed to parse incident list: {}", e))
        })?;

        Ok(body
            .result
            .into_iter()
            .map(|row| OpenItem {
                id: row.sys_id,
                priority: row.priority.and_then(|p| p.trim().parse().ok()),
            })
            .collect())
    }

    async fn health_check(&self) -> Result<(), TicketingError> {
        let url = format!("{}{}", self.base_url, INCIDENT_TABLE);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .query(&[("sysparm_limit", "1"), ("sysparm_fields", "sys_id")])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::upstream_error(response).await)
        }
    }
}
