//! Campaign API client.
//!
//! One method per remote operation; each call attaches the current bearer
//! token (when present) and maps the HTTP status onto the typed error
//! taxonomy. Retries are deliberately absent here - the sync engine owns
//! retry policy.

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::sync::Arc;
use std::time::Duration;

use doorstep_core::assignments::{Assignment, AssignmentStatus};
use doorstep_core::contact_logs::ContactLog;
use doorstep_core::secrets::TokenProvider;
use doorstep_core::sync::REMOTE_REQUEST_TIMEOUT_SECS;
use doorstep_core::voters::Voter;

use crate::error::{ApiError, Result};
use crate::types::*;

const MAX_LOG_BODY_CHARS: usize = 512;

/// Remote operations consumed by the sync engine and the cache facade.
///
/// Implemented by [`CanvassApiClient`]; tests substitute fakes.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn list_assignments(&self) -> Result<Vec<Assignment>>;

    /// Single assignment including its ordered walk list.
    async fn get_assignment(&self, assignment_id: &str) -> Result<Assignment>;

    async fn update_assignment_status(
        &self,
        assignment_id: &str,
        status: AssignmentStatus,
    ) -> Result<Assignment>;

    async fn get_voter(&self, voter_id: &str) -> Result<Voter>;

    async fn list_voters(&self, filter: &VoterFilter) -> Result<Vec<Voter>>;

    /// Deliver one contact log.
    ///
    /// Safe to call repeatedly with the same log id: the id is the
    /// idempotency key and the server is expected to dedupe on it. Against
    /// a server that does not, at-least-once delivery can create duplicate
    /// records - a deployment concern, not something this client can hide.
    async fn create_contact_log(&self, log: &ContactLog) -> Result<ContactLog>;

    async fn list_contact_logs(&self, filter: &ContactLogFilter) -> Result<Vec<ContactLog>>;
}

/// Client for the campaign REST API.
#[derive(Clone)]
pub struct CanvassApiClient {
    client: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl CanvassApiClient {
    /// Create a new API client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the campaign API (e.g. "https://api.example.org")
    /// * `tokens` - Source of the current bearer token
    pub fn new(base_url: &str, tokens: Arc<dyn TokenProvider>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REMOTE_REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    /// Create headers for an API request, attaching the bearer token when
    /// one is available.
    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = self.tokens.access_token() {
            let auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ApiError::invalid_request("Invalid access token format"))?;
            headers.insert(AUTHORIZATION, auth_value);
        }

        Ok(headers)
    }

    fn log_response(status: reqwest::StatusCode, body: &str) {
        if status.is_success() {
            debug!("API response status: {}", status);
            return;
        }

        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        debug!("API response error ({}): {}", status, preview);
    }

    fn error_for_status(status: reqwest::StatusCode, body: String) -> ApiError {
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden,
            404 => ApiError::NotFound,
            400 | 422 => ApiError::Validation {
                status: status.as_u16(),
                body,
            },
            code @ 500..=599 => ApiError::Server(code),
            code => {
                if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(&body) {
                    if let Some(detail) = parsed.detail {
                        return ApiError::api(code, detail);
                    }
                }
                ApiError::api(code, format!("Request failed: {}", body))
            }
        }
    }

    /// Parse a JSON response body.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);

        if !status.is_success() {
            return Err(Self::error_for_status(status, body));
        }

        serde_json::from_str(&body).map_err(|e| {
            log::error!(
                "Failed to deserialize response. Body: {}, Error: {}",
                body,
                e
            );
            ApiError::Json(e)
        })
    }
}

#[async_trait]
impl RemoteApi for CanvassApiClient {
    // ─────────────────────────────────────────────────────────────────────
    // Assignments
    // ─────────────────────────────────────────────────────────────────────

    /// GET /assignments
    async fn list_assignments(&self) -> Result<Vec<Assignment>> {
        let url = format!("{}/assignments", self.base_url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await?;

        let envelope: AssignmentsResponse = Self::parse_response(response).await?;
        Ok(envelope.assignments)
    }

    /// GET /assignments/{id}
    async fn get_assignment(&self, assignment_id: &str) -> Result<Assignment> {
        let url = format!("{}/assignments/{}", self.base_url, assignment_id);

        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// PATCH /assignments/{id}
    async fn update_assignment_status(
        &self,
        assignment_id: &str,
        status: AssignmentStatus,
    ) -> Result<Assignment> {
        let url = format!("{}/assignments/{}", self.base_url, assignment_id);

        let response = self
            .client
            .patch(&url)
            .headers(self.headers()?)
            .json(&UpdateAssignmentStatusRequest { status })
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ─────────────────────────────────────────────────────────────────────
    // Voters
    // ─────────────────────────────────────────────────────────────────────

    /// GET /voters/{id}
    async fn get_voter(&self, voter_id: &str) -> Result<Voter> {
        let url = format!("{}/voters/{}", self.base_url, voter_id);

        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// GET /voters?zip&limit&offset
    async fn list_voters(&self, filter: &VoterFilter) -> Result<Vec<Voter>> {
        let url = format!("{}/voters", self.base_url);
        let mut query: Vec<(&str, String)> = vec![
            ("limit", filter.limit.to_string()),
            ("offset", filter.offset.to_string()),
        ];
        if let Some(zip) = &filter.zip {
            query.push(("zip", zip.clone()));
        }

        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .query(&query)
            .send()
            .await?;

        let envelope: VotersResponse = Self::parse_response(response).await?;
        Ok(envelope.voters)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Contact Logs
    // ─────────────────────────────────────────────────────────────────────

    /// POST /contact-logs
    async fn create_contact_log(&self, log: &ContactLog) -> Result<ContactLog> {
        let url = format!("{}/contact-logs", self.base_url);
        debug!("Submitting contact log {}", log.id);

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&CreateContactLogRequest::from(log))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// GET /contact-logs?assignment_id&start_date
    async fn list_contact_logs(&self, filter: &ContactLogFilter) -> Result<Vec<ContactLog>> {
        let url = format!("{}/contact-logs", self.base_url);
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(assignment_id) = &filter.assignment_id {
            query.push(("assignment_id", assignment_id.clone()));
        }
        if let Some(start_date) = &filter.start_date {
            query.push(("start_date", start_date.to_rfc3339()));
        }

        let mut request = self.client.get(&url).headers(self.headers()?);
        if !query.is_empty() {
            request = request.query(&query);
        }
        let response = request.send().await?;

        let envelope: ContactLogsResponse = Self::parse_response(response).await?;
        Ok(envelope.logs)
    }
}
