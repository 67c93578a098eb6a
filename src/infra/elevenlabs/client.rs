//! HTTP client for the ElevenLabs batch-calling and outbound-call endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::debug;

use super::{ActiveCallsDecoder, CallPayload, OutboundCallRequest};
use crate::config::AppConfig;
use crate::core::{CapacityOracle, DispatchGateway, DispatchReceipt, SchedulerError};

const API_KEY_HEADER: &str = "xi-api-key";

/// Client implementing both the capacity oracle and the dispatch gateway.
#[derive(Debug, Clone)]
pub struct ElevenLabsClient {
    http: reqwest::Client,
    api_key: String,
    active_calls_url: Option<String>,
    start_call_url: Option<String>,
    decoder: ActiveCallsDecoder,
}

impl ElevenLabsClient {
    /// Create a client with no endpoints configured.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidConfig` if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, SchedulerError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SchedulerError::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            active_calls_url: None,
            start_call_url: None,
            decoder: ActiveCallsDecoder::default(),
        })
    }

    /// Build a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidConfig` if the HTTP client cannot be built.
    pub fn from_config(cfg: &AppConfig) -> Result<Self, SchedulerError> {
        Ok(Self::new(cfg.api_key.clone(), cfg.http_timeout)?
            .with_active_calls_url(cfg.active_calls_url.clone())
            .with_start_call_url(cfg.start_call_url.clone())
            .with_decoder(ActiveCallsDecoder::new(
                &cfg.active_statuses,
                cfg.count_strategy,
            )))
    }

    /// Set the active-calls endpoint. Empty strings disable polling.
    #[must_use]
    pub fn with_active_calls_url(mut self, url: Option<String>) -> Self {
        self.active_calls_url = url.filter(|u| !u.trim().is_empty());
        self
    }

    /// Set the start-call endpoint. Empty strings disable dispatch.
    #[must_use]
    pub fn with_start_call_url(mut self, url: Option<String>) -> Self {
        self.start_call_url = url.filter(|u| !u.trim().is_empty());
        self
    }

    /// Replace the active-count decoder.
    #[must_use]
    pub fn with_decoder(mut self, decoder: ActiveCallsDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    /// Fetch the active-call count.
    ///
    /// # Errors
    ///
    /// Transport failures, non-success statuses and non-JSON bodies.
    pub async fn active_calls_count(&self) -> Result<u64, SchedulerError> {
        let Some(url) = self.active_calls_url.as_deref() else {
            return Ok(0);
        };
        let resp = self
            .http
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(SchedulerError::Status {
                endpoint: "active calls",
                status: resp.status().as_u16(),
            });
        }
        let body: Value = resp.json().await?;
        let count = self.decoder.count(&body);
        debug!(count, "polled active calls");
        Ok(count)
    }

    /// Start one outbound call.
    ///
    /// # Errors
    ///
    /// Missing required payload fields (checked before any request), missing
    /// endpoint, transport failures, non-success statuses, and responses
    /// without any identifier.
    pub async fn start_call(
        &self,
        payload: &CallPayload,
    ) -> Result<DispatchReceipt, SchedulerError> {
        let request = OutboundCallRequest::try_from(payload)?;
        let url = self
            .start_call_url
            .as_deref()
            .ok_or(SchedulerError::NotConfigured("ELEVENLABS_START_CALL_URL"))?;

        let resp = self
            .http
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(SchedulerError::Status {
                endpoint: "start call",
                status: resp.status().as_u16(),
            });
        }
        let body: Value = resp.json().await?;
        receipt_from_response(&body)
    }
}

/// Extract identifiers from a start-call response.
///
/// The conversation id is preferred as tracking id, then the call SID, then
/// any generic id field.
///
/// # Errors
///
/// `SchedulerError::MissingTrackingId` when no identifier is present.
pub fn receipt_from_response(body: &Value) -> Result<DispatchReceipt, SchedulerError> {
    let conversation_id = first_id(body, &["conversation_id", "conversationId"]);
    let call_sid = first_id(body, &["call_sid", "callSid"]);
    let tracking_id = conversation_id
        .clone()
        .or_else(|| call_sid.clone())
        .or_else(|| first_id(body, &["id", "call_id", "callId"]))
        .ok_or(SchedulerError::MissingTrackingId)?;
    Ok(DispatchReceipt {
        tracking_id,
        conversation_id,
        call_sid,
    })
}

fn first_id(body: &Value, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| match body.get(name)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

#[async_trait]
impl CapacityOracle for ElevenLabsClient {
    async fn active_count(&self) -> Result<u64, SchedulerError> {
        self.active_calls_count().await
    }
}

#[async_trait]
impl DispatchGateway<CallPayload> for ElevenLabsClient {
    async fn dispatch(&self, payload: &CallPayload) -> Result<DispatchReceipt, SchedulerError> {
        self.start_call(payload).await
    }
}
