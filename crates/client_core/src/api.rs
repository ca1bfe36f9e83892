use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    error::ApiError,
    protocol::{
        CalculationRequest, CalculationResponse, CalculationResult, ChatRequest,
        ChatTurnResponse, ErrorBody, HealthResponse,
    },
};
use tracing::{debug, warn};
use url::Url;

use crate::config::{ClientSettings, Endpoints};

/// The two remote operations a session depends on.
///
/// Implementations never fail past this boundary: every transport, status or
/// decoding problem comes back as an [`ApiError`].
#[async_trait]
pub trait TaxApi: Send + Sync {
    async fn chat(&self, message: &str) -> Result<ChatTurnResponse, ApiError>;
    async fn calculate(&self, request: CalculationRequest)
        -> Result<CalculationResult, ApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpApiClient {
    http: Client,
    endpoints: Endpoints,
}

impl HttpApiClient {
    pub fn new(endpoints: Endpoints) -> Self {
        Self {
            http: Client::new(),
            endpoints,
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        Ok(Self::new(settings.endpoints()?))
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        let response = self
            .http
            .get(self.endpoints.health.clone())
            .send()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;
        let (status, body) = read_success_body(response).await?;
        decode(status, &body)
    }

    async fn post_json<B>(&self, url: &Url, body: &B) -> Result<(u16, String), ApiError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let response = self
            .http
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "api: request failed before response");
                ApiError::transport(e.to_string())
            })?;
        read_success_body(response).await
    }
}

#[async_trait]
impl TaxApi for HttpApiClient {
    async fn chat(&self, message: &str) -> Result<ChatTurnResponse, ApiError> {
        let request = ChatRequest {
            message: message.to_string(),
        };
        let (status, body) = self.post_json(&self.endpoints.chat, &request).await?;
        let response: ChatTurnResponse = decode(status, &body)?;
        debug!(status, ?response, "api: chat turn answered");
        Ok(response)
    }

    async fn calculate(
        &self,
        request: CalculationRequest,
    ) -> Result<CalculationResult, ApiError> {
        let (status, body) = self.post_json(&self.endpoints.calculate, &request).await?;
        let response: CalculationResponse = decode(status, &body)?;
        response.into_result().ok_or_else(|| {
            warn!(status, "api: calculation response missing calculation or explanation");
            ApiError::malformed(
                Some(status),
                "calculation response is missing calculation or explanation",
            )
        })
    }
}

async fn read_success_body(response: Response) -> Result<(u16, String), ApiError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::transport(e.to_string()))?;

    if !status.is_success() {
        let detail = error_detail(status.as_u16(), &body);
        warn!(status = status.as_u16(), %detail, "api: non-success status");
        return Err(ApiError::server(status.as_u16(), detail));
    }

    Ok((status.as_u16(), body))
}

fn decode<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| {
        warn!(status, error = %e, "api: undecodable response body");
        ApiError::malformed(Some(status), format!("invalid response body: {e}"))
    })
}

/// `HTTP status: <code>`, followed by the service's own diagnostic when the
/// body is JSON.
pub(crate) fn error_detail(status: u16, body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return format!("HTTP status: {status}");
    };

    let message = serde_json::from_value::<ErrorBody>(value.clone())
        .ok()
        .and_then(|parsed| parsed.best_message().map(str::to_string))
        .unwrap_or_else(|| value.to_string());
    format!("HTTP status: {status} - {message}")
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
