//! Client for the serverless PDF report function.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use tracing::info;

use neas_core::config::ReportConfig;
use neas_core::error::AppError;
use neas_core::result::AppResult;
use neas_entity::report::{ReportDocument, ReportErrorBody, ReportRequest};

use crate::http::{BackendHttp, read_failure, transport_error};
use crate::identity::HostedIdentityClient;

/// The document-generation service contract.
#[async_trait]
pub trait ReportService: Send + Sync + 'static {
    /// Generate the report described by `request`.
    async fn generate(&self, request: &ReportRequest) -> AppResult<ReportDocument>;
}

/// Requests comparison reports between two versions of a record.
#[derive(Debug, Clone)]
pub struct ReportClient {
    http: BackendHttp,
    identity: Arc<HostedIdentityClient>,
    endpoint: String,
}

impl ReportClient {
    /// Create a report client.
    pub fn new(
        http: BackendHttp,
        identity: Arc<HostedIdentityClient>,
        config: &ReportConfig,
    ) -> Self {
        Self {
            http,
            identity,
            endpoint: config.endpoint.clone(),
        }
    }
}

#[async_trait]
impl ReportService for ReportClient {
    /// The function answers with the document on success and with a JSON
    /// `{"error": ...}` body on failure, sometimes with a 200 status.
    async fn generate(&self, request: &ReportRequest) -> AppResult<ReportDocument> {
        let token = self.identity.access_token();
        let response = self
            .http
            .request(Method::POST, &self.endpoint, token.as_deref())
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error("Report request failed", e))?;

        if !response.status().is_success() {
            let (status, message) = read_failure(response).await;
            return Err(AppError::external_service(format!(
                "Report generation failed ({status}): {message}"
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error("Failed to read report body", e))?;

        if content_type.starts_with("application/json") {
            let message = serde_json::from_slice::<ReportErrorBody>(&bytes)
                .map(|body| body.error)
                .unwrap_or_else(|_| "Unexpected JSON response".to_string());
            return Err(AppError::external_service(format!(
                "Report generation failed: {message}"
            )));
        }

        info!(
            record_id = %request.id,
            version1 = request.version1,
            version2 = request.version2,
            size = bytes.len(),
            "Report generated"
        );
        Ok(ReportDocument {
            content_type,
            bytes,
        })
    }
}
