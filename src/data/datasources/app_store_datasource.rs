use std::time::Duration;

use async_trait::async_trait;

use crate::constants::{APP_STORE_PRODUCTION_URL, APP_STORE_SANDBOX_URL};
use crate::data::models::app_store::ios6_response_model::Ios6ResponseModel;
use crate::data::models::app_store::ios7_response_model::Ios7ResponseModel;
use crate::data::models::app_store::request_model::VerifyReceiptRequestModel;
use crate::domain::entities::receipt::Receipt;
use crate::errors::AppStoreError;

/// Client configuration for the `verifyReceipt` endpoint. Defaults to the
/// sandbox endpoint with a 5 second timeout.
#[derive(Debug, Clone)]
pub struct AppStoreConfig {
    pub is_production: bool,
    pub timeout: Duration,
}

impl Default for AppStoreConfig {
    fn default() -> Self {
        Self { is_production: false, timeout: Duration::from_secs(5) }
    }
}

#[async_trait]
pub trait AppStoreDatasource: Send + Sync {
    /// Submits the receipt for validation and returns the canonical
    /// receipt.
    ///
    /// The response format is detected at runtime: the iOS7 decode is
    /// trusted only when it yields a non-empty `environment` (the payload
    /// carries no explicit version field); otherwise the legacy iOS6
    /// decode is attempted and bridged. Non-2xx HTTP outcomes are
    /// reported, never swallowed.
    async fn verify_receipt(
        &self,
        request: &VerifyReceiptRequestModel,
    ) -> Result<Receipt, AppStoreError>;
}

pub struct AppStoreDatasourceImpl {
    client: reqwest::Client,
    url: String,
}

impl AppStoreDatasourceImpl {
    pub fn new(config: AppStoreConfig) -> Result<Self, AppStoreError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        let url = if config.is_production {
            APP_STORE_PRODUCTION_URL
        } else {
            APP_STORE_SANDBOX_URL
        };
        Ok(Self { client, url: url.to_string() })
    }
}

#[async_trait]
impl AppStoreDatasource for AppStoreDatasourceImpl {
    async fn verify_receipt(
        &self,
        request: &VerifyReceiptRequestModel,
    ) -> Result<Receipt, AppStoreError> {
        let response = self.client.post(&self.url).json(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                "verifyReceipt returned a non-success HTTP status"
            );
            return Err(AppStoreError::UnexpectedHttpStatus(status.as_u16()));
        }
        let body = response.text().await?;
        decode_receipt(&body, &request.receipt_data)
    }
}

/// Decoded `verifyReceipt` payload, with the format ambiguity resolved
/// once, at the boundary.
enum DecodedResponse {
    Modern(Ios7ResponseModel),
    Legacy(Ios6ResponseModel),
}

/// Decodes a response body into the canonical receipt, sniffing the
/// schema. A body only counts as a decode failure after both the iOS7 and
/// the iOS6 attempt have failed.
pub(crate) fn decode_receipt(body: &str, raw_receipt: &str) -> Result<Receipt, AppStoreError> {
    Ok(match sniff_schema(body)? {
        DecodedResponse::Modern(ios7) => ios7.into_receipt(raw_receipt.to_string()),
        DecodedResponse::Legacy(ios6) => {
            tracing::debug!("verifyReceipt response matched the legacy iOS6 format");
            ios6.into_ios7().into_receipt(raw_receipt.to_string())
        }
    })
}

fn sniff_schema(body: &str) -> Result<DecodedResponse, AppStoreError> {
    if let Ok(ios7) = serde_json::from_str::<Ios7ResponseModel>(body) {
        // An iOS7 decode with an empty environment means the fields
        // merely defaulted; the body is most likely legacy-shaped.
        if !ios7.environment.is_empty() {
            return Ok(DecodedResponse::Modern(ios7));
        }
    }
    serde_json::from_str::<Ios6ResponseModel>(body)
        .map(DecodedResponse::Legacy)
        .map_err(AppStoreError::DecodeFailed)
}
