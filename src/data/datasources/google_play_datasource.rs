use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use yup_oauth2::{parse_service_account_key, ServiceAccountAuthenticator};

use crate::constants::{ANDROID_PUBLISHER_BASE_URL, ANDROID_PUBLISHER_SCOPE};
use crate::data::models::google_play::product_purchase_model::ProductPurchaseModel;
use crate::data::models::google_play::subscription_purchase_model::SubscriptionPurchaseModel;
use crate::errors::GooglePlayError;

#[async_trait]
pub trait GooglePlayDatasource: Send + Sync {
    /// purchases.products.get:
    /// https://developers.google.com/android-publisher/api-ref/rest/v3/purchases.products/get
    ///
    /// packageName:
    ///   The package name of the application the inapp product was sold in
    ///   (for example, 'com.some.thing').
    /// productId:
    ///   The inapp product SKU (for example, 'com.some.thing.inapp1').
    /// token:
    ///   The token provided to the user's device when the inapp product
    ///   was purchased.
    async fn get_product_purchase(
        &self,
        package_name: &str,
        product_id: &str,
        token: &str,
    ) -> Result<ProductPurchaseModel, GooglePlayError>;

    /// purchases.subscriptions.get:
    /// https://developers.google.com/android-publisher/api-ref/rest/v3/purchases.subscriptions/get
    ///
    /// packageName:
    ///   The package of the application for which this subscription was
    ///   purchased (for example, 'com.some.thing').
    /// subscriptionId:
    ///   The purchased subscription ID (for example, 'monthly001').
    /// token:
    ///   The token provided to the user's device when the subscription was
    ///   purchased.
    async fn get_subscription_purchase(
        &self,
        package_name: &str,
        subscription_id: &str,
        token: &str,
    ) -> Result<SubscriptionPurchaseModel, GooglePlayError>;
}

pub struct GooglePlayDatasourceImpl {
    client: reqwest::Client,
    access_token: String,
}

#[async_trait]
impl GooglePlayDatasource for GooglePlayDatasourceImpl {
    async fn get_product_purchase(
        &self,
        package_name: &str,
        product_id: &str,
        token: &str,
    ) -> Result<ProductPurchaseModel, GooglePlayError> {
        let url = format!(
            "{ANDROID_PUBLISHER_BASE_URL}/applications/{package_name}/purchases/products/{product_id}/tokens/{token}"
        );
        self.callout(&url, "purchases.products.get").await
    }

    async fn get_subscription_purchase(
        &self,
        package_name: &str,
        subscription_id: &str,
        token: &str,
    ) -> Result<SubscriptionPurchaseModel, GooglePlayError> {
        let url = format!(
            "{ANDROID_PUBLISHER_BASE_URL}/applications/{package_name}/purchases/subscriptions/{subscription_id}/tokens/{token}"
        );
        self.callout(&url, "purchases.subscriptions.get").await
    }
}

impl GooglePlayDatasourceImpl {
    /// `service_account_key` is the contents of the JSON key file for a
    /// service account with access to the androidpublisher API.
    pub async fn new(service_account_key: &str) -> Result<Self, GooglePlayError> {
        Ok(Self {
            client: reqwest::Client::new(),
            access_token: Self::build_access_token(service_account_key).await?,
        })
    }

    async fn build_access_token(service_account_key: &str) -> Result<String, GooglePlayError> {
        let key = parse_service_account_key(service_account_key).map_err(|e| {
            GooglePlayError::Credentials(format!("service account key could not be parsed: {e}"))
        })?;
        let authenticator = ServiceAccountAuthenticator::builder(key).build().await.map_err(|e| {
            GooglePlayError::Credentials(format!("authenticator could not be built: {e}"))
        })?;

        let scopes = &[ANDROID_PUBLISHER_SCOPE];
        authenticator
            .token(scopes)
            .await
            .map_err(|e| GooglePlayError::Credentials(format!("token could not be obtained: {e}")))?
            .token()
            .map(str::to_string)
            .ok_or(GooglePlayError::Credentials("access token is empty".to_string()))
    }

    async fn callout<T: DeserializeOwned>(
        &self,
        url: &str,
        function_name: &str,
    ) -> Result<T, GooglePlayError> {
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.access_token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                function = function_name,
                status = status.as_u16(),
                "androidpublisher callout failed"
            );
            return Err(api_error(status.as_u16(), &body));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(GooglePlayError::DecodeFailed)
    }
}

/// Parses Google's error envelope into a classifiable API error. A body
/// that is not the envelope (or not JSON) yields an error with no reason
/// strings; the HTTP status alone still classifies 410s.
fn api_error(code: u16, body: &str) -> GooglePlayError {
    #[derive(Debug, Default, Deserialize)]
    struct ErrorEnvelopeModel {
        #[serde(default)]
        error: ErrorBodyModel,
    }
    #[derive(Debug, Default, Deserialize)]
    struct ErrorBodyModel {
        #[serde(default)]
        errors: Vec<ErrorItemModel>,
    }
    #[derive(Debug, Default, Deserialize)]
    struct ErrorItemModel {
        #[serde(default)]
        reason: String,
    }

    let reasons = serde_json::from_str::<ErrorEnvelopeModel>(body)
        .map(|envelope| envelope.error.errors.into_iter().map(|item| item.reason).collect())
        .unwrap_or_default();
    GooglePlayError::Api { code, reasons }
}
