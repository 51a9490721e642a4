use serde::Deserialize;

use crate::domain::entities::pending_renewal_info::PendingRenewalInfo;
use crate::domain::entities::purchase_record::PurchaseRecord;
use crate::domain::entities::receipt::Receipt;
use crate::util::{to_bool, to_i64, to_timestamp};

use super::common::{
    CancellationDateModel, ExpiresDateModel, OriginalPurchaseDateModel, PurchaseDateModel,
    RequestDateModel,
};

/// Raw `verifyReceipt` response in the iOS7 (multi-transaction) format.
///
/// Every leaf field Apple sends as a string stays a string here; coercion
/// to typed values happens only when building the canonical receipt. All
/// fields default when absent, since Apple omits whatever does not apply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ios7ResponseModel {
    #[serde(default)]
    pub status: i64,
    /// "Sandbox" or "Production". The payload carries no explicit version
    /// discriminator, so a non-empty environment is what marks a response
    /// as genuinely iOS7-shaped.
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub receipt: Ios7ReceiptModel,
    #[serde(default)]
    pub latest_receipt_info: Vec<InAppModel>,
    #[serde(default)]
    pub latest_receipt: String,
    #[serde(default)]
    pub pending_renewal_info: Vec<PendingRenewalInfoModel>,
    #[serde(default)]
    pub is_retryable: bool,
    /// 6 when this model was produced by the legacy bridge; never set by
    /// decoding.
    #[serde(skip)]
    pub(crate) schema_version: u8,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ios7ReceiptModel {
    #[serde(default)]
    pub receipt_type: String,
    #[serde(default)]
    pub adam_id: i64,
    #[serde(default)]
    pub app_item_id: i64,
    #[serde(default)]
    pub bundle_id: String,
    #[serde(default)]
    pub application_version: String,
    #[serde(default)]
    pub download_id: i64,
    #[serde(default)]
    pub original_application_version: String,
    #[serde(default)]
    pub in_app: Vec<InAppModel>,
    #[serde(flatten)]
    pub request_date: RequestDateModel,
    #[serde(flatten)]
    pub original_purchase_date: OriginalPurchaseDateModel,
}

/// One element of `in_app` or `latest_receipt_info`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct InAppModel {
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub original_transaction_id: String,
    #[serde(default)]
    pub is_trial_period: String,
    #[serde(default)]
    pub is_in_intro_offer_period: String,
    #[serde(default)]
    pub app_item_id: String,
    #[serde(default)]
    pub version_external_identifier: String,
    #[serde(default)]
    pub web_order_line_item_id: String,
    #[serde(flatten)]
    pub purchase_date: PurchaseDateModel,
    #[serde(flatten)]
    pub original_purchase_date: OriginalPurchaseDateModel,
    #[serde(flatten)]
    pub expires_date: ExpiresDateModel,
    #[serde(flatten)]
    pub cancellation_date: CancellationDateModel,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct PendingRenewalInfoModel {
    #[serde(default)]
    pub expiration_intent: String,
    #[serde(default)]
    pub auto_renew_product_id: String,
    #[serde(default, rename = "is_in_billing_retry_period")]
    pub retry_flag: String,
    #[serde(default)]
    pub auto_renew_status: String,
    #[serde(default)]
    pub price_consent_status: String,
    #[serde(default)]
    pub product_id: String,
}

impl Ios7ResponseModel {
    /// Normalizes the raw response into the canonical receipt.
    /// `raw_receipt` is the receipt-data string that was submitted, kept
    /// on the receipt for callers that persist or re-verify it.
    pub fn into_receipt(self, raw_receipt: String) -> Receipt {
        let receipt = self.receipt;
        Receipt {
            status: self.status,
            environment: self.environment,
            receipt_type: receipt.receipt_type,
            adam_id: receipt.adam_id,
            app_item_id: receipt.app_item_id,
            bundle_id: receipt.bundle_id,
            application_version: receipt.application_version,
            download_id: receipt.download_id,
            original_application_version: receipt.original_application_version,
            request_date: to_timestamp(&receipt.request_date.request_date_ms),
            original_purchase_date: to_timestamp(
                &receipt.original_purchase_date.original_purchase_date_ms,
            ),
            in_apps: receipt.in_app.into_iter().map(Into::into).collect(),
            latest_receipt_info: self.latest_receipt_info.into_iter().map(Into::into).collect(),
            latest_receipt: self.latest_receipt,
            pending_renewal_info: self
                .pending_renewal_info
                .into_iter()
                .map(Into::into)
                .collect(),
            schema_version: self.schema_version,
            raw_receipt,
        }
    }
}

impl From<InAppModel> for PurchaseRecord {
    fn from(model: InAppModel) -> Self {
        PurchaseRecord {
            quantity: to_i64(&model.quantity),
            product_id: model.product_id,
            transaction_id: to_i64(&model.transaction_id),
            original_transaction_id: to_i64(&model.original_transaction_id),
            is_trial_period: to_bool(&model.is_trial_period),
            app_item_id: to_i64(&model.app_item_id),
            version_external_identifier: to_i64(&model.version_external_identifier),
            web_order_line_item_id: to_i64(&model.web_order_line_item_id),
            purchase_date: to_timestamp(&model.purchase_date.purchase_date_ms),
            original_purchase_date: to_timestamp(
                &model.original_purchase_date.original_purchase_date_ms,
            ),
            expires_date: to_timestamp(&model.expires_date.expires_date_ms),
            cancellation_date: to_timestamp(&model.cancellation_date.cancellation_date_ms),
        }
    }
}

impl From<PendingRenewalInfoModel> for PendingRenewalInfo {
    fn from(model: PendingRenewalInfoModel) -> Self {
        PendingRenewalInfo {
            expiration_intent: to_i64(&model.expiration_intent),
            auto_renew_product_id: model.auto_renew_product_id,
            retry_flag: to_bool(&model.retry_flag),
            auto_renew_status: to_bool(&model.auto_renew_status),
            price_consent_status: to_bool(&model.price_consent_status),
            product_id: model.product_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_and_canonicalizes_straight_through() {
        let body = r#"{
            "status": 0,
            "environment": "Production",
            "receipt": {
                "receipt_type": "Production",
                "adam_id": 123,
                "app_item_id": 900000001,
                "bundle_id": "com.example.app",
                "application_version": "0.1",
                "download_id": 456,
                "original_application_version": "0.1",
                "request_date_ms": "1449532200000",
                "original_purchase_date_ms": "1431214288317",
                "in_app": [{
                    "quantity": "1",
                    "product_id": "com.example.product.item",
                    "transaction_id": "90000000000001",
                    "original_transaction_id": "90000000000001",
                    "is_trial_period": "false",
                    "web_order_line_item_id": "70000000000001",
                    "purchase_date_ms": "1431214285000",
                    "original_purchase_date_ms": "1431214288317",
                    "expires_date_ms": "1433892685000"
                }]
            },
            "latest_receipt": "dummy_latest_receipt",
            "pending_renewal_info": [{
                "auto_renew_product_id": "com.example.product.item",
                "auto_renew_status": "1",
                "product_id": "com.example.product.item",
                "is_in_billing_retry_period": "0"
            }]
        }"#;
        let model: Ios7ResponseModel = serde_json::from_str(body).unwrap();
        let receipt = model.into_receipt("raw".to_string());

        assert_eq!(receipt.status, 0);
        assert_eq!(receipt.environment, "Production");
        assert_eq!(receipt.bundle_id, "com.example.app");
        assert_eq!(receipt.adam_id, 123);
        assert_eq!(receipt.request_date.unwrap().timestamp(), 1449532200);
        assert_eq!(receipt.original_purchase_date.unwrap().timestamp(), 1431214288);
        assert_eq!(receipt.raw_receipt(), "raw");
        assert_eq!(receipt.response_schema_version(), 7);

        assert_eq!(receipt.in_apps.len(), 1);
        let record = &receipt.in_apps[0];
        assert_eq!(record.transaction_id, 90000000000001);
        assert_eq!(record.web_order_line_item_id, 70000000000001);
        assert_eq!(record.quantity, 1);
        assert!(!record.is_trial_period);
        assert_eq!(record.expires_date.unwrap().timestamp(), 1433892685);
        assert_eq!(record.cancellation_date, None);

        assert!(receipt.latest_receipt_info.is_empty());
        assert_eq!(receipt.latest_receipt, "dummy_latest_receipt");
        assert_eq!(receipt.pending_renewal_info.len(), 1);
        let renewal = &receipt.pending_renewal_info[0];
        assert!(renewal.auto_renew_status);
        assert!(!renewal.retry_flag);
    }

    #[test]
    fn malformed_subfields_fall_back_to_zero_values() {
        let model = InAppModel {
            quantity: "not-a-number".to_string(),
            product_id: "p".to_string(),
            transaction_id: String::new(),
            is_trial_period: "maybe".to_string(),
            expires_date: ExpiresDateModel {
                expires_date_ms: "garbage".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let record = PurchaseRecord::from(model);
        assert_eq!(record.quantity, 0);
        assert_eq!(record.transaction_id, 0);
        assert!(!record.is_trial_period);
        assert_eq!(record.expires_date, None);
        assert_eq!(record.product_id, "p");
    }

    #[test]
    fn missing_collections_decode_as_empty() {
        let model: Ios7ResponseModel = serde_json::from_str(r#"{"status": 21003}"#).unwrap();
        let receipt = model.into_receipt(String::new());
        assert_eq!(receipt.status, 21003);
        assert!(receipt.in_apps.is_empty());
        assert!(receipt.latest_receipt_info.is_empty());
        assert!(receipt.pending_renewal_info.is_empty());
    }
}
