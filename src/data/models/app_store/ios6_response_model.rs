use serde::Deserialize;

use crate::domain::entities::receipt::RESPONSE_SCHEMA_V6;

use super::common::{ExpiresDateModel, OriginalPurchaseDateModel, PurchaseDateModel, RequestDateModel};
use super::ios7_response_model::{
    InAppModel, Ios7ReceiptModel, Ios7ResponseModel, PendingRenewalInfoModel,
};

/// Raw `verifyReceipt` response in the legacy iOS6 (flat, single
/// transaction) format. Never consumed directly: it is bridged into the
/// iOS7 shape so both formats feed one query engine.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ios6ResponseModel {
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub receipt: Ios6ReceiptModel,
    /// A single object in this format, not an array.
    #[serde(default)]
    pub latest_receipt_info: Ios6ReceiptModel,
    #[serde(default)]
    pub latest_receipt: String,
    /// Later servers attach renewal info even to legacy-shaped responses.
    #[serde(default)]
    pub pending_renewal_info: Vec<PendingRenewalInfoModel>,
}

/// The flat legacy receipt. Several fields use legacy names (`bid`,
/// `bvrs`), and the expiry group is laid out differently: the epoch
/// milliseconds live under `expires_date`, the display strings under
/// `expires_date_formatted` / `expires_date_formatted_pst`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ios6ReceiptModel {
    #[serde(default)]
    pub app_item_id: String,
    #[serde(default, rename = "bid")]
    pub bundle_id: String,
    #[serde(default, rename = "bvrs")]
    pub application_version: String,
    #[serde(default)]
    pub original_application_version: String,
    #[serde(default)]
    pub original_transaction_id: String,
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub version_external_identifier: String,
    #[serde(default)]
    pub web_order_line_item_id: String,
    #[serde(default, rename = "expires_date_formatted")]
    pub expires_date: String,
    #[serde(default, rename = "expires_date")]
    pub expires_date_ms: String,
    #[serde(default, rename = "expires_date_formatted_pst")]
    pub expires_date_pst: String,
    #[serde(flatten)]
    pub request_date: RequestDateModel,
    #[serde(flatten)]
    pub purchase_date: PurchaseDateModel,
    #[serde(flatten)]
    pub original_purchase_date: OriginalPurchaseDateModel,
}

impl Ios6ResponseModel {
    /// Bridges the legacy response into the iOS7 shape: the single legacy
    /// transaction becomes the sole `in_app` element, `latest_receipt_info`
    /// becomes a one-element array iff it carries a transaction id, and the
    /// result is tagged with schema version 6. Fields with no legacy
    /// equivalent (`environment`, `receipt_type`, `adam_id`, `download_id`)
    /// stay at their zero values. Never fails: malformed legacy fields
    /// coerce to defaults later, during canonicalization.
    pub fn into_ios7(self) -> Ios7ResponseModel {
        let latest_receipt_info = if self.latest_receipt_info.transaction_id.is_empty() {
            Vec::new()
        } else {
            vec![self.latest_receipt_info.to_in_app()]
        };
        Ios7ResponseModel {
            schema_version: RESPONSE_SCHEMA_V6,
            status: self.status,
            environment: String::new(),
            receipt: self.receipt.into_ios7(),
            latest_receipt_info,
            latest_receipt: self.latest_receipt,
            pending_renewal_info: self.pending_renewal_info,
            is_retryable: false,
        }
    }
}

impl Ios6ReceiptModel {
    fn into_ios7(self) -> Ios7ReceiptModel {
        let in_app = vec![self.to_in_app()];
        Ios7ReceiptModel {
            receipt_type: String::new(),
            adam_id: 0,
            app_item_id: crate::util::to_i64(&self.app_item_id),
            bundle_id: self.bundle_id,
            application_version: self.application_version,
            download_id: 0,
            original_application_version: self.original_application_version,
            in_app,
            request_date: self.request_date,
            original_purchase_date: self.original_purchase_date,
        }
    }

    fn to_in_app(&self) -> InAppModel {
        InAppModel {
            quantity: self.quantity.clone(),
            product_id: self.product_id.clone(),
            transaction_id: self.transaction_id.clone(),
            original_transaction_id: self.original_transaction_id.clone(),
            version_external_identifier: self.version_external_identifier.clone(),
            web_order_line_item_id: self.web_order_line_item_id.clone(),
            purchase_date: self.purchase_date.clone(),
            original_purchase_date: self.original_purchase_date.clone(),
            expires_date: ExpiresDateModel {
                expires_date: self.expires_date.clone(),
                expires_date_ms: self.expires_date_ms.clone(),
                expires_date_pst: self.expires_date_pst.clone(),
            },
            ..Default::default()
        }
    }
}
