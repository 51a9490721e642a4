use serde::Serialize;

/// Request body for the `verifyReceipt` endpoint.
///
/// https://developer.apple.com/library/archive/releasenotes/General/ValidateAppStoreReceipt/Chapters/ValidateRemotely.html
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReceiptRequestModel {
    /// The base64-encoded receipt data from the device.
    #[serde(rename = "receipt-data")]
    pub receipt_data: String,
    /// The app's shared secret, required for auto-renewable subscription
    /// receipts. Omitted from the payload entirely when empty.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
}
