use serde::Deserialize;

/// Apple reports every date three ways: a display string, epoch
/// milliseconds, and a Pacific-time display string. Only the
/// milliseconds field is used for canonicalization; the others are
/// decoded for completeness.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct RequestDateModel {
    #[serde(default)]
    pub request_date: String,
    #[serde(default)]
    pub request_date_ms: String,
    #[serde(default)]
    pub request_date_pst: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct PurchaseDateModel {
    #[serde(default)]
    pub purchase_date: String,
    #[serde(default)]
    pub purchase_date_ms: String,
    #[serde(default)]
    pub purchase_date_pst: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct OriginalPurchaseDateModel {
    #[serde(default)]
    pub original_purchase_date: String,
    #[serde(default)]
    pub original_purchase_date_ms: String,
    #[serde(default)]
    pub original_purchase_date_pst: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ExpiresDateModel {
    #[serde(default)]
    pub expires_date: String,
    #[serde(default)]
    pub expires_date_ms: String,
    #[serde(default)]
    pub expires_date_pst: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct CancellationDateModel {
    #[serde(default)]
    pub cancellation_date: String,
    #[serde(default)]
    pub cancellation_date_ms: String,
    #[serde(default)]
    pub cancellation_date_pst: String,
}
