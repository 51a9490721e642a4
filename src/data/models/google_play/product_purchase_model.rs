use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_repr::Deserialize_repr;
use serde_with::{serde_as, DisplayFromStr};

/// Data structure returned by the Google Play Developer API when querying
/// a one-time product purchase.
///
/// https://developers.google.com/android-publisher/api-ref/rest/v3/purchases.products#ProductPurchase
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPurchaseModel {
    /// This kind represents an inappPurchase object in the
    /// androidpublisher service.
    pub kind: Option<String>,
    /// The time the product was purchased, in milliseconds since the
    /// epoch, encoded as a string.
    #[serde(default)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub purchase_time_millis: Option<i64>,
    /// The purchase state of the order.
    pub purchase_state: PurchaseState,
    /// The consumption state of the inapp product.
    pub consumption_state: ConsumptionState,
    /// A developer-specified string that contains supplemental information
    /// about an order.
    pub developer_payload: Option<String>,
    /// The order id associated with the purchase of the inapp product.
    pub order_id: Option<String>,
    /// Only set if this purchase was not made using the standard in-app
    /// billing flow.
    pub purchase_type: Option<PurchaseType>,
}

#[derive(Debug, Clone, Copy, Deserialize_repr, PartialEq, Eq)]
#[repr(u8)]
pub enum PurchaseState {
    Purchased = 0,
    Canceled = 1,
    Pending = 2,
}

#[derive(Debug, Clone, Copy, Deserialize_repr, PartialEq, Eq)]
#[repr(u8)]
pub enum ConsumptionState {
    YetToBeConsumed = 0,
    Consumed = 1,
}

#[derive(Debug, Clone, Copy, Deserialize_repr, PartialEq, Eq)]
#[repr(u8)]
pub enum PurchaseType {
    Test = 0,
    Promo = 1,
    Rewarded = 2,
}

impl ProductPurchaseModel {
    /// The purchase token is valid iff the order is in the purchased
    /// state.
    pub fn is_valid(&self) -> bool {
        self.purchase_state == PurchaseState::Purchased
    }

    pub fn purchase_time(&self) -> Option<DateTime<Utc>> {
        self.purchase_time_millis
            .and_then(|ms| DateTime::<Utc>::from_timestamp(ms / 1000, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_purchased_product() {
        let body = r#"{
            "kind": "androidpublisher#productPurchase",
            "purchaseTimeMillis": "1433892685123",
            "purchaseState": 0,
            "consumptionState": 1,
            "developerPayload": "payload",
            "orderId": "GPA.1234-5678-9012-34567"
        }"#;
        let model: ProductPurchaseModel = serde_json::from_str(body).unwrap();
        assert!(model.is_valid());
        assert_eq!(model.consumption_state, ConsumptionState::Consumed);
        assert_eq!(model.purchase_time().unwrap().timestamp(), 1433892685);
        assert_eq!(model.purchase_type, None);
    }

    #[test]
    fn canceled_and_pending_purchases_are_invalid() {
        let body = r#"{"purchaseState": 1, "consumptionState": 0}"#;
        let model: ProductPurchaseModel = serde_json::from_str(body).unwrap();
        assert!(!model.is_valid());

        let body = r#"{"purchaseState": 2, "consumptionState": 0, "purchaseType": 0}"#;
        let model: ProductPurchaseModel = serde_json::from_str(body).unwrap();
        assert!(!model.is_valid());
        assert_eq!(model.purchase_type, Some(PurchaseType::Test));
    }
}
