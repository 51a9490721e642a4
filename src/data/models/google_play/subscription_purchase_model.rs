use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};

use super::product_purchase_model::PurchaseType;

/// Data structure returned by the Google Play Developer API when querying
/// a subscription purchase.
///
/// https://developers.google.com/android-publisher/api-ref/rest/v3/purchases.subscriptions#SubscriptionPurchase
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPurchaseModel {
    /// This kind represents a subscriptionPurchase object in the
    /// androidpublisher service.
    pub kind: Option<String>,
    /// Time at which the subscription was granted, in epoch milliseconds,
    /// encoded as a string.
    #[serde(default)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub start_time_millis: Option<i64>,
    /// Time at which the subscription will expire, in epoch milliseconds,
    /// encoded as a string.
    #[serde(default)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub expiry_time_millis: Option<i64>,
    /// Whether the subscription will automatically be renewed when it
    /// reaches its current expiry time.
    #[serde(default)]
    pub auto_renewing: bool,
    /// ISO 4217 currency code for the subscription price.
    pub price_currency_code: Option<String>,
    /// Price of the subscription, in micro-units of the currency.
    #[serde(default)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub price_amount_micros: Option<i64>,
    /// ISO 3166-1 alpha-2 billing country code of the user at the time
    /// the subscription was granted.
    pub country_code: Option<String>,
    /// A developer-specified string that contains supplemental information
    /// about an order.
    pub developer_payload: Option<String>,
    /// The payment state of the subscription. Not present for canceled,
    /// expired subscriptions.
    pub payment_state: Option<i64>,
    /// The reason why a subscription was canceled or is not auto-renewing.
    pub cancel_reason: Option<i64>,
    /// The time at which the subscription was canceled by the user, in
    /// epoch milliseconds. Only present if `cancel_reason` is 0.
    #[serde(default)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub user_cancellation_time_millis: Option<i64>,
    /// The order id of the latest recurring order associated with the
    /// purchase of the subscription.
    pub order_id: Option<String>,
    /// The purchase token of the originating purchase if this subscription
    /// is one of: re-signup of a canceled but non-lapsed subscription, or
    /// upgrade/downgrade from a previous subscription.
    pub linked_purchase_token: Option<String>,
    /// Only set if this purchase was not made using the standard in-app
    /// billing flow.
    pub purchase_type: Option<PurchaseType>,
}

impl SubscriptionPurchaseModel {
    /// Whether the subscription has active recurring status.
    pub fn is_active(&self) -> bool {
        self.auto_renewing
    }

    /// Whether the subscription lapsed strictly before `now`. The
    /// reference instant is an explicit parameter so callers (and tests)
    /// control the clock. A response without an expiry is never expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expiry_time_millis {
            Some(ms) => ms < now.timestamp_millis(),
            None => false,
        }
    }

    /// Expiry truncated to whole seconds, matching the canonical receipt
    /// model's precision.
    pub fn expiry_time(&self) -> Option<DateTime<Utc>> {
        self.expiry_time_millis
            .and_then(|ms| DateTime::<Utc>::from_timestamp(ms / 1000, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn decodes_active_subscription() {
        let body = r#"{
            "kind": "androidpublisher#subscriptionPurchase",
            "startTimeMillis": "1431214285000",
            "expiryTimeMillis": "1433892685000",
            "autoRenewing": true,
            "priceCurrencyCode": "USD",
            "priceAmountMicros": "990000",
            "countryCode": "US",
            "orderId": "GPA.1234-5678-9012-34567",
            "paymentState": 1
        }"#;
        let model: SubscriptionPurchaseModel = serde_json::from_str(body).unwrap();
        assert!(model.is_active());
        assert_eq!(model.price_amount_micros, Some(990000));
        assert_eq!(model.expiry_time().unwrap().timestamp(), 1433892685);
    }

    #[test]
    fn expiry_is_relative_to_the_injected_clock() {
        let model = SubscriptionPurchaseModel {
            expiry_time_millis: Some(1433892685000),
            ..Default::default()
        };
        let before = Utc.timestamp_opt(1433892684, 0).unwrap();
        let after = Utc.timestamp_opt(1433892686, 0).unwrap();
        assert!(!model.is_expired(before));
        assert!(model.is_expired(after));
        // Equal instants are not yet expired.
        let exact = Utc.timestamp_opt(1433892685, 0).unwrap();
        assert!(!model.is_expired(exact));
    }

    #[test]
    fn missing_expiry_never_expires() {
        let model = SubscriptionPurchaseModel::default();
        assert!(!model.is_expired(Utc.timestamp_opt(2_000_000_000, 0).unwrap()));
    }
}
