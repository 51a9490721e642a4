use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::errors::{self, AppStoreError};

use super::pending_renewal_info::{auto_renew_status_for, PendingRenewalInfo};
use super::purchase_record::{best_match, PurchaseRecord, SelectionPolicy};

pub const RESPONSE_SCHEMA_V6: u8 = 6;
pub const RESPONSE_SCHEMA_V7: u8 = 7;

/// The unified, vendor-agnostic receipt: one canonical representation for
/// both Apple response schemas, built exactly once per vendor call and
/// immutable thereafter.
///
/// `in_apps` preserves the vendor's `in_app` array order (roughly
/// chronological purchase history); `latest_receipt_info` preserves the
/// vendor's chronological order for that collection, which may diverge
/// from `in_apps`. The same physical transaction may legitimately appear
/// in both; deduplication is the query engine's job, not the model's.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Receipt {
    pub status: i64,
    /// "Sandbox" or "Production"; empty for bridged legacy responses,
    /// which never carried the field.
    pub environment: String,
    pub receipt_type: String,
    pub adam_id: i64,
    pub app_item_id: i64,
    pub bundle_id: String,
    pub application_version: String,
    pub download_id: i64,
    pub original_application_version: String,
    pub request_date: Option<DateTime<Utc>>,
    pub original_purchase_date: Option<DateTime<Utc>>,
    pub in_apps: Vec<PurchaseRecord>,
    pub latest_receipt_info: Vec<PurchaseRecord>,
    /// The vendor's re-signed latest receipt blob, passed through opaque.
    pub latest_receipt: String,
    pub pending_renewal_info: Vec<PendingRenewalInfo>,
    pub(crate) schema_version: u8,
    pub(crate) raw_receipt: String,
}

impl Receipt {
    /// The receipt-data string that was submitted for verification.
    pub fn raw_receipt(&self) -> &str {
        &self.raw_receipt
    }

    /// Which Apple response schema this receipt came from: 6 for bridged
    /// legacy responses, otherwise 7.
    pub fn response_schema_version(&self) -> u8 {
        if self.schema_version == 0 {
            RESPONSE_SCHEMA_V7
        } else {
            self.schema_version
        }
    }

    /// A receipt is valid iff the vendor reported status 0.
    pub fn is_valid(&self) -> bool {
        self.status == 0
    }

    /// Status 21006 is Apple's "valid receipt, but the auto-renewable
    /// subscription has expired". Kept distinct from validity; it is also
    /// not an error in the status taxonomy.
    pub fn has_expired(&self) -> bool {
        self.status == 21006
    }

    /// The documented failure for this receipt's status code, if any.
    pub fn status_error(&self) -> Option<AppStoreError> {
        errors::status_error(self.status)
    }

    /// Whether every purchase record is an auto-renewable subscription
    /// transaction, i.e. carries an expiry. A single non-expiring record
    /// disqualifies the whole set, and so does an empty set: a receipt
    /// with no transactions is no evidence of a subscription.
    pub fn is_auto_renewable(&self) -> bool {
        !self.in_apps.is_empty() && self.in_apps.iter().all(|r| r.expires_date.is_some())
    }

    /// First `in_apps` record with the given transaction id.
    pub fn find_by_transaction_id(&self, transaction_id: i64) -> Option<&PurchaseRecord> {
        self.in_apps.iter().find(|r| r.transaction_id == transaction_id)
    }

    /// `in_apps` records for the given product, original order preserved.
    pub fn in_apps_by_product(&self, product_id: &str) -> Vec<&PurchaseRecord> {
        self.in_apps.iter().filter(|r| r.product_id == product_id).collect()
    }

    /// All transaction ids from `in_apps`, in order.
    pub fn transaction_ids(&self) -> Vec<i64> {
        self.in_apps.iter().map(|r| r.transaction_id).collect()
    }

    /// Transaction ids for a product across both collections. The current
    /// `latest_receipt_info` record (last matching element) is resolved
    /// first and claims its id; `in_apps` is then scanned in order,
    /// skipping ids already claimed. An id whose first `in_apps`
    /// occurrence fails the product filter stays claimed and is not
    /// revisited.
    pub fn transaction_ids_by_product(&self, product_id: &str) -> Vec<i64> {
        let mut claimed = HashSet::new();
        let mut matched = Vec::new();
        if let Some(latest) = best_match(
            &self.latest_receipt_info,
            SelectionPolicy::LastPosition,
            |r| r.product_id == product_id,
        ) {
            claimed.insert(latest.transaction_id);
            matched.push(latest.transaction_id);
        }
        for record in &self.in_apps {
            if !claimed.insert(record.transaction_id) {
                continue;
            }
            if record.product_id != product_id {
                continue;
            }
            matched.push(record.transaction_id);
        }
        matched
    }

    /// All transaction ids across both collections whose records have not
    /// expired as of `now`. A record with no expiry never expires. The
    /// reference instant is an explicit parameter so callers (and tests)
    /// control the clock.
    pub fn transaction_ids_excluding_expired(&self, now: DateTime<Utc>) -> Vec<i64> {
        self.unexpired_transaction_ids(now, |_| true)
    }

    /// As [`Self::transaction_ids_excluding_expired`], additionally
    /// filtered by product.
    pub fn transaction_ids_by_product_excluding_expired(
        &self,
        product_id: &str,
        now: DateTime<Utc>,
    ) -> Vec<i64> {
        self.unexpired_transaction_ids(now, |r| r.product_id == product_id)
    }

    fn unexpired_transaction_ids<F>(&self, now: DateTime<Utc>, matches: F) -> Vec<i64>
    where
        F: Fn(&PurchaseRecord) -> bool,
    {
        let mut checked = HashSet::new();
        let mut matched = Vec::new();
        for record in self.in_apps.iter().chain(&self.latest_receipt_info) {
            if !checked.insert(record.transaction_id) {
                continue;
            }
            if !matches(record) {
                continue;
            }
            if let Some(expires) = record.expires_date {
                if expires < now {
                    continue;
                }
            }
            matched.push(record.transaction_id);
        }
        matched
    }

    /// The record with the latest expiry for a product, resolved across
    /// both collections: max-by-expiry over matching `in_apps` versus the
    /// last matching `latest_receipt_info` element. The later expiry wins;
    /// on an exact tie the `latest_receipt_info` candidate wins.
    pub fn last_expires_by_product(&self, product_id: &str) -> Option<&PurchaseRecord> {
        self.last_expires(|r| r.product_id == product_id)
    }

    /// As [`Self::last_expires_by_product`], keyed by membership in a set
    /// of transaction ids instead of a product id.
    pub fn last_expires_by_transaction_ids(&self, ids: &[i64]) -> Option<&PurchaseRecord> {
        let ids: HashSet<i64> = ids.iter().copied().collect();
        self.last_expires(|r| ids.contains(&r.transaction_id))
    }

    fn last_expires<F>(&self, matches: F) -> Option<&PurchaseRecord>
    where
        F: Fn(&PurchaseRecord) -> bool + Copy,
    {
        let from_latest =
            best_match(&self.latest_receipt_info, SelectionPolicy::LastPosition, matches);
        let from_in_apps = best_match(&self.in_apps, SelectionPolicy::MaxExpiry, matches);
        match (from_in_apps, from_latest) {
            (None, latest) => latest,
            (in_app, None) => in_app,
            (Some(in_app), Some(latest)) => {
                if in_app.expires_date > latest.expires_date {
                    Some(in_app)
                } else {
                    Some(latest)
                }
            }
        }
    }

    /// Whether auto-renewal is currently on for the product, per the
    /// pending renewal info (joined by `auto_renew_product_id`).
    pub fn is_auto_renew_status_on(&self, product_id: &str) -> bool {
        auto_renew_status_for(&self.pending_renewal_info, product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn record(transaction_id: i64, product_id: &str, expires_secs: Option<i64>) -> PurchaseRecord {
        PurchaseRecord {
            transaction_id,
            product_id: product_id.to_string(),
            expires_date: expires_secs.map(at),
            ..Default::default()
        }
    }

    fn subscription_receipt() -> Receipt {
        Receipt {
            status: 0,
            in_apps: vec![
                record(1, "sub", Some(100)),
                record(2, "sub", Some(300)),
                record(3, "other", Some(200)),
            ],
            latest_receipt_info: vec![record(2, "sub", Some(300)), record(4, "sub", Some(400))],
            ..Default::default()
        }
    }

    #[test]
    fn schema_version_defaults_to_v7() {
        let receipt = Receipt::default();
        assert_eq!(receipt.response_schema_version(), RESPONSE_SCHEMA_V7);
        let bridged = Receipt { schema_version: RESPONSE_SCHEMA_V6, ..Default::default() };
        assert_eq!(bridged.response_schema_version(), RESPONSE_SCHEMA_V6);
    }

    #[test]
    fn validity_and_expiry_predicates_are_distinct() {
        let expired = Receipt { status: 21006, ..Default::default() };
        assert!(expired.has_expired());
        assert!(!expired.is_valid());
        assert!(expired.status_error().is_none());

        let valid = Receipt { status: 0, ..Default::default() };
        assert!(valid.is_valid());
        assert!(!valid.has_expired());
        assert!(valid.status_error().is_none());

        let rejected = Receipt { status: 21003, ..Default::default() };
        assert!(!rejected.is_valid());
        assert!(rejected.status_error().is_some());
    }

    #[test]
    fn auto_renewable_requires_every_record_to_expire() {
        let all_expiring = Receipt {
            in_apps: vec![record(1, "sub", Some(100)), record(2, "sub", Some(200))],
            ..Default::default()
        };
        assert!(all_expiring.is_auto_renewable());

        let one_without = Receipt {
            in_apps: vec![record(1, "sub", Some(100)), record(2, "consumable", None)],
            ..Default::default()
        };
        assert!(!one_without.is_auto_renewable());
    }

    #[test]
    fn auto_renewable_is_false_for_empty_receipt() {
        // Pinned decision: no transactions means no evidence of an
        // auto-renewable subscription.
        assert!(!Receipt::default().is_auto_renewable());
    }

    #[test]
    fn find_by_transaction_id_scans_in_apps_only() {
        let receipt = subscription_receipt();
        assert_eq!(receipt.find_by_transaction_id(3).unwrap().product_id, "other");
        // Id 4 exists only in latest_receipt_info.
        assert!(receipt.find_by_transaction_id(4).is_none());
        assert!(receipt.find_by_transaction_id(99).is_none());
    }

    #[test]
    fn in_apps_by_product_preserves_order() {
        let receipt = subscription_receipt();
        let ids: Vec<i64> =
            receipt.in_apps_by_product("sub").iter().map(|r| r.transaction_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(receipt.in_apps_by_product("missing").is_empty());
    }

    #[test]
    fn transaction_ids_by_product_latest_claims_first() {
        let receipt = subscription_receipt();
        // Tail of latest_receipt_info (id 4) wins first place, then the
        // in_apps scan adds 1 and 2.
        assert_eq!(receipt.transaction_ids_by_product("sub"), vec![4, 1, 2]);
    }

    #[test]
    fn transaction_ids_by_product_deduplicates_across_collections() {
        let receipt = Receipt {
            in_apps: vec![record(7, "sub", Some(100))],
            latest_receipt_info: vec![record(7, "sub", Some(100))],
            ..Default::default()
        };
        assert_eq!(receipt.transaction_ids_by_product("sub"), vec![7]);
    }

    #[test]
    fn excluding_expired_drops_past_records_only() {
        let receipt = subscription_receipt();
        // Records expiring strictly before now are dropped; id 2's first
        // occurrence in in_apps wins over its latest_receipt_info copy.
        assert_eq!(receipt.transaction_ids_excluding_expired(at(250)), vec![2, 4]);
        // Everything is still live at t=50.
        assert_eq!(receipt.transaction_ids_excluding_expired(at(50)), vec![1, 2, 3, 4]);
        // Expiring exactly at now is not yet expired.
        assert_eq!(receipt.transaction_ids_excluding_expired(at(400)), vec![4]);
    }

    #[test]
    fn excluding_expired_keeps_records_without_expiry() {
        let receipt = Receipt {
            in_apps: vec![record(1, "nonconsumable", None), record(2, "sub", Some(10))],
            ..Default::default()
        };
        assert_eq!(receipt.transaction_ids_excluding_expired(at(1_000)), vec![1]);
    }

    #[test]
    fn excluding_expired_by_product_applies_both_filters() {
        let receipt = subscription_receipt();
        let live = receipt.transaction_ids_by_product_excluding_expired("sub", at(250));
        assert_eq!(live, vec![2, 4]);
        let none = receipt.transaction_ids_by_product_excluding_expired("other", at(250));
        assert!(none.is_empty());
    }

    #[test]
    fn query_results_are_idempotent() {
        let receipt = subscription_receipt();
        assert_eq!(
            receipt.transaction_ids_by_product("sub"),
            receipt.transaction_ids_by_product("sub")
        );
        assert_eq!(
            receipt.transaction_ids_excluding_expired(at(250)),
            receipt.transaction_ids_excluding_expired(at(250))
        );
    }

    #[test]
    fn last_expires_by_product_takes_later_of_both_sides() {
        let receipt = subscription_receipt();
        assert_eq!(receipt.last_expires_by_product("sub").unwrap().transaction_id, 4);
        // No latest_receipt_info match: the in_apps max wins.
        assert_eq!(receipt.last_expires_by_product("other").unwrap().transaction_id, 3);
        assert!(receipt.last_expires_by_product("missing").is_none());
    }

    #[test]
    fn last_expires_in_apps_wins_only_when_strictly_later() {
        let receipt = Receipt {
            in_apps: vec![record(1, "sub", Some(500))],
            latest_receipt_info: vec![record(2, "sub", Some(400))],
            ..Default::default()
        };
        assert_eq!(receipt.last_expires_by_product("sub").unwrap().transaction_id, 1);

        let tie = Receipt {
            in_apps: vec![record(1, "sub", Some(500))],
            latest_receipt_info: vec![record(2, "sub", Some(500))],
            ..Default::default()
        };
        assert_eq!(tie.last_expires_by_product("sub").unwrap().transaction_id, 2);
    }

    #[test]
    fn last_expires_by_transaction_ids_keys_on_membership() {
        let receipt = subscription_receipt();
        assert_eq!(receipt.last_expires_by_transaction_ids(&[1, 3]).unwrap().transaction_id, 3);
        assert_eq!(receipt.last_expires_by_transaction_ids(&[2, 4]).unwrap().transaction_id, 4);
        assert!(receipt.last_expires_by_transaction_ids(&[99]).is_none());
        assert!(receipt.last_expires_by_transaction_ids(&[]).is_none());
    }

    #[test]
    fn auto_renew_status_lookup() {
        let receipt = Receipt {
            pending_renewal_info: vec![PendingRenewalInfo {
                auto_renew_product_id: "X".to_string(),
                auto_renew_status: true,
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(receipt.is_auto_renew_status_on("X"));
        assert!(!receipt.is_auto_renew_status_on("Y"));
    }
}
