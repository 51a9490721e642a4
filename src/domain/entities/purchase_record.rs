use chrono::{DateTime, Utc};

/// Canonical form of one in-app transaction, after all vendor string
/// fields have been coerced to typed values.
///
/// `transaction_id` uniquely identifies one purchase event;
/// `original_transaction_id` links renewals of the same subscription
/// chain. A date of `None` means the vendor supplied no value (or zero)
/// for it, and orders before every real timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurchaseRecord {
    pub quantity: i64,
    pub product_id: String,
    pub transaction_id: i64,
    pub original_transaction_id: i64,
    pub is_trial_period: bool,
    pub app_item_id: i64,
    pub version_external_identifier: i64,
    pub web_order_line_item_id: i64,
    pub purchase_date: Option<DateTime<Utc>>,
    pub original_purchase_date: Option<DateTime<Utc>>,
    pub expires_date: Option<DateTime<Utc>>,
    pub cancellation_date: Option<DateTime<Utc>>,
}

/// Tie-break policy when several records match a filter. The two record
/// collections on a receipt carry different ordering guarantees, so each
/// gets its own policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SelectionPolicy {
    /// Pick the record with the greatest expiry; on equal expiries the
    /// later element wins. Used for `in_app`, whose order is only roughly
    /// chronological.
    MaxExpiry,
    /// Pick the last matching element. Used for `latest_receipt_info`,
    /// whose vendor order is chronological, so the tail element is
    /// definitionally current.
    LastPosition,
}

/// Single reduction behind both "find the current record" scans.
pub(crate) fn best_match<F>(
    records: &[PurchaseRecord],
    policy: SelectionPolicy,
    matches: F,
) -> Option<&PurchaseRecord>
where
    F: Fn(&PurchaseRecord) -> bool,
{
    match policy {
        SelectionPolicy::MaxExpiry => records
            .iter()
            .filter(|r| matches(r))
            .max_by_key(|r| r.expires_date),
        SelectionPolicy::LastPosition => records.iter().rev().find(|r| matches(r)),
    }
}
