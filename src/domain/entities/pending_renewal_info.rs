/// Vendor-reported forward-looking renewal intent for one auto-renewable
/// subscription, separate from the historical transaction records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingRenewalInfo {
    pub expiration_intent: i64,
    /// The product the subscription will renew into. Differs from
    /// `product_id` when the user has switched to a new price tier.
    pub auto_renew_product_id: String,
    pub retry_flag: bool,
    pub auto_renew_status: bool,
    pub price_consent_status: bool,
    pub product_id: String,
}

/// Resolves the renewal flag for a product. The join key is
/// `auto_renew_product_id`, not `product_id`: renewal state applies to
/// the product the subscription renews into. No matching entry means
/// "not auto-renewing", never an error.
pub(crate) fn auto_renew_status_for(infos: &[PendingRenewalInfo], product_id: &str) -> bool {
    infos
        .iter()
        .find(|info| info.auto_renew_product_id == product_id)
        .map(|info| info.auto_renew_status)
        .unwrap_or(false)
}
