/// Apple `verifyReceipt` endpoints.
pub const APP_STORE_SANDBOX_URL: &str = "https://sandbox.itunes.apple.com/verifyReceipt";
pub const APP_STORE_PRODUCTION_URL: &str = "https://buy.itunes.apple.com/verifyReceipt";

/// Google Play Android Publisher API.
pub(crate) const ANDROID_PUBLISHER_BASE_URL: &str =
    "https://androidpublisher.googleapis.com/androidpublisher/v3";
pub(crate) const ANDROID_PUBLISHER_SCOPE: &str =
    "https://www.googleapis.com/auth/androidpublisher";
