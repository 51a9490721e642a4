use thiserror::Error;

/// Reason string Google attaches to a 410 response when the purchase token
/// has been permanently invalidated (e.g. the user deleted their account).
pub(crate) const PURCHASE_TOKEN_NO_LONGER_VALID: &str = "purchaseTokenNoLongerValid";

const UNKNOWN_STATUS_MESSAGE: &str = "An unknown error occurred";

/// Errors from the App Store `verifyReceipt` flow.
#[derive(Debug, Error)]
pub enum AppStoreError {
    #[error("verifyReceipt request could not be completed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("verifyReceipt returned HTTP status {0}")]
    UnexpectedHttpStatus(u16),
    /// The body matched neither the iOS7 nor the legacy iOS6 response
    /// shape. Both decode attempts must fail before this is reported.
    #[error("response body matched neither the iOS7 nor the iOS6 receipt format: {0}")]
    DecodeFailed(#[source] serde_json::Error),
    /// A vendor-reported validation failure, mapped from the documented
    /// status-code taxonomy.
    #[error("{message} (status {code})")]
    Status { code: i64, message: &'static str },
}

/// Maps an Apple status code to its documented failure, or `None` if the
/// code does not indicate an error. 21006 (valid receipt, subscription
/// expired) is deliberately not an error; callers that care use
/// `Receipt::has_expired`.
pub fn status_error(code: i64) -> Option<AppStoreError> {
    let message = match code {
        0 | 21006 => return None,
        21000 => "The App Store could not read the JSON object you provided.",
        21002 => "The data in the receipt-data property was malformed or missing.",
        21003 => "The receipt could not be authenticated.",
        21004 => {
            "The shared secret you provided does not match the shared secret on file for your account."
        }
        21005 => "The receipt server is not currently available.",
        21007 => {
            "This receipt is from the test environment, but it was sent to the production environment for verification. Send it to the test environment instead."
        }
        21008 => {
            "This receipt is from the production environment, but it was sent to the test environment for verification. Send it to the production environment instead."
        }
        _ => UNKNOWN_STATUS_MESSAGE,
    };
    Some(AppStoreError::Status { code, message })
}

/// Errors from the Google Play `androidpublisher` flow.
#[derive(Debug, Error)]
pub enum GooglePlayError {
    #[error("Google Play service account key could not be used: {0}")]
    Credentials(String),
    #[error("androidpublisher request could not be completed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("androidpublisher response could not be decoded: {0}")]
    DecodeFailed(#[source] serde_json::Error),
    /// Non-2xx API response, with the reason strings from Google's error
    /// envelope when the body carried any.
    #[error("androidpublisher returned HTTP status {code}")]
    Api { code: u16, reasons: Vec<String> },
}

impl GooglePlayError {
    /// Google returns 410 when the purchase token is no longer valid at
    /// all, which often means the user deleted their Google account. Such
    /// purchases are permanently gone, unlike transient API failures.
    pub fn is_error_code_410(&self) -> bool {
        matches!(self, Self::Api { code: 410, .. })
    }

    /// Whether any error reason is `purchaseTokenNoLongerValid`.
    pub fn has_purchase_token_no_longer_valid(&self) -> bool {
        match self {
            Self::Api { reasons, .. } => {
                reasons.iter().any(|r| r == PURCHASE_TOKEN_NO_LONGER_VALID)
            }
            _ => false,
        }
    }
}
