use thiserror::Error;
use url::Url;

use super::types::SubscriptionRequest;

pub const SECRET_MIN_LEN: usize = 10;
pub const SECRET_MAX_LEN: usize = 100;
pub const CALLBACK_SCHEME: &str = "https";

/// Constraints checked locally before a subscription request leaves the client.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("secret must be between 10 and 100 characters")]
    InvalidSecretLength,

    #[error("callback must use https")]
    InsecureCallback,
}

/// Checks the secret length, then the callback scheme. The first failure is returned.
///
/// Everything else (duplicates, auth, quota) is left to the server.
pub fn validate(request: &SubscriptionRequest) -> Result<(), ValidationError> {
    let secret_len = request.transport.secret.chars().count();
    if !(SECRET_MIN_LEN..=SECRET_MAX_LEN).contains(&secret_len) {
        return Err(ValidationError::InvalidSecretLength);
    }

    // an unparseable callback has no scheme at all
    match Url::parse(&request.transport.callback) {
        Ok(url) if url.scheme() == CALLBACK_SCHEME => Ok(()),
        _ => Err(ValidationError::InsecureCallback),
    }
}
