pub mod middleware;
pub mod verify;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::helix::types::Subscription;

pub const HMAC_PREFIX: &str = "sha256=";
pub const TWITCH_MESSAGE_ID: &str = "Twitch-Eventsub-Message-Id";
pub const TWITCH_MESSAGE_TIMESTAMP: &str = "Twitch-Eventsub-Message-Timestamp";
pub const TWITCH_MESSAGE_SIGNATURE: &str = "Twitch-Eventsub-Message-Signature";
pub const TWITCH_MESSAGE_TYPE_HEADER: &str = "Twitch-Eventsub-Message-Type";

/// Twitch retries deliveries for a while; anything older than this should be dropped
pub const DEFAULT_MAX_MESSAGE_AGE: TimeDelta = TimeDelta::minutes(10);

#[derive(Debug, Error)]
pub enum WebhookErr {
    #[error("invalid message type header: {0}")]
    InvalidMessageType(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookMessageType {
    Verify,
    Notify,
    Revoke,
}

impl WebhookMessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verify => "webhook_callback_verification",
            Self::Notify => "notification",
            Self::Revoke => "revocation",
        }
    }
}

impl TryFrom<&str> for WebhookMessageType {
    type Error = WebhookErr;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "webhook_callback_verification" => Ok(Self::Verify),
            "notification" => Ok(Self::Notify),
            "revocation" => Ok(Self::Revoke),
            other => Err(WebhookErr::InvalidMessageType(other.to_string())),
        }
    }
}

/// Sent once after subscription creation; the handler must echo `challenge` back as plain text.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CallbackVerification {
    pub challenge: String,
    pub subscription: Subscription,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Notification<E = serde_json::Value> {
    pub subscription: Subscription,
    pub event: E,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Revocation {
    pub subscription: Subscription,
}

/// Whether an RFC3339 `timestamp` lies within `max_age` of `now` (either side).
///
/// Unparseable timestamps are never fresh.
pub fn message_is_fresh(timestamp: &str, now: DateTime<Utc>, max_age: TimeDelta) -> bool {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(sent) => (now - sent.with_timezone(&Utc)).abs() <= max_age,
        Err(_) => false,
    }
}
