use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_VERSION: &str = "1";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportMethod {
    #[default]
    Webhook,
}

/// Delivery settings sent when creating a subscription.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Transport {
    /// Transport method.
    ///
    /// Only "webhook" is supported.
    pub method: TransportMethod,
    /// The callback URL where the notifications are sent. The URL must use the HTTPS protocol.
    ///
    /// > Redirects are NOT followed.
    pub callback: String,
    /// Secret used to sign notifications.
    ///
    /// Secret must be:
    /// - ASCII string
    /// - at least 10 characters
    /// - at most 100 characters
    pub secret: String,
}

impl Transport {
    pub fn webhook(callback: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            method: TransportMethod::Webhook,
            callback: callback.into(),
            secret: secret.into(),
        }
    }
}

/// Subscription-type specific parameters, e.g. `broadcaster_user_id`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct Condition(pub BTreeMap<String, String>);

impl Condition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn broadcaster(broadcaster_user_id: impl Into<String>) -> Self {
        Self::new().with("broadcaster_user_id", broadcaster_user_id)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

/// Body of a `POST /eventsub/subscriptions` request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionRequest {
    pub r#type: String,
    pub version: String,
    pub condition: Condition,
    pub transport: Transport,
}

impl SubscriptionRequest {
    pub fn new(event_type: impl Into<String>, condition: Condition, transport: Transport) -> Self {
        Self {
            r#type: event_type.into(),
            version: DEFAULT_VERSION.to_string(),
            condition,
            transport,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Enabled,
    WebhookCallbackVerificationPending,
    WebhookCallbackVerificationFailed,
    NotificationFailuresExceeded,
    AuthorizationRevoked,
    ModeratorRemoved,
    UserRemoved,
    VersionRemoved,
    #[serde(other)]
    Unknown,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::WebhookCallbackVerificationPending => "webhook_callback_verification_pending",
            Self::WebhookCallbackVerificationFailed => "webhook_callback_verification_failed",
            Self::NotificationFailuresExceeded => "notification_failures_exceeded",
            Self::AuthorizationRevoked => "authorization_revoked",
            Self::ModeratorRemoved => "moderator_removed",
            Self::UserRemoved => "user_removed",
            Self::VersionRemoved => "version_removed",
            Self::Unknown => "unknown",
        }
    }
}

/// Delivery settings as echoed back by the server; the secret is never included.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionTransport {
    pub method: TransportMethod,
    #[serde(default)]
    pub callback: String,
}

/// A server-side subscription record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Subscription {
    pub id: String,
    pub status: SubscriptionStatus,
    pub r#type: String,
    pub version: String,
    pub condition: Condition,
    pub transport: SubscriptionTransport,
    pub created_at: DateTime<Utc>,
    // omitted from callback verification payloads
    #[serde(default)]
    pub cost: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Pagination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// Payload of the subscription list/create endpoints.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ManySubscriptions {
    #[serde(rename = "data")]
    pub subscriptions: Vec<Subscription>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_cost: u64,
    #[serde(default)]
    pub max_total_cost: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Query filters for `GET /eventsub/subscriptions`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionsParams {
    pub status: Option<SubscriptionStatus>,
    pub r#type: Option<String>,
    pub user_id: Option<String>,
    pub after: Option<String>,
}

impl SubscriptionsParams {
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("status", self.status.as_ref().map(SubscriptionStatus::as_str)),
            ("type", self.r#type.as_deref()),
            ("user_id", self.user_id.as_deref()),
            ("after", self.after.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
    }
}
