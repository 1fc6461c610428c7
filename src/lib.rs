//! Client for Twitch's EventSub subscription endpoints and webhook deliveries.
//!
//! - [`helix`] creates, lists and removes subscriptions through a pluggable
//!   [`RequestExecutor`](helix::executor::RequestExecutor).
//! - [`hook`] verifies the HMAC signature on incoming webhook deliveries, either directly or as
//!   an axum middleware.

pub mod helix;
pub mod hook;
pub mod util;

pub use helix::executor::{
    ApiRequest, RawResponse, ReqwestExecutor, RequestExecutor, TransportError,
};
pub use helix::response::{ApiError, RateLimit, Response, ResponseBody};
pub use helix::types::{
    Condition, ManySubscriptions, Pagination, Subscription, SubscriptionRequest,
    SubscriptionStatus, SubscriptionsParams, Transport, TransportMethod,
};
pub use helix::validate::ValidationError;
pub use helix::{Client, HelixErr, HelixResult};
pub use hook::verify::{signature, verify, verify_notification};
pub use util::env::{Config, ConfigErr};
