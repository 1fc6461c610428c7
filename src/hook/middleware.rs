use std::sync::Arc;

use axum::body::{Body, Bytes, HttpBody};
use axum::extract::{FromRequest, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{TimeDelta, Utc};
use http::StatusCode;

use super::verify::{get_message_parts, verify};
use super::{
    DEFAULT_MAX_MESSAGE_AGE, TWITCH_MESSAGE_TYPE_HEADER, WebhookMessageType, message_is_fresh,
};

/// Upper bound on buffered delivery bodies
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Router state for [`verify_sender_ident`].
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: Arc<str>,
    max_message_age: Option<TimeDelta>,
}

impl WebhookVerifier {
    /// Verifies signatures with `secret` and drops deliveries older than ten minutes.
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self {
            secret: secret.into(),
            max_message_age: Some(DEFAULT_MAX_MESSAGE_AGE),
        }
    }

    /// `None` disables the timestamp check.
    pub fn with_max_message_age(mut self, max_age: Option<TimeDelta>) -> Self {
        self.max_message_age = max_age;
        self
    }

    fn check(&self, headers: &http::HeaderMap, body: &Bytes) -> Result<(), StatusCode> {
        let (id, timestamp, received) =
            get_message_parts(headers).ok_or(StatusCode::BAD_REQUEST)?;

        if !verify(&self.secret, id, timestamp, body, received) {
            return Err(StatusCode::FORBIDDEN);
        }

        if let Some(max_age) = self.max_message_age
            && !message_is_fresh(timestamp, Utc::now(), max_age)
        {
            tracing::warn!(message_id = id, timestamp, "dropping stale delivery");
            return Err(StatusCode::FORBIDDEN);
        }

        Ok(())
    }
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("secret", &"[REDACTED]")
            .field("max_message_age", &self.max_message_age)
            .finish()
    }
}

/// Request body that passed signature verification, along with the delivery's message type.
#[derive(Clone, Debug)]
pub struct VerifiedBody {
    pub message_type: Option<WebhookMessageType>,
    pub bytes: Bytes,
}

impl VerifiedBody {
    pub fn as_bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn as_json<T>(&self) -> Result<T, serde_json::Error>
    where
        T: serde::de::DeserializeOwned,
    {
        serde_json::from_slice(&self.bytes)
    }
}

/// Rejects deliveries whose signature does not match; use with
/// `axum::middleware::from_fn_with_state`.
pub async fn verify_sender_ident(
    State(verifier): State<WebhookVerifier>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let headers = req.headers().clone();
    let body = extract_body(&mut req).await?;

    if let Err(status) = verifier.check(&headers, &body) {
        tracing::error!(%status, "unable to verify external webhook signature");
        return Err(status);
    }

    let message_type = headers
        .get(TWITCH_MESSAGE_TYPE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| WebhookMessageType::try_from(v).ok());

    req.extensions_mut().insert(VerifiedBody {
        message_type,
        bytes: body,
    });
    Ok(next.run(req).await)
}

async fn extract_body(request: &mut Request) -> Result<Bytes, StatusCode> {
    let body = std::mem::replace(request.body_mut(), Body::empty());

    // a declared `Content-Length` (or an in-memory body) shows up in the lower bound
    if body.size_hint().lower() > MAX_BODY_BYTES as u64 {
        tracing::warn!(
            size = body.size_hint().lower(),
            limit = MAX_BODY_BYTES,
            "delivery body too large"
        );
        return Err(StatusCode::PAYLOAD_TOO_LARGE);
    }

    axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to read delivery body");
            StatusCode::BAD_REQUEST
        })
}

impl<S> FromRequest<S> for VerifiedBody
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request(req: Request, _: &S) -> Result<Self, Self::Rejection> {
        req.extensions()
            .get::<VerifiedBody>()
            .cloned()
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}
