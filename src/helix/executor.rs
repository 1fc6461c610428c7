use std::error::Error as StdError;

use async_trait::async_trait;
use http::{HeaderMap, Method, StatusCode};
use thiserror::Error;
use tracing::instrument;
use url::Url;

/// An outgoing API call, fully built.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

/// Whatever came back over the wire, before any decoding.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// The call never produced a response (DNS, refused connection, timeout, ...).
///
/// The message carries the whole cause chain (`error sending request: ...: Connection refused`),
/// so the wrapped error is not exposed as a `source` and reporters print each cause once.
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct TransportError {
    reason: String,
    inner: Box<dyn StdError + Send + Sync>,
}

impl TransportError {
    pub fn new<E>(err: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        let inner = err.into();
        Self {
            reason: describe_chain(&*inner),
            inner,
        }
    }

    /// The error the executor failed with.
    pub fn get_ref(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.inner
    }
}

fn describe_chain(err: &(dyn StdError + 'static)) -> String {
    let mut reason = err.to_string();
    let mut cause = err.source();

    while let Some(e) = cause {
        let msg = e.to_string();
        // some wrappers already print their cause
        if !msg.is_empty() && !reason.contains(&msg) {
            reason.push_str(": ");
            reason.push_str(&msg);
        }
        cause = e.source();
    }

    reason
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err)
    }
}

/// Performs HTTP requests on behalf of [`Client`](super::Client).
///
/// Timeouts, retries and pooling are the implementor's business.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse, TransportError>;
}

#[async_trait]
impl<E> RequestExecutor for std::sync::Arc<E>
where
    E: RequestExecutor + ?Sized,
{
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse, TransportError> {
        (**self).execute(request).await
    }
}

/// Default executor backed by a `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestExecutor {
    client: reqwest::Client,
}

impl ReqwestExecutor {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RequestExecutor for ReqwestExecutor {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let res = builder.send().await?;
        let status = res.status();
        let headers = res.headers().clone();
        let body = res.bytes().await?.to_vec();

        tracing::trace!(%status, body_len = body.len(), "received raw response");
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
