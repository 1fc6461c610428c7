pub mod executor;
pub mod response;
pub mod types;
pub mod validate;

use http::header::{AUTHORIZATION, CONTENT_TYPE, InvalidHeaderValue};
use http::{HeaderMap, HeaderValue, Method};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::util::env::Config;
use executor::{ApiRequest, ReqwestExecutor, RequestExecutor, TransportError};
use response::{Response, ResponseBody, shape};
use types::{ManySubscriptions, SubscriptionRequest, SubscriptionsParams};
use validate::{ValidationError, validate};

pub const HELIX_URN_SUBSCRIPTIONS: &str = "eventsub/subscriptions";
pub const CLIENT_ID_HEADER: &str = "client-id";

pub type HelixResult<T> = core::result::Result<T, HelixErr>;

#[derive(Debug, Error)]
pub enum HelixErr {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The message already includes the transport's cause chain.
    #[error("failed to execute API request: {0}")]
    Transport(TransportError),

    #[error("failed to decode API response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("while encoding request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("while creating a HeaderValue ({0})")]
    HeaderError(#[from] InvalidHeaderValue),

    #[error("while building request url: {0}")]
    UrlError(#[from] url::ParseError),
}

/// EventSub client for the Helix API.
///
/// Holds only immutable configuration and its executor; share it behind an `Arc` if needed.
#[derive(Debug, Clone)]
pub struct Client<E = ReqwestExecutor> {
    config: Config,
    executor: E,
}

impl Client<ReqwestExecutor> {
    pub fn new(config: Config) -> Self {
        Self::with_executor(config, ReqwestExecutor::default())
    }
}

impl<E> Client<E>
where
    E: RequestExecutor,
{
    pub fn with_executor(config: Config, executor: E) -> Self {
        Self { config, executor }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    #[instrument(skip(self))]
    /// Lists the app's EventSub subscriptions, optionally filtered by `params`.
    pub async fn get_eventsub_subscriptions(
        &self,
        params: &SubscriptionsParams,
    ) -> HelixResult<Response<ManySubscriptions>> {
        let mut url = self.endpoint(HELIX_URN_SUBSCRIPTIONS)?;
        {
            let pairs = params.query_pairs();
            if !pairs.is_empty() {
                url.query_pairs_mut().extend_pairs(pairs);
            }
        }

        self.send(Method::GET, url, None).await
    }

    #[instrument(skip(self, request), fields(sub_type = %request.r#type, callback = %request.transport.callback))]
    /// Creates a subscription.
    ///
    /// The request is validated locally first; a [`HelixErr::Validation`] means nothing was
    /// sent.
    pub async fn create_eventsub_subscription(
        &self,
        request: &SubscriptionRequest,
    ) -> HelixResult<Response<ManySubscriptions>> {
        if let Err(e) = validate(request) {
            tracing::warn!(error = %e, "subscription request failed validation");
            return Err(e.into());
        }

        let url = self.endpoint(HELIX_URN_SUBSCRIPTIONS)?;
        let body = serde_json::to_vec(request).map_err(HelixErr::Encode)?;

        let res: Response<ManySubscriptions> = self.send(Method::POST, url, Some(body)).await?;
        if let Some(created) = res.data().and_then(|d| d.subscriptions.first()) {
            tracing::info!(
                id = %created.id,
                status = created.status.as_str(),
                "subscription created"
            );
        }

        Ok(res)
    }

    #[instrument(skip(self))]
    /// Deletes a subscription by id. Helix answers a successful delete with `204 No Content`.
    pub async fn remove_eventsub_subscription(
        &self,
        subscription_id: &str,
    ) -> HelixResult<Response<()>> {
        let mut url = self.endpoint(HELIX_URN_SUBSCRIPTIONS)?;
        url.query_pairs_mut().append_pair("id", subscription_id);

        self.send(Method::DELETE, url, None).await
    }

    fn endpoint(&self, urn: &str) -> HelixResult<Url> {
        // `Url::join` drops the last path segment unless the base ends in '/'
        let mut base = self.config.base_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(base.join(urn)?)
    }

    fn build_headers(&self, has_body: bool) -> HelixResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CLIENT_ID_HEADER, HeaderValue::from_str(&self.config.client_id)?);

        if let Some(token) = &self.config.app_access_token {
            let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token))?;
            bearer.set_sensitive(true);
            headers.insert(AUTHORIZATION, bearer);
        }

        if has_body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        Ok(headers)
    }

    async fn send<T>(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> HelixResult<Response<T>>
    where
        T: DeserializeOwned + Default,
    {
        let headers = self.build_headers(body.is_some())?;
        let request = ApiRequest {
            method,
            url,
            headers,
            body,
        };

        let raw = self.executor.execute(request).await.map_err(|e| {
            tracing::error!(error = %e, "API request did not complete");
            HelixErr::Transport(e)
        })?;

        let res = shape::<T>(raw)?;
        if let Some(rl) = res.rate_limit() {
            tracing::debug!(
                ratelimit_remaining = rl.remaining,
                ratelimit_total = rl.limit,
                "rate-limit bucket"
            );
        }

        match &res.body {
            ResponseBody::Data(_) => tracing::debug!(status = %res.status, "API request succeeded"),
            ResponseBody::Error(err) => tracing::warn!(
                status = %res.status,
                error = %err.error,
                message = %err.message,
                "API responded with an error"
            ),
        }

        Ok(res)
    }
}
