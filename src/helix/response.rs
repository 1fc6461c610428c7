use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::executor::RawResponse;
use super::{HelixErr, HelixResult};

pub const RATELIMIT_LIMIT: &str = "ratelimit-limit";
pub const RATELIMIT_REMAINING: &str = "ratelimit-remaining";
pub const RATELIMIT_RESET: &str = "ratelimit-reset";

/// Error body returned by Helix alongside a non-2xx status.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub error: String,
    pub status: u16,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody<T> {
    Data(T),
    Error(ApiError),
}

/// A response the server actually sent.
///
/// A rejected request (401, 409, ...) is still an `Ok(Response)`; branch on [`ResponseBody`] or
/// [`Response::status`] to tell them apart.
#[derive(Debug, Clone)]
pub struct Response<T> {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: ResponseBody<T>,
}

impl<T> Response<T> {
    pub fn is_success(&self) -> bool {
        matches!(self.body, ResponseBody::Data(_))
    }

    pub fn data(&self) -> Option<&T> {
        match &self.body {
            ResponseBody::Data(data) => Some(data),
            ResponseBody::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ApiError> {
        match &self.body {
            ResponseBody::Data(_) => None,
            ResponseBody::Error(err) => Some(err),
        }
    }

    pub fn into_result(self) -> Result<T, ApiError> {
        match self.body {
            ResponseBody::Data(data) => Ok(data),
            ResponseBody::Error(err) => Err(err),
        }
    }

    /// Rate-limit bucket reported by the server, if all three headers are present.
    pub fn rate_limit(&self) -> Option<RateLimit> {
        let header = |name: &str| {
            self.headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
        };

        Some(RateLimit {
            limit: header(RATELIMIT_LIMIT)?,
            remaining: header(RATELIMIT_REMAINING)?,
            reset: header(RATELIMIT_RESET)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    /// Unix epoch seconds at which the bucket refills
    pub reset: u64,
}

/// Maps a raw HTTP response onto a [`Response`].
///
/// 2xx bodies decode as `T` (an empty body becomes `T::default()`), anything else decodes as an
/// [`ApiError`]. Malformed JSON on either side is a [`HelixErr::Decode`].
pub fn shape<T>(raw: RawResponse) -> HelixResult<Response<T>>
where
    T: DeserializeOwned + Default,
{
    let RawResponse {
        status,
        headers,
        body,
    } = raw;

    let body = if status.is_success() {
        if body.is_empty() {
            ResponseBody::Data(T::default())
        } else {
            ResponseBody::Data(serde_json::from_slice(&body).map_err(HelixErr::Decode)?)
        }
    } else if body.is_empty() {
        ResponseBody::Error(ApiError {
            error: status.canonical_reason().unwrap_or_default().to_string(),
            status: status.as_u16(),
            message: String::new(),
        })
    } else {
        ResponseBody::Error(serde_json::from_slice(&body).map_err(HelixErr::Decode)?)
    };

    Ok(Response {
        status,
        headers,
        body,
    })
}
