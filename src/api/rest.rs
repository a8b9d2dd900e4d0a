use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use super::Api;
use super::errors::ApiError;

/// Error code moodle answers a bad token with
static INVALID_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""errorcode"\s*:\s*"invalidtoken""#).unwrap());

/// Builds the query url of a web service function
///
/// Parameters without a value are left out entirely.
pub fn build_url(endpoint: &Url, function: &str, params: &[(&str, Option<&str>)]) -> Url {
    let mut url = endpoint.clone();
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("wsfunction", function)
            .append_pair("moodlewsrestformat", "json");
        for (key, value) in params {
            if let Some(value) = value {
                query.append_pair(key, value);
            }
        }
    }
    url
}

/// Where the token is placed in a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStrategy {
    /// `Authorization: Bearer <token>`
    Header,
    /// `?wstoken=<token>`
    QueryParameter,
}

impl AuthStrategy {
    fn apply(self, request: RequestBuilder, wstoken: &str) -> RequestBuilder {
        match self {
            AuthStrategy::Header => request.bearer_auth(wstoken),
            AuthStrategy::QueryParameter => request.query(&[("wstoken", wstoken)]),
        }
    }
}

/// Result of the first authorization attempt
enum Attempt {
    Done(Result<String, ApiError>),
    Fallback,
}

impl Api {
    async fn send(&self, url: &Url, strategy: AuthStrategy) -> Result<Response, ApiError> {
        trace!("Requesting {} using {:?}", url, strategy);
        strategy
            .apply(self.client.get(url.clone()), &self.wstoken)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source: source.without_url(),
            })
    }

    async fn attempt_header(&self, url: &Url) -> Attempt {
        match self.send(url, AuthStrategy::Header).await {
            Ok(response) => match read_body(url, response).await {
                Err(e) if e.is_auth() => {
                    debug!("Header authorization rejected for {}, retrying with token parameter", url);
                    Attempt::Fallback
                }
                other => Attempt::Done(other),
            },
            Err(e) => {
                debug!("Header request failed ({}), retrying with token parameter", e);
                Attempt::Fallback
            }
        }
    }

    /// Requests `url`, authorizing via header first and via query parameter second
    ///
    /// The second attempt is only made if the first one was rejected as
    /// unauthorized or failed on the transport level.
    pub async fn request(&self, url: &Url) -> Result<String, ApiError> {
        match self.attempt_header(url).await {
            Attempt::Done(result) => result,
            Attempt::Fallback => {
                let response = self.send(url, AuthStrategy::QueryParameter).await?;
                read_body(url, response).await
            }
        }
    }

    /// Same as `request` but parses the body and surfaces moodle exceptions
    pub async fn request_json(&self, url: &Url) -> Result<Value, ApiError> {
        let body = self.request(url).await?;
        let value: Value = serde_json::from_str(&body).map_err(|source| ApiError::Parse {
            url: url.to_string(),
            source,
        })?;
        if let Some(exception) = value.as_object().filter(|o| o.contains_key("exception")) {
            let field = |key: &str| {
                exception
                    .get(key)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            return Err(ApiError::Moodle {
                errorcode: field("errorcode"),
                message: field("message"),
            });
        }
        Ok(value)
    }
}

/// Reads the body, failing on unsuccessful status codes and token errors
async fn read_body(url: &Url, response: Response) -> Result<String, ApiError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized {
            url: url.to_string(),
        });
    }
    if !status.is_success() {
        return Err(ApiError::Status {
            url: url.to_string(),
            status,
        });
    }
    let body = response.text().await.map_err(|source| ApiError::Transport {
        url: url.to_string(),
        source: source.without_url(),
    })?;
    // Checked before parsing, the error is also sent with a 200
    if is_invalid_token(&body) {
        return Err(ApiError::InvalidToken);
    }
    Ok(body)
}

/// Token errors are objects, course data mentioning the word is not
fn is_invalid_token(body: &str) -> bool {
    body.trim_start().starts_with('{') && INVALID_TOKEN.is_match(body)
}
