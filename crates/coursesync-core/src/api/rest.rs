//! Paginated LMS REST listings

use regex::Regex;
use reqwest::header::{ACCEPT, LINK};
use reqwest::{StatusCode, Url};
use serde_json::Value;

use super::PageSource;
use crate::config::{non_empty, parse_base_url};
use crate::error::{Error, Result};
use crate::payload::{payloads_from_array, Payload};

/// Ask the API to render every id as a string.
const ACCEPT_STRING_IDS: &str = "application/json+canvas-string-ids";

/// Longest slice of an error body kept in an [`Error::Api`] message
const ERROR_BODY_CHARS: usize = 180;

/// Walks a REST listing page by page, following `Link: rel="next"`.
#[derive(Clone)]
pub struct RestPages {
    client: reqwest::Client,
    base_url: Url,
    access_token: Option<String>,
    next: Option<Url>,
}

impl std::fmt::Debug for RestPages {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("RestPages")
            .field("base_url", &self.base_url.as_str())
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("next", &self.next.as_ref().map(Url::as_str))
            .finish_non_exhaustive()
    }
}

impl RestPages {
    /// Start a listing at `path`, resolved against `base_url`.
    pub fn new(base_url: &str, access_token: Option<String>, path: &str) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;
        let first = base_url
            .join(path.trim())
            .map_err(|error| Error::Config(format!("invalid listing path `{path}`: {error}")))?;

        Ok(Self {
            client: reqwest::Client::builder().build()?,
            base_url,
            access_token: non_empty(access_token),
            next: Some(first),
        })
    }

    /// Use a preconfigured HTTP client, e.g. one with custom timeouts.
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// The token is only sent to the API's own origin (scheme, host and
    /// port), never to a next link that points elsewhere.
    fn should_authorize(&self, url: &Url) -> bool {
        url.origin() == self.base_url.origin()
    }
}

/// Build the error for a non-success response, keeping the start of the body.
fn api_error(status: StatusCode, url: &Url, body: &str) -> Error {
    let message: String = body.trim().chars().take(ERROR_BODY_CHARS).collect();
    Error::Api(if message.is_empty() {
        format!("HTTP {} from {url}", status.as_u16())
    } else {
        format!("{message} ({})", status.as_u16())
    })
}

impl PageSource for RestPages {
    async fn next_page(&mut self) -> Result<Option<Vec<Payload>>> {
        let Some(url) = self.next.take() else {
            return Ok(None);
        };

        let mut request = self
            .client
            .get(url.clone())
            .header(ACCEPT, ACCEPT_STRING_IDS);
        if self.should_authorize(&url) {
            if let Some(token) = &self.access_token {
                request = request.bearer_auth(token);
            }
        }

        tracing::debug!("Fetching {url}");
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &url, &body));
        }

        let next = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_next_link);

        let body: Value = response.json().await?;
        let page = payloads_from_array(body)?;

        self.next = match next {
            Some(link) => Some(url.join(&link).map_err(|error| {
                Error::Api(format!("invalid next link `{link}`: {error}"))
            })?),
            None => None,
        };

        Ok(Some(page))
    }
}

/// Extract the `rel="next"` target from a `Link` header.
///
/// ```
/// use coursesync_core::api::parse_next_link;
///
/// let header = concat!(
///     r#"<https://lms.test/api/v1/x?page=1>; rel="current", "#,
///     r#"<https://lms.test/api/v1/x?page=2>; rel="next""#,
/// );
/// assert_eq!(
///     parse_next_link(header).as_deref(),
///     Some("https://lms.test/api/v1/x?page=2")
/// );
/// ```
pub fn parse_next_link(header: &str) -> Option<String> {
    let re = Regex::new(r#"<([^>]*)>((?:\s*;\s*[^;,]+)*)"#).expect("Invalid regex");
    let next = re.captures_iter(header).find_map(|cap| {
        let is_next = cap[2].split(';').any(|param| {
            let mut parts = param.splitn(2, '=');
            let key = parts.next().unwrap_or("").trim();
            let value = parts.next().unwrap_or("").trim().trim_matches('"');
            key.eq_ignore_ascii_case("rel")
                && value
                    .split_whitespace()
                    .any(|rel| rel.eq_ignore_ascii_case("next"))
        });
        is_next.then(|| cap[1].trim().to_string())
    });
    next
}
