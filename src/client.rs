//! # Remote Fetch Client
//!
//! A thin blocking wrapper around the GitHub REST API.
//!
//! The [`Fetch`] trait is the seam every pass talks to. [`ApiClient`] is the
//! real implementation: it is built once from the configuration with fixed
//! `Accept`, `Authorization` and `User-Agent` headers and then passed by
//! reference into each pass.
//!
//! A request never fails fatally. Any non-2xx status, transport error or
//! undecodable body comes back as a [`Skip`], and the caller decides what a
//! skip means: end of pagination for a listing, or "leave this record for the
//! next run" for enrichment.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::error::Result;

/// Media type requested from the API.
pub const ACCEPT: &str = "application/vnd.github.v3+json";

/// Why a request produced no usable response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    /// The server answered with a non-2xx status.
    Status(u16),
    /// The request never got a response.
    Transport(String),
    /// The response body was not the expected JSON.
    Decode(String),
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skip::Status(code) => write!(f, "HTTP {code}"),
            Skip::Transport(message) => write!(f, "transport error: {message}"),
            Skip::Decode(message) => write!(f, "unexpected response body: {message}"),
        }
    }
}

/// A successful response: the JSON body plus the next page, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub body: Value,
    pub next: Option<String>,
}

impl ApiResponse {
    pub fn new(body: Value) -> Self {
        Self { body, next: None }
    }

    /// Decode the body into `T`; a shape mismatch is a skip like any other.
    pub fn parse<T: DeserializeOwned>(self) -> std::result::Result<T, Skip> {
        serde_json::from_value(self.body).map_err(|e| Skip::Decode(e.to_string()))
    }
}

/// Trait for API access - allows faking the remote in tests
pub trait Fetch {
    /// GET `target`, a path relative to the API base or an absolute URL.
    fn fetch(&self, target: &str) -> std::result::Result<ApiResponse, Skip>;
}

/// Join a repository API URL and one of its sub-resources.
pub fn sub_resource_url(api_url: &str, sub_resource: &str) -> String {
    format!("{}/{}", api_url.trim_end_matches('/'), sub_resource)
}

/// Extract the `rel="next"` target from an RFC 8288 `Link` header.
pub fn parse_next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|link| {
        let mut parts = link.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|param| {
            let param = param.trim();
            param == "rel=\"next\"" || param == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}

/// The real GitHub API client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    agent: ureq::Agent,
    base: Url,
    authorization: String,
}

impl ApiClient {
    /// Create a client for `api_base` authenticating with `token`.
    pub fn new(api_base: &str, token: &str) -> Result<Self> {
        let mut base = Url::parse(api_base)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let agent = ureq::AgentBuilder::new()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build();

        Ok(Self {
            agent,
            base,
            authorization: format!("Bearer {token}"),
        })
    }

    fn resolve(&self, target: &str) -> std::result::Result<Url, Skip> {
        match Url::parse(target) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => self
                .base
                .join(target.trim_start_matches('/'))
                .map_err(|e| Skip::Transport(e.to_string())),
            Err(e) => Err(Skip::Transport(e.to_string())),
        }
    }
}

impl Fetch for ApiClient {
    fn fetch(&self, target: &str) -> std::result::Result<ApiResponse, Skip> {
        let url = self.resolve(target)?;
        let response = match self
            .agent
            .request_url("GET", &url)
            .set("Accept", ACCEPT)
            .set("Authorization", &self.authorization)
            .call()
        {
            Ok(response) => response,
            Err(ureq::Error::Status(code, _)) => return Err(Skip::Status(code)),
            Err(ureq::Error::Transport(transport)) => {
                return Err(Skip::Transport(transport.to_string()))
            }
        };

        if response.status() / 100 != 2 {
            return Err(Skip::Status(response.status()));
        }

        let next = response.header("link").and_then(parse_next_link);
        let body: Value = response
            .into_json()
            .map_err(|e| Skip::Decode(e.to_string()))?;
        Ok(ApiResponse { body, next })
    }
}
