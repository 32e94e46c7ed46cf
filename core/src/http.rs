//! HTTP request and response types as plain data.
//!
//! # Design
//! The client merges everything it knows (default transport settings,
//! accumulated headers, call-specific options) into one `HttpRequest` value
//! before anything touches the network. A `Transport` only has to execute
//! that value, which keeps the merge rules testable without I/O.
//!
//! All fields use owned types so requests can be recorded and inspected
//! after the fact.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::HttpError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = HttpError;

    /// Accepts any letter case; `"post"` and `"POST"` are the same method.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            _ => Err(HttpError::InvalidMethod(s.to_string())),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header set keyed by lower-cased header name.
///
/// Merging is per key: a later value for the same name replaces the earlier
/// one, every other header is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.0.insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(&name.to_ascii_lowercase())
    }

    pub fn merge(&mut self, other: &Headers) {
        for (name, value) in &other.0 {
            self.0.insert(name.clone(), value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// One named field of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub name: String,
    pub contents: Vec<u8>,
    /// Set for parts read from a file; literal fields leave it empty.
    pub filename: Option<String>,
}

impl Part {
    pub fn text(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into().into_bytes(),
            filename: None,
        }
    }
}

/// Request payload. Exactly one encoding per request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Body {
    #[default]
    Empty,
    Raw(String),
    Form(Vec<(String, String)>),
    Multipart(Vec<Part>),
}

impl Body {
    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }
}

/// Transport-level settings applied to every request unless overridden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransportOptions {
    /// Resolve host names to IPv4 addresses only.
    pub force_ipv4: bool,
    /// Overall deadline for the round trip. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Report 4xx/5xx responses as transport errors.
    pub http_errors: bool,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            force_ipv4: true,
            timeout: None,
            http_errors: true,
        }
    }
}

impl TransportOptions {
    /// Effective settings for one call: each override that is set wins.
    pub fn apply(&self, overrides: &TransportOverrides) -> TransportOptions {
        TransportOptions {
            force_ipv4: overrides.force_ipv4.unwrap_or(self.force_ipv4),
            timeout: overrides.timeout.or(self.timeout),
            http_errors: overrides.http_errors.unwrap_or(self.http_errors),
        }
    }
}

/// Per-call overrides for [`TransportOptions`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportOverrides {
    pub force_ipv4: Option<bool>,
    pub timeout: Option<Duration>,
    pub http_errors: Option<bool>,
}

/// Call-specific options handed to `HttpClient::request`.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub query: Vec<(String, String)>,
    pub headers: Headers,
    pub body: Body,
    pub transport: TransportOverrides,
}

/// A fully merged HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Headers,
    pub body: Body,
    pub transport: TransportOptions,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    /// Raw body bytes, exactly as received.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Body as text; invalid UTF-8 sequences become U+FFFD.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
