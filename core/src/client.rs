//! Blocking HTTP client facade for the OCR API.
//!
//! # Design
//! `HttpClient` owns its transport, an immutable set of default transport
//! options, and the headers accumulated through `set_headers`. Every verb
//! helper funnels into `request`, which merges
//! defaults ⊕ client headers ⊕ call options into one `HttpRequest` and hands
//! it to the transport. Status codes are not interpreted here.
//!
//! Payload shapes that could be ambiguous (`post` with fields or a raw body,
//! `json` with a value or pre-serialized text) are explicit enums chosen by
//! the caller's type through `From` conversions.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Config;
use crate::encode::{encode_json, JsonEncoding, JSON_CONTENT_TYPE};
use crate::error::{HttpError, Result};
use crate::http::{
    Body, Headers, HttpMethod, HttpRequest, HttpResponse, Part, RequestOptions, TransportOptions,
};
use crate::transport::{Transport, UreqTransport};

/// Payload of a `post` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostBody {
    /// Sent as `application/x-www-form-urlencoded` fields.
    Form(Vec<(String, String)>),
    /// Sent verbatim as the request body.
    Raw(String),
}

impl From<&str> for PostBody {
    fn from(raw: &str) -> Self {
        PostBody::Raw(raw.to_string())
    }
}

impl From<String> for PostBody {
    fn from(raw: String) -> Self {
        PostBody::Raw(raw)
    }
}

impl From<Vec<(String, String)>> for PostBody {
    fn from(fields: Vec<(String, String)>) -> Self {
        PostBody::Form(fields)
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for PostBody {
    fn from(fields: [(K, V); N]) -> Self {
        PostBody::Form(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, String>> for PostBody {
    fn from(fields: BTreeMap<String, String>) -> Self {
        PostBody::Form(fields.into_iter().collect())
    }
}

impl From<HashMap<String, String>> for PostBody {
    fn from(fields: HashMap<String, String>) -> Self {
        PostBody::Form(fields.into_iter().collect())
    }
}

/// Payload of a `json` call.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonBody {
    /// Serialized with the requested [`JsonEncoding`].
    Value(Value),
    /// Already serialized; sent as-is.
    Raw(String),
}

impl From<Value> for JsonBody {
    fn from(value: Value) -> Self {
        JsonBody::Value(value)
    }
}

impl From<&str> for JsonBody {
    fn from(raw: &str) -> Self {
        JsonBody::Raw(raw.to_string())
    }
}

impl From<String> for JsonBody {
    fn from(raw: String) -> Self {
        JsonBody::Raw(raw)
    }
}

/// One or more file paths uploaded under a single field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilePaths(pub Vec<PathBuf>);

impl From<&str> for FilePaths {
    fn from(path: &str) -> Self {
        FilePaths(vec![PathBuf::from(path)])
    }
}

impl From<&Path> for FilePaths {
    fn from(path: &Path) -> Self {
        FilePaths(vec![path.to_path_buf()])
    }
}

impl From<PathBuf> for FilePaths {
    fn from(path: PathBuf) -> Self {
        FilePaths(vec![path])
    }
}

impl<P: Into<PathBuf>> From<Vec<P>> for FilePaths {
    fn from(paths: Vec<P>) -> Self {
        FilePaths(paths.into_iter().map(Into::into).collect())
    }
}

impl<P: Into<PathBuf>, const N: usize> From<[P; N]> for FilePaths {
    fn from(paths: [P; N]) -> Self {
        FilePaths(paths.into_iter().map(Into::into).collect())
    }
}

/// Outcome of decoding a response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    Value(Value),
    /// The body was empty.
    NoContent,
}

impl Parsed {
    pub fn into_value(self) -> Option<Value> {
        match self {
            Parsed::Value(value) => Some(value),
            Parsed::NoContent => None,
        }
    }

    pub fn is_no_content(&self) -> bool {
        matches!(self, Parsed::NoContent)
    }
}

/// Anything `parse_json` can read a body from.
pub trait ResponseBody {
    fn body_bytes(&self) -> &[u8];
}

impl ResponseBody for HttpResponse {
    fn body_bytes(&self) -> &[u8] {
        &self.body
    }
}

impl ResponseBody for str {
    fn body_bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl ResponseBody for String {
    fn body_bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl ResponseBody for [u8] {
    fn body_bytes(&self) -> &[u8] {
        self
    }
}

/// Blocking client for a JSON API.
///
/// Holds the transport it sends through, the default transport options
/// merged into every call, and the headers accumulated by `set_headers`.
/// Nothing is sent until one of the verb methods or `request` is called.
pub struct HttpClient<T: Transport = UreqTransport> {
    transport: T,
    defaults: TransportOptions,
    headers: Headers,
}

impl HttpClient<UreqTransport> {
    /// Client over `ureq` with the default transport options (IPv4 only).
    pub fn new() -> Self {
        Self::with_transport(UreqTransport::new(), TransportOptions::default())
    }

    /// Client over `ureq` with transport options read from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::with_transport(UreqTransport::new(), TransportOptions::from_config(config))
    }
}

impl Default for HttpClient<UreqTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> HttpClient<T> {
    pub fn with_transport(transport: T, defaults: TransportOptions) -> Self {
        Self {
            transport,
            defaults,
            headers: Headers::new(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn defaults(&self) -> &TransportOptions {
        &self.defaults
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Merge `headers` into the client's header set, replacing values for
    /// names already present.
    pub fn set_headers<K, V, I>(&mut self, headers: I) -> &mut Self
    where
        K: AsRef<str>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.headers.merge(&headers.into_iter().collect());
        self
    }

    pub fn get(&self, url: &str, params: &[(&str, &str)]) -> Result<HttpResponse> {
        self.request(
            "GET",
            url,
            RequestOptions {
                query: owned_pairs(params),
                ..Default::default()
            },
        )
    }

    pub fn post(&self, url: &str, params: impl Into<PostBody>) -> Result<HttpResponse> {
        let body = match params.into() {
            PostBody::Form(fields) => Body::Form(fields),
            PostBody::Raw(raw) => Body::Raw(raw),
        };
        self.request(
            "POST",
            url,
            RequestOptions {
                body,
                ..Default::default()
            },
        )
    }

    /// Multipart POST. Every file is read before anything is sent, so an
    /// unreadable path fails the call without touching the network.
    pub fn upload(
        &self,
        url: &str,
        files: &[(&str, FilePaths)],
        params: &[(&str, &str)],
        queries: &[(&str, &str)],
    ) -> Result<HttpResponse> {
        let mut parts = Vec::new();
        for (name, paths) in files {
            for path in &paths.0 {
                parts.push(read_file_part(name, path)?);
            }
        }
        parts.extend(params.iter().map(|(name, contents)| Part::text(*name, *contents)));

        self.request(
            "POST",
            url,
            RequestOptions {
                query: owned_pairs(queries),
                body: Body::Multipart(parts),
                ..Default::default()
            },
        )
    }

    /// POST a JSON payload with `content-type: application/json`.
    ///
    /// The content type applies to this call only; the client's header set is
    /// left unchanged. It is deliberately not stored through `set_headers`,
    /// so later `get`, `post` or `upload` calls never inherit it.
    pub fn json(
        &self,
        url: &str,
        options: impl Into<JsonBody>,
        encoding: JsonEncoding,
        queries: &[(&str, &str)],
    ) -> Result<HttpResponse> {
        let body = match options.into() {
            JsonBody::Value(value) => encode_json(&value, encoding)?,
            JsonBody::Raw(raw) => raw,
        };
        let mut headers = Headers::new();
        headers.insert("content-type", JSON_CONTENT_TYPE);

        self.request(
            "POST",
            url,
            RequestOptions {
                query: owned_pairs(queries),
                headers,
                body: Body::Raw(body),
                ..Default::default()
            },
        )
    }

    /// Build the merged request for `method`/`url`/`options` without sending it.
    pub fn build_request(
        &self,
        method: &str,
        url: &str,
        options: RequestOptions,
    ) -> Result<HttpRequest> {
        let method: HttpMethod = method.parse()?;
        let mut headers = self.headers.clone();
        headers.merge(&options.headers);

        Ok(HttpRequest {
            method,
            url: url.to_string(),
            query: options.query,
            headers,
            body: options.body,
            transport: self.defaults.apply(&options.transport),
        })
    }

    pub fn request(&self, method: &str, url: &str, options: RequestOptions) -> Result<HttpResponse> {
        let request = self.build_request(method, url, options)?;
        let response = self
            .transport
            .send(&request)
            .map_err(HttpError::Transport)?;

        tracing::debug!(
            status = response.status,
            reason = %response.reason,
            headers = ?response.headers,
            body = %response.text(),
            "API response"
        );

        Ok(response)
    }

    /// Decode a response (or raw body text) as JSON.
    ///
    /// An empty body yields `Parsed::NoContent`; any syntactically valid JSON,
    /// scalars included, yields `Parsed::Value`.
    pub fn parse_json<B: ResponseBody + ?Sized>(&self, body: &B) -> Result<Parsed> {
        let bytes = body.body_bytes();
        if bytes.is_empty() {
            return Ok(Parsed::NoContent);
        }

        match serde_json::from_slice::<Value>(bytes) {
            Ok(contents) => {
                tracing::debug!(contents = %contents, "API response decoded");
                Ok(Parsed::Value(contents))
            }
            Err(e) => {
                let err = HttpError::Parse(e.to_string());
                tracing::error!("{err}");
                Err(err)
            }
        }
    }

    /// Decode into `D`. `Ok(None)` means the body was empty.
    pub fn parse_json_as<D, B>(&self, body: &B) -> Result<Option<D>>
    where
        D: DeserializeOwned,
        B: ResponseBody + ?Sized,
    {
        match self.parse_json(body)? {
            Parsed::NoContent => Ok(None),
            Parsed::Value(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| {
                    let err = HttpError::Parse(e.to_string());
                    tracing::error!("{err}");
                    err
                }),
        }
    }
}

fn owned_pairs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn read_file_part(name: &str, path: &Path) -> Result<Part> {
    let contents = std::fs::read(path).map_err(|source| {
        tracing::error!(path = %path.display(), error = %source, "Failed to read upload file");
        HttpError::Io {
            path: path.to_path_buf(),
            source,
        }
    })?;
    Ok(Part {
        name: name.to_string(),
        contents,
        filename: path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned()),
    })
}
