//! Execution of `HttpRequest` values over the network.
//!
//! # Design
//! `Transport` is the only seam that performs I/O. `UreqTransport` is the
//! blocking implementation used in production; tests substitute a recording
//! transport so the merge and encoding rules can be checked without sockets.
//!
//! ureq fixes the IP family per agent, so two agents are built up front and
//! each request picks one according to its `force_ipv4` setting. Timeout and
//! status handling are per-request settings.

use ureq::config::IpFamily;
use ureq::Agent;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, TransportOptions};

pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}

/// Blocking transport backed by `ureq`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    ipv4: Agent,
    any: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self {
            ipv4: build_agent(IpFamily::Ipv4Only),
            any: build_agent(IpFamily::Any),
        }
    }

    fn agent(&self, options: &TransportOptions) -> &Agent {
        if options.force_ipv4 {
            &self.ipv4
        } else {
            &self.any
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn build_agent(family: IpFamily) -> Agent {
    Agent::config_builder()
        .ip_family(family)
        .build()
        .new_agent()
}

/// Apply query, headers and per-request config to a builder in any body state.
fn prepare<B>(
    builder: ureq::RequestBuilder<B>,
    request: &HttpRequest,
    content_type: Option<&str>,
) -> ureq::RequestBuilder<B> {
    let mut builder = builder.query_pairs(
        request
            .query
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str())),
    );
    for (name, value) in request.headers.iter() {
        builder = builder.header(name, value);
    }
    if let Some(content_type) = content_type {
        if !request.headers.contains("content-type") {
            builder = builder.header("content-type", content_type);
        }
    }
    builder
        .config()
        .timeout_global(request.transport.timeout)
        .http_status_as_error(request.transport.http_errors)
        .build()
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = self.agent(&request.transport);
        let encoded = request.body.encode();
        let content_type = encoded.content_type.as_deref();
        let url = request.url.as_str();

        let without_body = match request.method {
            HttpMethod::Get => Some(agent.get(url)),
            HttpMethod::Delete => Some(agent.delete(url)),
            HttpMethod::Head => Some(agent.head(url)),
            HttpMethod::Options => Some(agent.options(url)),
            HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch => None,
        };

        let result = match without_body {
            Some(builder) if request.body.is_empty() => {
                prepare(builder, request, content_type).call()
            }
            Some(builder) => prepare(builder.force_send_body(), request, content_type)
                .send(&encoded.bytes[..]),
            None => {
                let builder = match request.method {
                    HttpMethod::Put => agent.put(url),
                    HttpMethod::Patch => agent.patch(url),
                    _ => agent.post(url),
                };
                let builder = prepare(builder, request, content_type);
                if request.body.is_empty() {
                    builder.send_empty()
                } else {
                    builder.send(&encoded.bytes[..])
                }
            }
        };
        let mut response = result?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        // Bodies are bytes; decoding is left to the caller.
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}
