//! Blocking HTTP client facade for OCR-style JSON APIs.
//!
//! # Overview
//! `HttpClient` builds GET, form POST, multipart upload, and JSON requests,
//! sends them through a [`Transport`], and decodes JSON responses. `Config`
//! supplies settings by dotted-path lookup.
//!
//! # Design
//! - Every call is merged into a plain-data `HttpRequest` before any I/O, so
//!   the header and option merge rules can be tested with an in-memory
//!   transport.
//! - The client owns its transport from construction; `UreqTransport` is the
//!   default and resolves IPv4 only unless told otherwise.
//! - Status codes are never interpreted here. The facade's own failures are
//!   unreadable upload files and undecodable bodies.

pub mod client;
pub mod config;
pub mod encode;
pub mod error;
pub mod http;
pub mod transport;

pub use client::{FilePaths, HttpClient, JsonBody, Parsed, PostBody, ResponseBody};
pub use config::Config;
pub use encode::{EncodedBody, JsonEncoding};
pub use error::{HttpError, Result, TransportError};
pub use http::{
    Body, Headers, HttpMethod, HttpRequest, HttpResponse, Part, RequestOptions, TransportOptions,
    TransportOverrides,
};
pub use transport::{Transport, UreqTransport};
