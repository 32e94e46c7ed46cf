use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{Multipart, Path, Query},
    http::{HeaderMap, Method, StatusCode},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What the echo routes saw of an incoming request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub query: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

/// One decoded field of a multipart request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EchoPart {
    pub name: String,
    pub filename: Option<String>,
    pub contents: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MultipartEcho {
    pub query: BTreeMap<String, String>,
    pub parts: Vec<EchoPart>,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/multipart", post(multipart))
        .route("/empty", any(empty))
        .route("/malformed", get(malformed))
        .route("/binary", get(binary))
        .route("/status/{code}", any(status))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(
    method: Method,
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Echo> {
    Json(Echo {
        method: method.to_string(),
        query,
        headers: headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect(),
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn multipart(
    Query(query): Query<BTreeMap<String, String>>,
    mut form: Multipart,
) -> Result<Json<MultipartEcho>, StatusCode> {
    let mut parts = Vec::new();
    while let Some(field) = form.next_field().await.map_err(|_| StatusCode::BAD_REQUEST)? {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
        parts.push(EchoPart {
            name,
            filename,
            contents: String::from_utf8_lossy(&bytes).into_owned(),
        });
    }
    Ok(Json(MultipartEcho { query, parts }))
}

async fn empty() -> StatusCode {
    StatusCode::OK
}

async fn malformed() -> &'static str {
    "{invalid"
}

/// Bytes that are not valid UTF-8.
pub const BINARY_BODY: &[u8] = &[0xff, 0xfe, 0x00, 0x41];

async fn binary() -> &'static [u8] {
    BINARY_BODY
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, &'static str), StatusCode> {
    let code = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((code, "{\"status\":\"forced\"}"))
}
