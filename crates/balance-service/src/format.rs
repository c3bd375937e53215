//! Body format negotiation.
//!
//! `Content-Type` picks the request decoder and `Accept` the response
//! encoder: YAML when any listed media type ends in `yaml` or is a bare `*`,
//! JSON otherwise. `?debug` swaps the response for a `{:#?}` dump.

use std::fmt::Debug;

use axum::http::{HeaderMap, HeaderName, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
    Debug,
}

impl Format {
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Yaml => "application/yaml",
            Self::Debug => "text/plain; charset=utf-8",
        }
    }
}

/// Query parameters shared by every rendering route.
#[derive(Debug, Default, serde::Deserialize)]
pub struct RenderQuery {
    pub debug: Option<String>,
}

fn wants_yaml(headers: &HeaderMap, name: &HeaderName) -> bool {
    headers
        .get_all(name)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|media| media.split(';').next().unwrap_or_default().trim())
        .any(|media| media.ends_with("yaml") || media == "*")
}

/// Decoder for the request body.
pub fn request_format(headers: &HeaderMap) -> Format {
    if wants_yaml(headers, &header::CONTENT_TYPE) {
        Format::Yaml
    } else {
        Format::Json
    }
}

/// Encoder for the response body.
pub fn response_format(headers: &HeaderMap, query: &RenderQuery) -> Format {
    if query.debug.is_some() {
        Format::Debug
    } else if wants_yaml(headers, &header::ACCEPT) {
        Format::Yaml
    } else {
        Format::Json
    }
}

/// Decode a request body. Any decode failure is a 400.
pub fn decode<T: DeserializeOwned>(format: Format, body: &[u8]) -> Result<T, ServiceError> {
    match format {
        Format::Yaml => serde_yaml::from_slice(body)
            .map_err(|e| ServiceError::BadRequest(format!("yaml error: {e}"))),
        Format::Json | Format::Debug => serde_json::from_slice(body)
            .map_err(|e| ServiceError::BadRequest(format!("json error: {e}"))),
    }
}

/// Encode `value` as a response. Encoder failures are a 500.
pub fn render<T: Serialize + Debug>(format: Format, value: &T) -> Result<Response, ServiceError> {
    let mut body = match format {
        Format::Json => serde_json::to_string_pretty(value)
            .map_err(|e| ServiceError::Internal(format!("json encode: {e}")))?,
        Format::Yaml => serde_yaml::to_string(value)
            .map_err(|e| ServiceError::Internal(format!("yaml encode: {e}")))?,
        Format::Debug => format!("{value:#?}"),
    };
    if !body.ends_with('\n') {
        body.push('\n');
    }
    Ok(([(header::CONTENT_TYPE, format.content_type())], body).into_response())
}
