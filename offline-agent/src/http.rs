//! HTTP Value Types
//!
//! Request and response snapshots as the agent sees them. These are plain
//! value types: the hosting runtime converts its own request/response
//! objects at the boundary.

use std::collections::BTreeMap;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl Default for Method {
    fn default() -> Self {
        Self::Get
    }
}

impl Method {
    /// Convert to the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

/// Response type as classified by the hosting runtime.
///
/// Only `Basic` (same-origin) responses are eligible for caching; opaque
/// cross-origin bodies are never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    /// Same-origin response.
    Basic,
    /// Cross-origin response with CORS headers.
    Cors,
    /// Default / unclassified.
    Default,
    /// Network-level error response.
    Error,
    /// Cross-origin response without CORS (body not readable).
    Opaque,
    /// Opaque redirect.
    OpaqueRedirect,
}

impl Default for ResponseType {
    fn default() -> Self {
        Self::Default
    }
}

/// An intercepted request.
#[derive(Debug, Clone)]
pub struct Request {
    /// Request URL (absolute path or full cross-origin URL).
    pub url: String,
    /// HTTP method.
    pub method: Method,
    /// Request headers.
    pub headers: BTreeMap<String, String>,
    /// Request body (if any).
    pub body: Option<Vec<u8>>,
}

impl Request {
    /// Create a new request with default (GET) semantics.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Convenience constructor for a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(url)
    }

    /// Set the method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// A response snapshot.
#[derive(Debug, Clone)]
pub struct Response {
    /// Response type classification.
    pub response_type: ResponseType,
    /// URL the response was fetched from.
    pub url: String,
    /// Status code.
    pub status: u16,
    /// Status text.
    pub status_text: String,
    /// Response headers.
    pub headers: BTreeMap<String, String>,
    /// Response body.
    pub body: Option<Vec<u8>>,
    /// Whether the body has been handed to a consumer.
    pub body_used: bool,
}

impl Response {
    /// Create a new response with the given status.
    pub fn new(status: u16) -> Self {
        Self {
            response_type: ResponseType::Default,
            url: String::new(),
            status,
            status_text: status_text_for(status).to_string(),
            headers: BTreeMap::new(),
            body: None,
            body_used: false,
        }
    }

    /// Create a network-error response.
    pub fn error() -> Self {
        Self {
            response_type: ResponseType::Error,
            url: String::new(),
            status: 0,
            status_text: String::new(),
            headers: BTreeMap::new(),
            body: None,
            body_used: false,
        }
    }

    /// Set the response type.
    pub fn with_response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    /// Set the source URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Check if the status is in the 2xx range.
    pub fn ok(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Whether this response may be stored in a cache.
    ///
    /// Mirrors the interceptor predicate: exactly HTTP 200 with a
    /// same-origin `Basic` classification. Opaque and CORS responses are
    /// returned to the caller but never cached.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.response_type == ResponseType::Basic
    }

    /// Duplicate this response for storage.
    ///
    /// A body stream can be consumed only once, so the original is handed
    /// to the caller while the duplicate goes to the cache. The duplicate
    /// starts with a fresh `body_used` flag.
    pub fn clone_response(&self) -> Self {
        let mut copy = self.clone();
        copy.body_used = false;
        copy
    }

    /// Body length in bytes (0 when absent).
    pub fn body_len(&self) -> usize {
        self.body.as_ref().map(|b| b.len()).unwrap_or(0)
    }
}

/// Get status text for a status code.
fn status_text_for(status: u16) -> &'static str {
    match status {
        100 => "Continue",
        101 => "Switching Protocols",
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Unknown",
    }
}
