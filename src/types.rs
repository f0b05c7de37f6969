// Request and response types exchanged with the host player.

use std::collections::HashMap;

use bytes::Bytes;

use crate::config::{FROM_CACHE_HEADER, HTTP_SUCCESS_CODE};

/// Closed set of request classes the host can hand us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    Manifest,
    Segment,
    License,
    /// Anything the engine does not know how to retrieve.
    Unsupported,
}

impl RequestClass {
    /// Whether this class identifies retrievable content.
    pub fn is_retrievable(self) -> bool {
        !matches!(self, RequestClass::Unsupported)
    }
}

/// One fetch request from the host. Immutable, consumed once.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub uri: String,
    pub class: RequestClass,
    pub headers: HashMap<String, String>,
}

impl FetchRequest {
    pub fn new(uri: impl Into<String>, class: RequestClass) -> Self {
        Self {
            uri: uri.into(),
            class,
            headers: HashMap::new(),
        }
    }
}

/// Response handed back to the host player.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub headers: HashMap<String, String>,
    pub body: Bytes,
    pub status: u16,
    pub final_uri: String,
    pub class: RequestClass,
}

impl FetchResponse {
    /// A response produced by a successful network fetch.
    pub fn from_network(body: Bytes, uri: &str, class: RequestClass) -> Self {
        Self {
            headers: HashMap::new(),
            body,
            status: HTTP_SUCCESS_CODE,
            final_uri: uri.to_string(),
            class,
        }
    }

    /// A response served from the local cache, flagged with the synthetic
    /// cache header.
    pub fn from_cache(body: Bytes, uri: &str, class: RequestClass) -> Self {
        let mut headers = HashMap::new();
        headers.insert(FROM_CACHE_HEADER.to_string(), "true".to_string());
        Self {
            headers,
            body,
            status: HTTP_SUCCESS_CODE,
            final_uri: uri.to_string(),
            class,
        }
    }

    pub fn is_from_cache(&self) -> bool {
        self.headers
            .get(FROM_CACHE_HEADER)
            .is_some_and(|v| v == "true")
    }
}

/// What a completed (non-failed) operation produced.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Fetched(FetchResponse),
    /// The request class is not retrievable; no response was produced.
    Unsupported,
}

impl FetchOutcome {
    pub fn into_response(self) -> Option<FetchResponse> {
        match self {
            FetchOutcome::Fetched(response) => Some(response),
            FetchOutcome::Unsupported => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_response_flagged() {
        let response = FetchResponse::from_cache(Bytes::from_static(b"x"), "http://h/a", RequestClass::Segment);
        assert!(response.is_from_cache());
        assert_eq!(response.status, HTTP_SUCCESS_CODE);

        let response =
            FetchResponse::from_network(Bytes::from_static(b"x"), "http://h/a", RequestClass::Segment);
        assert!(!response.is_from_cache());
    }

    #[test]
    fn test_retrievable_classes() {
        assert!(RequestClass::Manifest.is_retrievable());
        assert!(RequestClass::Segment.is_retrievable());
        assert!(RequestClass::License.is_retrievable());
        assert!(!RequestClass::Unsupported.is_retrievable());
    }
}
