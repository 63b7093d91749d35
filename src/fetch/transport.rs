//! Single-request transport trait and the raw response it returns.
//!
//! A [`Transport`] performs exactly one GET and never follows redirects on
//! its own. Redirect handling and status classification live in
//! [`Fetcher`](super::Fetcher), so they behave the same whatever the backend.
//!
//! The production implementation is
//! [`UreqTransport`](super::ureq_transport::UreqTransport).

use super::FetchError;

/// One HTTP response, before any status interpretation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// `Location` header, if sent.
    pub location: Option<String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            location: None,
            body: body.into(),
        }
    }

    pub fn redirect(status: u16, location: &str) -> Self {
        Self {
            status,
            location: Some(location.to_string()),
            body: Vec::new(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }
}

/// Trait for HTTP backends.
///
/// Implementations return every HTTP status as `Ok`; only failures that
/// produce no response at all (DNS, connect, TLS, timeouts, truncated
/// bodies) are `Err`, as [`FetchError::Network`].
pub trait Transport {
    fn get(&self, url: &str) -> Result<RawResponse, FetchError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Serves canned responses by URL and records every request.
    #[derive(Default)]
    pub struct MockTransport {
        pub responses: HashMap<String, RawResponse>,
        pub requests: RefCell<Vec<String>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(mut self, url: &str, response: RawResponse) -> Self {
            self.responses.insert(url.to_string(), response);
            self
        }

        pub fn get_requests(&self) -> Vec<String> {
            self.requests.borrow().clone()
        }
    }

    impl Transport for MockTransport {
        fn get(&self, url: &str) -> Result<RawResponse, FetchError> {
            self.requests.borrow_mut().push(url.to_string());
            self.responses
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Network {
                    url: url.to_string(),
                    message: "connection refused".to_string(),
                })
        }
    }

    #[test]
    fn mock_serves_and_records() {
        let transport = MockTransport::new().with("https://a.test/", RawResponse::ok("hi"));
        let response = transport.get("https://a.test/").unwrap();
        assert_eq!(response.body, b"hi");
        assert_eq!(transport.get_requests(), ["https://a.test/"]);
    }

    #[test]
    fn mock_unknown_url_is_network_error() {
        let transport = MockTransport::new();
        assert!(matches!(
            transport.get("https://nowhere.test/"),
            Err(FetchError::Network { .. })
        ));
    }

    #[test]
    fn status_classification() {
        assert!(RawResponse::ok("").is_success());
        assert!(RawResponse::status(204).is_success());
        assert!(RawResponse::redirect(301, "/x").is_redirect());
        assert!(RawResponse::redirect(308, "/x").is_redirect());
        assert!(!RawResponse::status(404).is_success());
        assert!(!RawResponse::status(404).is_redirect());
    }
}
