//! HTTP fetching with explicit redirect handling.
//!
//! [`Fetcher`] wraps a [`Transport`] and turns single requests into a
//! complete fetch:
//!
//! - 2xx: the body is returned
//! - 3xx with `Location`: the location is resolved against the current URL
//!   and requested again, up to `max_redirects` hops
//! - anything else, including 3xx without `Location`: [`FetchError::Status`]
//!
//! There is no retry. The first failure aborts the build.

pub mod transport;
pub mod ureq_transport;

pub use transport::{RawResponse, Transport};
pub use ureq_transport::UreqTransport;

use crate::config::FetchConfig;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
    #[error("Gave up on {url} after {limit} redirects")]
    TooManyRedirects { url: String, limit: usize },
    #[error("Invalid redirect from {url} to {location:?}")]
    InvalidRedirect { url: String, location: String },
}

pub struct Fetcher<T: Transport = UreqTransport> {
    transport: T,
    max_redirects: usize,
}

impl Fetcher<UreqTransport> {
    /// Production fetcher configured from `[fetch]`.
    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(UreqTransport::new(config), config.max_redirects)
    }
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, max_redirects: usize) -> Self {
        Self {
            transport,
            max_redirects,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch `url` and decode the body as UTF-8 (lossily).
    pub fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let body = self.fetch_binary(url)?;
        Ok(match String::from_utf8(body) {
            Ok(text) => text,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        })
    }

    /// Fetch `url`, following redirects, and return the raw body.
    pub fn fetch_binary(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut current = url.to_string();
        let mut hops = 0;

        loop {
            log::debug!("GET {current}");
            let response = self.transport.get(&current)?;

            if response.is_success() {
                return Ok(response.body);
            }

            match (response.is_redirect(), response.location) {
                (true, Some(location)) => {
                    if hops == self.max_redirects {
                        return Err(FetchError::TooManyRedirects {
                            url: url.to_string(),
                            limit: self.max_redirects,
                        });
                    }
                    let next = resolve_location(&current, &location)?;
                    log::debug!("{} redirect: {current} -> {next}", response.status);
                    current = next;
                    hops += 1;
                }
                _ => {
                    return Err(FetchError::Status {
                        status: response.status,
                        url: current,
                    });
                }
            }
        }
    }
}

/// Resolve a `Location` header against the URL that sent it.
///
/// Absolute locations are used as-is; relative ones (`/feed`, `../feed`,
/// `//host/feed`) are joined onto `base`.
pub fn resolve_location(base: &str, location: &str) -> Result<String, FetchError> {
    let invalid = || FetchError::InvalidRedirect {
        url: base.to_string(),
        location: location.to_string(),
    };
    let base = Url::parse(base).map_err(|_| invalid())?;
    base.join(location.trim())
        .map(String::from)
        .map_err(|_| invalid())
}
