//! `ureq`-backed transport.
//!
//! The agent is built with automatic redirects disabled so that 3xx
//! responses come back to [`Fetcher`](super::Fetcher) untouched, and with
//! `ureq`'s status-as-error behavior undone so every status is a response.

use super::FetchError;
use super::transport::{RawResponse, Transport};
use crate::config::FetchConfig;
use std::io::Read;
use std::time::Duration;

pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(config: &FetchConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .redirects(0)
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn get(&self, url: &str) -> Result<RawResponse, FetchError> {
        let response = match self.agent.get(url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(transport)) => {
                return Err(FetchError::Network {
                    url: url.to_string(),
                    message: transport.to_string(),
                });
            }
        };

        let status = response.status();
        let location = response.header("Location").map(str::to_string);
        let mut body = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut body)
            .map_err(|err| FetchError::Network {
                url: url.to_string(),
                message: format!("reading body: {err}"),
            })?;

        Ok(RawResponse {
            status,
            location,
            body,
        })
    }
}
