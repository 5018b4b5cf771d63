use std::io::Read;
use std::time::Duration;

use thiserror::Error;

use crate::snapshot::{DataResponse, PayloadError};

const DATA_PATH: &str = "/data";
const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },
    #[error("reading response body failed: {0}")]
    ReadBody(#[from] std::io::Error),
    #[error(transparent)]
    Decode(#[from] PayloadError),
}

/// Where combined snapshots come from. The poll loop owns exactly one.
pub trait SnapshotSource {
    fn fetch(&mut self) -> Result<DataResponse, FetchError>;
}

pub fn endpoint_url(endpoint: &str, path: &str) -> String {
    format!("{}{}", endpoint.trim_end_matches('/'), path)
}

/// Blocking HTTP source for `GET {endpoint}/data`.
pub struct HttpSnapshotSource {
    agent: ureq::Agent,
    url: String,
}

impl HttpSnapshotSource {
    pub fn new(endpoint: &str) -> Self {
        Self::with_agent(ureq::Agent::new(), endpoint)
    }

    /// Same as [`HttpSnapshotSource::new`] but gives up on a stalled backend.
    /// The window loop does not use this; a hung request only delays the next
    /// poll there.
    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self::with_agent(agent, endpoint)
    }

    fn with_agent(agent: ureq::Agent, endpoint: &str) -> Self {
        Self {
            agent,
            url: endpoint_url(endpoint, DATA_PATH),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Raw body, undecoded. Used by `agentctl dump`.
    pub fn fetch_bytes(&self) -> Result<Vec<u8>, FetchError> {
        let response = self
            .agent
            .get(&self.url)
            .call()
            .map_err(|source| FetchError::Transport {
                url: self.url.clone(),
                source: Box::new(source),
            })?;
        let mut body = Vec::new();
        response
            .into_reader()
            .take(MAX_BODY_BYTES)
            .read_to_end(&mut body)?;
        Ok(body)
    }
}

impl SnapshotSource for HttpSnapshotSource {
    fn fetch(&mut self) -> Result<DataResponse, FetchError> {
        let body = self.fetch_bytes()?;
        Ok(DataResponse::from_slice(&body)?)
    }
}
