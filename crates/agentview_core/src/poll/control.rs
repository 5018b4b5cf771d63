use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use super::source::endpoint_url;

const CONTROL_PATH: &str = "/control";

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("control request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },
    #[error("encoding control body failed: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    SetAutopilot(bool),
}

#[derive(Serialize)]
struct ControlBody {
    autopilot: bool,
}

impl ControlCommand {
    pub fn to_body(self) -> Result<String, serde_json::Error> {
        match self {
            Self::SetAutopilot(autopilot) => serde_json::to_string(&ControlBody { autopilot }),
        }
    }
}

pub trait ControlClient {
    fn send(&mut self, command: ControlCommand) -> Result<(), ControlError>;
}

/// `POST {endpoint}/control`; the response body is ignored.
pub struct HttpControlClient {
    agent: ureq::Agent,
    url: String,
}

impl HttpControlClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            agent: ureq::Agent::new(),
            url: endpoint_url(endpoint, CONTROL_PATH),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ControlClient for HttpControlClient {
    fn send(&mut self, command: ControlCommand) -> Result<(), ControlError> {
        let body = command.to_body()?;
        self.agent
            .post(&self.url)
            .set("Content-Type", "application/json")
            .send_string(&body)
            .map_err(|source| ControlError::Transport {
                url: self.url.clone(),
                source: Box::new(source),
            })?;
        Ok(())
    }
}

/// Sends queued commands one by one until every [`ControlHandle`] is dropped.
/// Failures are logged and never retried.
pub fn run_control_pump<C: ControlClient>(mut client: C, receiver: Receiver<ControlCommand>) {
    for command in receiver {
        match client.send(command) {
            Ok(()) => info!(?command, "control_sent"),
            Err(err) => warn!(?command, error = %err, "control_failed"),
        }
    }
}

/// Fire-and-forget sender side of the control pump.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    sender: Sender<ControlCommand>,
}

impl ControlHandle {
    pub fn submit(&self, command: ControlCommand) {
        if self.sender.send(command).is_err() {
            warn!(?command, "control_failed");
        }
    }
}

pub fn spawn_control_pump<C>(client: C) -> io::Result<(ControlHandle, JoinHandle<()>)>
where
    C: ControlClient + Send + 'static,
{
    let (sender, receiver) = mpsc::channel();
    let handle = thread::Builder::new()
        .name("control".to_string())
        .spawn(move || run_control_pump(client, receiver))?;
    Ok((ControlHandle { sender }, handle))
}

/// Value to request when the user toggles autopilot: the opposite of what the
/// backend last reported, or of what was last requested when it has not said.
pub fn next_autopilot_value(reported: Option<bool>, last_requested: bool) -> bool {
    !reported.unwrap_or(last_requested)
}
