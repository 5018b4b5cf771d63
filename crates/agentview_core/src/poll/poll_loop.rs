use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};

use super::source::{FetchError, SnapshotSource};
use crate::snapshot::{DataResponse, LiveSnapshot, MemorySnapshot, StatusLine, StoreWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalfOutcome {
    Accepted,
    /// Half missing, null, or undecodable. The stored value is kept.
    Absent,
    /// Memory half present but without tiles. The stored value is kept.
    NotReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOutcome {
    pub live: HalfOutcome,
    pub memory: HalfOutcome,
    pub backend_error: bool,
}

/// Fetch, apply, wait, repeat. A fetch starts only after the previous one
/// has finished, so a slow backend never piles up requests.
pub struct PollLoop<S> {
    source: S,
    writer: StoreWriter,
    interval: Duration,
}

impl<S: SnapshotSource> PollLoop<S> {
    pub fn new(source: S, writer: StoreWriter, interval: Duration) -> Self {
        Self {
            source,
            writer,
            interval,
        }
    }

    /// One fetch and apply. On error the store is left untouched.
    pub fn poll_once(&mut self, now_unix_secs: f64) -> Result<PollOutcome, FetchError> {
        let response = self.source.fetch()?;
        Ok(apply_response(&self.writer, response, now_unix_secs))
    }

    /// Polls until `shutdown` receives a message or its sender is dropped.
    pub fn run(mut self, shutdown: Receiver<()>) {
        info!(interval_ms = self.interval.as_millis() as u64, "poll_loop_started");
        loop {
            if let Err(err) = self.poll_once(unix_now_secs()) {
                warn!(error = %err, "poll_failed");
            }
            match shutdown.recv_timeout(self.interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        info!("shutdown");
    }
}

pub fn unix_now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or(0.0)
}

/// Writes each present half on its own. A backend error wins the status line
/// over a same-payload live update.
pub fn apply_response(
    writer: &StoreWriter,
    response: DataResponse,
    now_unix_secs: f64,
) -> PollOutcome {
    let DataResponse {
        timestamp,
        error,
        live,
        memory,
    } = response;

    let mut connected_tick = None;
    let live_outcome = match live {
        Some(state) => {
            let tick = state.tick.unwrap_or(0.0);
            writer.set_live(LiveSnapshot { timestamp, state });
            debug!(tick, "live_snapshot_accepted");
            connected_tick = Some(tick);
            HalfOutcome::Accepted
        }
        None => HalfOutcome::Absent,
    };

    let memory_outcome = match memory {
        Some(state) if state.is_ready() => {
            let tiles = state.tiles.len();
            writer.set_memory(MemorySnapshot { timestamp, state });
            debug!(tiles, "memory_snapshot_accepted");
            HalfOutcome::Accepted
        }
        Some(_) => {
            debug!("memory_snapshot_not_ready");
            HalfOutcome::NotReady
        }
        None => HalfOutcome::Absent,
    };

    let backend_error = error.is_some();
    if let Some(message) = error {
        warn!(message = %message, "backend_error_reported");
        writer.set_status(StatusLine::BackendError(message));
    } else if let Some(tick) = connected_tick {
        writer.set_status(StatusLine::Connected {
            tick,
            latency_secs: now_unix_secs - timestamp,
        });
    }

    PollOutcome {
        live: live_outcome,
        memory: memory_outcome,
        backend_error,
    }
}
