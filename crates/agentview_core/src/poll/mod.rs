mod control;
mod poll_loop;
mod source;

pub use control::{
    next_autopilot_value, run_control_pump, spawn_control_pump, ControlClient, ControlCommand,
    ControlError, ControlHandle, HttpControlClient,
};
pub use poll_loop::{apply_response, unix_now_secs, HalfOutcome, PollLoop, PollOutcome};
pub use source::{endpoint_url, FetchError, HttpSnapshotSource, SnapshotSource};
