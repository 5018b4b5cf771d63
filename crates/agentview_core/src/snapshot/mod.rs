pub mod lenient;
mod payload;
mod store;

pub use payload::{
    ActionState, Body, Bounds, BrainSummary, ControlFlags, DataResponse, InventoryEntry,
    LiveState, MemoryState, Moodle, Need, NeedsSummary, PayloadError, PlayerState, Position,
    RawRecord, SignalRecord, Thought, ThreatSummary, ThreatVector, TileRecord, Vision,
};
pub use store::{
    LiveSnapshot, MemorySnapshot, SnapshotStore, StatusLine, StoreReader, StoreView, StoreWriter,
};
