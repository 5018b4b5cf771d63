pub mod app;
pub mod classify;
pub mod config;
pub mod containers;
pub mod dashboard;
pub mod palette;
pub mod poll;
pub mod render;
pub mod snapshot;

pub use app::{run_viewer, AppError};
pub use classify::{Entity, EntityKind, Provenance};
pub use config::{MapConfig, ViewerConfig};
pub use containers::{render_container, ContainerNode, DecayTag, Fragment};
pub use dashboard::{Dashboard, PanelContent, PanelId, PanelSink};
pub use poll::{
    ControlCommand, FetchError, HttpControlClient, HttpSnapshotSource, PollLoop, SnapshotSource,
};
pub use render::{export_png, ExportError, FrameBuffer, SpatialRenderer, Viewport};
pub use snapshot::{DataResponse, SnapshotStore, StatusLine, StoreReader, StoreView, StoreWriter};
