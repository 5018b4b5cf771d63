mod input;
mod loop_runner;
mod surface;

pub use input::{KeyLatch, ViewerKey};
pub use loop_runner::{run_viewer, window_title, AppError};
pub use surface::PixelsSurface;
