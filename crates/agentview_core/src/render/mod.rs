mod camera;
mod export;
pub mod font;
mod frame;
mod legend;
mod spatial;

pub use camera::{on_screen, Camera, Vec2, ViewportBounds};
pub use export::{export_png, ExportError};
pub use frame::{Canvas, FrameBuffer, PresentSurface, Region, Viewport};
pub use legend::{draw_legend, legend_sections, LegendEntry, LegendSection, Swatch};
pub use spatial::{draw_map, FrameLayout, FrameReport, SidePanel, SpatialRenderer};
