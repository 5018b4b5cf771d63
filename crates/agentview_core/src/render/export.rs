use std::path::Path;

use image::{ImageFormat, RgbaImage};
use thiserror::Error;
use tracing::info;

use super::frame::FrameBuffer;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("frame has no pixels to export")]
    EmptyFrame,
    #[error("failed to write png: {0}")]
    Image(#[from] image::ImageError),
}

/// Writes the composed frame as an RGBA PNG.
pub fn export_png(frame: &FrameBuffer, path: &Path) -> Result<(), ExportError> {
    let viewport = frame.viewport();
    if viewport.is_empty() {
        return Err(ExportError::EmptyFrame);
    }
    let image = RgbaImage::from_raw(viewport.width, viewport.height, frame.as_bytes().to_vec())
        .ok_or(ExportError::EmptyFrame)?;
    image.save_with_format(path, ImageFormat::Png)?;
    info!(
        path = %path.display(),
        width = viewport.width,
        height = viewport.height,
        "frame_exported"
    );
    Ok(())
}
