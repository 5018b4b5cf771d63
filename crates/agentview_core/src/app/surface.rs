use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::render::{FrameBuffer, PresentSurface, Viewport};

/// The window's visible surface. Only [`PresentSurface::present`] writes to
/// it, once per frame.
pub struct PixelsSurface {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
}

impl PixelsSurface {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport::new(size.width, size.height),
        })
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }
}

impl PresentSurface for PixelsSurface {
    type Error = Error;

    fn ensure_size(&mut self, viewport: Viewport) -> Result<(), Error> {
        if viewport.is_empty() || viewport == self.viewport {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), viewport.width, viewport.height)?;
        self.viewport = viewport;
        Ok(())
    }

    fn present(&mut self, frame: &FrameBuffer) -> Result<(), Error> {
        let source = frame.as_bytes();
        let target = self.pixels.frame_mut();
        if target.len() == source.len() {
            target.copy_from_slice(source);
        }
        self.pixels.render()
    }
}
