use std::convert::Infallible;

use crate::palette::Rgba;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    fn byte_len(self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// Drawing primitives shared by the map, the legend and the sidebar. All
/// coordinates are local to the canvas; anything outside is clipped.
pub trait Canvas {
    fn viewport(&self) -> Viewport;
    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Rgba);
    fn stroke_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Rgba);
    fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Rgba);
    fn stroke_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Rgba);
}

/// A target the finished frame is copied onto.
pub trait PresentSurface {
    type Error;

    fn ensure_size(&mut self, viewport: Viewport) -> Result<(), Self::Error>;
    fn present(&mut self, frame: &FrameBuffer) -> Result<(), Self::Error>;
}

/// Offscreen RGBA8 buffer. Frames are composed here in full before being
/// handed to a [`PresentSurface`].
#[derive(Debug, Clone, Default)]
pub struct FrameBuffer {
    viewport: Viewport,
    bytes: Vec<u8>,
}

impl FrameBuffer {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            bytes: vec![0; viewport.byte_len()],
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Returns `true` when the buffer was reallocated. Same-size calls keep
    /// the current contents.
    pub fn resize(&mut self, viewport: Viewport) -> bool {
        if viewport == self.viewport {
            return false;
        }
        self.viewport = viewport;
        self.bytes.clear();
        self.bytes.resize(viewport.byte_len(), 0);
        true
    }

    pub fn clear(&mut self, color: Rgba) {
        for chunk in self.bytes.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.viewport.width || y >= self.viewport.height {
            return None;
        }
        let offset = (y as usize * self.viewport.width as usize + x as usize) * 4;
        let chunk = self.bytes.get(offset..offset + 4)?;
        Some([chunk[0], chunk[1], chunk[2], chunk[3]])
    }

    /// Whole-buffer canvas.
    pub fn canvas(&mut self) -> Region<'_> {
        let viewport = self.viewport;
        self.region(0, 0, viewport.width, viewport.height)
    }

    /// Sub-rectangle canvas, clamped to the buffer.
    pub fn region(&mut self, left: u32, top: u32, width: u32, height: u32) -> Region<'_> {
        let left = left.min(self.viewport.width);
        let top = top.min(self.viewport.height);
        let width = width.min(self.viewport.width - left);
        let height = height.min(self.viewport.height - top);
        Region {
            stride: self.viewport.width as usize,
            left: left as usize,
            top: top as usize,
            viewport: Viewport { width, height },
            bytes: &mut self.bytes,
        }
    }
}

impl PresentSurface for FrameBuffer {
    type Error = Infallible;

    fn ensure_size(&mut self, viewport: Viewport) -> Result<(), Self::Error> {
        self.resize(viewport);
        Ok(())
    }

    fn present(&mut self, frame: &FrameBuffer) -> Result<(), Self::Error> {
        if self.viewport != frame.viewport {
            self.resize(frame.viewport);
        }
        self.bytes.copy_from_slice(&frame.bytes);
        Ok(())
    }
}

pub struct Region<'a> {
    bytes: &'a mut [u8],
    stride: usize,
    left: usize,
    top: usize,
    viewport: Viewport,
}

impl Region<'_> {
    fn put(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 || x >= self.viewport.width as i32 || y >= self.viewport.height as i32 {
            return;
        }
        let pixel = (self.top + y as usize) * self.stride + self.left + x as usize;
        let Some(dst) = self.bytes.get_mut(pixel * 4..pixel * 4 + 4) else {
            return;
        };
        blend_into(dst, color);
    }

    fn clip_span(&self, start: i32, len: i32, limit: u32) -> (i32, i32) {
        let lo = start.max(0);
        let hi = start.saturating_add(len).min(limit as i32);
        (lo, hi)
    }

    /// Rows or columns a circle of `radius` around `center` can touch.
    fn circle_span(&self, center: i32, radius: i32, limit: u32) -> (i32, i32) {
        let lo = center.saturating_sub(radius).max(0);
        let hi = center
            .saturating_add(radius)
            .saturating_add(1)
            .min(limit as i32);
        (lo, hi)
    }
}

impl Canvas for Region<'_> {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Rgba) {
        if width <= 0 || height <= 0 {
            return;
        }
        let (x0, x1) = self.clip_span(x, width, self.viewport.width);
        let (y0, y1) = self.clip_span(y, height, self.viewport.height);
        for py in y0..y1 {
            for px in x0..x1 {
                self.put(px, py, color);
            }
        }
    }

    fn stroke_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Rgba) {
        if width <= 0 || height <= 0 {
            return;
        }
        let right = x + width - 1;
        let bottom = y + height - 1;
        for px in x..=right {
            self.put(px, y, color);
            if bottom != y {
                self.put(px, bottom, color);
            }
        }
        for py in (y + 1)..bottom {
            self.put(x, py, color);
            if right != x {
                self.put(right, py, color);
            }
        }
    }

    fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Rgba) {
        if radius <= 0 {
            self.put(cx, cy, color);
            return;
        }
        let limit = i64::from(radius) * i64::from(radius);
        let (y0, y1) = self.circle_span(cy, radius, self.viewport.height);
        let (x0, x1) = self.circle_span(cx, radius, self.viewport.width);
        for py in y0..y1 {
            let dy = i64::from(py) - i64::from(cy);
            for px in x0..x1 {
                let dx = i64::from(px) - i64::from(cx);
                if dx * dx + dy * dy <= limit {
                    self.put(px, py, color);
                }
            }
        }
    }

    fn stroke_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Rgba) {
        if radius <= 0 {
            return;
        }
        let outer = i64::from(radius) * i64::from(radius);
        let inner = (i64::from(radius) - 1) * (i64::from(radius) - 1);
        let (y0, y1) = self.circle_span(cy, radius, self.viewport.height);
        let (x0, x1) = self.circle_span(cx, radius, self.viewport.width);
        for py in y0..y1 {
            let dy = i64::from(py) - i64::from(cy);
            for px in x0..x1 {
                let dx = i64::from(px) - i64::from(cx);
                let dist = dx * dx + dy * dy;
                if dist <= outer && dist > inner {
                    self.put(px, py, color);
                }
            }
        }
    }
}

fn blend_into(dst: &mut [u8], color: Rgba) {
    match color[3] {
        0 => {}
        255 => dst.copy_from_slice(&color),
        alpha => {
            let alpha = u16::from(alpha);
            let inverse = 255 - alpha;
            for channel in 0..3 {
                let src = u16::from(color[channel]);
                let old = u16::from(dst[channel]);
                dst[channel] = ((src * alpha + old * inverse) / 255) as u8;
            }
            dst[3] = 255;
        }
    }
}
