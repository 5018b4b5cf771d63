use crate::snapshot::Bounds;

use super::frame::Viewport;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// World point the map is centered on. Rebuilt from the store every frame;
/// nothing carries over between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub center: Vec2,
    pub tile_size_px: f64,
}

impl Camera {
    /// Agent position if known, otherwise the middle of the memory region,
    /// otherwise the origin.
    pub fn resolve(agent: Option<Vec2>, region: Option<Bounds>, tile_size_px: u32) -> Self {
        let center = agent
            .or_else(|| region.map(|bounds| bounds.midpoint()))
            .unwrap_or(Vec2::ZERO);
        Self {
            center,
            tile_size_px: f64::from(tile_size_px.max(1)),
        }
    }

    pub fn to_screen(&self, world: Vec2, viewport: Viewport) -> (i32, i32) {
        let x = (world.x - self.center.x) * self.tile_size_px + f64::from(viewport.width) / 2.0;
        let y = (world.y - self.center.y) * self.tile_size_px + f64::from(viewport.height) / 2.0;
        (x.floor() as i32, y.floor() as i32)
    }

    pub fn view_bounds(&self, viewport: Viewport, margin_tiles: f64) -> ViewportBounds {
        let margin = margin_tiles.max(0.0);
        ViewportBounds {
            center: self.center,
            radius_x: f64::from(viewport.width) / self.tile_size_px / 2.0 + margin,
            radius_y: f64::from(viewport.height) / self.tile_size_px / 2.0 + margin,
        }
    }
}

/// World-space culling window around the camera center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportBounds {
    pub center: Vec2,
    pub radius_x: f64,
    pub radius_y: f64,
}

impl ViewportBounds {
    pub fn contains(&self, point: Vec2) -> bool {
        (point.x - self.center.x).abs() <= self.radius_x
            && (point.y - self.center.y).abs() <= self.radius_y
    }
}

/// Screen-space cull applied to each marker after projection.
pub fn on_screen(screen: (i32, i32), viewport: Viewport, margin_px: i32) -> bool {
    let (x, y) = screen;
    let margin_px = margin_px.max(0);
    x >= -margin_px
        && y >= -margin_px
        && x <= (viewport.width as i32).saturating_add(margin_px)
        && y <= (viewport.height as i32).saturating_add(margin_px)
}
