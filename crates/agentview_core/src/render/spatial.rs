use super::camera::{on_screen, Camera, Vec2, ViewportBounds};
use super::frame::{Canvas, FrameBuffer, PresentSurface, Viewport};
use super::legend::{draw_legend, legend_sections};
use crate::classify::{live_entities, memory_entities, Entity, MarkerShape};
use crate::config::MapConfig;
use crate::palette::{self, Rgba};
use crate::snapshot::{SignalRecord, StoreView};

const DEFAULT_RING_RADIUS_TILES: f64 = 3.0;
const MARKER_SCALE: f64 = 0.8;

/// Anything drawn beside the map in the same frame.
pub trait SidePanel {
    fn draw(&self, canvas: &mut dyn Canvas, view: &StoreView);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    pub window: Viewport,
    pub sidebar_width_px: u32,
}

impl FrameLayout {
    pub fn map_only(window: Viewport) -> Self {
        Self {
            window,
            sidebar_width_px: 0,
        }
    }

    pub fn map_width(&self) -> u32 {
        self.window.width.saturating_sub(self.sidebar_width_px)
    }

    pub fn sidebar_width(&self) -> u32 {
        self.window.width - self.map_width()
    }
}

/// Per-frame counters, handy for tests and debug logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub tiles_drawn: usize,
    pub tiles_culled: usize,
    pub markers_drawn: usize,
    pub markers_culled: usize,
    pub rings_drawn: usize,
}

/// Owns the offscreen buffer. A frame is composed there completely and then
/// handed to the visible surface with a single `present`.
#[derive(Debug)]
pub struct SpatialRenderer {
    config: MapConfig,
    offscreen: FrameBuffer,
}

impl SpatialRenderer {
    pub fn new(config: MapConfig) -> Self {
        Self {
            config,
            offscreen: FrameBuffer::default(),
        }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn toggle_zone_overlay(&mut self) -> bool {
        self.config.zone_overlay = !self.config.zone_overlay;
        self.config.zone_overlay
    }

    pub fn offscreen(&self) -> &FrameBuffer {
        &self.offscreen
    }

    /// Returns `Ok(None)` without touching `surface` until the first snapshot
    /// has arrived.
    pub fn render_frame<S: PresentSurface>(
        &mut self,
        view: &StoreView,
        layout: FrameLayout,
        side_panel: Option<&dyn SidePanel>,
        surface: &mut S,
    ) -> Result<Option<FrameReport>, S::Error> {
        if !view.has_any_snapshot() || layout.window.is_empty() {
            return Ok(None);
        }
        let report = self.compose(view, layout, side_panel);
        surface.ensure_size(layout.window)?;
        surface.present(&self.offscreen)?;
        Ok(Some(report))
    }

    /// Draws into the offscreen buffer only. Used for headless export.
    pub fn compose(
        &mut self,
        view: &StoreView,
        layout: FrameLayout,
        side_panel: Option<&dyn SidePanel>,
    ) -> FrameReport {
        self.offscreen.resize(layout.window);
        self.offscreen.clear(palette::BACKGROUND);

        let height = layout.window.height;
        let map_width = layout.map_width();
        let report = {
            let mut map = self.offscreen.region(0, 0, map_width, height);
            draw_map(&mut map, view, &self.config)
        };
        if let Some(panel) = side_panel {
            let mut sidebar = self
                .offscreen
                .region(map_width, 0, layout.sidebar_width(), height);
            panel.draw(&mut sidebar, view);
        }
        report
    }
}

struct MarkerPainter {
    camera: Camera,
    bounds: ViewportBounds,
    viewport: Viewport,
    tile_px: i32,
    pixel_margin: i32,
    report: FrameReport,
}

impl MarkerPainter {
    /// Screen position of the cell's center, or `None` when either cull
    /// rejects the point.
    fn project(&self, world: Vec2) -> Option<(i32, i32)> {
        if !self.bounds.contains(world) {
            return None;
        }
        let screen = self.camera.to_screen(world, self.viewport);
        if !on_screen(screen, self.viewport, self.pixel_margin) {
            return None;
        }
        let half = self.tile_px / 2;
        Some((screen.0 + half, screen.1 + half))
    }

    fn marker(
        &mut self,
        canvas: &mut dyn Canvas,
        world: Vec2,
        shape: MarkerShape,
        color: Rgba,
        filled: bool,
    ) {
        let Some((cx, cy)) = self.project(world) else {
            self.report.markers_culled += 1;
            return;
        };
        let size = ((f64::from(self.tile_px) * MARKER_SCALE).round() as i32).max(1);
        let radius = (size / 2).max(1);
        match (shape, filled) {
            (MarkerShape::Rect, true) => {
                canvas.fill_rect(cx - size / 2, cy - size / 2, size, size, color)
            }
            (MarkerShape::Rect, false) => {
                canvas.stroke_rect(cx - size / 2, cy - size / 2, size, size, color)
            }
            (MarkerShape::Circle, true) => canvas.fill_circle(cx, cy, radius, color),
            (MarkerShape::Circle, false) => canvas.stroke_circle(cx, cy, radius, color),
        }
        self.report.markers_drawn += 1;
    }

    fn entity(&mut self, canvas: &mut dyn Canvas, entity: &Entity, filled: bool) {
        self.marker(canvas, entity.position, entity.shape(), entity.color(), filled);
    }

    fn ring(&mut self, canvas: &mut dyn Canvas, record: &SignalRecord, color: Rgba) {
        let world = Vec2::new(record.x, record.y);
        let radius_tiles = record
            .radius
            .filter(|radius| radius.is_finite() && *radius > 0.0)
            .unwrap_or(DEFAULT_RING_RADIUS_TILES);
        // A ring wider than the viewport diagonal draws the same as one that
        // just spans it.
        let max_radius_px = f64::from(self.viewport.width).hypot(f64::from(self.viewport.height))
            + f64::from(self.pixel_margin.max(0) + self.tile_px);
        let radius_px = (radius_tiles * f64::from(self.tile_px))
            .min(max_radius_px)
            .round() as i32;
        let screen = self.camera.to_screen(world, self.viewport);
        if !on_screen(
            screen,
            self.viewport,
            self.pixel_margin.saturating_add(radius_px),
        ) {
            self.report.markers_culled += 1;
            return;
        }
        let half = self.tile_px / 2;
        let (cx, cy) = (screen.0 + half, screen.1 + half);
        let dot = (self.tile_px / 4).max(2);
        canvas.fill_circle(cx, cy, dot, color);
        canvas.stroke_circle(
            cx,
            cy,
            radius_px,
            palette::with_alpha(color, palette::RING_ALPHA),
        );
        self.report.rings_drawn += 1;
    }
}

/// Draws one map frame onto `canvas`: tiles, remembered entities, live
/// entities, the agent, signal rings and finally the legend.
pub fn draw_map(canvas: &mut dyn Canvas, view: &StoreView, config: &MapConfig) -> FrameReport {
    let viewport = canvas.viewport();
    if viewport.is_empty() {
        return FrameReport::default();
    }
    let width = viewport.width as i32;
    let height = viewport.height as i32;
    canvas.fill_rect(0, 0, width, height, palette::BACKGROUND);

    let camera = Camera::resolve(
        view.agent_position(),
        view.memory_region_bounds(),
        config.tile_size_px,
    );
    let bounds = camera.view_bounds(viewport, config.cull_margin_tiles);
    let tile_px = config.tile_size_px.max(1) as i32;
    let memory = view.memory_state();
    let live = view.live_state();

    let mut report = FrameReport::default();
    if let Some(memory) = memory {
        for tile in &memory.tiles {
            let world = Vec2::new(tile.x, tile.y);
            if !bounds.contains(world) {
                report.tiles_culled += 1;
                continue;
            }
            let (x, y) = camera.to_screen(world, viewport);
            canvas.fill_rect(
                x,
                y,
                tile_px,
                tile_px,
                palette::tile_color(tile, config.zone_overlay),
            );
            report.tiles_drawn += 1;
        }
    }

    let mut painter = MarkerPainter {
        camera,
        bounds,
        viewport,
        tile_px,
        pixel_margin: config.pixel_cull_margin_px,
        report,
    };

    if let Some(memory) = memory {
        for entity in memory_entities(memory) {
            painter.entity(canvas, &entity, false);
        }
    }
    if let Some(live) = live {
        for entity in live_entities(live) {
            painter.entity(canvas, &entity, true);
        }
    }
    if let Some(agent) = view.agent_position() {
        painter.marker(canvas, agent, MarkerShape::Circle, palette::AGENT, true);
    }

    if let Some(memory) = memory {
        for signal in &memory.signals {
            painter.ring(canvas, signal, palette::SIGNAL);
        }
        for sound in &memory.sounds {
            painter.ring(canvas, sound, palette::SOUND);
        }
    }
    if let Some(vision) = live.and_then(|live| live.vision()) {
        for signal in &vision.signals {
            painter.ring(canvas, signal, palette::SIGNAL);
        }
        for sound in &vision.sounds {
            painter.ring(canvas, sound, palette::SOUND);
        }
    }

    let report = painter.report;
    if config.show_legend {
        draw_legend(canvas, &legend_sections(config.zone_overlay));
    }
    report
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::classify::{EntityKind, Provenance};
    use crate::snapshot::{LiveSnapshot, LiveState, MemorySnapshot, MemoryState, StatusLine};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        FillRect(i32, i32, i32, i32, Rgba),
        StrokeRect(i32, i32, i32, i32, Rgba),
        FillCircle(i32, i32, i32, Rgba),
        StrokeCircle(i32, i32, i32, Rgba),
    }

    impl Call {
        fn color(&self) -> Rgba {
            match self {
                Call::FillRect(.., color)
                | Call::StrokeRect(.., color)
                | Call::FillCircle(.., color)
                | Call::StrokeCircle(.., color) => *color,
            }
        }
    }

    struct RecordingCanvas {
        viewport: Viewport,
        calls: Vec<Call>,
    }

    impl RecordingCanvas {
        fn new(width: u32, height: u32) -> Self {
            Self {
                viewport: Viewport::new(width, height),
                calls: Vec::new(),
            }
        }

        fn with_color(&self, color: Rgba) -> Vec<&Call> {
            self.calls.iter().filter(|call| call.color() == color).collect()
        }
    }

    impl Canvas for RecordingCanvas {
        fn viewport(&self) -> Viewport {
            self.viewport
        }

        fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Rgba) {
            self.calls.push(Call::FillRect(x, y, width, height, color));
        }

        fn stroke_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Rgba) {
            self.calls.push(Call::StrokeRect(x, y, width, height, color));
        }

        fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Rgba) {
            self.calls.push(Call::FillCircle(cx, cy, radius, color));
        }

        fn stroke_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Rgba) {
            self.calls.push(Call::StrokeCircle(cx, cy, radius, color));
        }
    }

    fn quiet_config() -> MapConfig {
        MapConfig {
            show_legend: false,
            ..MapConfig::default()
        }
    }

    fn view(live: Option<serde_json::Value>, memory: Option<serde_json::Value>) -> StoreView {
        StoreView {
            live: live.map(|value| {
                Arc::new(LiveSnapshot {
                    timestamp: 1.0,
                    state: serde_json::from_value::<LiveState>(value).expect("live fixture"),
                })
            }),
            memory: memory.map(|value| {
                Arc::new(MemorySnapshot {
                    timestamp: 1.0,
                    state: serde_json::from_value::<MemoryState>(value).expect("memory fixture"),
                })
            }),
            status: StatusLine::Waiting,
        }
    }

    fn zombie_memory_color() -> Rgba {
        EntityKind::Zombie.style().color(Provenance::Memory)
    }

    #[test]
    fn entity_at_camera_center_is_drawn_and_far_entity_is_not() {
        // 280x280 at 14 px is a 10-tile radius; the world margin adds 5 more.
        let fixture = view(
            Some(json!({ "tick": 1, "player": { "position": { "x": 100, "y": 100 } } })),
            Some(json!({
                "tiles": [{ "x": 100, "y": 100 }],
                "zombies": [
                    { "id": "near", "x": 100, "y": 100 },
                    { "id": "far", "x": 116, "y": 100 },
                    { "id": "farther", "x": 100, "y": 40 }
                ]
            })),
        );
        let mut canvas = RecordingCanvas::new(280, 280);
        let report = draw_map(&mut canvas, &fixture, &quiet_config());

        let zombies = canvas.with_color(zombie_memory_color());
        assert_eq!(zombies, vec![&Call::StrokeCircle(147, 147, 5, zombie_memory_color())]);
        assert_eq!(report.markers_culled, 2);
    }

    #[test]
    fn camera_falls_back_to_memory_bounds_then_origin() {
        let fixture = view(
            None,
            Some(json!({
                "tiles": [{ "x": 0, "y": 0 }],
                "bounds": { "min_x": 10, "max_x": 30, "min_y": 10, "max_y": 30 },
                "world_items": [{ "id": "box", "x": 20, "y": 20 }]
            })),
        );
        let mut canvas = RecordingCanvas::new(200, 100);
        draw_map(&mut canvas, &fixture, &quiet_config());
        let item = EntityKind::Generic.style().color(Provenance::Memory);
        let drawn = canvas.with_color(item);
        // Centered marker: cell top-left is (100, 50), center is +7, size 11.
        assert_eq!(drawn, vec![&Call::StrokeRect(102, 52, 11, 11, item)]);

        let origin = view(Some(json!({ "tick": 3 })), None);
        let mut canvas = RecordingCanvas::new(200, 100);
        let report = draw_map(&mut canvas, &origin, &quiet_config());
        assert_eq!(report, FrameReport::default());
        assert_eq!(canvas.calls.len(), 1);
    }

    #[test]
    fn draw_order_is_tiles_memory_live_agent_rings() {
        let fixture = view(
            Some(json!({
                "tick": 2,
                "player": {
                    "position": { "x": 0, "y": 0 },
                    "vision": {
                        "objects": [{ "id": "z1", "type": "Zombie", "x": 1, "y": 0 }],
                        "sounds": [{ "x": 2, "y": 2, "radius": 4 }]
                    }
                }
            })),
            Some(json!({
                "tiles": [{ "x": 0, "y": 0, "layer": "Street" }],
                "zombies": [{ "id": "z1", "x": 1, "y": 0 }]
            })),
        );
        let mut canvas = RecordingCanvas::new(300, 300);
        let report = draw_map(&mut canvas, &fixture, &quiet_config());

        let colors: Vec<Rgba> = canvas.calls.iter().skip(1).map(Call::color).collect();
        let zombie = EntityKind::Zombie.style();
        assert_eq!(
            colors,
            vec![
                palette::layer_color(Some("Street")),
                zombie.memory,
                zombie.live,
                palette::AGENT,
                palette::SOUND,
                palette::with_alpha(palette::SOUND, palette::RING_ALPHA),
            ]
        );
        assert_eq!(report.tiles_drawn, 1);
        assert_eq!(report.markers_drawn, 3);
        assert_eq!(report.rings_drawn, 1);
        assert_eq!(
            canvas.calls.last(),
            Some(&Call::StrokeCircle(
                185,
                185,
                56,
                palette::with_alpha(palette::SOUND, palette::RING_ALPHA)
            ))
        );
    }

    fn ring_color() -> Rgba {
        palette::with_alpha(palette::SOUND, palette::RING_ALPHA)
    }

    #[test]
    fn off_screen_ring_is_kept_only_when_its_radius_reaches_the_view() {
        // 280 px wide at 14 px per tile: x = 20 lands at 420, 120 px past the
        // right edge and 100 px past the 20 px margin.
        let fixture = view(
            None,
            Some(json!({
                "tiles": [],
                "bounds": { "min_x": 0, "max_x": 0, "min_y": 0, "max_y": 0 },
                "sounds": [
                    { "x": 20, "y": 0, "radius": 10 },
                    { "x": 20, "y": 0, "radius": 4 }
                ]
            })),
        );
        let mut canvas = RecordingCanvas::new(280, 280);
        let report = draw_map(&mut canvas, &fixture, &quiet_config());

        assert_eq!(report.rings_drawn, 1);
        assert_eq!(report.markers_culled, 1);
        assert_eq!(
            canvas.with_color(ring_color()),
            vec![&Call::StrokeCircle(427, 147, 140, ring_color())]
        );
    }

    #[test]
    fn huge_ring_radius_is_clamped_to_the_viewport() {
        let fixture = view(
            None,
            Some(json!({
                "tiles": [],
                "sounds": [
                    { "x": 0, "y": 0, "radius": 5000 },
                    { "x": 0, "y": 0, "radius": 1e12 }
                ]
            })),
        );
        let mut canvas = RecordingCanvas::new(200, 200);
        let report = draw_map(&mut canvas, &fixture, &quiet_config());
        assert_eq!(report.rings_drawn, 2);
        // Diagonal 282.8 plus the 20 px margin and one tile.
        assert_eq!(
            canvas.with_color(ring_color()),
            vec![
                &Call::StrokeCircle(107, 107, 317, ring_color()),
                &Call::StrokeCircle(107, 107, 317, ring_color())
            ]
        );

        let mut frame = FrameBuffer::new(Viewport::new(200, 200));
        let report = draw_map(&mut frame.canvas(), &fixture, &quiet_config());
        assert_eq!(report.rings_drawn, 2);
        assert_eq!(frame.pixel(107, 107), Some(palette::SOUND));
    }

    #[test]
    fn zone_overlay_switches_tile_color_to_room_hash() {
        let fixture = view(
            None,
            Some(json!({ "tiles": [{ "x": 0, "y": 0, "layer": "Floor", "room": "kitchen" }] })),
        );
        let mut canvas = RecordingCanvas::new(100, 100);
        draw_map(&mut canvas, &fixture, &quiet_config());
        assert_eq!(canvas.with_color(palette::room_hash_color("kitchen")).len(), 1);

        let layered = MapConfig {
            zone_overlay: false,
            ..quiet_config()
        };
        let mut canvas = RecordingCanvas::new(100, 100);
        draw_map(&mut canvas, &fixture, &layered);
        assert_eq!(canvas.with_color(palette::layer_color(Some("Floor"))).len(), 1);
    }

    #[test]
    fn tiles_outside_world_window_are_culled() {
        let fixture = view(
            None,
            Some(json!({
                "tiles": [{ "x": 0, "y": 0 }, { "x": 500, "y": 0 }],
                "bounds": { "min_x": 0, "max_x": 0, "min_y": 0, "max_y": 0 }
            })),
        );
        let mut canvas = RecordingCanvas::new(140, 140);
        let report = draw_map(&mut canvas, &fixture, &quiet_config());
        assert_eq!(report.tiles_drawn, 1);
        assert_eq!(report.tiles_culled, 1);
    }

    #[derive(Default)]
    struct CountingSurface {
        size: Option<Viewport>,
        presents: usize,
    }

    impl PresentSurface for CountingSurface {
        type Error = Infallible;

        fn ensure_size(&mut self, viewport: Viewport) -> Result<(), Infallible> {
            self.size = Some(viewport);
            Ok(())
        }

        fn present(&mut self, _frame: &FrameBuffer) -> Result<(), Infallible> {
            self.presents += 1;
            Ok(())
        }
    }

    struct SolidPanel(Rgba);

    impl SidePanel for SolidPanel {
        fn draw(&self, canvas: &mut dyn Canvas, _view: &StoreView) {
            let viewport = canvas.viewport();
            canvas.fill_rect(0, 0, viewport.width as i32, viewport.height as i32, self.0);
        }
    }

    #[test]
    fn frame_is_skipped_until_first_snapshot() {
        let mut renderer = SpatialRenderer::new(quiet_config());
        let mut surface = CountingSurface::default();
        let layout = FrameLayout::map_only(Viewport::new(64, 64));
        let report = renderer
            .render_frame(&StoreView::default(), layout, None, &mut surface)
            .expect("infallible");
        assert_eq!(report, None);
        assert_eq!(surface.presents, 0);
        assert_eq!(surface.size, None);
    }

    #[test]
    fn one_present_per_frame_with_sidebar_composed_offscreen() {
        let mut renderer = SpatialRenderer::new(quiet_config());
        let mut surface = CountingSurface::default();
        let layout = FrameLayout {
            window: Viewport::new(100, 40),
            sidebar_width_px: 30,
        };
        let panel = SolidPanel(palette::PANEL_RULE);
        let fixture = view(Some(json!({ "tick": 1 })), None);
        let report = renderer
            .render_frame(&fixture, layout, Some(&panel), &mut surface)
            .expect("infallible");
        assert!(report.is_some());
        assert_eq!(surface.presents, 1);
        assert_eq!(surface.size, Some(Viewport::new(100, 40)));
        assert_eq!(renderer.offscreen().pixel(69, 0), Some(palette::BACKGROUND));
        assert_eq!(renderer.offscreen().pixel(70, 0), Some(palette::PANEL_RULE));
    }

    #[test]
    fn sidebar_wider_than_window_leaves_no_map() {
        let layout = FrameLayout {
            window: Viewport::new(50, 50),
            sidebar_width_px: 80,
        };
        assert_eq!(layout.map_width(), 0);
        assert_eq!(layout.sidebar_width(), 50);
    }
}
