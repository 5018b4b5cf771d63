use super::font::{draw_text, text_width, LINE_ADVANCE, TEXT_HEIGHT};
use super::frame::Canvas;
use crate::classify::{EntityKind, MarkerShape, Provenance};
use crate::palette::{self, Rgba};

const LEGEND_MARGIN_PX: i32 = 8;
const LEGEND_INSET_PX: i32 = 6;
const SWATCH_PX: i32 = 10;
const SWATCH_GAP_PX: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swatch {
    /// One filled marker.
    Solid(MarkerShape),
    /// Filled live marker next to the outlined memory marker.
    LiveAndMemory { shape: MarkerShape, memory: Rgba },
    /// Source dot inside a translucent ring.
    Ring,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: &'static str,
    pub color: Rgba,
    pub swatch: Swatch,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendSection {
    pub title: &'static str,
    pub entries: Vec<LegendEntry>,
}

const ZONE_SAMPLE_ROOM: &str = "kitchen";

/// Built from the same tables the map draws with.
pub fn legend_sections(zone_overlay: bool) -> Vec<LegendSection> {
    let mut tiles = Vec::new();
    if zone_overlay {
        tiles.push(LegendEntry {
            label: "Zones (room hash)",
            color: palette::room_hash_color(ZONE_SAMPLE_ROOM),
            swatch: Swatch::Solid(MarkerShape::Rect),
        });
    }
    tiles.extend(palette::TILE_LAYERS.iter().map(|&(name, color)| LegendEntry {
        label: name,
        color,
        swatch: Swatch::Solid(MarkerShape::Rect),
    }));

    let mut entities: Vec<LegendEntry> = EntityKind::ALL
        .iter()
        .map(|kind| {
            let style = kind.style();
            LegendEntry {
                label: style.label,
                color: style.color(Provenance::Live),
                swatch: Swatch::LiveAndMemory {
                    shape: style.shape,
                    memory: style.color(Provenance::Memory),
                },
            }
        })
        .collect();
    entities.push(LegendEntry {
        label: "Signal",
        color: palette::SIGNAL,
        swatch: Swatch::Ring,
    });
    entities.push(LegendEntry {
        label: "Sound",
        color: palette::SOUND,
        swatch: Swatch::Ring,
    });
    entities.push(LegendEntry {
        label: "Agent",
        color: palette::AGENT,
        swatch: Swatch::Solid(MarkerShape::Circle),
    });

    vec![
        LegendSection {
            title: "Tiles",
            entries: tiles,
        },
        LegendSection {
            title: "Entities",
            entries: entities,
        },
    ]
}

fn swatch_width(swatch: Swatch) -> i32 {
    match swatch {
        Swatch::LiveAndMemory { .. } => SWATCH_PX * 2 + SWATCH_GAP_PX,
        Swatch::Solid(_) | Swatch::Ring => SWATCH_PX,
    }
}

fn draw_marker(canvas: &mut dyn Canvas, x: i32, y: i32, shape: MarkerShape, color: Rgba, filled: bool) {
    let radius = SWATCH_PX / 2;
    match (shape, filled) {
        (MarkerShape::Rect, true) => canvas.fill_rect(x, y, SWATCH_PX, SWATCH_PX, color),
        (MarkerShape::Rect, false) => canvas.stroke_rect(x, y, SWATCH_PX, SWATCH_PX, color),
        (MarkerShape::Circle, true) => canvas.fill_circle(x + radius, y + radius, radius, color),
        (MarkerShape::Circle, false) => canvas.stroke_circle(x + radius, y + radius, radius, color),
    }
}

fn draw_swatch(canvas: &mut dyn Canvas, x: i32, y: i32, entry: &LegendEntry) {
    match entry.swatch {
        Swatch::Solid(shape) => draw_marker(canvas, x, y, shape, entry.color, true),
        Swatch::LiveAndMemory { shape, memory } => {
            draw_marker(canvas, x, y, shape, entry.color, true);
            draw_marker(canvas, x + SWATCH_PX + SWATCH_GAP_PX, y, shape, memory, false);
        }
        Swatch::Ring => {
            let radius = SWATCH_PX / 2;
            canvas.fill_circle(x + radius, y + radius, 1, entry.color);
            canvas.stroke_circle(
                x + radius,
                y + radius,
                radius,
                palette::with_alpha(entry.color, palette::RING_ALPHA),
            );
        }
    }
}

/// Draws the legend box anchored to the bottom-left corner.
pub fn draw_legend(canvas: &mut dyn Canvas, sections: &[LegendSection]) {
    let viewport = canvas.viewport();
    if viewport.is_empty() || sections.is_empty() {
        return;
    }

    let mut rows = 0;
    let mut content_width = 0;
    for section in sections {
        rows += 1 + section.entries.len() as i32;
        content_width = content_width.max(text_width(section.title));
        for entry in &section.entries {
            let width = swatch_width(entry.swatch) + SWATCH_GAP_PX + text_width(entry.label);
            content_width = content_width.max(width);
        }
    }

    let panel_width = content_width + LEGEND_INSET_PX * 2;
    let panel_height = rows * LINE_ADVANCE + LEGEND_INSET_PX * 2;
    let left = LEGEND_MARGIN_PX;
    let top = viewport.height as i32 - LEGEND_MARGIN_PX - panel_height;
    canvas.fill_rect(left, top, panel_width, panel_height, palette::LEGEND_BG);
    canvas.stroke_rect(left, top, panel_width, panel_height, palette::LEGEND_BORDER);

    let x = left + LEGEND_INSET_PX;
    let mut y = top + LEGEND_INSET_PX;
    for section in sections {
        draw_text(canvas, x, y, section.title, palette::PANEL_HEADER);
        y += LINE_ADVANCE;
        for entry in &section.entries {
            let swatch_y = y + (TEXT_HEIGHT - SWATCH_PX) / 2;
            draw_swatch(canvas, x, swatch_y, entry);
            let text_x = x + swatch_width(entry.swatch) + SWATCH_GAP_PX;
            draw_text(canvas, text_x, y, entry.label, palette::TEXT_PRIMARY);
            y += LINE_ADVANCE;
        }
    }
}
