//! Every color the viewer draws with. The map, the legend and the sidebar all
//! read from here so the legend cannot disagree with what is on screen.

use crate::snapshot::TileRecord;

pub type Rgba = [u8; 4];

pub const fn rgb(hex: u32) -> Rgba {
    [(hex >> 16) as u8, (hex >> 8) as u8, hex as u8, 255]
}

pub const fn with_alpha(color: Rgba, alpha: u8) -> Rgba {
    [color[0], color[1], color[2], alpha]
}

pub const BACKGROUND: Rgba = rgb(0x000000);
pub const AGENT: Rgba = rgb(0x4CAF50);
pub const SIGNAL: Rgba = rgb(0xE040FB);
pub const SOUND: Rgba = rgb(0xFFA726);
pub const RING_ALPHA: u8 = 90;

pub const TILE_DEFAULT: Rgba = rgb(0x111111);
pub const TILE_LAYERS: [(&str, Rgba); 9] = [
    ("Tree", rgb(0x2E7D32)),
    ("Vegetation", rgb(0x1B3B1B)),
    ("Street", rgb(0x444444)),
    ("Floor", rgb(0x3A3A3A)),
    ("Wall", rgb(0x888888)),
    ("FenceHigh", rgb(0xA0522D)),
    ("FenceLow", rgb(0xCD853F)),
    ("Window", rgb(0xAAAAAA)),
    ("Door", rgb(0x44FFCC)),
];

const ROOM_CHANNEL_FLOOR: u8 = 40;
const ROOM_CHANNEL_CAP: u8 = 150;
const OUTSIDE_ROOM: &str = "outside";

pub const TEXT_PRIMARY: Rgba = rgb(0xEEEEEE);
pub const TEXT_DIM: Rgba = rgb(0x888888);
pub const TEXT_FAINT: Rgba = rgb(0x666666);
pub const PANEL_HEADER: Rgba = rgb(0x9FB4C8);
pub const SIDEBAR_BG: Rgba = rgb(0x15181D);
pub const PANEL_RULE: Rgba = rgb(0x2A3340);
pub const LEGEND_BG: Rgba = [10, 12, 16, 210];
pub const LEGEND_BORDER: Rgba = rgb(0x5C6A7E);

pub const HEALTH_LOW: Rgba = rgb(0xF44336);
pub const HEALTH_MID: Rgba = rgb(0xFF9800);
pub const HEALTH_OK: Rgba = rgb(0x4CAF50);

pub const MOODLE_GOOD: Rgba = rgb(0x6FBF6F);
pub const MOODLE_BAD: Rgba = rgb(0xE06060);
pub const MOODLE_NEUTRAL: Rgba = rgb(0xB0B0B0);

pub const CONTAINER_PART: Rgba = rgb(0xCCCCCC);
pub const CONTAINER_PART_MEMORY: Rgba = rgb(0x888888);
pub const INVENTORY_ITEM: Rgba = rgb(0xEEEEEE);

pub fn layer_color(layer: Option<&str>) -> Rgba {
    let Some(layer) = layer else {
        return TILE_DEFAULT;
    };
    TILE_LAYERS
        .iter()
        .find(|(name, _)| *name == layer)
        .map(|(_, color)| *color)
        .unwrap_or(TILE_DEFAULT)
}

/// Stable color for a room label. Hashes UTF-16 code units with the 32-bit
/// `h = c + (h << 5) - h` recurrence, then maps each of the low three bytes
/// into `[40, 150]` so no zone is too dark to read.
pub fn room_hash_color(room: &str) -> Rgba {
    let mut hash: i32 = 0;
    for unit in room.encode_utf16() {
        hash = i32::from(unit).wrapping_add((hash << 5).wrapping_sub(hash));
    }
    let mut color = [0u8, 0, 0, 255];
    for (index, channel) in color.iter_mut().take(3).enumerate() {
        let byte = ((hash >> (index * 8)) & 0xFF) as u8;
        *channel = byte.saturating_add(ROOM_CHANNEL_FLOOR).min(ROOM_CHANNEL_CAP);
    }
    color
}

pub fn tile_color(tile: &TileRecord, zone_overlay: bool) -> Rgba {
    if zone_overlay {
        if let Some(room) = tile.room.as_deref() {
            if !room.is_empty() && room != OUTSIDE_ROOM {
                return room_hash_color(room);
            }
        }
    }
    layer_color(tile.layer.as_deref())
}

pub fn health_color(fraction: f64) -> Rgba {
    if fraction < 0.3 {
        HEALTH_LOW
    } else if fraction < 0.7 {
        HEALTH_MID
    } else {
        HEALTH_OK
    }
}
