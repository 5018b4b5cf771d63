use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::lenient;
use crate::render::Vec2;

/// Entity, container and vehicle records are kept as raw JSON objects; the
/// classifier and the container renderer normalize them.
pub type RawRecord = serde_json::Map<String, Value>;

#[derive(Debug, Error)]
#[error("payload does not decode at `{path}`: {source}")]
pub struct PayloadError {
    pub path: String,
    #[source]
    pub source: serde_json::Error,
}

/// One `GET /data` body after lenient decoding. A half that was missing,
/// null, empty or undecodable is `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataResponse {
    pub timestamp: f64,
    pub error: Option<String>,
    pub live: Option<LiveState>,
    pub memory: Option<MemoryState>,
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default, deserialize_with = "lenient::number")]
    timestamp: f64,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    error: Option<String>,
    #[serde(default)]
    state_data: Option<Value>,
    #[serde(default)]
    grid_data: Option<Value>,
}

impl DataResponse {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, PayloadError> {
        let mut deserializer = serde_json::Deserializer::from_slice(bytes);
        let wire: WireResponse =
            serde_path_to_error::deserialize(&mut deserializer).map_err(|err| PayloadError {
                path: err.path().to_string(),
                source: err.into_inner(),
            })?;
        Ok(Self::from_wire(wire))
    }

    pub fn from_value(value: Value) -> Result<Self, PayloadError> {
        let wire: WireResponse =
            serde_path_to_error::deserialize(value).map_err(|err| PayloadError {
                path: err.path().to_string(),
                source: err.into_inner(),
            })?;
        Ok(Self::from_wire(wire))
    }

    fn from_wire(wire: WireResponse) -> Self {
        let live = decode_section::<LiveState>("state_data", wire.state_data).filter(|live| {
            let keep = live.has_content();
            if !keep {
                debug!("live_snapshot_empty_ignored");
            }
            keep
        });
        let memory = decode_section::<MemoryState>("grid_data", wire.grid_data);
        Self {
            timestamp: wire.timestamp,
            error: wire.error.filter(|message| !message.is_empty()),
            live,
            memory,
        }
    }
}

fn decode_section<T: DeserializeOwned>(section: &'static str, value: Option<Value>) -> Option<T> {
    let value = value.filter(|value| !value.is_null())?;
    match serde_path_to_error::deserialize::<_, T>(value) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            warn!(
                section,
                path = %err.path(),
                error = %err.inner(),
                "payload_section_ignored"
            );
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LiveState {
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub tick: Option<f64>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub player: Option<PlayerState>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub flags: ControlFlags,
}

impl LiveState {
    /// The backend sends `{}` while its state file is missing.
    pub fn has_content(&self) -> bool {
        self.player.is_some() || self.tick.is_some()
    }

    pub fn agent_position(&self) -> Option<Vec2> {
        let position = self.player.as_ref()?.position.as_ref()?;
        Some(Vec2::new(position.x, position.y))
    }

    pub fn vision(&self) -> Option<&Vision> {
        self.player.as_ref().map(|player| &player.vision)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct ControlFlags {
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub autopilot_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlayerState {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub position: Option<Position>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub body: Option<Body>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub state: BTreeMap<String, Value>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub moodles: Vec<Moodle>,
    #[serde(default, deserialize_with = "inventory")]
    pub inventory: Vec<InventoryEntry>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub vision: Vision,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub action_state: Option<ActionState>,
}

impl PlayerState {
    /// Movement flags currently set, in key order.
    pub fn active_flags(&self) -> Vec<&str> {
        self.state
            .iter()
            .filter(|(_, value)| matches!(value, Value::Bool(true)))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn health_fraction(&self) -> f64 {
        self.body
            .as_ref()
            .and_then(|body| body.health)
            .map(|health| (health / 100.0).clamp(0.0, 1.0))
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Position {
    #[serde(deserialize_with = "lenient::number")]
    pub x: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub y: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub z: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Body {
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub health: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Moodle {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub value: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub sentiment: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ActionState {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub current_action_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryEntry {
    pub record: RawRecord,
    pub worn: bool,
}

/// Either a flat item list or `{ main: [...], worn: [...] }`; main items come
/// first.
fn inventory<'de, D>(deserializer: D) -> Result<Vec<InventoryEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let split = match &value {
        Value::Object(map) => map.contains_key("main") || map.contains_key("worn"),
        _ => false,
    };
    if !split {
        return Ok(lenient::list_from_value::<RawRecord>(value)
            .into_iter()
            .map(|record| InventoryEntry {
                record,
                worn: false,
            })
            .collect());
    }

    let Value::Object(mut map) = value else {
        return Ok(Vec::new());
    };
    let mut entries = Vec::new();
    for (key, worn) in [("main", false), ("worn", true)] {
        let Some(section) = map.remove(key) else {
            continue;
        };
        entries.extend(
            lenient::list_from_value::<RawRecord>(section)
                .into_iter()
                .map(|record| InventoryEntry { record, worn }),
        );
    }
    Ok(entries)
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Vision {
    #[serde(default, deserialize_with = "lenient::list")]
    pub objects: Vec<RawRecord>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub nearby_containers: Vec<RawRecord>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub vehicles: Vec<RawRecord>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub signals: Vec<SignalRecord>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub sounds: Vec<SignalRecord>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub tiles: Vec<TileRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TileRecord {
    #[serde(deserialize_with = "lenient::number")]
    pub x: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub y: f64,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub layer: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub room: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SignalRecord {
    #[serde(deserialize_with = "lenient::number")]
    pub x: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub y: f64,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub radius: Option<f64>,
    #[serde(default, rename = "type", deserialize_with = "lenient::opt_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub ttl_remaining_ms: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn midpoint(&self) -> Vec2 {
        Vec2::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    fn is_ordered(&self) -> bool {
        self.min_x <= self.max_x && self.min_y <= self.max_y
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MemoryState {
    #[serde(default, deserialize_with = "lenient::list")]
    pub tiles: Vec<TileRecord>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub bounds: Option<Bounds>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub entities: Vec<RawRecord>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub zombies: Vec<RawRecord>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub nearby_containers: Vec<RawRecord>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub world_items: Vec<RawRecord>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub vehicles: Vec<RawRecord>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub signals: Vec<SignalRecord>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub sounds: Vec<SignalRecord>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub brain: Option<BrainSummary>,
}

impl MemoryState {
    /// A grid with no tiles comes from a backend that is still starting up.
    pub fn is_ready(&self) -> bool {
        !self.tiles.is_empty()
    }

    /// Reported bounds, or the extent of the known tiles.
    pub fn region_bounds(&self) -> Option<Bounds> {
        if let Some(bounds) = self.bounds.filter(Bounds::is_ordered) {
            return Some(bounds);
        }
        let mut tiles = self.tiles.iter();
        let first = tiles.next()?;
        let seed = Bounds {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };
        Some(tiles.fold(seed, |acc, tile| Bounds {
            min_x: acc.min_x.min(tile.x),
            max_x: acc.max_x.max(tile.x),
            min_y: acc.min_y.min(tile.y),
            max_y: acc.max_y.max(tile.y),
        }))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BrainSummary {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub threat: ThreatSummary,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub needs: NeedsSummary,
    #[serde(default, deserialize_with = "lenient::list")]
    pub thoughts: Vec<Thought>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub intent: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ThreatSummary {
    #[serde(default, deserialize_with = "lenient::number")]
    pub global_level: f64,
    #[serde(default, deserialize_with = "lenient::list")]
    pub vectors: Vec<ThreatVector>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ThreatVector {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub source_id: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient::opt_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub x: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub y: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NeedsSummary {
    #[serde(default, deserialize_with = "lenient::list")]
    pub active_needs: Vec<Need>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Need {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Thought {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub score: f64,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub timestamp: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: Value) -> DataResponse {
        DataResponse::from_value(value).expect("response should decode")
    }

    #[test]
    fn missing_halves_decode_as_none() {
        let response = decode(json!({ "timestamp": 12.5 }));
        assert_eq!(response.timestamp, 12.5);
        assert!(response.live.is_none());
        assert!(response.memory.is_none());
        assert!(response.error.is_none());
    }

    #[test]
    fn empty_state_object_is_treated_as_absent() {
        let response = decode(json!({ "timestamp": 1, "state_data": {}, "grid_data": {} }));
        assert!(response.live.is_none());
        let memory = response.memory.expect("grid section decodes");
        assert!(!memory.is_ready());
    }

    #[test]
    fn has_content_needs_player_or_tick() {
        assert!(!LiveState::default().has_content());
        let ticked = LiveState {
            tick: Some(3.0),
            ..LiveState::default()
        };
        assert!(ticked.has_content());
    }

    #[test]
    fn tile_and_signal_coordinates_accept_numeric_strings() {
        let memory: MemoryState = serde_json::from_value(json!({
            "tiles": [{ "x": "4", "y": " 9 " }, { "y": 1 }],
            "signals": [{ "x": "2.5", "y": 7, "radius": "3" }],
            "sounds": [{ "x": 1 }]
        }))
        .expect("memory");
        assert_eq!(memory.tiles.len(), 1);
        assert_eq!((memory.tiles[0].x, memory.tiles[0].y), (4.0, 9.0));
        assert_eq!(memory.signals.len(), 1);
        assert_eq!((memory.signals[0].x, memory.signals[0].y), (2.5, 7.0));
        assert_eq!(memory.signals[0].radius, Some(3.0));
        assert!(memory.sounds.is_empty());
    }

    #[test]
    fn empty_error_string_is_not_an_error() {
        assert!(decode(json!({ "error": "" })).error.is_none());
        assert_eq!(decode(json!({ "error": "x" })).error.as_deref(), Some("x"));
    }

    #[test]
    fn bad_section_is_dropped_without_losing_the_other() {
        let response = decode(json!({
            "state_data": "corrupt",
            "grid_data": { "tiles": [{ "x": 1, "y": 2, "layer": "Floor" }] }
        }));
        assert!(response.live.is_none());
        assert!(response.memory.expect("memory").is_ready());
    }

    #[test]
    fn truncated_body_fails_to_decode() {
        let err = DataResponse::from_slice(br#"{"timestamp": 1, "state_data": "#)
            .expect_err("truncated body must fail");
        assert!(err.to_string().contains("payload does not decode"));
    }

    #[test]
    fn player_fields_decode_leniently() {
        let response = decode(json!({
            "state_data": {
                "tick": 42,
                "player": {
                    "position": { "x": "10.5", "y": 20, "z": 0 },
                    "body": { "health": 55 },
                    "state": { "running": true, "aiming": false, "sneaking": true },
                    "moodles": { "Hungry": { "name": "Hungry", "value": 2, "sentiment": 2 } },
                    "inventory": {
                        "main": [{ "name": "Axe", "cat": "Weapon" }],
                        "worn": { "1": { "name": "Jacket" } }
                    },
                    "vision": { "objects": {}, "vehicles": [{ "id": "vehicle_3", "x": 1, "y": 2 }, 5] }
                },
                "flags": { "autopilot_enabled": false }
            }
        }));
        let live = response.live.expect("live state");
        assert_eq!(live.tick, Some(42.0));
        assert_eq!(live.flags.autopilot_enabled, Some(false));
        assert_eq!(live.agent_position(), Some(Vec2::new(10.5, 20.0)));

        let player = live.player.expect("player");
        assert_eq!(player.health_fraction(), 0.55);
        assert_eq!(player.active_flags(), vec!["running", "sneaking"]);
        assert_eq!(player.moodles.len(), 1);
        assert_eq!(player.inventory.len(), 2);
        assert!(!player.inventory[0].worn);
        assert!(player.inventory[1].worn);
        assert!(player.vision.objects.is_empty());
        assert_eq!(player.vision.vehicles.len(), 1);
    }

    #[test]
    fn flat_inventory_list_is_accepted() {
        let response = decode(json!({
            "state_data": { "player": { "inventory": [{ "name": "Bag" }, { "name": "Pen" }] } }
        }));
        let player = response.live.and_then(|live| live.player).expect("player");
        assert_eq!(player.inventory.len(), 2);
        assert!(player.inventory.iter().all(|entry| !entry.worn));
    }

    #[test]
    fn region_bounds_fall_back_to_tile_extent() {
        let memory: MemoryState = serde_json::from_value(json!({
            "tiles": [{ "x": 4, "y": 9 }, { "x": -2, "y": 3 }, { "x": 1, "y": 12 }]
        }))
        .expect("memory");
        let bounds = memory.region_bounds().expect("bounds");
        assert_eq!(bounds.midpoint(), Vec2::new(1.0, 7.5));

        let reported: MemoryState = serde_json::from_value(json!({
            "tiles": [{ "x": 4, "y": 9 }],
            "bounds": { "min_x": 0, "max_x": 10, "min_y": 0, "max_y": 20 }
        }))
        .expect("memory");
        assert_eq!(
            reported.region_bounds().map(|bounds| bounds.midpoint()),
            Some(Vec2::new(5.0, 10.0))
        );
    }

    #[test]
    fn brain_summary_decodes_with_defaults() {
        let memory: MemoryState = serde_json::from_value(json!({
            "brain": {
                "threat": { "global_level": 12.5, "vectors": [{ "source_id": 7, "type": "Zombie", "score": 3 }] },
                "needs": { "active_needs": [{ "name": "HUNGER", "score": 40 }] },
                "thoughts": [{ "category": "PLAN", "message": "loot" }],
                "intent": "Loot house"
            }
        }))
        .expect("memory");
        let brain = memory.brain.expect("brain");
        assert_eq!(brain.threat.global_level, 12.5);
        assert_eq!(brain.threat.vectors[0].source_id.as_deref(), Some("7"));
        assert_eq!(brain.needs.active_needs[0].score, 40.0);
        assert_eq!(brain.thoughts.len(), 1);
        assert_eq!(brain.intent.as_deref(), Some("Loot house"));
    }
}
