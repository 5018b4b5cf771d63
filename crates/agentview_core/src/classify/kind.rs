use serde_json::Value;

use crate::palette::{rgb, Rgba};
use crate::snapshot::lenient::{number_from_value, string_from_value};
use crate::snapshot::RawRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Zombie,
    Player,
    Animal,
    Vehicle,
    Container,
    Device,
    Generic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Live,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Circle,
    Rect,
}

pub type InfoFormatter = fn(&RawRecord) -> Option<String>;

/// Everything the renderer and the panels need to know about one kind.
pub struct KindStyle {
    pub label: &'static str,
    pub live: Rgba,
    pub memory: Rgba,
    pub shape: MarkerShape,
    pub info: InfoFormatter,
}

impl KindStyle {
    pub fn color(&self, provenance: Provenance) -> Rgba {
        match provenance {
            Provenance::Live => self.live,
            Provenance::Memory => self.memory,
        }
    }
}

static ZOMBIE: KindStyle = KindStyle {
    label: "Zombie",
    live: rgb(0xFF4444),
    memory: rgb(0xFF8888),
    shape: MarkerShape::Circle,
    info: no_info,
};

static PLAYER: KindStyle = KindStyle {
    label: "Survivor",
    live: rgb(0xF06292),
    memory: rgb(0xF8BBD0),
    shape: MarkerShape::Circle,
    info: character_info,
};

static ANIMAL: KindStyle = KindStyle {
    label: "Animal",
    live: rgb(0xA1887F),
    memory: rgb(0x6D4C41),
    shape: MarkerShape::Circle,
    info: animal_info,
};

static VEHICLE: KindStyle = KindStyle {
    label: "Vehicle",
    live: rgb(0x2196F3),
    memory: rgb(0x1565C0),
    shape: MarkerShape::Rect,
    info: no_info,
};

static CONTAINER: KindStyle = KindStyle {
    label: "Container",
    live: rgb(0xFFFF00),
    memory: rgb(0xCCCC00),
    shape: MarkerShape::Rect,
    info: no_info,
};

static DEVICE: KindStyle = KindStyle {
    label: "Device",
    live: rgb(0xB388FF),
    memory: rgb(0x7E57C2),
    shape: MarkerShape::Rect,
    info: device_info,
};

static GENERIC: KindStyle = KindStyle {
    label: "Item",
    live: rgb(0x00FFFF),
    memory: rgb(0x00AAAA),
    shape: MarkerShape::Rect,
    info: no_info,
};

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Zombie,
        EntityKind::Player,
        EntityKind::Animal,
        EntityKind::Vehicle,
        EntityKind::Container,
        EntityKind::Device,
        EntityKind::Generic,
    ];

    pub fn style(self) -> &'static KindStyle {
        match self {
            EntityKind::Zombie => &ZOMBIE,
            EntityKind::Player => &PLAYER,
            EntityKind::Animal => &ANIMAL,
            EntityKind::Vehicle => &VEHICLE,
            EntityKind::Container => &CONTAINER,
            EntityKind::Device => &DEVICE,
            EntityKind::Generic => &GENERIC,
        }
    }

    /// Maps a backend `type` string onto a kind. Anything unrecognised is
    /// [`EntityKind::Generic`].
    pub fn from_type_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "zombie" | "isozombie" => EntityKind::Zombie,
            "player" | "isoplayer" | "survivor" | "character" | "npc" => EntityKind::Player,
            "animal" | "isoanimal" => EntityKind::Animal,
            "vehicle" | "basevehicle" => EntityKind::Vehicle,
            "container" | "itemcontainer" => EntityKind::Container,
            "device" | "radio" | "television" | "generator" | "isoradio" | "isotelevision"
            | "isogenerator" => EntityKind::Device,
            _ => EntityKind::Generic,
        }
    }
}

fn no_info(_: &RawRecord) -> Option<String> {
    None
}

fn text(attributes: &RawRecord, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| attributes.get(*key))
        .find_map(string_from_value)
        .filter(|value| !value.is_empty())
}

fn number(attributes: &RawRecord, key: &str) -> Option<f64> {
    attributes.get(key).and_then(number_from_value)
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

fn join_parts(parts: Vec<String>) -> Option<String> {
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" | "))
    }
}

fn animal_info(attributes: &RawRecord) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(species) = text(attributes, &["species", "breed", "animal_type"]) {
        parts.push(species);
    }
    let gender = text(attributes, &["gender", "sex"]).or_else(|| {
        match attributes.get("isFemale").or_else(|| attributes.get("female")) {
            Some(Value::Bool(true)) => Some("female".to_string()),
            Some(Value::Bool(false)) => Some("male".to_string()),
            _ => None,
        }
    });
    if let Some(gender) = gender {
        parts.push(gender);
    }
    if let Some(age) = text(attributes, &["age", "age_days"]) {
        parts.push(format!("age {age}"));
    }
    join_parts(parts)
}

fn character_info(attributes: &RawRecord) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(weapon) = text(attributes, &["weapon", "primary", "primaryHand"]) {
        parts.push(format!("wpn: {weapon}"));
    }
    let worn = match attributes.get("worn") {
        Some(Value::Array(items)) => Some(items.len() as f64),
        Some(Value::Object(items)) => Some(items.len() as f64),
        Some(other) => number_from_value(other),
        None => None,
    };
    if let Some(worn) = worn {
        parts.push(format!("worn: {}", format_number(worn)));
    }
    if let Some(state) = text(attributes, &["state", "action", "behavior"]) {
        parts.push(state);
    }
    join_parts(parts)
}

const DEVICE_READOUTS: [(&str, &str); 6] = [
    ("power", "pwr"),
    ("fuel", "fuel"),
    ("condition", "cond"),
    ("volume", "vol"),
    ("channel", "ch"),
    ("temperature", "temp"),
];

fn device_info(attributes: &RawRecord) -> Option<String> {
    let mut parts = Vec::new();
    let on = ["isOn", "on", "activated", "active"]
        .iter()
        .find_map(|key| match attributes.get(*key) {
            Some(Value::Bool(flag)) => Some(*flag),
            Some(other) => number_from_value(other).map(|value| value != 0.0),
            None => None,
        });
    if let Some(on) = on {
        parts.push(if on { "ON" } else { "OFF" }.to_string());
    }
    for (key, short) in DEVICE_READOUTS {
        if let Some(value) = number(attributes, key) {
            parts.push(format!("{short}: {}", format_number(value)));
        }
    }
    join_parts(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn type_names_map_case_insensitively() {
        assert_eq!(EntityKind::from_type_name("Zombie"), EntityKind::Zombie);
        assert_eq!(EntityKind::from_type_name("IsoPlayer"), EntityKind::Player);
        assert_eq!(EntityKind::from_type_name(" animal "), EntityKind::Animal);
        assert_eq!(EntityKind::from_type_name("BaseVehicle"), EntityKind::Vehicle);
        assert_eq!(EntityKind::from_type_name("Radio"), EntityKind::Device);
        assert_eq!(EntityKind::from_type_name("Spaceship"), EntityKind::Generic);
        assert_eq!(EntityKind::from_type_name(""), EntityKind::Generic);
    }

    #[test]
    fn static_kinds_are_rectangles() {
        for kind in EntityKind::ALL {
            let expected = match kind {
                EntityKind::Zombie | EntityKind::Player | EntityKind::Animal => MarkerShape::Circle,
                _ => MarkerShape::Rect,
            };
            assert_eq!(kind.style().shape, expected, "{kind:?}");
        }
    }

    #[test]
    fn live_and_memory_colors_differ_for_every_kind() {
        for kind in EntityKind::ALL {
            let style = kind.style();
            assert_ne!(style.color(Provenance::Live), style.color(Provenance::Memory));
        }
    }

    #[test]
    fn animal_info_lists_known_fields() {
        let info = animal_info(&record(json!({ "species": "Cow", "isFemale": true, "age": 12 })));
        assert_eq!(info.as_deref(), Some("Cow | female | age 12"));
        assert_eq!(animal_info(&record(json!({}))), None);
    }

    #[test]
    fn character_info_counts_worn_items() {
        let info = character_info(&record(json!({
            "weapon": "Baseball Bat",
            "worn": [{ "name": "Jacket" }, { "name": "Boots" }],
            "state": "walking"
        })));
        assert_eq!(info.as_deref(), Some("wpn: Baseball Bat | worn: 2 | walking"));
    }

    #[test]
    fn device_info_shows_switch_and_readouts() {
        let info = device_info(&record(json!({ "isOn": false, "fuel": 0.5, "channel": 98 })));
        assert_eq!(info.as_deref(), Some("OFF | fuel: 0.5 | ch: 98"));
        let powered = device_info(&record(json!({ "on": 1 })));
        assert_eq!(powered.as_deref(), Some("ON"));
    }

    #[test]
    fn generic_kinds_have_blank_info() {
        let attributes = record(json!({ "species": "Cow" }));
        assert_eq!((EntityKind::Generic.style().info)(&attributes), None);
        assert_eq!((EntityKind::Zombie.style().info)(&attributes), None);
    }
}
