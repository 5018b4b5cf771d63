use serde_json::Value;

use super::kind::{EntityKind, KindStyle, MarkerShape, Provenance};
use crate::palette::Rgba;
use crate::render::Vec2;
use crate::snapshot::lenient::{number_from_value, string_from_value};
use crate::snapshot::{LiveState, MemoryState, RawRecord};

const NESTED_KEYS: [&str; 2] = ["properties", "meta"];

/// One drawable entity, rebuilt from its raw record on every use.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: String,
    pub kind: EntityKind,
    pub position: Vec2,
    pub provenance: Provenance,
    /// Memory entities only.
    pub ttl_remaining_ms: Option<f64>,
    pub attributes: RawRecord,
}

impl Entity {
    /// `fallback` is the kind implied by the list the record came from; an
    /// explicit `type` field wins over it unless it is unrecognised.
    pub fn classify(record: &RawRecord, provenance: Provenance, fallback: EntityKind) -> Self {
        let attributes = merged_attributes(record);
        let kind = attributes
            .get("type")
            .and_then(string_from_value)
            .map(|name| EntityKind::from_type_name(&name))
            .filter(|kind| *kind != EntityKind::Generic)
            .unwrap_or(fallback);
        let position = Vec2::new(
            attribute_number(&attributes, "x").unwrap_or(0.0),
            attribute_number(&attributes, "y").unwrap_or(0.0),
        );
        let id = ["id", "parent_id"]
            .iter()
            .filter_map(|key| attributes.get(*key))
            .find_map(string_from_value)
            .unwrap_or_else(|| "??".to_string());
        let ttl_remaining_ms = match provenance {
            Provenance::Memory => attribute_number(&attributes, "ttl_remaining_ms"),
            Provenance::Live => None,
        };
        Self {
            id,
            kind,
            position,
            provenance,
            ttl_remaining_ms,
            attributes,
        }
    }

    pub fn style(&self) -> &'static KindStyle {
        self.kind.style()
    }

    pub fn color(&self) -> Rgba {
        self.style().color(self.provenance)
    }

    pub fn shape(&self) -> MarkerShape {
        self.style().shape
    }

    pub fn info_line(&self) -> Option<String> {
        (self.style().info)(&self.attributes)
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.attributes.get(key).and_then(string_from_value)
    }
}

/// Root fields, overridden by `properties`, overridden by `meta`. Live vision
/// records nest their details under `meta`; memory records flatten them onto
/// the root or into `properties`.
pub fn merged_attributes(record: &RawRecord) -> RawRecord {
    let mut merged: RawRecord = record
        .iter()
        .filter(|(key, _)| !NESTED_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    for nested in NESTED_KEYS {
        if let Some(Value::Object(fields)) = record.get(nested) {
            for (key, value) in fields {
                if !value.is_null() {
                    merged.insert(key.clone(), value.clone());
                }
            }
        }
    }
    merged
}

fn attribute_number(attributes: &RawRecord, key: &str) -> Option<f64> {
    attributes.get(key).and_then(number_from_value)
}

fn classify_all<'a>(
    records: &'a [RawRecord],
    provenance: Provenance,
    fallback: EntityKind,
) -> impl Iterator<Item = Entity> + 'a {
    records
        .iter()
        .map(move |record| Entity::classify(record, provenance, fallback))
}

/// Vision entities in draw order: vehicles, then objects, then containers.
pub fn live_entities(live: &LiveState) -> Vec<Entity> {
    let Some(vision) = live.vision() else {
        return Vec::new();
    };
    classify_all(&vision.vehicles, Provenance::Live, EntityKind::Vehicle)
        .chain(classify_all(
            &vision.objects,
            Provenance::Live,
            EntityKind::Generic,
        ))
        .chain(classify_all(
            &vision.nearby_containers,
            Provenance::Live,
            EntityKind::Container,
        ))
        .collect()
}

/// Remembered entities in draw order: vehicles, characters, containers, then
/// loose world items.
pub fn memory_entities(memory: &MemoryState) -> Vec<Entity> {
    classify_all(&memory.vehicles, Provenance::Memory, EntityKind::Vehicle)
        .chain(classify_all(
            &memory.entities,
            Provenance::Memory,
            EntityKind::Generic,
        ))
        .chain(classify_all(
            &memory.zombies,
            Provenance::Memory,
            EntityKind::Zombie,
        ))
        .chain(classify_all(
            &memory.nearby_containers,
            Provenance::Memory,
            EntityKind::Container,
        ))
        .chain(classify_all(
            &memory.world_items,
            Provenance::Memory,
            EntityKind::Generic,
        ))
        .collect()
}
