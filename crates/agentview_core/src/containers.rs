//! Nested container rendering: world containers, vehicle parts, inventory
//! items and whatever they hold, turned into a display tree.
//!
//! The input is untrusted backend state, so both building a
//! [`ContainerNode`] tree from JSON and rendering one are depth-bounded.

use serde_json::Value;

use crate::classify::{format_number, merged_attributes};
use crate::palette::{self, Rgba};
use crate::snapshot::lenient::{number_from_value, string_from_value};
use crate::snapshot::RawRecord;

pub const DEFAULT_MAX_DEPTH: usize = 32;
/// Nesting kept when converting JSON into nodes. Deeper content is dropped and
/// the node is marked `elided`.
pub const BUILD_DEPTH_LIMIT: usize = 128;
/// Remaining lifetimes above one day are not worth showing.
pub const PERMANENT_TTL_SECS: u64 = 86_400;
const URGENT_TTL_SECS: u64 = 10;
const WARNING_TTL_SECS: u64 = 60;
const NON_DAMAGEABLE_CATEGORIES: [&str; 2] = ["Key", "Literature"];
const NON_DAMAGEABLE_NAMES: [&str; 1] = ["Key Ring"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponStats {
    pub min: f64,
    pub max: Option<f64>,
    pub crit: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContainerNode {
    pub label: String,
    pub id: Option<String>,
    pub children: Vec<ContainerNode>,
    /// Has an item list, even an empty one.
    pub is_container: bool,
    /// Children existed but were beyond [`BUILD_DEPTH_LIMIT`].
    pub elided: bool,
    pub condition: Option<f64>,
    pub is_damageable: bool,
    pub category: Option<String>,
    pub weapon_stats: Option<WeaponStats>,
    pub ttl_remaining_ms: Option<f64>,
    pub position: Option<(f64, f64)>,
    pub count: Option<f64>,
}

impl ContainerNode {
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Top-level record from an entity list. `properties` and `meta` are
    /// merged onto the root first, so `meta.parent_id` backs up a missing id
    /// and `properties.items` is found like a direct item list.
    pub fn from_entity_record(record: &RawRecord) -> Self {
        let mut attributes = merged_attributes(record);
        if !attributes.contains_key("id") {
            if let Some(parent) = attributes.get("parent_id").cloned() {
                attributes.insert("id".to_string(), parent);
            }
        }
        Self::from_record(&attributes)
    }

    /// Item or container record as the backend nests them.
    pub fn from_record(record: &RawRecord) -> Self {
        build_node(record, 0)
    }
}

fn text(record: &RawRecord, key: &str) -> Option<String> {
    record
        .get(key)
        .and_then(string_from_value)
        .filter(|value| !value.is_empty())
}

fn number(record: &RawRecord, key: &str) -> Option<f64> {
    record.get(key).and_then(number_from_value)
}

/// Direct `items`, else `container.items`; never both.
fn item_list(record: &RawRecord) -> Option<&Value> {
    match record.get("items") {
        Some(items) if !items.is_null() => Some(items),
        _ => match record.get("container") {
            Some(Value::Object(container)) => container.get("items").filter(|items| !items.is_null()),
            _ => None,
        },
    }
}

fn item_records(items: &Value) -> Vec<&RawRecord> {
    match items {
        Value::Array(values) => values.iter().filter_map(Value::as_object).collect(),
        Value::Object(map) => map.values().filter_map(Value::as_object).collect(),
        _ => Vec::new(),
    }
}

fn build_node(record: &RawRecord, depth: usize) -> ContainerNode {
    let items = item_list(record);
    let records = items.map(item_records).unwrap_or_default();
    let elided = depth >= BUILD_DEPTH_LIMIT && !records.is_empty();
    let children = if elided {
        Vec::new()
    } else {
        records
            .into_iter()
            .map(|child| build_node(child, depth + 1))
            .collect()
    };

    let weapon_stats = number(record, "minDmg").map(|min| WeaponStats {
        min,
        max: number(record, "maxDmg"),
        crit: number(record, "crit"),
    });
    let position = match (number(record, "x"), number(record, "y")) {
        (Some(x), Some(y)) => Some((x, y)),
        _ => None,
    };

    ContainerNode {
        label: text(record, "name")
            .or_else(|| text(record, "type"))
            .unwrap_or_else(|| "Unknown".to_string()),
        id: text(record, "id"),
        children,
        is_container: items.is_some(),
        elided,
        condition: number(record, "cond"),
        is_damageable: matches!(record.get("isDamageable"), Some(Value::Bool(true))),
        category: text(record, "cat"),
        weapon_stats,
        ttl_remaining_ms: number(record, "ttl_remaining_ms"),
        position,
        count: number(record, "count"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecayUrgency {
    Urgent,
    Warning,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecayTag {
    pub seconds: u64,
    pub urgency: DecayUrgency,
}

impl DecayTag {
    /// `None` for a missing, zero or effectively permanent lifetime.
    pub fn from_ttl_ms(ttl_remaining_ms: Option<f64>) -> Option<Self> {
        let ms = ttl_remaining_ms.filter(|ms| ms.is_finite() && *ms > 0.0)?;
        let seconds = (ms / 1000.0).ceil() as u64;
        if seconds > PERMANENT_TTL_SECS {
            return None;
        }
        let urgency = if seconds < URGENT_TTL_SECS {
            DecayUrgency::Urgent
        } else if seconds < WARNING_TTL_SECS {
            DecayUrgency::Warning
        } else {
            DecayUrgency::Normal
        };
        Some(Self { seconds, urgency })
    }

    pub fn color(&self) -> Rgba {
        match self.urgency {
            DecayUrgency::Urgent => palette::HEALTH_LOW,
            DecayUrgency::Warning => palette::HEALTH_MID,
            DecayUrgency::Normal => palette::HEALTH_OK,
        }
    }

    pub fn text(&self) -> String {
        format!("TTL:{}s", self.seconds)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FragmentBody {
    /// Not a container.
    Leaf,
    /// A container with nothing in it.
    Empty,
    Children(Vec<Fragment>),
    /// Content deeper than the render or build limit.
    Truncated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub label: String,
    pub id: Option<String>,
    pub color: Rgba,
    pub decay: Option<DecayTag>,
    /// Condition in `[0, 1]`, present only when the durability gate passes.
    pub durability: Option<f64>,
    pub weapon: Option<String>,
    pub suffix: Option<String>,
    pub coordinates: Option<String>,
    pub body: FragmentBody,
}

impl Fragment {
    /// Depth of the deepest fragment, counting this one as 1.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((fragment, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let FragmentBody::Children(children) = &fragment.body {
                stack.extend(children.iter().map(|child| (child, depth + 1)));
            }
        }
        deepest
    }

    pub fn contains_truncation(&self) -> bool {
        let mut stack = vec![self];
        while let Some(fragment) = stack.pop() {
            match &fragment.body {
                FragmentBody::Truncated => return true,
                FragmentBody::Children(children) => stack.extend(children.iter()),
                FragmentBody::Leaf | FragmentBody::Empty => {}
            }
        }
        false
    }
}

pub fn render_container(
    node: &ContainerNode,
    label: &str,
    color: Rgba,
    header_suffix: Option<&str>,
) -> Fragment {
    render_bounded(node, label, color, header_suffix, DEFAULT_MAX_DEPTH)
}

/// Children are rendered with their own label and the parent's color. A node
/// at `max_depth` that still has children renders as
/// [`FragmentBody::Truncated`].
pub fn render_bounded(
    node: &ContainerNode,
    label: &str,
    color: Rgba,
    header_suffix: Option<&str>,
    max_depth: usize,
) -> Fragment {
    render_at(node, label, color, header_suffix, 0, max_depth)
}

fn render_at(
    node: &ContainerNode,
    label: &str,
    color: Rgba,
    header_suffix: Option<&str>,
    depth: usize,
    max_depth: usize,
) -> Fragment {
    let body = if node.elided || (!node.children.is_empty() && depth >= max_depth) {
        FragmentBody::Truncated
    } else if !node.children.is_empty() {
        FragmentBody::Children(
            node.children
                .iter()
                .map(|child| render_at(child, &child.label, color, None, depth + 1, max_depth))
                .collect(),
        )
    } else if node.is_container {
        FragmentBody::Empty
    } else {
        FragmentBody::Leaf
    };

    // Top-level callers put coordinates in the label already.
    let coordinates = match (node.position, header_suffix, depth) {
        (Some((x, y)), None, 1..) => Some(format!("({},{})", format_number(x), format_number(y))),
        _ => None,
    };

    Fragment {
        label: label.to_string(),
        id: node.id.clone(),
        color,
        decay: DecayTag::from_ttl_ms(node.ttl_remaining_ms),
        durability: durability(node),
        weapon: node.weapon_stats.map(format_weapon),
        suffix: header_suffix.map(ToString::to_string),
        coordinates,
        body,
    }
}

/// Many non-physical items carry a nominal condition upstream, hence the
/// category and name exclusions on top of the damageable flag.
fn durability(node: &ContainerNode) -> Option<f64> {
    let condition = node.condition?;
    if !node.is_damageable {
        return None;
    }
    if node
        .category
        .as_deref()
        .is_some_and(|category| NON_DAMAGEABLE_CATEGORIES.contains(&category))
    {
        return None;
    }
    if NON_DAMAGEABLE_NAMES
        .iter()
        .any(|name| node.label.contains(name))
    {
        return None;
    }
    Some(condition.clamp(0.0, 1.0))
}

fn format_weapon(stats: WeaponStats) -> String {
    let max = stats
        .max
        .filter(|max| *max != 0.0)
        .map(|max| format!("{max:.1}"))
        .unwrap_or_else(|| "?".to_string());
    let crit = stats
        .crit
        .filter(|crit| *crit != 0.0)
        .map(|crit| format!("{crit:.0}"))
        .unwrap_or_else(|| "0".to_string());
    format!("Dmg: {:.1}-{max} | Crit: {crit}%", stats.min)
}
