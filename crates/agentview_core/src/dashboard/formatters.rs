use serde_json::Value;

use super::{PanelContent, PanelLine};
use crate::classify::{format_number, merged_attributes, Entity, EntityKind, Provenance};
use crate::containers::{render_bounded, ContainerNode, DecayTag, Fragment, FragmentBody};
use crate::palette::{self, Rgba};
use crate::snapshot::lenient::{number_from_value, string_from_value};
use crate::snapshot::{BrainSummary, LiveState, MemoryState, PlayerState, RawRecord, StatusLine};

const MAX_MOODLE_PIPS: f64 = 4.0;
const VEHICLE_ID_PREFIX: &str = "vehicle_";

/// Flattens a rendered container into indented panel lines.
pub fn fragment_lines(fragment: &Fragment, indent: usize, lines: &mut Vec<PanelLine>) {
    let mut header = PanelLine::text(indent, fragment.label.clone(), fragment.color);
    if let Some(id) = &fragment.id {
        header = header.with_text(format!(" [#{id}]"), palette::TEXT_FAINT);
    }
    if let Some(decay) = fragment.decay {
        header = header.with_text(format!(" {}", decay.text()), decay.color());
    }
    if let Some(condition) = fragment.durability {
        let color = palette::health_color(condition);
        header = header
            .with_text(format!(" {:.0}%", condition * 100.0), color)
            .with_bar(condition, color);
    }
    if let Some(weapon) = &fragment.weapon {
        header = header.with_text(format!(" {weapon}"), palette::TEXT_DIM);
    }
    if let Some(suffix) = &fragment.suffix {
        header = header.with_text(format!(" {suffix}"), palette::TEXT_DIM);
    }
    if let Some(coordinates) = &fragment.coordinates {
        header = header.with_text(format!(" {coordinates}"), palette::TEXT_FAINT);
    }
    lines.push(header);

    match &fragment.body {
        FragmentBody::Leaf => {}
        FragmentBody::Empty => lines.push(PanelLine::text(indent + 1, "Empty", palette::TEXT_FAINT)),
        FragmentBody::Truncated => lines.push(PanelLine::text(
            indent + 1,
            "... (truncated)",
            palette::TEXT_FAINT,
        )),
        FragmentBody::Children(children) => {
            for child in children {
                fragment_lines(child, indent + 1, lines);
            }
        }
    }
}

fn single(line: PanelLine) -> PanelContent {
    PanelContent {
        count: None,
        lines: vec![line],
    }
}

fn placeholder(text: &str) -> PanelLine {
    PanelLine::text(0, text, palette::TEXT_FAINT)
}

fn listed(count: usize, lines: Vec<PanelLine>, empty: &str) -> PanelContent {
    let lines = if lines.is_empty() {
        vec![placeholder(empty)]
    } else {
        lines
    };
    PanelContent {
        count: Some(count),
        lines,
    }
}

fn text(record: &RawRecord, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find_map(string_from_value)
        .filter(|value| !value.is_empty())
}

fn exact_coordinates(record: &RawRecord) -> String {
    let coordinate = |key: &str| {
        record
            .get(key)
            .and_then(number_from_value)
            .map(format_number)
            .unwrap_or_else(|| "?".to_string())
    };
    format!("({},{})", coordinate("x"), coordinate("y"))
}

fn with_decay(line: PanelLine, ttl_remaining_ms: Option<f64>) -> PanelLine {
    match DecayTag::from_ttl_ms(ttl_remaining_ms) {
        Some(tag) => line.with_text(format!(" {}", tag.text()), tag.color()),
        None => line,
    }
}

pub(super) fn status(status: &StatusLine) -> PanelContent {
    single(match status {
        StatusLine::Waiting => PanelLine::text(0, "Waiting for data...", palette::TEXT_DIM),
        StatusLine::Connected { tick, latency_secs } => PanelLine::text(
            0,
            format!("Tick: {} | Latency: {latency_secs:.3}s", format_number(*tick)),
            palette::HEALTH_OK,
        ),
        StatusLine::BackendError(message) => PanelLine::text(
            0,
            format!("Backend Error: {message}"),
            palette::HEALTH_LOW,
        ),
    })
}

pub(super) fn vitals(player: Option<&PlayerState>) -> PanelContent {
    let Some(player) = player else {
        return single(placeholder("No player data"));
    };
    let health = player.health_fraction();
    let color = palette::health_color(health);
    let mut lines = vec![PanelLine::text(
        0,
        format!("Health: {:.0}%", health * 100.0),
        palette::TEXT_PRIMARY,
    )
    .with_text(" ", palette::TEXT_PRIMARY)
    .with_bar(health, color)];

    if let Some(position) = &player.position {
        lines.push(PanelLine::text(
            0,
            format!("X:{:.1} Y:{:.1}", position.x, position.y),
            palette::TEXT_PRIMARY,
        ));
    }
    if let Some(temperature) = player.body.as_ref().and_then(|body| body.temperature) {
        lines.push(PanelLine::text(
            0,
            format!("Temp: {temperature:.1}"),
            palette::TEXT_DIM,
        ));
    }
    let flags = player.active_flags();
    if !flags.is_empty() {
        lines.push(PanelLine::text(
            0,
            format!("State: {}", flags.join(", ")),
            palette::TEXT_DIM,
        ));
    }
    if let Some(action) = &player.action_state {
        let kind = action.current_action_type.as_deref().unwrap_or("none");
        let line = match action.status.as_deref() {
            Some(status) => format!("Action: {kind} ({status})"),
            None => format!("Action: {kind}"),
        };
        lines.push(PanelLine::text(0, line, palette::TEXT_DIM));
    }
    if let Some(status) = &player.status {
        lines.push(PanelLine::text(0, format!("Status: {status}"), palette::TEXT_DIM));
    }
    PanelContent { count: None, lines }
}

pub(super) fn moodles(player: Option<&PlayerState>) -> PanelContent {
    let moodles = player.map(|player| player.moodles.as_slice()).unwrap_or_default();
    if moodles.is_empty() {
        return single(placeholder("Calm"));
    }
    let lines = moodles
        .iter()
        .map(|moodle| {
            let level = moodle
                .value
                .filter(|value| *value >= 1.0)
                .unwrap_or(1.0)
                .min(MAX_MOODLE_PIPS) as usize;
            let color = match moodle.sentiment.map(|sentiment| sentiment as i64) {
                Some(1) => palette::MOODLE_GOOD,
                Some(2) | Some(4) => palette::MOODLE_BAD,
                _ => palette::MOODLE_NEUTRAL,
            };
            PanelLine::text(0, moodle.name.as_deref().unwrap_or("?"), color)
                .with_text(format!(" {}", "I".repeat(level)), palette::TEXT_DIM)
        })
        .collect();
    PanelContent {
        count: Some(moodles.len()),
        lines,
    }
}

pub(super) fn inventory(player: Option<&PlayerState>, max_depth: usize) -> PanelContent {
    let entries = player
        .map(|player| player.inventory.as_slice())
        .unwrap_or_default();
    let mut lines = Vec::new();
    for entry in entries {
        let node = ContainerNode::from_record(&entry.record);
        let count = node.count.filter(|count| *count != 0.0).unwrap_or(1.0);
        let mut suffix = format!("x{}", format_number(count));
        if entry.worn {
            suffix.push_str(" worn");
        }
        let label = node.label.clone();
        let fragment = render_bounded(
            &node,
            &label,
            palette::INVENTORY_ITEM,
            Some(&suffix),
            max_depth,
        );
        fragment_lines(&fragment, 0, &mut lines);
    }
    listed(entries.len(), lines, "Empty")
}

fn brain(memory: Option<&MemoryState>) -> Option<&BrainSummary> {
    memory.and_then(|memory| memory.brain.as_ref())
}

pub(super) fn needs(memory: Option<&MemoryState>) -> PanelContent {
    let mut needs: Vec<_> = brain(memory)
        .map(|brain| brain.needs.active_needs.iter().collect())
        .unwrap_or_default();
    needs.sort_by(|left, right| right.score.total_cmp(&left.score));
    let lines = needs
        .iter()
        .map(|need| {
            PanelLine::text(
                0,
                format!(
                    "{} {:.0} ",
                    need.name.as_deref().unwrap_or("?"),
                    need.score
                ),
                palette::TEXT_PRIMARY,
            )
            .with_bar(need.score / 100.0, palette::PANEL_HEADER)
        })
        .collect();
    listed(needs.len(), lines, "No active needs")
}

pub(super) fn threat(memory: Option<&MemoryState>) -> PanelContent {
    let Some(brain) = brain(memory) else {
        return single(placeholder("No threat data"));
    };
    let threat = &brain.threat;
    let mut vectors: Vec<_> = threat.vectors.iter().collect();
    vectors.sort_by(|left, right| right.score.total_cmp(&left.score));

    let mut lines = vec![PanelLine::text(
        0,
        format!("Threat: {:.1}", threat.global_level),
        palette::TEXT_PRIMARY,
    )];
    lines.extend(vectors.iter().map(|vector| {
        PanelLine::text(
            1,
            format!(
                "{} #{} ({:.1},{:.1}) {:.1}",
                vector.kind.as_deref().unwrap_or("?"),
                vector.source_id.as_deref().unwrap_or("??"),
                vector.x,
                vector.y,
                vector.score
            ),
            palette::TEXT_DIM,
        )
    }));
    PanelContent {
        count: Some(vectors.len()),
        lines,
    }
}

pub(super) fn thoughts(memory: Option<&MemoryState>, limit: usize) -> PanelContent {
    let Some(brain) = brain(memory) else {
        return single(placeholder("No thoughts"));
    };
    let mut lines = Vec::new();
    if let Some(intent) = &brain.intent {
        lines.push(PanelLine::text(
            0,
            format!("Intent: {intent}"),
            palette::PANEL_HEADER,
        ));
    }
    let skip = brain.thoughts.len().saturating_sub(limit);
    lines.extend(brain.thoughts.iter().skip(skip).map(|thought| {
        PanelLine::text(
            0,
            format!(
                "[{}] {}",
                thought.category.as_deref().unwrap_or("?"),
                thought.message.as_deref().unwrap_or("")
            ),
            palette::TEXT_DIM,
        )
    }));
    listed(brain.thoughts.len(), lines, "No thoughts")
}

fn vision_objects(live: Option<&LiveState>) -> Vec<Entity> {
    live.and_then(LiveState::vision)
        .map(|vision| {
            vision
                .objects
                .iter()
                .map(|record| Entity::classify(record, Provenance::Live, EntityKind::Generic))
                .collect()
        })
        .unwrap_or_default()
}

pub(super) fn live_zombies(live: Option<&LiveState>) -> PanelContent {
    let zombies: Vec<Entity> = vision_objects(live)
        .into_iter()
        .filter(|entity| entity.kind == EntityKind::Zombie)
        .collect();
    let lines = zombies
        .iter()
        .map(|zombie| {
            PanelLine::text(
                0,
                format!(
                    "Zombie #{} ({:.1},{:.1})",
                    zombie.id, zombie.position.x, zombie.position.y
                ),
                zombie.color(),
            )
        })
        .collect();
    listed(zombies.len(), lines, "None")
}

fn entity_lines(entity: &Entity, lines: &mut Vec<PanelLine>) {
    let label = entity
        .text("name")
        .unwrap_or_else(|| entity.style().label.to_string());
    let header = match entity.provenance {
        Provenance::Live => format!(
            "{label} #{} ({:.1},{:.1})",
            entity.id, entity.position.x, entity.position.y
        ),
        Provenance::Memory => format!(
            "{label} #{} ({},{})",
            entity.id,
            format_number(entity.position.x),
            format_number(entity.position.y)
        ),
    };
    lines.push(with_decay(
        PanelLine::text(0, header, entity.color()),
        entity.ttl_remaining_ms,
    ));
    if let Some(info) = entity.info_line() {
        lines.push(PanelLine::text(1, info, palette::TEXT_DIM));
    }
}

pub(super) fn live_entities_panel(live: Option<&LiveState>) -> PanelContent {
    let entities: Vec<Entity> = vision_objects(live)
        .into_iter()
        .filter(|entity| entity.kind != EntityKind::Zombie)
        .collect();
    let mut lines = Vec::new();
    for entity in &entities {
        entity_lines(entity, &mut lines);
    }
    listed(entities.len(), lines, "None")
}

pub(super) fn memory_entities_panel(memory: Option<&MemoryState>) -> PanelContent {
    let Some(memory) = memory else {
        return listed(0, Vec::new(), "None");
    };
    let zombies = memory
        .zombies
        .iter()
        .map(|record| Entity::classify(record, Provenance::Memory, EntityKind::Zombie));
    let others = memory
        .entities
        .iter()
        .map(|record| Entity::classify(record, Provenance::Memory, EntityKind::Generic));
    let entities: Vec<Entity> = zombies.chain(others).collect();

    let mut lines = Vec::new();
    for entity in &entities {
        if entity.kind == EntityKind::Zombie {
            let header = format!(
                "Zombie #{} ({},{})",
                entity.id,
                format_number(entity.position.x),
                format_number(entity.position.y)
            );
            lines.push(with_decay(
                PanelLine::text(0, header, entity.color()),
                entity.ttl_remaining_ms,
            ));
        } else {
            entity_lines(entity, &mut lines);
        }
    }
    listed(entities.len(), lines, "None")
}

fn container_lines(
    records: &[RawRecord],
    color: Rgba,
    max_depth: usize,
    lines: &mut Vec<PanelLine>,
) {
    for record in records {
        let attributes = merged_attributes(record);
        let node = ContainerNode::from_entity_record(record);
        let object_type = text(&attributes, &["object_type", "type"])
            .unwrap_or_else(|| "Container".to_string());
        let label = format!("{object_type} {}", exact_coordinates(&attributes));
        let fragment = render_bounded(&node, &label, color, None, max_depth);
        fragment_lines(&fragment, 0, lines);
    }
}

pub(super) fn live_containers(live: Option<&LiveState>, max_depth: usize) -> PanelContent {
    let records = live
        .and_then(LiveState::vision)
        .map(|vision| vision.nearby_containers.as_slice())
        .unwrap_or_default();
    let mut lines = Vec::new();
    let color = EntityKind::Container.style().color(Provenance::Live);
    container_lines(records, color, max_depth, &mut lines);
    listed(records.len(), lines, "None")
}

pub(super) fn memory_containers(memory: Option<&MemoryState>, max_depth: usize) -> PanelContent {
    let records = memory
        .map(|memory| memory.nearby_containers.as_slice())
        .unwrap_or_default();
    let mut lines = Vec::new();
    let color = EntityKind::Container.style().color(Provenance::Memory);
    container_lines(records, color, max_depth, &mut lines);
    listed(records.len(), lines, "None")
}

pub(super) fn memory_items(memory: Option<&MemoryState>) -> PanelContent {
    let records = memory
        .map(|memory| memory.world_items.as_slice())
        .unwrap_or_default();
    let mut lines = Vec::new();
    for record in records {
        let entity = Entity::classify(record, Provenance::Memory, EntityKind::Generic);
        let node = ContainerNode::from_entity_record(record);
        let label = format!("{} {}", node.label, exact_coordinates(&entity.attributes));
        // Items sit loose on the ground; one level of contents is enough.
        let fragment = render_bounded(&node, &label, entity.color(), None, 1);
        fragment_lines(&fragment, 0, &mut lines);
    }
    listed(records.len(), lines, "None")
}

/// `parts`, else `properties.parts`; object maps are taken in key order.
fn vehicle_parts(record: &RawRecord) -> Vec<&RawRecord> {
    let parts = match record.get("parts") {
        Some(parts) if !parts.is_null() => Some(parts),
        _ => match record.get("properties") {
            Some(Value::Object(properties)) => properties.get("parts"),
            _ => None,
        },
    };
    match parts {
        Some(Value::Array(values)) => values.iter().filter_map(Value::as_object).collect(),
        Some(Value::Object(map)) => map.values().filter_map(Value::as_object).collect(),
        _ => Vec::new(),
    }
}

fn has_storage(part: &RawRecord) -> bool {
    ["container", "items"]
        .iter()
        .any(|key| part.get(*key).is_some_and(is_truthy))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|value| value != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn vehicle_lines(
    records: &[RawRecord],
    provenance: Provenance,
    max_depth: usize,
    lines: &mut Vec<PanelLine>,
) {
    let (part_color, no_parts) = match provenance {
        Provenance::Live => (palette::CONTAINER_PART, "No accessible containers"),
        Provenance::Memory => (palette::CONTAINER_PART_MEMORY, "No container info"),
    };
    for record in records {
        let entity = Entity::classify(record, provenance, EntityKind::Vehicle);
        let object_type = entity
            .text("object_type")
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| "Unknown".to_string());
        let id = entity.id.replacen(VEHICLE_ID_PREFIX, "", 1);
        let header = format!(
            "{object_type} [#{id}] ({:.1},{:.1})",
            entity.position.x, entity.position.y
        );
        lines.push(with_decay(
            PanelLine::text(0, header, entity.color()),
            entity.ttl_remaining_ms,
        ));

        let parts: Vec<&RawRecord> = vehicle_parts(record)
            .into_iter()
            .filter(|part| has_storage(part))
            .collect();
        if parts.is_empty() {
            lines.push(PanelLine::text(1, no_parts, palette::TEXT_FAINT));
            continue;
        }
        for part in parts {
            let mut node = ContainerNode::from_record(part);
            let label = text(part, &["id", "name"]).unwrap_or_else(|| "Part".to_string());
            if node.id.as_deref() == Some(label.as_str()) {
                node.id = None;
            }
            let fragment = render_bounded(&node, &label, part_color, None, max_depth);
            fragment_lines(&fragment, 1, lines);
        }
    }
}

pub(super) fn live_vehicles(live: Option<&LiveState>, max_depth: usize) -> PanelContent {
    let records = live
        .and_then(LiveState::vision)
        .map(|vision| vision.vehicles.as_slice())
        .unwrap_or_default();
    let mut lines = Vec::new();
    vehicle_lines(records, Provenance::Live, max_depth, &mut lines);
    listed(records.len(), lines, "None")
}

pub(super) fn memory_vehicles(memory: Option<&MemoryState>, max_depth: usize) -> PanelContent {
    let records = memory
        .map(|memory| memory.vehicles.as_slice())
        .unwrap_or_default();
    let mut lines = Vec::new();
    vehicle_lines(records, Provenance::Memory, max_depth, &mut lines);
    listed(records.len(), lines, "None")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::containers::render_container;
    use crate::dashboard::Span;

    fn record(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    fn live(value: Value) -> LiveState {
        serde_json::from_value(value).expect("live fixture")
    }

    fn memory(value: Value) -> MemoryState {
        serde_json::from_value(value).expect("memory fixture")
    }

    #[test]
    fn status_lines_follow_connection_state() {
        let connected = status(&StatusLine::Connected {
            tick: 42.0,
            latency_secs: 0.12345,
        });
        assert_eq!(
            connected.plain_lines(),
            vec!["Tick: 42 | Latency: 0.123s".to_string()]
        );
        let failed = status(&StatusLine::BackendError("x".to_string()));
        assert_eq!(failed.plain_lines(), vec!["Backend Error: x".to_string()]);
        assert_eq!(failed.lines[0].spans[0], Span::Text {
            text: "Backend Error: x".to_string(),
            color: palette::HEALTH_LOW
        });
    }

    #[test]
    fn container_fragment_becomes_nested_lines() {
        let node = ContainerNode::from_record(&record(json!({
            "name": "Backpack",
            "id": 7,
            "items": [
                { "name": "Axe", "cond": 0.5, "isDamageable": true, "cat": "Weapon",
                  "minDmg": 1.0, "maxDmg": 2.0, "crit": 5 },
                { "name": "Pouch", "items": [] }
            ]
        })));
        let fragment = render_container(&node, "Backpack", palette::INVENTORY_ITEM, Some("x1"));
        let mut lines = Vec::new();
        fragment_lines(&fragment, 0, &mut lines);
        let text: Vec<String> = PanelContent { count: None, lines }.plain_lines();
        assert_eq!(
            text,
            vec![
                "Backpack [#7] x1".to_string(),
                "  Axe 50% Dmg: 1.0-2.0 | Crit: 5%".to_string(),
                "  Pouch".to_string(),
                "    Empty".to_string(),
            ]
        );
    }

    #[test]
    fn vitals_show_health_bar_and_flags() {
        let state = live(json!({
            "player": {
                "position": { "x": 1.26, "y": 2 },
                "body": { "health": 25 },
                "state": { "running": true, "aiming": false, "sneaking": true }
            }
        }));
        let content = vitals(state.player.as_ref());
        assert_eq!(
            content.plain_lines(),
            vec![
                "Health: 25% ".to_string(),
                "X:1.3 Y:2.0".to_string(),
                "State: running, sneaking".to_string(),
            ]
        );
        assert!(content.lines[0].spans.contains(&Span::Bar {
            fraction: 0.25,
            color: palette::HEALTH_LOW
        }));
    }

    #[test]
    fn moodles_use_pips_and_sentiment_colors() {
        let state = live(json!({
            "player": { "moodles": [
                { "name": "Hungry", "value": 2, "sentiment": 2 },
                { "name": "Happy", "sentiment": 1 },
                { "name": "Panic", "value": 9 }
            ] }
        }));
        let content = moodles(state.player.as_ref());
        assert_eq!(
            content.plain_lines(),
            vec![
                "Hungry II".to_string(),
                "Happy I".to_string(),
                "Panic IIII".to_string()
            ]
        );
        let colors: Vec<Rgba> = content
            .lines
            .iter()
            .map(|line| match &line.spans[0] {
                Span::Text { color, .. } => *color,
                Span::Bar { color, .. } => *color,
            })
            .collect();
        assert_eq!(
            colors,
            vec![palette::MOODLE_BAD, palette::MOODLE_GOOD, palette::MOODLE_NEUTRAL]
        );
        assert_eq!(moodles(None).plain_lines(), vec!["Calm".to_string()]);
    }

    #[test]
    fn inventory_suffixes_count_and_worn() {
        let state = live(json!({
            "player": { "inventory": {
                "main": [{ "name": "Nails", "count": 12 }, { "name": "Hammer" }],
                "worn": [{ "name": "Jacket" }]
            } }
        }));
        let content = inventory(state.player.as_ref(), 32);
        assert_eq!(content.count, Some(3));
        assert_eq!(
            content.plain_lines(),
            vec![
                "Nails x12".to_string(),
                "Hammer x1".to_string(),
                "Jacket x1 worn".to_string(),
            ]
        );
        assert_eq!(inventory(None, 32).plain_lines(), vec!["Empty".to_string()]);
    }

    #[test]
    fn needs_sort_by_score_descending() {
        let grid = memory(json!({
            "brain": { "needs": { "active_needs": [
                { "name": "Eat", "score": 40 },
                { "name": "Flee", "score": 95 }
            ] } }
        }));
        let content = needs(Some(&grid));
        assert_eq!(
            content.plain_lines(),
            vec!["Flee 95 ".to_string(), "Eat 40 ".to_string()]
        );
        assert_eq!(needs(None).plain_lines(), vec!["No active needs".to_string()]);
    }

    #[test]
    fn threat_and_thoughts_read_brain_summary() {
        let grid = memory(json!({
            "brain": {
                "threat": { "global_level": 0.8, "vectors": [
                    { "source_id": "z1", "type": "Zombie", "x": 1, "y": 2, "score": 0.2 },
                    { "source_id": "z2", "type": "Zombie", "x": 3, "y": 4, "score": 0.9 }
                ] },
                "thoughts": [
                    { "category": "Plan", "message": "one" },
                    { "category": "Plan", "message": "two" },
                    { "category": "Fear", "message": "three" }
                ],
                "intent": "Loot"
            }
        }));
        assert_eq!(
            threat(Some(&grid)).plain_lines(),
            vec![
                "Threat: 0.8".to_string(),
                "  Zombie #z2 (3.0,4.0) 0.9".to_string(),
                "  Zombie #z1 (1.0,2.0) 0.2".to_string(),
            ]
        );
        assert_eq!(
            thoughts(Some(&grid), 2).plain_lines(),
            vec![
                "Intent: Loot".to_string(),
                "[Plan] two".to_string(),
                "[Fear] three".to_string(),
            ]
        );
    }

    #[test]
    fn live_zombies_are_split_from_other_objects() {
        let state = live(json!({
            "player": { "vision": { "objects": [
                { "id": 3, "type": "Zombie", "x": 10.04, "y": 5 },
                { "id": "cow", "type": "Animal", "x": 1, "y": 1, "meta": { "species": "Cow" } }
            ] } }
        }));
        assert_eq!(
            live_zombies(Some(&state)).plain_lines(),
            vec!["Zombie #3 (10.0,5.0)".to_string()]
        );
        let others = live_entities_panel(Some(&state));
        assert_eq!(others.count, Some(1));
        assert_eq!(
            others.plain_lines(),
            vec!["Animal #cow (1.0,1.0)".to_string(), "  Cow".to_string()]
        );
    }

    #[test]
    fn memory_zombies_carry_decay_tags() {
        let grid = memory(json!({
            "zombies": [
                { "id": "z", "x": 4, "y": 5.5, "ttl_remaining_ms": 5000 },
                { "id": "old", "x": 0, "y": 0, "ttl_remaining_ms": 90000000 }
            ]
        }));
        let content = memory_entities_panel(Some(&grid));
        assert_eq!(
            content.plain_lines(),
            vec![
                "Zombie #z (4,5.5) TTL:5s".to_string(),
                "Zombie #old (0,0)".to_string()
            ]
        );
    }

    #[test]
    fn containers_use_object_type_and_parent_id() {
        let state = live(json!({
            "player": { "vision": { "nearby_containers": [{
                "object_type": "Crate", "x": 3, "y": 4,
                "meta": { "parent_id": "c9" },
                "items": [{ "name": "Nails", "x": 3, "y": 4 }]
            }] } }
        }));
        assert_eq!(
            live_containers(Some(&state), 32).plain_lines(),
            vec!["Crate (3,4) [#c9]".to_string(), "  Nails (3,4)".to_string()]
        );
    }

    #[test]
    fn vehicles_list_storage_parts_or_placeholder() {
        let state = live(json!({
            "player": { "vision": { "vehicles": [
                {
                    "id": "vehicle_12", "object_type": "Van", "x": 1, "y": 2,
                    "parts": [
                        { "id": "TruckBed", "container": { "items": [{ "name": "Tire" }] } },
                        { "id": "Engine" }
                    ]
                },
                { "x": 0, "y": 0 }
            ] } }
        }));
        assert_eq!(
            live_vehicles(Some(&state), 32).plain_lines(),
            vec![
                "Van [#12] (1.0,2.0)".to_string(),
                "  TruckBed".to_string(),
                "    Tire".to_string(),
                "Unknown [#??] (0.0,0.0)".to_string(),
                "  No accessible containers".to_string(),
            ]
        );
    }

    #[test]
    fn memory_vehicle_parts_fall_back_to_properties() {
        let grid = memory(json!({
            "vehicles": [{
                "id": "vehicle_5", "object_type": "Car", "x": 1, "y": 1,
                "properties": { "parts": [{ "name": "GloveBox", "items": [] }] }
            }, {
                "id": "vehicle_6", "x": 2, "y": 2, "parts": []
            }]
        }));
        assert_eq!(
            memory_vehicles(Some(&grid), 32).plain_lines(),
            vec![
                "Car [#5] (1.0,1.0)".to_string(),
                "  GloveBox".to_string(),
                "    Empty".to_string(),
                "Unknown [#6] (2.0,2.0)".to_string(),
                "  No container info".to_string(),
            ]
        );
    }

    #[test]
    fn memory_items_show_label_and_coordinates() {
        let grid = memory(json!({
            "world_items": [{ "id": "i1", "name": "Bandage", "x": 7, "y": 8, "ttl_remaining_ms": 45000 }]
        }));
        assert_eq!(
            memory_items(Some(&grid)).plain_lines(),
            vec!["Bandage (7,8) [#i1] TTL:45s".to_string()]
        );
    }
}
