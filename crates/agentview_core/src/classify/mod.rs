mod entity;
mod kind;

pub use entity::{live_entities, memory_entities, merged_attributes, Entity};
pub use kind::{format_number, EntityKind, InfoFormatter, KindStyle, MarkerShape, Provenance};
