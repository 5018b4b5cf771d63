//! Text panels fed from the Snapshot Store. Formatting is pure; where the
//! output goes is up to the injected [`PanelSink`].

mod formatters;
mod sidebar;

pub use formatters::fragment_lines;
pub use sidebar::{Sidebar, SidebarPage};

use crate::palette::Rgba;
use crate::snapshot::StoreView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PanelId {
    Status,
    Vitals,
    Moodles,
    Inventory,
    Needs,
    Threat,
    Thoughts,
    LiveZombies,
    LiveEntities,
    LiveContainers,
    LiveVehicles,
    MemoryEntities,
    MemoryContainers,
    MemoryItems,
    MemoryVehicles,
}

impl PanelId {
    pub const ALL: [PanelId; 15] = [
        PanelId::Status,
        PanelId::Vitals,
        PanelId::Moodles,
        PanelId::Inventory,
        PanelId::Needs,
        PanelId::Threat,
        PanelId::Thoughts,
        PanelId::LiveZombies,
        PanelId::LiveEntities,
        PanelId::LiveContainers,
        PanelId::LiveVehicles,
        PanelId::MemoryEntities,
        PanelId::MemoryContainers,
        PanelId::MemoryItems,
        PanelId::MemoryVehicles,
    ];

    pub fn title(self) -> &'static str {
        match self {
            PanelId::Status => "Status",
            PanelId::Vitals => "Vitals",
            PanelId::Moodles => "Moodles",
            PanelId::Inventory => "Inventory",
            PanelId::Needs => "Needs",
            PanelId::Threat => "Threat",
            PanelId::Thoughts => "Thoughts",
            PanelId::LiveZombies => "Zombies (live)",
            PanelId::LiveEntities => "Entities (live)",
            PanelId::LiveContainers => "Containers (live)",
            PanelId::LiveVehicles => "Vehicles (live)",
            PanelId::MemoryEntities => "Entities (memory)",
            PanelId::MemoryContainers => "Containers (memory)",
            PanelId::MemoryItems => "Items (memory)",
            PanelId::MemoryVehicles => "Vehicles (memory)",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Span {
    Text { text: String, color: Rgba },
    /// Horizontal bar filled to `fraction` of its width.
    Bar { fraction: f64, color: Rgba },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanelLine {
    pub indent: usize,
    pub spans: Vec<Span>,
}

impl PanelLine {
    pub fn new(indent: usize) -> Self {
        Self {
            indent,
            spans: Vec::new(),
        }
    }

    pub fn text(indent: usize, text: impl Into<String>, color: Rgba) -> Self {
        Self::new(indent).with_text(text, color)
    }

    pub fn with_text(mut self, text: impl Into<String>, color: Rgba) -> Self {
        self.spans.push(Span::Text {
            text: text.into(),
            color,
        });
        self
    }

    pub fn with_bar(mut self, fraction: f64, color: Rgba) -> Self {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.spans.push(Span::Bar { fraction, color });
        self
    }

    /// Text spans joined, bars dropped. Mostly for tests and the CLI.
    pub fn plain_text(&self) -> String {
        self.spans
            .iter()
            .filter_map(|span| match span {
                Span::Text { text, .. } => Some(text.as_str()),
                Span::Bar { .. } => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanelContent {
    /// Badge shown next to list panel titles.
    pub count: Option<usize>,
    pub lines: Vec<PanelLine>,
}

impl PanelContent {
    pub fn plain_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| format!("{}{}", "  ".repeat(line.indent), line.plain_text()))
            .collect()
    }
}

/// Receives every panel on each publish.
pub trait PanelSink {
    fn present(&mut self, panel: PanelId, content: PanelContent);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dashboard {
    pub max_container_depth: usize,
    pub thought_log_limit: usize,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            max_container_depth: crate::containers::DEFAULT_MAX_DEPTH,
            thought_log_limit: 12,
        }
    }
}

impl Dashboard {
    pub fn new(max_container_depth: usize, thought_log_limit: usize) -> Self {
        Self {
            max_container_depth,
            thought_log_limit,
        }
    }

    pub fn publish(&self, view: &StoreView, sink: &mut dyn PanelSink) {
        for panel in PanelId::ALL {
            sink.present(panel, self.panel(panel, view));
        }
    }

    pub fn panel(&self, panel: PanelId, view: &StoreView) -> PanelContent {
        let live = view.live_state();
        let player = live.and_then(|live| live.player.as_ref());
        let memory = view.memory_state();
        let depth = self.max_container_depth;
        match panel {
            PanelId::Status => formatters::status(&view.status),
            PanelId::Vitals => formatters::vitals(player),
            PanelId::Moodles => formatters::moodles(player),
            PanelId::Inventory => formatters::inventory(player, depth),
            PanelId::Needs => formatters::needs(memory),
            PanelId::Threat => formatters::threat(memory),
            PanelId::Thoughts => formatters::thoughts(memory, self.thought_log_limit),
            PanelId::LiveZombies => formatters::live_zombies(live),
            PanelId::LiveEntities => formatters::live_entities_panel(live),
            PanelId::LiveContainers => formatters::live_containers(live, depth),
            PanelId::LiveVehicles => formatters::live_vehicles(live, depth),
            PanelId::MemoryEntities => formatters::memory_entities_panel(memory),
            PanelId::MemoryContainers => formatters::memory_containers(memory, depth),
            PanelId::MemoryItems => formatters::memory_items(memory),
            PanelId::MemoryVehicles => formatters::memory_vehicles(memory, depth),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[derive(Default)]
    struct CollectingSink {
        panels: BTreeMap<PanelId, PanelContent>,
    }

    impl PanelSink for CollectingSink {
        fn present(&mut self, panel: PanelId, content: PanelContent) {
            self.panels.insert(panel, content);
        }
    }

    #[test]
    fn publish_hands_every_panel_to_sink() {
        let mut sink = CollectingSink::default();
        Dashboard::default().publish(&StoreView::default(), &mut sink);
        assert_eq!(sink.panels.len(), PanelId::ALL.len());
        assert_eq!(
            sink.panels[&PanelId::Status].plain_lines(),
            vec!["Waiting for data...".to_string()]
        );
    }

    #[test]
    fn bars_are_clamped_and_skipped_in_plain_text() {
        let line = PanelLine::text(1, "Health: 50%", [0, 0, 0, 255]).with_bar(7.0, [0, 0, 0, 255]);
        assert_eq!(line.plain_text(), "Health: 50%");
        assert_eq!(
            line.spans[1],
            Span::Bar {
                fraction: 1.0,
                color: [0, 0, 0, 255]
            }
        );
        let content = PanelContent {
            count: None,
            lines: vec![line],
        };
        assert_eq!(content.plain_lines(), vec!["  Health: 50%".to_string()]);
    }
}
