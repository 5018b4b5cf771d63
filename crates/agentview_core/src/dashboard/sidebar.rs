use std::collections::BTreeMap;

use tracing::info;

use super::{Dashboard, PanelContent, PanelId, PanelSink, Span};
use crate::palette;
use crate::render::font::{draw_text, LINE_ADVANCE, TEXT_HEIGHT};
use crate::render::{Canvas, SidePanel};
use crate::snapshot::StoreView;

const PADDING_PX: i32 = 10;
const INDENT_PX: i32 = 12;
const BAR_WIDTH_PX: i32 = 60;
const PANEL_GAP_PX: i32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SidebarPage {
    #[default]
    Agent,
    World,
}

impl SidebarPage {
    pub fn label(self) -> &'static str {
        match self {
            SidebarPage::Agent => "Agent",
            SidebarPage::World => "World",
        }
    }

    pub fn next(self) -> Self {
        match self {
            SidebarPage::Agent => SidebarPage::World,
            SidebarPage::World => SidebarPage::Agent,
        }
    }

    pub fn panels(self) -> &'static [PanelId] {
        match self {
            SidebarPage::Agent => &[
                PanelId::Status,
                PanelId::Vitals,
                PanelId::Moodles,
                PanelId::Inventory,
                PanelId::Needs,
                PanelId::Threat,
                PanelId::Thoughts,
            ],
            SidebarPage::World => &[
                PanelId::Status,
                PanelId::LiveZombies,
                PanelId::LiveEntities,
                PanelId::LiveContainers,
                PanelId::LiveVehicles,
                PanelId::MemoryEntities,
                PanelId::MemoryContainers,
                PanelId::MemoryItems,
                PanelId::MemoryVehicles,
            ],
        }
    }
}

/// Holds the latest published panels and draws the active page.
#[derive(Debug, Default)]
pub struct Sidebar {
    dashboard: Dashboard,
    page: SidebarPage,
    panels: BTreeMap<PanelId, PanelContent>,
}

impl Sidebar {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard,
            ..Self::default()
        }
    }

    pub fn page(&self) -> SidebarPage {
        self.page
    }

    pub fn switch_page(&mut self) -> SidebarPage {
        self.page = self.page.next();
        info!(page = self.page.label(), "sidebar_page_switched");
        self.page
    }

    pub fn refresh(&mut self, view: &StoreView) {
        let dashboard = self.dashboard;
        dashboard.publish(view, self);
    }

    pub fn panel(&self, panel: PanelId) -> Option<&PanelContent> {
        self.panels.get(&panel)
    }

    fn draw_tabs(&self, canvas: &mut dyn Canvas, y: i32) {
        let mut x = PADDING_PX;
        for page in [SidebarPage::Agent, SidebarPage::World] {
            let color = if page == self.page {
                palette::TEXT_PRIMARY
            } else {
                palette::TEXT_FAINT
            };
            x = draw_text(canvas, x, y, &format!("[{}]", page.label()), color);
            x += PADDING_PX;
        }
        draw_text(canvas, x, y, "Tab", palette::TEXT_FAINT);
    }

    fn draw_panel(
        &self,
        canvas: &mut dyn Canvas,
        panel: PanelId,
        content: &PanelContent,
        mut y: i32,
        bottom: i32,
    ) -> i32 {
        let width = canvas.viewport().width as i32;
        let title = match content.count {
            Some(count) => format!("{} ({count})", panel.title()),
            None => panel.title().to_string(),
        };
        draw_text(canvas, PADDING_PX, y, &title, palette::PANEL_HEADER);
        y += LINE_ADVANCE;
        canvas.fill_rect(PADDING_PX, y - 3, width - PADDING_PX * 2, 1, palette::PANEL_RULE);

        for (index, line) in content.lines.iter().enumerate() {
            if y + LINE_ADVANCE > bottom {
                let hidden = content.lines.len() - index;
                draw_text(
                    canvas,
                    PADDING_PX,
                    y,
                    &format!("... {hidden} more"),
                    palette::TEXT_FAINT,
                );
                return bottom;
            }
            let mut x = PADDING_PX + line.indent as i32 * INDENT_PX;
            for span in &line.spans {
                match span {
                    Span::Text { text, color } => x = draw_text(canvas, x, y, text, *color),
                    Span::Bar { fraction, color } => {
                        let filled = (f64::from(BAR_WIDTH_PX) * fraction).round() as i32;
                        canvas.stroke_rect(x, y, BAR_WIDTH_PX, TEXT_HEIGHT, palette::PANEL_RULE);
                        canvas.fill_rect(x + 1, y + 1, filled - 2, TEXT_HEIGHT - 2, *color);
                        x += BAR_WIDTH_PX + PADDING_PX / 2;
                    }
                }
            }
            y += LINE_ADVANCE;
        }
        y + PANEL_GAP_PX
    }
}

impl PanelSink for Sidebar {
    fn present(&mut self, panel: PanelId, content: PanelContent) {
        self.panels.insert(panel, content);
    }
}

impl SidePanel for Sidebar {
    fn draw(&self, canvas: &mut dyn Canvas, _view: &StoreView) {
        let viewport = canvas.viewport();
        if viewport.is_empty() {
            return;
        }
        let height = viewport.height as i32;
        canvas.fill_rect(0, 0, viewport.width as i32, height, palette::SIDEBAR_BG);
        canvas.fill_rect(0, 0, 1, height, palette::PANEL_RULE);

        self.draw_tabs(canvas, PADDING_PX);
        let mut y = PADDING_PX + LINE_ADVANCE * 2;
        let bottom = height - PADDING_PX;
        for panel in self.page.panels() {
            if y + LINE_ADVANCE > bottom {
                break;
            }
            let Some(content) = self.panels.get(panel) else {
                continue;
            };
            y = self.draw_panel(canvas, *panel, content, y, bottom);
        }
    }
}
