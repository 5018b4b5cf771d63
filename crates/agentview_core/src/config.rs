use std::time::Duration;

use tracing::warn;

use crate::containers::DEFAULT_MAX_DEPTH;

pub const ENDPOINT_ENV_VAR: &str = "AGENTVIEW_ENDPOINT";
pub const POLL_MS_ENV_VAR: &str = "AGENTVIEW_POLL_MS";
pub const SIDEBAR_PX_ENV_VAR: &str = "AGENTVIEW_SIDEBAR_PX";
pub const TILE_PX_ENV_VAR: &str = "AGENTVIEW_TILE_PX";
pub const ZONE_OVERLAY_ENV_VAR: &str = "AGENTVIEW_ZONE_OVERLAY";

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000";
const DEFAULT_POLL_MS: u64 = 700;
const DEFAULT_SIDEBAR_PX: u32 = 460;
pub const DEFAULT_TILE_PX: u32 = 14;

/// Knobs the Spatial Renderer reads every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    pub tile_size_px: u32,
    pub zone_overlay: bool,
    pub cull_margin_tiles: f64,
    pub pixel_cull_margin_px: i32,
    pub show_legend: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            tile_size_px: DEFAULT_TILE_PX,
            zone_overlay: true,
            cull_margin_tiles: 5.0,
            pixel_cull_margin_px: 20,
            show_legend: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub endpoint: String,
    pub poll_interval: Duration,
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub sidebar_width_px: u32,
    pub map: MapConfig,
    pub max_container_depth: usize,
    pub thought_log_limit: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_MS),
            window_title: "Agent View".to_string(),
            window_width: 1400,
            window_height: 860,
            sidebar_width_px: DEFAULT_SIDEBAR_PX,
            map: MapConfig::default(),
            max_container_depth: DEFAULT_MAX_DEPTH,
            thought_log_limit: 12,
        }
    }
}

impl ViewerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns. Values that do not
    /// parse are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(endpoint) = lookup(ENDPOINT_ENV_VAR) {
            let trimmed = endpoint.trim();
            if trimmed.is_empty() {
                warn!(
                    env_var = ENDPOINT_ENV_VAR,
                    fallback = DEFAULT_ENDPOINT,
                    "invalid_env_value_using_default"
                );
            } else {
                config.endpoint = trimmed.to_string();
            }
        }
        if let Some(ms) = parse_env(&lookup, POLL_MS_ENV_VAR, DEFAULT_POLL_MS, |value| {
            value.parse::<u64>().ok().filter(|ms| *ms > 0)
        }) {
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(px) = parse_env(&lookup, SIDEBAR_PX_ENV_VAR, DEFAULT_SIDEBAR_PX, |value| {
            value.parse::<u32>().ok()
        }) {
            config.sidebar_width_px = px;
        }
        if let Some(px) = parse_env(&lookup, TILE_PX_ENV_VAR, DEFAULT_TILE_PX, parse_tile_px) {
            config.map.tile_size_px = px;
        }
        if let Some(enabled) = parse_env(&lookup, ZONE_OVERLAY_ENV_VAR, true, parse_flag) {
            config.map.zone_overlay = enabled;
        }
        config
    }
}

fn parse_env<T: std::fmt::Display>(
    lookup: &impl Fn(&str) -> Option<String>,
    env_var: &str,
    fallback: T,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let raw = lookup(env_var)?;
    let parsed = parse(raw.trim());
    if parsed.is_none() {
        warn!(
            env_var,
            value = raw.as_str(),
            fallback = %fallback,
            "invalid_env_value_using_default"
        );
    }
    parsed
}

pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

pub fn parse_tile_px(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok().filter(|px| (1..=256).contains(px))
}
