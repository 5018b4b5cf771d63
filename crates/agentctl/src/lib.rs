use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use agentview_core::config::{parse_flag, parse_tile_px, DEFAULT_ENDPOINT, DEFAULT_TILE_PX};
use agentview_core::poll::{
    apply_response, unix_now_secs, ControlClient, ControlCommand, HttpControlClient,
    HttpSnapshotSource, PollOutcome, SnapshotSource,
};
use agentview_core::render::{export_png, FrameLayout, FrameReport, SpatialRenderer, Viewport};
use agentview_core::{Dashboard, DataResponse, MapConfig, PanelId, SnapshotStore, StoreView};

pub const DEFAULT_WIDTH: u32 = 940;
pub const DEFAULT_HEIGHT: u32 = 860;
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq)]
pub struct CommonOptions {
    pub endpoint: String,
    pub width: u32,
    pub height: u32,
    pub tile_px: u32,
    pub zone_overlay: bool,
    pub timeout_ms: u64,
}

impl Default for CommonOptions {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            tile_px: DEFAULT_TILE_PX,
            zone_overlay: true,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl CommonOptions {
    pub fn map_config(&self) -> MapConfig {
        MapConfig {
            tile_size_px: self.tile_px,
            zone_overlay: self.zone_overlay,
            ..MapConfig::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandKind {
    Status,
    Dump,
    Autopilot { enabled: bool },
    Render { out: PathBuf },
    Panels,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    Help,
    Run {
        kind: CommandKind,
        options: CommonOptions,
    },
}

pub fn usage_text() -> String {
    [
        "usage: agentctl [options] <command>",
        "",
        "commands:",
        "  status                  fetch once and print the status line",
        "  dump                    print the raw /data payload",
        "  autopilot <on|off>      send a control request",
        "  render --out <file>     fetch once and write the map as PNG",
        "  panels                  fetch once and print every dashboard panel",
        "",
        "options:",
        "  --endpoint <url>        backend base URL (default http://127.0.0.1:8000)",
        "  --width <px>            render width",
        "  --height <px>           render height",
        "  --tile-px <px>          tile size in pixels (1-256)",
        "  --no-zones              disable the zone overlay",
        "  --timeout-ms <ms>       request timeout",
    ]
    .join("\n")
}

fn option_value<'a>(args: &'a [String], index: usize, flag: &str) -> Result<&'a str, String> {
    args.get(index + 1)
        .map(String::as_str)
        .ok_or_else(|| format!("missing value for {flag}"))
}

fn parse_dimension(value: &str, flag: &str) -> Result<u32, String> {
    match value.parse::<u32>() {
        Ok(px) if px > 0 => Ok(px),
        _ => Err(format!(
            "invalid {flag} value '{value}' (expected positive integer)"
        )),
    }
}

pub fn parse_args(args: &[String]) -> Result<Invocation, String> {
    let Some(first) = args.first() else {
        return Err(usage_text());
    };
    if first == "-h" || first == "--help" {
        return Ok(Invocation::Help);
    }

    let mut options = CommonOptions::default();
    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "--endpoint" => {
                options.endpoint = option_value(args, index, "--endpoint")?.to_string();
                index += 2;
            }
            "--width" => {
                options.width = parse_dimension(option_value(args, index, "--width")?, "--width")?;
                index += 2;
            }
            "--height" => {
                options.height =
                    parse_dimension(option_value(args, index, "--height")?, "--height")?;
                index += 2;
            }
            "--tile-px" => {
                let value = option_value(args, index, "--tile-px")?;
                options.tile_px = parse_tile_px(value)
                    .ok_or_else(|| format!("invalid --tile-px value '{value}' (expected 1-256)"))?;
                index += 2;
            }
            "--timeout-ms" => {
                let value = option_value(args, index, "--timeout-ms")?;
                options.timeout_ms = value
                    .parse::<u64>()
                    .map_err(|_| format!("invalid --timeout-ms value '{value}' (expected u64)"))?;
                index += 2;
            }
            "--no-zones" => {
                options.zone_overlay = false;
                index += 1;
            }
            _ => break,
        }
    }

    let command = args
        .get(index)
        .ok_or_else(|| "missing subcommand".to_string())?
        .as_str();
    let command_args = &args[(index + 1)..];

    let kind = match command {
        "status" | "dump" | "panels" => {
            if !command_args.is_empty() {
                return Err(format!("{command} takes no arguments"));
            }
            match command {
                "status" => CommandKind::Status,
                "dump" => CommandKind::Dump,
                _ => CommandKind::Panels,
            }
        }
        "autopilot" => {
            let [value] = command_args else {
                return Err("autopilot requires exactly one of on|off".to_string());
            };
            let enabled = parse_flag(value)
                .ok_or_else(|| format!("invalid autopilot value '{value}' (expected on|off)"))?;
            CommandKind::Autopilot { enabled }
        }
        "render" => match command_args {
            [flag, path] if flag == "--out" => CommandKind::Render {
                out: PathBuf::from(path),
            },
            _ => return Err("render requires --out <file>".to_string()),
        },
        other => return Err(format!("unknown subcommand '{other}'")),
    };

    Ok(Invocation::Run { kind, options })
}

/// Applies one response to a private store, exactly as the poll loop would.
pub fn view_from_response(response: DataResponse, now_unix_secs: f64) -> (StoreView, PollOutcome) {
    let (writer, reader) = SnapshotStore::new();
    let outcome = apply_response(&writer, response, now_unix_secs);
    (reader.view(), outcome)
}

pub fn panels_text(view: &StoreView, dashboard: &Dashboard) -> String {
    let mut out = String::new();
    for panel in PanelId::ALL {
        let content = dashboard.panel(panel, view);
        match content.count {
            Some(count) => out.push_str(&format!("== {} ({count}) ==\n", panel.title())),
            None => out.push_str(&format!("== {} ==\n", panel.title())),
        }
        for line in content.plain_lines() {
            out.push_str(&line);
            out.push('\n');
        }
    }
    out
}

pub fn render_to_png(
    view: &StoreView,
    options: &CommonOptions,
    out: &Path,
) -> Result<FrameReport, String> {
    if !view.has_any_snapshot() {
        return Err("backend returned no usable snapshot; nothing to render".to_string());
    }
    let mut renderer = SpatialRenderer::new(options.map_config());
    let layout = FrameLayout::map_only(Viewport::new(options.width, options.height));
    let report = renderer.compose(view, layout, None);
    export_png(renderer.offscreen(), out)
        .map_err(|error| format!("failed to write '{}': {error}", out.display()))?;
    Ok(report)
}

fn fetch_view(options: &CommonOptions) -> Result<(StoreView, PollOutcome), String> {
    let mut source = HttpSnapshotSource::with_timeout(
        &options.endpoint,
        Duration::from_millis(options.timeout_ms),
    );
    let response = source.fetch().map_err(|error| error.to_string())?;
    Ok(view_from_response(response, unix_now_secs()))
}

fn write_out<W: Write>(stdout: &mut W, text: &str) -> Result<(), String> {
    stdout
        .write_all(text.as_bytes())
        .map_err(|error| format!("failed to write output: {error}"))
}

pub fn run<W: Write>(kind: CommandKind, options: CommonOptions, stdout: &mut W) -> Result<(), String> {
    match kind {
        CommandKind::Status => {
            let (view, outcome) = fetch_view(&options)?;
            let status = Dashboard::default().panel(PanelId::Status, &view);
            let mut text = status.plain_lines().join("\n");
            text.push_str(&format!(
                "\nlive: {:?} | memory: {:?}\n",
                outcome.live, outcome.memory
            ));
            write_out(stdout, &text)
        }
        CommandKind::Dump => {
            let source = HttpSnapshotSource::with_timeout(
                &options.endpoint,
                Duration::from_millis(options.timeout_ms),
            );
            let body = source.fetch_bytes().map_err(|error| error.to_string())?;
            let text = match serde_json::from_slice::<serde_json::Value>(&body) {
                Ok(value) => serde_json::to_string_pretty(&value)
                    .map_err(|error| format!("failed to format payload: {error}"))?,
                Err(_) => String::from_utf8_lossy(&body).into_owned(),
            };
            write_out(stdout, &text)?;
            write_out(stdout, "\n")
        }
        CommandKind::Autopilot { enabled } => {
            let mut client = HttpControlClient::new(&options.endpoint);
            client
                .send(ControlCommand::SetAutopilot(enabled))
                .map_err(|error| error.to_string())?;
            let state = if enabled { "on" } else { "off" };
            write_out(stdout, &format!("autopilot {state} requested\n"))
        }
        CommandKind::Render { out } => {
            let (view, _) = fetch_view(&options)?;
            let report = render_to_png(&view, &options, &out)?;
            write_out(
                stdout,
                &format!(
                    "wrote {} ({}x{}): tiles {} drawn / {} culled, markers {} drawn / {} culled, rings {}\n",
                    out.display(),
                    options.width,
                    options.height,
                    report.tiles_drawn,
                    report.tiles_culled,
                    report.markers_drawn,
                    report.markers_culled,
                    report.rings_drawn
                ),
            )
        }
        CommandKind::Panels => {
            let (view, _) = fetch_view(&options)?;
            write_out(stdout, &panels_text(&view, &Dashboard::default()))
        }
    }
}
