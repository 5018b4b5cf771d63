use std::io;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use super::input::{KeyLatch, ViewerKey};
use super::surface::PixelsSurface;
use crate::config::ViewerConfig;
use crate::dashboard::{Dashboard, Sidebar};
use crate::poll::{
    next_autopilot_value, spawn_control_pump, ControlCommand, HttpControlClient,
    HttpSnapshotSource, PollLoop,
};
use crate::render::{FrameLayout, SpatialRenderer, Viewport};
use crate::snapshot::{SnapshotStore, StatusLine};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create viewer window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize pixel surface: {0}")]
    CreateSurface(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
    #[error("failed to spawn worker thread: {0}")]
    SpawnThread(#[source] io::Error),
}

/// Title shown while the map is still blank, and afterwards as a status hint.
pub fn window_title(base: &str, status: &StatusLine) -> String {
    match status {
        StatusLine::Waiting => format!("{base} - waiting for data"),
        StatusLine::Connected { .. } => base.to_string(),
        StatusLine::BackendError(_) => format!("{base} - backend error"),
    }
}

/// Opens the viewer window and blocks until it is closed. The poll task and
/// the control pump run on their own threads; this thread only renders.
pub fn run_viewer(config: ViewerConfig) -> Result<(), AppError> {
    info!(
        endpoint = %config.endpoint,
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        tile_size_px = config.map.tile_size_px,
        zone_overlay = config.map.zone_overlay,
        "viewer_startup"
    );

    let (writer, reader) = SnapshotStore::new();
    let poll_loop = PollLoop::new(
        HttpSnapshotSource::new(&config.endpoint),
        writer,
        config.poll_interval,
    );
    let (shutdown_sender, shutdown_receiver) = mpsc::channel();
    // Never joined: a request to a hung backend has no timeout, and process
    // exit reclaims the thread.
    thread::Builder::new()
        .name("poll".to_string())
        .spawn(move || poll_loop.run(shutdown_receiver))
        .map_err(AppError::SpawnThread)?;
    let (control, _control_thread) =
        spawn_control_pump(HttpControlClient::new(&config.endpoint))
            .map_err(AppError::SpawnThread)?;

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(window_title(&config.window_title, &StatusLine::Waiting))
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut surface = PixelsSurface::new(Arc::clone(&window)).map_err(AppError::CreateSurface)?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut renderer = SpatialRenderer::new(config.map.clone());
    let mut sidebar = Sidebar::new(Dashboard::new(
        config.max_container_depth,
        config.thought_log_limit,
    ));
    let mut keys = KeyLatch::default();
    let mut last_autopilot_request = true;
    let mut last_title: Option<String> = None;
    let mut shutdown = Some(shutdown_sender);

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                    window.request_redraw();
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    match keys.handle(event.physical_key, event.state) {
                        Some(ViewerKey::ToggleZones) => {
                            let enabled = renderer.toggle_zone_overlay();
                            info!(enabled, "zone_overlay_toggled");
                        }
                        Some(ViewerKey::ToggleAutopilot) => {
                            let reported = reader
                                .view()
                                .live_state()
                                .and_then(|live| live.flags.autopilot_enabled);
                            let requested = next_autopilot_value(reported, last_autopilot_request);
                            last_autopilot_request = requested;
                            control.submit(ControlCommand::SetAutopilot(requested));
                        }
                        Some(ViewerKey::SwitchPage) => {
                            sidebar.switch_page();
                        }
                        Some(ViewerKey::Quit) => {
                            info!(reason = "escape_key", "shutdown_requested");
                            window_target.exit();
                        }
                        None => {}
                    }
                }
                WindowEvent::RedrawRequested => {
                    let view = reader.view();
                    let title = window_title(&config.window_title, &view.status);
                    if last_title.as_deref() != Some(title.as_str()) {
                        window.set_title(&title);
                        last_title = Some(title);
                    }

                    sidebar.refresh(&view);
                    let size = window.inner_size();
                    let layout = FrameLayout {
                        window: Viewport::new(size.width, size.height),
                        sidebar_width_px: config.sidebar_width_px,
                    };
                    if let Err(error) =
                        renderer.render_frame(&view, layout, Some(&sidebar), &mut surface)
                    {
                        warn!(error = %error, "renderer_present_failed");
                        window_target.exit();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                if let Some(sender) = shutdown.take() {
                    let _ = sender.send(());
                }
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}
