#![windows_subsystem = "windows"]
//! Trace Observer - Main entry point

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod api;
mod app;
mod constants;
mod error;
mod export;
mod settings;
mod stable_metrics;
mod theme;
mod types;
mod ui;

use app::App;
use constants::*;
use eframe::egui;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Initialize file logging. Returns a guard that must be held for the app lifetime.
fn init_logging(data_dir: &std::path::Path) -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let logs_dir = data_dir.join("logs");
    std::fs::create_dir_all(&logs_dir).ok();

    let file_appender = tracing_appender::rolling::daily(&logs_dir, "trace-observer.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,trace_observer=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    guard
}

fn main() -> eframe::Result<()> {
    let data_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME);

    std::fs::create_dir_all(&data_dir).ok();

    // Initialize logging - guard must live for entire app lifetime
    let _log_guard = init_logging(&data_dir);

    info!(version = APP_VERSION, "Trace Observer starting");

    // Load saved window position/size
    let settings = settings::Settings::load(&data_dir);
    let win_pos = match (settings.window_x, settings.window_y) {
        (Some(x), Some(y)) => Some(egui::pos2(x, y)),
        _ => None,
    };
    let win_size = match (settings.window_w, settings.window_h) {
        (Some(w), Some(h)) => Some(egui::vec2(w, h)),
        _ => None,
    };

    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size(win_size.unwrap_or(egui::vec2(1440.0, 860.0)))
        .with_min_inner_size([1100.0, 680.0])
        .with_title(APP_NAME);

    if let Some(pos) = win_pos {
        viewport = viewport.with_position(pos);
    }

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |cc| Ok(Box::new(App::new(cc, settings, data_dir)?))),
    )
}

// ============================================================================
// MAIN UPDATE LOOP
// ============================================================================

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Track window position/size for saving on exit
        ctx.input(|i| {
            if let Some(rect) = i.viewport().outer_rect {
                self.window_pos = Some(rect.min);
            }
            if let Some(rect) = i.viewport().inner_rect {
                self.window_size = Some(rect.size());
            }
        });

        // Center window on first launch
        if self.needs_center {
            self.needs_center = false;
            if let Some(cmd) = egui::ViewportCommand::center_on_screen(ctx) {
                ctx.send_viewport_cmd(cmd);
            }
        }

        // Metrics load once on the first frame
        if !self.metrics_requested {
            self.metrics_requested = true;
            self.start_metrics_fetch(ctx);
        }

        self.poll_fetch_results();

        // Settle the search term once typing pauses
        let now = Instant::now();
        self.debouncer.poll(now);
        if let Some(remaining) = self.debouncer.remaining(now) {
            ctx.request_repaint_after(remaining);
        }

        egui::CentralPanel::default()
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_BASE)
                    .inner_margin(egui::Margin::same(24)),
            )
            .show(ctx, |ui| {
                // Store panel rect for toast positioning
                self.central_panel_rect = Some(ui.max_rect());

                self.render_header(ui);
                self.render_metric_cards(ui);
                self.render_filters_bar(ui);
                self.render_table(ui);
                self.render_pagination(ui);
            });

        self.render_drawer(ctx);
        self.render_toast(ctx);

        // Filters changed this frame: fetch the matching page
        self.refresh_if_needed(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Application shutting down");
        self.cancel_requests();
        self.save_settings();
    }
}
