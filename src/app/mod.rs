//! App module - contains the main application state and logic

mod drawer;
mod fetch;
pub(crate) mod filters;
mod pagination;
mod views;

use crate::api::TracesClient;
use crate::constants::*;
use crate::settings::Settings;
use crate::theme;
use crate::types::VisibleColumns;
use crate::ui::virtual_list::VirtualList;
use drawer::DrawerState;
use eframe::egui;
use fetch::{FetchEvent, MetricsState, TraceFeed};
use filters::{FilterState, SearchDebouncer, TraceQuery};
use std::collections::HashSet;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use views::Toast;

// ============================================================================
// APP STATE
// ============================================================================

pub struct App {
    // Filters
    pub(crate) filters: FilterState,
    pub(crate) search_text: String,
    pub(crate) debouncer: SearchDebouncer,
    pub(crate) last_query: Option<TraceQuery>,
    // Data
    pub(crate) feed: TraceFeed,
    pub(crate) metrics: MetricsState,
    pub(crate) metrics_requested: bool,
    // Table
    pub(crate) visible_columns: VisibleColumns,
    pub(crate) list: VirtualList,
    pub(crate) selected_rows: HashSet<usize>,
    // Overlays
    pub(crate) drawer: Option<DrawerState>,
    pub(crate) toast: Option<Toast>,
    pub(crate) central_panel_rect: Option<egui::Rect>,
    // Background requests
    pub(crate) client: TracesClient,
    pub(crate) runtime: tokio::runtime::Runtime,
    pub(crate) fetch_tx: mpsc::UnboundedSender<FetchEvent>,
    pub(crate) fetch_rx: mpsc::UnboundedReceiver<FetchEvent>,
    pub(crate) cancel_token: Option<CancellationToken>,
    pub(crate) shutdown: CancellationToken,
    // Settings
    pub(crate) api_base_url: Option<String>,
    pub(crate) export_dir: PathBuf,
    pub(crate) window_pos: Option<egui::Pos2>,
    pub(crate) window_size: Option<egui::Vec2>,
    pub(crate) needs_center: bool,
    pub(crate) data_dir: PathBuf,
}

// ============================================================================
// APP INITIALIZATION & HELPERS
// ============================================================================

impl App {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: Settings,
        data_dir: PathBuf,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        // Force dark theme
        cc.egui_ctx.set_theme(egui::Theme::Dark);

        // Add Phosphor icons font
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        theme::apply_visuals(&cc.egui_ctx);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("trace-fetch")
            .build()?;

        let client = match TracesClient::new(&settings.api_base_url()) {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "Invalid traces API URL, falling back to default");
                TracesClient::new(DEFAULT_API_BASE_URL)?
            }
        };

        let (fetch_tx, fetch_rx) = mpsc::unbounded_channel();
        let filters = FilterState::default().with_limit(settings.page_size);
        info!(page_size = filters.limit, "Dashboard initialized");

        Ok(Self {
            filters,
            search_text: String::new(),
            debouncer: SearchDebouncer::default(),
            last_query: None,
            feed: TraceFeed::default(),
            metrics: MetricsState::Loading,
            metrics_requested: false,
            visible_columns: settings.visible_columns.clone(),
            list: VirtualList::new(TRACE_ROW_HEIGHT, TRACE_ROW_BUFFER),
            selected_rows: HashSet::new(),
            drawer: None,
            toast: None,
            central_panel_rect: None,
            client,
            runtime,
            fetch_tx,
            fetch_rx,
            cancel_token: None,
            shutdown: CancellationToken::new(),
            api_base_url: settings.api_base_url.clone(),
            export_dir: settings.export_dir_or_default(),
            window_pos: None,
            window_size: None,
            needs_center: settings.window_x.is_none(),
            data_dir,
        })
    }

    pub fn save_settings(&self) {
        let settings = Settings {
            window_x: self.window_pos.map(|p| p.x),
            window_y: self.window_pos.map(|p| p.y),
            window_w: self.window_size.map(|s| s.x),
            window_h: self.window_size.map(|s| s.y),
            visible_columns: self.visible_columns.clone(),
            page_size: self.filters.limit,
            api_base_url: self.api_base_url.clone(),
            export_dir: Some(self.export_dir.to_string_lossy().to_string()),
        };
        settings.save(&self.data_dir);
    }

    /// Cancel in-flight requests; called once on exit
    pub fn cancel_requests(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        self.shutdown.cancel();
    }
}
