//! Dashboard rendering: metric cards, filters bar, traces table, pagination, toast

use super::fetch::MetricsState;
use super::pagination::{is_visible, page_numbers, total_pages};
use super::App;
use crate::constants::PAGE_SIZE_OPTIONS;
use crate::export::{write_csv, write_filters, ExportKind};
use crate::stable_metrics::stable_metrics;
use crate::theme;
use crate::types::*;
use crate::ui::components::{
    filter_chip, format_date_parts, format_duration, format_thousands, short_id, status_icon,
    styled_checkbox,
};
use eframe::egui;
use std::time::Instant;
use tracing::{debug, error};

const PAGINATION_HEIGHT: f32 = 48.0;
const TOAST_VISIBLE_SECS: f32 = 3.0;
const TOAST_FADE_SECS: f32 = 0.5;

enum RowAction {
    Open,
    ToggleSelect,
}

pub(crate) struct Toast {
    pub message: String,
    pub started: Instant,
    /// Folder opened when the toast is clicked
    pub reveal: Option<std::path::PathBuf>,
}

impl App {
    // ========================================================================
    // HEADER & METRIC CARDS
    // ========================================================================

    pub(crate) fn render_header(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new("Observe /")
                    .size(theme::FONT_HEADING)
                    .color(theme::TEXT_SECONDARY),
            );
            ui.label(
                egui::RichText::new("Activity Traces")
                    .size(theme::FONT_HEADING)
                    .color(theme::TEXT_PRIMARY),
            );
        });
        ui.add_space(theme::SPACING_XL);
    }

    pub(crate) fn render_metric_cards(&mut self, ui: &mut egui::Ui) {
        let metrics = self.metrics;
        let mut toggled: Option<CardFilter> = None;

        ui.columns(CardFilter::ALL.len(), |cols| {
            for (ui, card) in cols.iter_mut().zip(CardFilter::ALL) {
                let active = self.filters.is_card_active(card);
                if metric_card(ui, card, metrics, active).clicked() {
                    toggled = Some(card);
                }
            }
        });

        if let Some(card) = toggled {
            debug!(card = card.key(), "Toggled card filter");
            self.filters = self.filters.toggle_card(card);
        }
        ui.add_space(theme::SPACING_XL);
    }

    // ========================================================================
    // FILTERS BAR
    // ========================================================================

    pub(crate) fn render_filters_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            // Search
            let search = ui.add(
                egui::TextEdit::singleline(&mut self.search_text)
                    .hint_text(format!(
                        "{}  Search by Trace ID",
                        egui_phosphor::regular::MAGNIFYING_GLASS
                    ))
                    .desired_width(280.0)
                    .margin(egui::Margin::symmetric(10, 7)),
            );
            if search.changed() {
                self.filters = self.filters.with_search(self.search_text.clone());
                self.debouncer.input(&self.search_text, Instant::now());
            }

            // Time range
            let mut time_range = self.filters.time_range;
            egui::ComboBox::from_id_salt("time_range")
                .selected_text(format!(
                    "{}  {}",
                    egui_phosphor::regular::CLOCK,
                    time_range.label()
                ))
                .width(170.0)
                .show_ui(ui, |ui| {
                    for range in TimeRange::ALL {
                        ui.selectable_value(&mut time_range, range, range.label());
                    }
                });
            if time_range != self.filters.time_range {
                debug!(range = time_range.value(), "Time range changed");
                self.filters = self.filters.with_time_range(time_range);
            }

            // Active filter count
            let count = self.filters.active_filter_count();
            let funnel = ui.add(theme::button(egui_phosphor::regular::FUNNEL));
            if count > 0 {
                let center = funnel.rect.right_top() + egui::vec2(-2.0, 2.0);
                ui.painter().circle_filled(center, 8.0, theme::ACCENT_STRONG);
                ui.painter().text(
                    center,
                    egui::Align2::CENTER_CENTER,
                    count.to_string(),
                    egui::FontId::proportional(theme::FONT_CAPTION),
                    theme::TEXT_PRIMARY,
                );
            }
            funnel.on_hover_text(format!("{count} active filters"));

            // Column toggles
            ui.menu_button(egui_phosphor::regular::COLUMNS, |ui| {
                ui.set_min_width(190.0);
                ui.label(
                    egui::RichText::new("TOGGLE COLUMNS")
                        .size(theme::FONT_SMALL)
                        .color(theme::TEXT_MUTED),
                );
                ui.add_space(theme::SPACING_SM);
                for key in ColumnKey::ALL {
                    let visible = self.visible_columns.is_visible(key);
                    if theme::menu_checkbox(ui, visible, key.toggle_label()) {
                        self.visible_columns = self.visible_columns.toggled(key);
                    }
                }
            });

            // Export
            let export = ui
                .add(theme::button(egui_phosphor::regular::DOWNLOAD_SIMPLE))
                .on_hover_text(if self.selected_rows.is_empty() {
                    "Export current page"
                } else {
                    "Export selected rows"
                });
            if export.clicked() {
                self.export_current();
            }
        });

        self.render_filter_chips(ui);
        ui.add_space(theme::SPACING_LG);
    }

    fn render_filter_chips(&mut self, ui: &mut egui::Ui) {
        if self.filters.active_filter_count() == 0 {
            return;
        }

        let mut next = None;
        let mut clear_all = false;
        ui.add_space(theme::SPACING_MD);
        ui.horizontal_wrapped(|ui| {
            for card in self.filters.active_cards.clone() {
                if filter_chip(ui, card.chip_label()) {
                    next = Some(self.filters.remove_card(card));
                }
            }
            if self.filters.time_range != TimeRange::All
                && filter_chip(ui, self.filters.time_range.label())
            {
                next = Some(self.filters.without_time_range());
            }
            let clear = ui.add(
                egui::Label::new(
                    egui::RichText::new("Clear all")
                        .size(theme::FONT_LABEL)
                        .color(theme::ACCENT),
                )
                .sense(egui::Sense::click()),
            );
            if clear.clicked() {
                clear_all = true;
            }
        });

        if clear_all {
            self.clear_filters();
        } else if let Some(filters) = next {
            self.filters = filters;
        }
    }

    pub(crate) fn clear_filters(&mut self) {
        debug!("Clearing all filters");
        self.filters = self.filters.cleared();
        self.search_text.clear();
        self.debouncer.reset();
    }

    // ========================================================================
    // TRACES TABLE
    // ========================================================================

    pub(crate) fn render_table(&mut self, ui: &mut egui::Ui) {
        let reserved = if is_visible(total_pages(self.feed.total(), self.filters.limit)) {
            PAGINATION_HEIGHT
        } else {
            0.0
        };
        let height = (ui.available_height() - reserved).max(theme::HEADER_ROW_HEIGHT * 4.0);
        let width = ui.available_width();

        ui.allocate_ui(egui::vec2(width, height), |ui| {
            theme::table_frame().show(ui, |ui| {
                ui.set_min_size(ui.available_size());

                if self.feed.is_loading() {
                    render_loading(ui);
                } else if self.feed.traces().is_empty() {
                    if self.render_empty_state(ui) {
                        self.clear_filters();
                    }
                } else {
                    self.render_rows(ui);
                }
            });
        });
    }

    fn render_rows(&mut self, ui: &mut egui::Ui) {
        let columns = self.visible_columns.table_columns();
        let widths = layout_columns(&columns, ui.available_width());
        let row_count = self.feed.traces().len();

        // Sticky header
        let all_selected = row_count > 0 && self.selected_rows.len() == row_count;
        if render_header_row(ui, &columns, &widths, all_selected) {
            if all_selected {
                self.selected_rows.clear();
            } else {
                self.selected_rows = (0..row_count).collect();
            }
        }

        let traces = self.feed.traces();
        let selected = &self.selected_rows;
        let mut action: Option<(usize, RowAction)> = None;

        self.list.show(ui, "traces_table", traces, |ui, trace, index| {
            if let Some(a) = render_trace_row(ui, trace, &columns, &widths, selected.contains(&index)) {
                action = Some((index, a));
            }
        });

        match action {
            Some((index, RowAction::ToggleSelect)) => {
                if !self.selected_rows.remove(&index) {
                    self.selected_rows.insert(index);
                }
            }
            Some((index, RowAction::Open)) => {
                if let Some(trace) = self.feed.traces().get(index) {
                    self.open_drawer(trace.clone());
                }
            }
            None => {}
        }
    }

    /// Returns true when "Clear filters" was clicked
    fn render_empty_state(&self, ui: &mut egui::Ui) -> bool {
        let mut clear = false;
        ui.vertical_centered(|ui| {
            ui.add_space((ui.available_height() / 2.0 - 110.0).max(theme::SPACING_XXL));
            let (rect, _) = ui.allocate_exact_size(egui::vec2(64.0, 64.0), egui::Sense::hover());
            ui.painter().circle_filled(rect.center(), 32.0, theme::BG_HOVER);
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                egui_phosphor::regular::CLIPBOARD_TEXT,
                egui::FontId::proportional(30.0),
                theme::TEXT_DIM,
            );
            ui.add_space(theme::SPACING_XL);
            ui.label(
                egui::RichText::new("No traces found")
                    .size(theme::FONT_HEADING)
                    .color(theme::TEXT_PRIMARY),
            );
            ui.add_space(theme::SPACING_SM);
            ui.label(
                egui::RichText::new(
                    "No activity traces match your current filters. Try adjusting your search or filter criteria.",
                )
                .size(theme::FONT_LABEL)
                .color(theme::TEXT_MUTED),
            );
            if let Some(error) = self.feed.error() {
                ui.add_space(theme::SPACING_SM);
                ui.label(
                    egui::RichText::new(format!("Could not reach the traces service ({error})"))
                        .size(theme::FONT_SMALL)
                        .color(theme::TEXT_DIM),
                );
            }
            if self.filters.has_active_filters() {
                ui.add_space(theme::SPACING_XL);
                clear = ui.add(theme::button_accent("Clear filters")).clicked();
            }
        });
        clear
    }

    // ========================================================================
    // PAGINATION
    // ========================================================================

    pub(crate) fn render_pagination(&mut self, ui: &mut egui::Ui) {
        let total = self.feed.total();
        let pages = total_pages(total, self.filters.limit);
        if !is_visible(pages) {
            return;
        }

        let page = self.filters.page;
        let mut go_to: Option<u32> = None;
        let mut limit = self.filters.limit;

        ui.add_space(theme::SPACING_LG);
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Show").color(theme::TEXT_MUTED));
            egui::ComboBox::from_id_salt("page_size")
                .selected_text(limit.to_string())
                .width(56.0)
                .show_ui(ui, |ui| {
                    for option in PAGE_SIZE_OPTIONS {
                        ui.selectable_value(&mut limit, option, option.to_string());
                    }
                });
            ui.label(
                egui::RichText::new(format!("of {total}"))
                    .size(theme::FONT_SMALL)
                    .color(theme::TEXT_DIM),
            );

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                // Right-to-left: last control first
                if page_button(ui, egui_phosphor::regular::CARET_DOUBLE_RIGHT, false, page < pages).clicked() {
                    go_to = Some(pages);
                }
                if page_button(ui, egui_phosphor::regular::CARET_RIGHT, false, page < pages).clicked() {
                    go_to = Some((page + 1).min(pages));
                }
                for number in page_numbers(page, pages).into_iter().rev() {
                    if page_button(ui, &number.to_string(), number == page, true).clicked() {
                        go_to = Some(number);
                    }
                }
                if page_button(ui, egui_phosphor::regular::CARET_LEFT, false, page > 1).clicked() {
                    go_to = Some(page.saturating_sub(1).max(1));
                }
                if page_button(ui, egui_phosphor::regular::CARET_DOUBLE_LEFT, false, page > 1).clicked() {
                    go_to = Some(1);
                }
            });
        });

        if limit != self.filters.limit {
            debug!(limit, "Page size changed");
            self.filters = self.filters.with_limit(limit);
        } else if let Some(target) = go_to.filter(|p| *p != page) {
            debug!(page = target, "Page changed");
            self.filters = self.filters.with_page(target);
        }
    }

    // ========================================================================
    // EXPORT
    // ========================================================================

    /// Selected rows if any, else the current page. An empty page exports the filters.
    pub(crate) fn export_current(&mut self) {
        let rows: Vec<&Trace> = if self.selected_rows.is_empty() {
            self.feed.traces().iter().collect()
        } else {
            let mut indices: Vec<usize> = self.selected_rows.iter().copied().collect();
            indices.sort_unstable();
            indices
                .into_iter()
                .filter_map(|i| self.feed.traces().get(i))
                .collect()
        };

        let kind = ExportKind::for_row_count(rows.len());
        let file_name = kind.default_file_name(chrono::Local::now().date_naive());
        let ext = kind.extension();

        std::fs::create_dir_all(&self.export_dir).ok();
        let Some(path) = rfd::FileDialog::new()
            .set_directory(&self.export_dir)
            .set_file_name(&file_name)
            .add_filter(ext.to_uppercase(), &[ext])
            .save_file()
        else {
            debug!("Export cancelled");
            return;
        };

        let result = match kind {
            ExportKind::Csv => write_csv(&path, rows.iter().copied()),
            ExportKind::Filters => write_filters(&path, &self.filters),
        };

        match result {
            Ok(written) => {
                if let Some(dir) = written.parent() {
                    self.export_dir = dir.to_path_buf();
                    self.save_settings();
                }
                let message = match kind {
                    ExportKind::Csv => format!("Exported {} traces", rows.len()),
                    ExportKind::Filters => "No traces to export, saved filters instead".to_string(),
                };
                self.show_toast(message, Some(written));
            }
            Err(e) => {
                error!(error = %e, "Export failed");
                self.show_toast(format!("Export failed: {e}"), None);
            }
        }
    }

    // ========================================================================
    // TOAST
    // ========================================================================

    pub(crate) fn show_toast(&mut self, message: impl Into<String>, reveal: Option<std::path::PathBuf>) {
        self.toast = Some(Toast {
            message: message.into(),
            started: Instant::now(),
            reveal,
        });
    }

    /// Bottom-right of the central panel, 3s visible then fade, paused on hover
    pub(crate) fn render_toast(&mut self, ctx: &egui::Context) {
        let (Some(toast), Some(panel_rect)) = (&mut self.toast, self.central_panel_rect) else {
            return;
        };
        let total_duration = TOAST_VISIBLE_SECS + TOAST_FADE_SECS;
        let margin = 12.0;
        let toast_pos = egui::pos2(panel_rect.right() - margin, panel_rect.bottom() - margin);

        let elapsed = toast.started.elapsed().as_secs_f32();
        let alpha = if elapsed > TOAST_VISIBLE_SECS {
            ((total_duration - elapsed) / TOAST_FADE_SECS).clamp(0.0, 1.0)
        } else {
            1.0
        };

        let response = egui::Area::new(egui::Id::new("toast"))
            .fixed_pos(toast_pos)
            .pivot(egui::Align2::RIGHT_BOTTOM)
            .order(egui::Order::Tooltip)
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(theme::BG_ELEVATED.gamma_multiply(0.95 * alpha))
                    .stroke(egui::Stroke::new(
                        theme::STROKE_DEFAULT,
                        theme::ACCENT.gamma_multiply(0.4 * alpha),
                    ))
                    .corner_radius(6.0)
                    .inner_margin(egui::Margin::symmetric(16, 10))
                    .show(ui, |ui| {
                        ui.label(
                            egui::RichText::new(&toast.message)
                                .color(theme::TEXT_PRIMARY.gamma_multiply(alpha)),
                        );
                        if toast.reveal.is_some() {
                            ui.label(
                                egui::RichText::new("Click to open folder")
                                    .size(theme::FONT_SMALL)
                                    .color(theme::TEXT_DIM.gamma_multiply(alpha)),
                            );
                        }
                    })
                    .response
                    .interact(egui::Sense::click())
            })
            .inner;

        if response.clicked() {
            if let Some(dir) = toast.reveal.as_ref().and_then(|p| p.parent()) {
                debug!(path = %dir.display(), "Opening export folder");
                let _ = open::that(dir);
            }
        }

        // Pause timer while hovering
        if response.hovered() {
            toast.started = Instant::now();
        }

        if toast.started.elapsed().as_secs_f32() >= total_duration {
            self.toast = None;
        } else {
            ctx.request_repaint();
        }
    }
}

// ============================================================================
// WIDGETS
// ============================================================================

fn metric_card(
    ui: &mut egui::Ui,
    card: CardFilter,
    metrics: MetricsState,
    active: bool,
) -> egui::Response {
    let color = theme::card_color(card);
    let (fill, stroke) = if active {
        (theme::tint(color), color)
    } else {
        (theme::BG_ELEVATED, theme::BORDER_DEFAULT)
    };

    let inner = egui::Frame::new()
        .fill(fill)
        .stroke(egui::Stroke::new(theme::STROKE_DEFAULT, stroke))
        .corner_radius(theme::RADIUS_LARGE)
        .inner_margin(egui::Margin::same(theme::SPACING_XL as i8))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal_top(|ui| {
                let icon = match card {
                    CardFilter::Failed => egui_phosphor::regular::X_CIRCLE,
                    CardFilter::Anomalous => egui_phosphor::regular::WARNING,
                    CardFilter::DataExposure => egui_phosphor::regular::INFO,
                    CardFilter::Pii => egui_phosphor::regular::SHIELD_CHECK,
                };
                ui.label(egui::RichText::new(icon).size(20.0).color(color));
                ui.vertical(|ui| {
                    match metrics {
                        MetricsState::Loading => {
                            ui.add(egui::Spinner::new().size(theme::FONT_DISPLAY));
                        }
                        MetricsState::Ready(m) => {
                            ui.label(
                                egui::RichText::new(format_thousands(m.value_for(card)))
                                    .size(theme::FONT_DISPLAY)
                                    .color(theme::TEXT_PRIMARY)
                                    .strong(),
                            );
                        }
                        MetricsState::Failed => {
                            ui.label(
                                egui::RichText::new("—")
                                    .size(theme::FONT_DISPLAY)
                                    .color(theme::TEXT_PRIMARY),
                            );
                        }
                    }
                    ui.add(
                        egui::Label::new(
                            egui::RichText::new(card.label())
                                .size(theme::FONT_LABEL)
                                .color(theme::TEXT_PRIMARY),
                        )
                        .truncate(),
                    );
                    ui.add(
                        egui::Label::new(
                            egui::RichText::new(card.subtitle())
                                .size(theme::FONT_SMALL)
                                .color(theme::TEXT_DIM),
                        )
                        .truncate(),
                    );
                });
            });
        });

    let response = inner
        .response
        .interact(egui::Sense::click())
        .on_hover_text(format!("Filter by {}", card.label()));
    if response.hovered() && !active {
        ui.painter().rect_stroke(
            response.rect,
            theme::RADIUS_LARGE,
            egui::Stroke::new(theme::STROKE_DEFAULT, color.gamma_multiply(0.5)),
            egui::StrokeKind::Inside,
        );
    }
    response
}

fn render_loading(ui: &mut egui::Ui) {
    ui.vertical_centered(|ui| {
        ui.add_space((ui.available_height() / 2.0 - 40.0).max(theme::SPACING_XXL));
        ui.add(egui::Spinner::new().size(32.0).color(theme::ACCENT));
        ui.add_space(theme::SPACING_XL);
        ui.label(egui::RichText::new("Loading traces...").color(theme::TEXT_MUTED));
    });
}

fn page_button(ui: &mut egui::Ui, text: &str, current: bool, enabled: bool) -> egui::Response {
    let size = egui::vec2(theme::PAGE_BUTTON_SIZE, theme::PAGE_BUTTON_SIZE);
    let sense = if enabled { egui::Sense::click() } else { egui::Sense::hover() };
    let (rect, response) = ui.allocate_exact_size(size, sense);

    let base = if current { theme::ACCENT_STRONG } else { theme::BG_ELEVATED };
    let (fill, rect) = if enabled {
        theme::button_visual(&response, base, rect)
    } else {
        (base, rect)
    };
    let painter = ui.painter();
    painter.rect_filled(rect, theme::RADIUS_DEFAULT, fill);
    painter.rect_stroke(
        rect,
        theme::RADIUS_DEFAULT,
        egui::Stroke::new(
            theme::STROKE_DEFAULT,
            if current { theme::ACCENT } else { theme::BORDER_DEFAULT },
        ),
        egui::StrokeKind::Inside,
    );
    let text_color = match (current, enabled) {
        (true, _) => theme::TEXT_PRIMARY,
        (false, true) => theme::TEXT_MUTED,
        (false, false) => theme::TEXT_DIM.gamma_multiply(0.5),
    };
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        text,
        egui::FontId::proportional(theme::FONT_LABEL),
        text_color,
    );
    response
}

/// Returns true when the select-all checkbox was clicked
fn render_header_row(
    ui: &mut egui::Ui,
    columns: &[TableColumn],
    widths: &[f32],
    all_selected: bool,
) -> bool {
    let (rect, _) = ui.allocate_exact_size(
        egui::vec2(ui.available_width(), theme::HEADER_ROW_HEIGHT),
        egui::Sense::hover(),
    );
    ui.painter().hline(
        rect.x_range(),
        rect.bottom() - 0.5,
        egui::Stroke::new(theme::STROKE_DEFAULT, theme::BORDER_DEFAULT),
    );

    let mut toggled = false;
    let mut x = rect.left();
    for (column, width) in columns.iter().zip(widths) {
        let cell = egui::Rect::from_min_size(
            egui::pos2(x, rect.top()),
            egui::vec2(*width, rect.height()),
        );
        x += width;
        match column {
            TableColumn::Select => {
                let cb = egui::Rect::from_center_size(
                    cell.center(),
                    egui::vec2(theme::CHECKBOX_SIZE, theme::CHECKBOX_SIZE),
                );
                if ui.put(cb, |ui: &mut egui::Ui| styled_checkbox(ui, all_selected, theme::CHECKBOX_SIZE)).clicked() {
                    toggled = true;
                }
            }
            _ => {
                let (anchor, pos) = if column.is_centered() {
                    (egui::Align2::CENTER_CENTER, cell.center())
                } else {
                    (egui::Align2::LEFT_CENTER, cell.left_center() + egui::vec2(8.0, 0.0))
                };
                ui.painter().text(
                    pos,
                    anchor,
                    column.header(),
                    egui::FontId::proportional(theme::FONT_SMALL),
                    theme::TEXT_MUTED,
                );
            }
        }
    }
    toggled
}

fn render_trace_row(
    ui: &mut egui::Ui,
    trace: &Trace,
    columns: &[TableColumn],
    widths: &[f32],
    selected: bool,
) -> Option<RowAction> {
    let rect = ui.max_rect();
    let row = ui.interact(rect, ui.id().with("row"), egui::Sense::click());

    let painter = ui.painter().clone();
    if selected {
        painter.rect_filled(rect, 0.0, theme::tint(theme::ACCENT));
    } else if row.hovered() {
        painter.rect_filled(rect, 0.0, theme::BG_HOVER);
    }
    painter.hline(
        rect.x_range(),
        rect.bottom() - 0.5,
        egui::Stroke::new(theme::STROKE_DEFAULT, theme::BORDER_SUBTLE),
    );
    if let Some(color) = theme::severity_color(trace.severity()) {
        painter.rect_filled(
            egui::Rect::from_min_size(rect.min, egui::vec2(theme::SEVERITY_STRIPE_WIDTH, rect.height())),
            0.0,
            color,
        );
    }

    let metrics = stable_metrics(trace);
    let mut action = None;
    let mut x = rect.left();

    for (column, width) in columns.iter().zip(widths) {
        let cell = egui::Rect::from_min_size(
            egui::pos2(x, rect.top()),
            egui::vec2(*width, rect.height()),
        )
        .shrink2(egui::vec2(8.0, 0.0));
        x += width;

        match column {
            TableColumn::Select => {
                let cb = egui::Rect::from_center_size(
                    cell.center(),
                    egui::vec2(theme::CHECKBOX_SIZE, theme::CHECKBOX_SIZE),
                );
                if ui.put(cb, |ui: &mut egui::Ui| styled_checkbox(ui, selected, theme::CHECKBOX_SIZE)).clicked() {
                    action = Some(RowAction::ToggleSelect);
                }
            }
            TableColumn::Status => {
                let icon = egui::Rect::from_center_size(
                    cell.center(),
                    egui::vec2(theme::STATUS_ICON_SIZE, theme::STATUS_ICON_SIZE),
                );
                ui.put(icon, |ui: &mut egui::Ui| status_icon(ui, trace.is_success()))
                    .on_hover_text(trace.status.as_str());
            }
            TableColumn::TraceId => {
                let id = trace.display_id();
                text_cell(ui, cell, short_id(id, 14), theme::ACCENT).on_hover_text(id);
            }
            TableColumn::StartTime => {
                let (date, time) = format_date_parts(&trace.timestamp);
                ui.scope_builder(
                    egui::UiBuilder::new()
                        .max_rect(cell)
                        .layout(egui::Layout::top_down(egui::Align::Min)),
                    |ui| {
                        ui.add_space((cell.height() - 32.0) / 2.0);
                        ui.spacing_mut().item_spacing.y = 2.0;
                        ui.label(egui::RichText::new(date).size(theme::FONT_LABEL).color(theme::TEXT_SECONDARY));
                        ui.label(egui::RichText::new(time).size(theme::FONT_SMALL).color(theme::TEXT_DIM));
                    },
                );
            }
            TableColumn::Duration => {
                text_cell(ui, cell, format_duration(trace.duration), theme::TEXT_SECONDARY);
            }
            TableColumn::Agent => {
                text_cell(ui, cell, trace.agent.clone(), theme::TEXT_SECONDARY);
            }
            TableColumn::Application => {
                text_cell(ui, cell, trace.application.clone(), theme::TEXT_SECONDARY);
            }
            TableColumn::RunSteps => centered_text(&painter, cell, metrics.run_steps.to_string()),
            TableColumn::LlmCalls => centered_text(&painter, cell, metrics.llm_calls.to_string()),
            TableColumn::ToolCalls => centered_text(&painter, cell, metrics.tool_calls.to_string()),
            TableColumn::InputTokens => {
                centered_text(&painter, cell, format_thousands(metrics.input_tokens))
            }
            TableColumn::OutputTokens => {
                centered_text(&painter, cell, format_thousands(metrics.output_tokens))
            }
            TableColumn::DataCategories => {
                if trace.has_sensitive_data {
                    let first = pill(&painter, cell.left_center(), "PII", theme::STATUS_WARNING, false);
                    pill(
                        &painter,
                        egui::pos2(first.right() + 4.0, cell.center().y),
                        "Fin",
                        theme::STATUS_INFO,
                        false,
                    );
                } else {
                    painter.text(
                        cell.left_center(),
                        egui::Align2::LEFT_CENTER,
                        "—",
                        egui::FontId::proportional(theme::FONT_LABEL),
                        theme::TEXT_DIM,
                    );
                }
            }
            TableColumn::Anomalous => {
                let (text, color) = if trace.is_anomalous {
                    ("Yes", theme::STATUS_WARNING)
                } else {
                    ("No", theme::ACCENT)
                };
                pill(&painter, cell.center(), text, color, true);
            }
        }
    }

    if action.is_none() && row.clicked() {
        action = Some(RowAction::Open);
    }
    if row.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
    }
    action
}

fn text_cell(ui: &mut egui::Ui, cell: egui::Rect, text: String, color: egui::Color32) -> egui::Response {
    ui.scope_builder(
        egui::UiBuilder::new()
            .max_rect(cell)
            .layout(egui::Layout::left_to_right(egui::Align::Center)),
        |ui| {
            ui.add(
                egui::Label::new(egui::RichText::new(text).size(theme::FONT_LABEL).color(color))
                    .truncate(),
            )
        },
    )
    .inner
}

fn centered_text(painter: &egui::Painter, cell: egui::Rect, text: String) {
    painter.text(
        cell.center(),
        egui::Align2::CENTER_CENTER,
        text,
        egui::FontId::proportional(theme::FONT_SMALL),
        theme::TEXT_SECONDARY,
    );
}

/// Tinted pill anchored at its left-center (or center). Returns the painted rect.
fn pill(
    painter: &egui::Painter,
    anchor: egui::Pos2,
    text: &str,
    color: egui::Color32,
    centered: bool,
) -> egui::Rect {
    let galley = painter.layout_no_wrap(
        text.to_string(),
        egui::FontId::proportional(theme::FONT_CAPTION),
        color,
    );
    let size = galley.size() + egui::vec2(12.0, 6.0);
    let rect = if centered {
        egui::Rect::from_center_size(anchor, size)
    } else {
        egui::Rect::from_min_size(anchor - egui::vec2(0.0, size.y / 2.0), size)
    };
    painter.rect_filled(rect, theme::RADIUS_DEFAULT, theme::tint(color));
    painter.galley(rect.center() - galley.size() / 2.0, galley, color);
    rect
}
