//! Trace detail drawer

use super::App;
use crate::stable_metrics::{stable_metrics, StableMetrics};
use crate::theme;
use crate::types::Trace;
use crate::ui::components::{format_duration, format_thousands, format_timestamp_long, token_bar};
use eframe::egui;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const COPIED_FEEDBACK: Duration = Duration::from_secs(2);

pub struct DrawerState {
    pub trace: Trace,
    pub metrics: StableMetrics,
    pub show_raw: bool,
    copied_at: Option<Instant>,
}

impl DrawerState {
    pub fn new(trace: Trace) -> Self {
        let metrics = stable_metrics(&trace);
        Self {
            trace,
            metrics,
            show_raw: false,
            copied_at: None,
        }
    }

    pub fn mark_copied(&mut self, now: Instant) {
        self.copied_at = Some(now);
    }

    pub fn is_copied(&self, now: Instant) -> bool {
        self.copied_at
            .is_some_and(|t| now.saturating_duration_since(t) < COPIED_FEEDBACK)
    }
}

/// Label/value rows for the metadata section; empty values are skipped
pub fn metadata_rows(trace: &Trace) -> Vec<(&'static str, String)> {
    let rows = [
        ("Trace ID", trace.display_id().to_string()),
        ("Name", trace.name.clone()),
        ("Agent", trace.agent.clone()),
        ("Application", trace.application.clone()),
        ("Status", trace.status.clone()),
        ("Duration", format_duration(trace.duration)),
        ("Timestamp", format_timestamp_long(&trace.timestamp)),
    ];
    rows.into_iter().filter(|(_, v)| !v.is_empty()).collect()
}

/// Record as served, pretty-printed
pub fn raw_json(trace: &Trace) -> String {
    serde_json::to_string_pretty(trace).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to serialize trace");
        String::new()
    })
}

fn section_title(ui: &mut egui::Ui, text: &str) {
    ui.label(
        egui::RichText::new(text.to_uppercase())
            .size(theme::FONT_SMALL)
            .color(theme::TEXT_MUTED)
            .strong(),
    );
    ui.add_space(theme::SPACING_SM);
}

impl App {
    pub(crate) fn open_drawer(&mut self, trace: Trace) {
        debug!(trace_id = %trace.display_id(), "Opening trace drawer");
        self.drawer = Some(DrawerState::new(trace));
    }

    pub(crate) fn render_drawer(&mut self, ctx: &egui::Context) {
        if self.drawer.is_none() {
            return;
        }

        let mut close = ctx.input(|i| i.key_pressed(egui::Key::Escape));

        // Dim backdrop - blocks interaction with the dashboard, click closes
        let screen = ctx.screen_rect();
        egui::Area::new(egui::Id::new("drawer_backdrop"))
            .fixed_pos(screen.min)
            .order(egui::Order::Middle)
            .interactable(true)
            .show(ctx, |ui| {
                let response = ui.allocate_response(screen.size(), egui::Sense::click());
                ui.painter().rect_filled(screen, 0.0, theme::BACKDROP);
                if response.clicked() {
                    close = true;
                }
            });

        let width = theme::DRAWER_WIDTH.min(screen.width());
        let Some(drawer) = self.drawer.as_mut() else {
            return;
        };
        let now = Instant::now();

        egui::Area::new(egui::Id::new("trace_drawer"))
            .fixed_pos(egui::pos2(screen.right() - width, screen.top()))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                theme::drawer_frame().show(ui, |ui| {
                    let inner_width = width - 2.0 * theme::SPACING_XXL;
                    ui.set_width(inner_width);
                    ui.set_min_height(screen.height() - 2.0 * theme::SPACING_XXL);

                    // Header
                    ui.horizontal(|ui| {
                        ui.vertical(|ui| {
                            ui.label(
                                egui::RichText::new("Trace Details")
                                    .size(theme::FONT_HEADING)
                                    .color(theme::TEXT_PRIMARY)
                                    .strong(),
                            );
                            ui.label(
                                egui::RichText::new(drawer.trace.display_id())
                                    .size(theme::FONT_SMALL)
                                    .color(theme::TEXT_DIM),
                            );
                        });
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            let x = ui.add(
                                egui::Button::new(
                                    egui::RichText::new(egui_phosphor::regular::X).size(16.0),
                                )
                                .frame(false),
                            );
                            if x.on_hover_text("Close").clicked() {
                                close = true;
                            }
                        });
                    });
                    ui.add_space(theme::SPACING_MD);
                    ui.separator();
                    ui.add_space(theme::SPACING_MD);

                    egui::ScrollArea::vertical()
                        .id_salt("drawer_scroll")
                        .auto_shrink([false, false])
                        .show(ui, |ui| {
                            render_drawer_body(ui, drawer, now);
                        });
                });
            });

        if let Some(drawer) = &self.drawer {
            if drawer.is_copied(now) {
                ctx.request_repaint_after(COPIED_FEEDBACK);
            }
        }

        if close {
            debug!("Closing trace drawer");
            self.drawer = None;
        }
    }
}

fn render_drawer_body(ui: &mut egui::Ui, drawer: &mut DrawerState, now: Instant) {
    let trace = &drawer.trace;
    let metrics = drawer.metrics;

    // Status banner
    let (color, icon, text) = if trace.is_success() {
        (theme::STATUS_SUCCESS, egui_phosphor::regular::CHECK_CIRCLE, "Completed Successfully")
    } else {
        (theme::STATUS_ERROR, egui_phosphor::regular::X_CIRCLE, "Execution Failed")
    };
    egui::Frame::new()
        .fill(theme::tint(color))
        .stroke(egui::Stroke::new(theme::STROKE_DEFAULT, color.gamma_multiply(0.4)))
        .corner_radius(theme::RADIUS_LARGE)
        .inner_margin(egui::Margin::same(theme::SPACING_LG as i8))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(
                egui::RichText::new(format!("{icon}  {text}"))
                    .color(color)
                    .strong(),
            );
            if trace.is_anomalous {
                ui.label(
                    egui::RichText::new(format!(
                        "{}  Anomalous behavior detected",
                        egui_phosphor::regular::WARNING
                    ))
                    .size(theme::FONT_LABEL)
                    .color(theme::STATUS_WARNING),
                );
            }
        });
    ui.add_space(theme::SPACING_XL);

    // Metadata
    section_title(ui, "Metadata");
    theme::section_frame().show(ui, |ui| {
        ui.set_width(ui.available_width());
        let rows = metadata_rows(trace);
        let count = rows.len();
        for (i, (label, value)) in rows.into_iter().enumerate() {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(label).color(theme::TEXT_MUTED));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.add(
                        egui::Label::new(
                            egui::RichText::new(value)
                                .color(theme::TEXT_PRIMARY)
                                .strong(),
                        )
                        .truncate(),
                    );
                });
            });
            if i + 1 < count {
                ui.separator();
            }
        }
    });
    ui.add_space(theme::SPACING_XL);

    // Execution stats
    section_title(ui, "Execution Stats");
    ui.columns(3, |cols| {
        let stats = [
            ("Run Steps", metrics.run_steps, theme::TEXT_PRIMARY),
            ("LLM Calls", metrics.llm_calls, egui::Color32::from_rgb(0x60, 0xa5, 0xfa)),
            ("Tool Calls", metrics.tool_calls, egui::Color32::from_rgb(0xc0, 0x84, 0xfc)),
        ];
        for (ui, (label, value, color)) in cols.iter_mut().zip(stats) {
            theme::section_frame().show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.vertical_centered(|ui| {
                    ui.label(
                        egui::RichText::new(value.to_string())
                            .size(theme::FONT_DISPLAY)
                            .color(color)
                            .strong(),
                    );
                    ui.label(
                        egui::RichText::new(label)
                            .size(theme::FONT_SMALL)
                            .color(theme::TEXT_MUTED),
                    );
                });
            });
        }
    });
    ui.add_space(theme::SPACING_XL);

    // Token usage
    section_title(ui, "Token Usage");
    theme::section_frame().show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.label(egui::RichText::new("Input").size(theme::FONT_SMALL).color(theme::TEXT_MUTED));
                ui.label(
                    egui::RichText::new(format_thousands(metrics.input_tokens))
                        .size(theme::FONT_TITLE)
                        .color(theme::ACCENT)
                        .strong(),
                );
            });
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                ui.vertical(|ui| {
                    ui.label(egui::RichText::new("Output").size(theme::FONT_SMALL).color(theme::TEXT_MUTED));
                    ui.label(
                        egui::RichText::new(format_thousands(metrics.output_tokens))
                            .size(theme::FONT_TITLE)
                            .color(theme::ACCENT)
                            .strong(),
                    );
                });
            });
        });
        ui.separator();
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Total Tokens").color(theme::TEXT_MUTED));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    egui::RichText::new(format_thousands(metrics.total_tokens()))
                        .size(theme::FONT_HEADING)
                        .color(theme::TEXT_PRIMARY)
                        .strong(),
                );
            });
        });
        let input_pct = metrics.input_percent();
        token_bar(ui, input_pct / 100.0);
        ui.horizontal(|ui| {
            let small = |t: String| egui::RichText::new(t).size(theme::FONT_CAPTION).color(theme::TEXT_DIM);
            ui.label(small(format!("Input ({}%)", input_pct.round())));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let output_pct = if metrics.total_tokens() == 0 { 0.0 } else { 100.0 - input_pct };
                ui.label(small(format!("Output ({}%)", output_pct.round())));
            });
        });
    });
    ui.add_space(theme::SPACING_XL);

    // Data categories
    if trace.has_sensitive_data {
        section_title(ui, "Data Categories");
        ui.horizontal(|ui| {
            crate::ui::components::badge(ui, "PII Detected", theme::STATUS_WARNING);
            crate::ui::components::badge(ui, "Financial Data", egui::Color32::from_rgb(0xfb, 0x92, 0x3c));
        });
        ui.add_space(theme::SPACING_XL);
    }

    // Raw JSON
    let arrow = if drawer.show_raw {
        egui_phosphor::regular::CARET_UP
    } else {
        egui_phosphor::regular::CARET_DOWN
    };
    let toggle = ui.add(
        egui::Button::new(
            egui::RichText::new(format!("RAW TRACE JSON  {arrow}"))
                .size(theme::FONT_SMALL)
                .color(theme::TEXT_MUTED)
                .strong(),
        )
        .frame(false),
    );
    if toggle.clicked() {
        drawer.show_raw = !drawer.show_raw;
    }

    if drawer.show_raw {
        let json = raw_json(&drawer.trace);
        let copied = drawer.is_copied(now);
        let mut copy_clicked = false;
        theme::section_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                let (icon, color, hint) = if copied {
                    (egui_phosphor::regular::CHECK, theme::STATUS_SUCCESS, "Copied")
                } else {
                    (egui_phosphor::regular::COPY, theme::TEXT_MUTED, "Copy to clipboard")
                };
                let button = ui.add(
                    egui::Button::new(egui::RichText::new(icon).color(color)).fill(theme::BG_HOVER),
                );
                copy_clicked = button.on_hover_text(hint).clicked();
            });
            egui::ScrollArea::both()
                .id_salt("raw_json")
                .max_height(256.0)
                .show(ui, |ui| {
                    ui.label(
                        egui::RichText::new(&json)
                            .monospace()
                            .size(theme::FONT_SMALL)
                            .color(theme::TEXT_SECONDARY),
                    );
                });
        });
        if copy_clicked {
            ui.ctx().copy_text(json);
            drawer.mark_copied(now);
            debug!("Copied raw trace JSON");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(value: serde_json::Value) -> Trace {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn metadata_skips_empty_values() {
        let t = trace(serde_json::json!({
            "id": "trace-9",
            "name": "",
            "status": "failed",
            "agent": "billing",
            "duration": 65000,
            "timestamp": ""
        }));
        let rows = metadata_rows(&t);
        let labels: Vec<&str> = rows.iter().map(|(l, _)| *l).collect();
        assert_eq!(labels, vec!["Trace ID", "Agent", "Status", "Duration"]);
        assert_eq!(rows[3].1, "1m 5s");
    }

    #[test]
    fn copied_indicator_expires() {
        let mut d = DrawerState::new(trace(serde_json::json!({ "id": "a" })));
        let t0 = Instant::now();
        assert!(!d.is_copied(t0));
        d.mark_copied(t0);
        assert!(d.is_copied(t0 + Duration::from_millis(1999)));
        assert!(!d.is_copied(t0 + Duration::from_secs(2)));
    }

    #[test]
    fn drawer_metrics_match_table() {
        let t = trace(serde_json::json!({ "id": "run-77" }));
        let d = DrawerState::new(t.clone());
        assert_eq!(d.metrics, stable_metrics(&t));
    }

    #[test]
    fn raw_json_round_trips_unknown_fields() {
        let t = trace(serde_json::json!({ "id": "a", "model": "gpt-x" }));
        let json = raw_json(&t);
        assert!(json.contains("\"model\": \"gpt-x\""));
    }
}
