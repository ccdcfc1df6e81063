//! Reusable UI components and display formatting
//!
//! Formatting helpers are pure and shared by the table, the drawer and the
//! CSV export; the widgets paint with the theme palette.

use crate::theme;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use eframe::egui;

/// `850ms`, `42s`, `3m 7s`
pub fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        return format!("{ms}ms");
    }
    let seconds = ms / 1000;
    if seconds < 60 {
        format!("{seconds}s")
    } else {
        format!("{}m {}s", seconds / 60, seconds % 60)
    }
}

/// Parse a backend timestamp. RFC 3339 first, then a naive ISO form taken as UTC.
pub fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(ts, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// (`MM-DD-YYYY`, `HH:MM`) in the given zone; unparsable input is returned verbatim
pub fn format_date_parts_in<Tz: TimeZone>(ts: &str, tz: &Tz) -> (String, String)
where
    Tz::Offset: std::fmt::Display,
{
    match parse_timestamp(ts) {
        Some(dt) => {
            let local = dt.with_timezone(tz);
            (
                local.format("%m-%d-%Y").to_string(),
                local.format("%H:%M").to_string(),
            )
        }
        None => (ts.to_string(), String::new()),
    }
}

pub fn format_date_parts(ts: &str) -> (String, String) {
    format_date_parts_in(ts, &Local)
}

/// `Jan 5, 2024, 14:03`
pub fn format_timestamp_long_in<Tz: TimeZone>(ts: &str, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match parse_timestamp(ts) {
        Some(dt) => dt.with_timezone(tz).format("%b %-d, %Y, %H:%M").to_string(),
        None => ts.to_string(),
    }
}

pub fn format_timestamp_long(ts: &str) -> String {
    format_timestamp_long_in(ts, &Local)
}

/// `1234567` -> `1,234,567`
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// First `n` characters followed by `...`
pub fn short_id(id: &str, n: usize) -> String {
    let mut s: String = id.chars().take(n).collect();
    s.push_str("...");
    s
}

/// Selection checkbox used in table rows and the header
pub fn styled_checkbox(ui: &mut egui::Ui, selected: bool, size: f32) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(egui::vec2(size, size), egui::Sense::click());

    if ui.is_rect_visible(rect) {
        theme::paint_checkbox(ui.painter(), rect, selected);
        if response.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }
    }

    response
}

/// Round success/failure marker
pub fn status_icon(ui: &mut egui::Ui, success: bool) -> egui::Response {
    let size = theme::STATUS_ICON_SIZE;
    let (rect, response) = ui.allocate_exact_size(egui::vec2(size, size), egui::Sense::hover());

    let (color, glyph) = if success {
        (theme::STATUS_SUCCESS, egui_phosphor::regular::CHECK)
    } else {
        (theme::STATUS_ERROR, egui_phosphor::regular::X)
    };
    let painter = ui.painter();
    painter.circle_filled(rect.center(), size / 2.0, theme::tint(color));
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        glyph,
        egui::FontId::proportional(size * 0.6),
        color,
    );

    response
}

/// Small pill label on a tinted background
pub fn badge(ui: &mut egui::Ui, text: &str, color: egui::Color32) -> egui::Response {
    egui::Frame::new()
        .fill(theme::tint(color))
        .corner_radius(theme::RADIUS_DEFAULT)
        .inner_margin(egui::Margin::symmetric(6, 2))
        .show(ui, |ui| {
            ui.label(
                egui::RichText::new(text)
                    .size(theme::FONT_SMALL)
                    .color(color),
            );
        })
        .response
}

/// Filter chip with a remove button. Returns true when the remove button is clicked.
pub fn filter_chip(ui: &mut egui::Ui, text: &str) -> bool {
    let mut removed = false;
    egui::Frame::new()
        .fill(theme::tint(theme::ACCENT))
        .stroke(egui::Stroke::new(theme::STROKE_DEFAULT, theme::ACCENT_STRONG))
        .corner_radius(theme::RADIUS_PILL)
        .inner_margin(egui::Margin::symmetric(10, 3))
        .show(ui, |ui| {
            ui.set_min_height(theme::CHIP_HEIGHT - 6.0);
            ui.horizontal_centered(|ui| {
                ui.spacing_mut().item_spacing.x = 6.0;
                ui.label(
                    egui::RichText::new(text)
                        .size(theme::FONT_LABEL)
                        .color(theme::ACCENT),
                );
                let close = ui.add(
                    egui::Label::new(
                        egui::RichText::new(egui_phosphor::regular::X)
                            .size(theme::FONT_SMALL)
                            .color(theme::ACCENT),
                    )
                    .sense(egui::Sense::click()),
                );
                if close.hovered() {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                }
                removed = close.on_hover_text("Remove filter").clicked();
            });
        });
    removed
}

/// Horizontal bar split into input/output shares
pub fn token_bar(ui: &mut egui::Ui, input_fraction: f32) {
    let width = ui.available_width();
    let (rect, _) = ui.allocate_exact_size(egui::vec2(width, 8.0), egui::Sense::hover());
    let painter = ui.painter();
    painter.rect_filled(rect, theme::RADIUS_DEFAULT, theme::STATUS_INFO);
    let split = rect.min.x + rect.width() * input_fraction.clamp(0.0, 1.0);
    let input_rect = egui::Rect::from_min_max(rect.min, egui::pos2(split, rect.max.y));
    painter.rect_filled(input_rect, theme::RADIUS_DEFAULT, theme::ACCENT);
}
