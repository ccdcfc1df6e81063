//! Centralized theme constants for Trace Observer
//! All colors, sizes, and styling should reference these constants

use crate::types::{CardFilter, Severity};
use egui::Color32;

// =============================================================================
// COLORS - Backgrounds
// =============================================================================
pub const BG_BASE: Color32 = Color32::from_rgb(0x0a, 0x0a, 0x0f); // page background
pub const BG_ELEVATED: Color32 = Color32::from_rgb(0x12, 0x12, 0x1a); // cards, table, drawer
pub const BG_HOVER: Color32 = Color32::from_rgb(0x1a, 0x1a, 0x28); // row / card hover
pub const BG_INPUT: Color32 = Color32::from_rgb(0x1a, 0x1a, 0x28);
pub const BACKDROP: Color32 = Color32::from_black_alpha(150);

// =============================================================================
// COLORS - Accent (Teal)
// =============================================================================
pub const ACCENT: Color32 = Color32::from_rgb(0x2d, 0xd4, 0xbf); // teal-400
pub const ACCENT_STRONG: Color32 = Color32::from_rgb(0x0d, 0x94, 0x88); // teal-600

// =============================================================================
// COLORS - Text
// =============================================================================
pub const TEXT_PRIMARY: Color32 = Color32::WHITE;
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(0xd1, 0xd5, 0xdb); // gray-300
pub const TEXT_MUTED: Color32 = Color32::from_rgb(0x9c, 0xa3, 0xaf); // gray-400
pub const TEXT_DIM: Color32 = Color32::from_rgb(0x6b, 0x72, 0x80); // gray-500

// =============================================================================
// COLORS - Borders
// =============================================================================
pub const BORDER_SUBTLE: Color32 = Color32::from_rgb(0x1a, 0x1a, 0x28); // row separators
pub const BORDER_DEFAULT: Color32 = Color32::from_rgb(0x2a, 0x2a, 0x3e);
pub const BORDER_STRONG: Color32 = Color32::from_rgb(0x3a, 0x3a, 0x5e);

// =============================================================================
// COLORS - Status
// =============================================================================
pub const STATUS_SUCCESS: Color32 = Color32::from_rgb(0x22, 0xc5, 0x5e); // green-500
pub const STATUS_WARNING: Color32 = Color32::from_rgb(0xea, 0xb3, 0x08); // yellow-500
pub const STATUS_ERROR: Color32 = Color32::from_rgb(0xef, 0x44, 0x44); // red-500
pub const STATUS_INFO: Color32 = Color32::from_rgb(0x22, 0xd3, 0xee); // cyan-400

/// Left stripe color of a table row
pub fn severity_color(severity: Severity) -> Option<Color32> {
    match severity {
        Severity::Critical => Some(STATUS_ERROR),
        Severity::Warning => Some(STATUS_WARNING),
        Severity::Healthy => Some(STATUS_SUCCESS),
        Severity::None => None,
    }
}

/// Icon and highlight color of a metric card
pub fn card_color(card: CardFilter) -> Color32 {
    match card {
        CardFilter::Failed => STATUS_ERROR,
        CardFilter::Anomalous => STATUS_WARNING,
        CardFilter::DataExposure | CardFilter::Pii => STATUS_INFO,
    }
}

/// `color` at ~10% opacity, for tinted backgrounds
pub fn tint(color: Color32) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), 26)
}

// =============================================================================
// TYPOGRAPHY - Font Sizes
// =============================================================================
pub const FONT_DISPLAY: f32 = 28.0;
pub const FONT_TITLE: f32 = 20.0;
pub const FONT_HEADING: f32 = 16.0;
pub const FONT_LABEL: f32 = 13.0;
pub const FONT_SMALL: f32 = 11.0;
pub const FONT_CAPTION: f32 = 10.0;

// =============================================================================
// DIMENSIONS
// =============================================================================
pub const DRAWER_WIDTH: f32 = 480.0;
pub const HEADER_ROW_HEIGHT: f32 = 36.0;
pub const CHECKBOX_SIZE: f32 = 16.0;
pub const STATUS_ICON_SIZE: f32 = 20.0;
pub const SEVERITY_STRIPE_WIDTH: f32 = 4.0;
pub const BUTTON_HEIGHT: f32 = 30.0;
pub const PAGE_BUTTON_SIZE: f32 = 32.0;
pub const CHIP_HEIGHT: f32 = 24.0;

// =============================================================================
// CORNER RADIUS
// =============================================================================
pub const RADIUS_SMALL: f32 = 3.0;
pub const RADIUS_DEFAULT: f32 = 4.0;
pub const RADIUS_LARGE: f32 = 8.0;
pub const RADIUS_PILL: f32 = 12.0;

// =============================================================================
// STROKE WIDTHS
// =============================================================================
pub const STROKE_DEFAULT: f32 = 1.0;
pub const STROKE_MEDIUM: f32 = 1.5;

// =============================================================================
// SPACING
// =============================================================================
pub const SPACING_SM: f32 = 4.0;
pub const SPACING_MD: f32 = 8.0;
pub const SPACING_LG: f32 = 12.0;
pub const SPACING_XL: f32 = 16.0;
pub const SPACING_XXL: f32 = 24.0;

// =============================================================================
// HELPER - Apply global visuals
// =============================================================================
pub fn apply_visuals(ctx: &egui::Context) {
    ctx.set_visuals(egui::Visuals {
        dark_mode: true,
        panel_fill: BG_BASE,
        window_fill: BG_ELEVATED,
        extreme_bg_color: BG_INPUT,
        faint_bg_color: BG_ELEVATED,
        hyperlink_color: ACCENT,
        selection: egui::style::Selection {
            bg_fill: Color32::from_rgb(0x11, 0x5e, 0x59),
            stroke: egui::Stroke::new(STROKE_DEFAULT, ACCENT),
        },
        widgets: egui::style::Widgets {
            noninteractive: egui::style::WidgetVisuals {
                bg_fill: BG_ELEVATED,
                weak_bg_fill: BG_ELEVATED,
                bg_stroke: egui::Stroke::new(STROKE_DEFAULT, BORDER_DEFAULT),
                fg_stroke: egui::Stroke::new(STROKE_DEFAULT, TEXT_SECONDARY),
                corner_radius: RADIUS_DEFAULT.into(),
                expansion: 0.0,
            },
            inactive: egui::style::WidgetVisuals {
                bg_fill: BG_INPUT,
                weak_bg_fill: BG_ELEVATED,
                bg_stroke: egui::Stroke::new(STROKE_DEFAULT, BORDER_DEFAULT),
                fg_stroke: egui::Stroke::new(STROKE_DEFAULT, TEXT_SECONDARY),
                corner_radius: RADIUS_DEFAULT.into(),
                expansion: 0.0,
            },
            hovered: egui::style::WidgetVisuals {
                bg_fill: BG_HOVER,
                weak_bg_fill: BG_HOVER,
                bg_stroke: egui::Stroke::new(STROKE_DEFAULT, BORDER_STRONG),
                fg_stroke: egui::Stroke::new(STROKE_MEDIUM, TEXT_PRIMARY),
                corner_radius: RADIUS_DEFAULT.into(),
                expansion: 0.0,
            },
            active: egui::style::WidgetVisuals {
                bg_fill: BG_HOVER,
                weak_bg_fill: BG_HOVER,
                bg_stroke: egui::Stroke::new(STROKE_DEFAULT, ACCENT),
                fg_stroke: egui::Stroke::new(STROKE_DEFAULT, TEXT_PRIMARY),
                corner_radius: RADIUS_DEFAULT.into(),
                expansion: -1.0,
            },
            open: egui::style::WidgetVisuals {
                bg_fill: BG_ELEVATED,
                weak_bg_fill: BG_ELEVATED,
                bg_stroke: egui::Stroke::new(STROKE_DEFAULT, BORDER_DEFAULT),
                fg_stroke: egui::Stroke::new(STROKE_DEFAULT, TEXT_PRIMARY),
                corner_radius: RADIUS_DEFAULT.into(),
                expansion: 0.0,
            },
        },
        striped: false,
        interact_cursor: Some(egui::CursorIcon::PointingHand),
        popup_shadow: egui::epaint::Shadow {
            offset: [0, 4],
            blur: 12,
            spread: 0,
            color: Color32::from_black_alpha(100),
        },
        window_stroke: egui::Stroke::new(STROKE_DEFAULT, BORDER_DEFAULT),
        window_corner_radius: egui::CornerRadius::same(8),
        menu_corner_radius: egui::CornerRadius::same(8),
        ..egui::Visuals::dark()
    });

    ctx.style_mut(|style| {
        style.interaction.selectable_labels = false;
        style.spacing.menu_margin = egui::Margin::symmetric(6, 4);
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        style.spacing.button_padding = egui::vec2(12.0, 6.0);
        style.spacing.scroll.bar_inner_margin = 2.0;
        style.spacing.scroll.bar_width = 6.0;
        style.spacing.scroll.bar_outer_margin = 2.0;
        style.spacing.scroll.handle_min_length = 20.0;
        style.spacing.scroll.floating = false;
    });
}

// =============================================================================
// HELPER - Frames
// =============================================================================
/// Table container: no inner margin so rows run edge to edge
pub fn table_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(BG_ELEVATED)
        .stroke(egui::Stroke::new(STROKE_DEFAULT, BORDER_DEFAULT))
        .corner_radius(RADIUS_LARGE)
}

pub fn drawer_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(BG_BASE)
        .stroke(egui::Stroke::new(STROKE_DEFAULT, BORDER_DEFAULT))
        .inner_margin(egui::Margin::same(SPACING_XXL as i8))
}

/// Inner panel of the drawer (stats, token usage, raw json)
pub fn section_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(BG_ELEVATED)
        .stroke(egui::Stroke::new(STROKE_DEFAULT, BORDER_DEFAULT))
        .corner_radius(RADIUS_LARGE)
        .inner_margin(egui::Margin::same(SPACING_LG as i8))
}

// =============================================================================
// HELPER - Button styles
// =============================================================================

/// Default bordered button
pub fn button(text: impl Into<egui::WidgetText>) -> egui::Button<'static> {
    egui::Button::new(text)
        .fill(BG_ELEVATED)
        .stroke(egui::Stroke::new(STROKE_DEFAULT, BORDER_DEFAULT))
        .corner_radius(RADIUS_DEFAULT)
        .min_size(egui::vec2(0.0, BUTTON_HEIGHT))
}

/// Accent teal button (Export, Clear filters)
pub fn button_accent(text: impl Into<String>) -> egui::Button<'static> {
    egui::Button::new(egui::RichText::new(text.into()).color(TEXT_PRIMARY))
        .fill(ACCENT_STRONG)
        .corner_radius(RADIUS_DEFAULT)
        .min_size(egui::vec2(0.0, BUTTON_HEIGHT))
}

/// Checkbox row for menus. Returns true if toggled.
pub fn menu_checkbox(ui: &mut egui::Ui, checked: bool, label: &str) -> bool {
    let full_width = ui.available_width();
    let (row_rect, row_resp) =
        ui.allocate_exact_size(egui::vec2(full_width, 24.0), egui::Sense::click());
    let painter = ui.painter();
    if row_resp.hovered() {
        painter.rect_filled(row_rect, RADIUS_DEFAULT, BG_HOVER);
    }
    let cb_rect = egui::Rect::from_min_size(
        egui::pos2(row_rect.min.x + 6.0, row_rect.center().y - CHECKBOX_SIZE / 2.0),
        egui::vec2(CHECKBOX_SIZE, CHECKBOX_SIZE),
    );
    paint_checkbox(painter, cb_rect, checked);
    painter.text(
        egui::pos2(cb_rect.max.x + 8.0, row_rect.center().y),
        egui::Align2::LEFT_CENTER,
        label,
        egui::FontId::proportional(FONT_LABEL),
        TEXT_SECONDARY,
    );
    row_resp.clicked()
}

pub fn paint_checkbox(painter: &egui::Painter, rect: egui::Rect, checked: bool) {
    if checked {
        painter.rect_filled(rect, RADIUS_SMALL, ACCENT_STRONG);
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            egui_phosphor::regular::CHECK,
            egui::FontId::proportional(rect.height() * 0.7),
            TEXT_PRIMARY,
        );
    } else {
        painter.rect_filled(rect, RADIUS_SMALL, BG_INPUT);
        painter.rect_stroke(
            rect,
            RADIUS_SMALL,
            egui::Stroke::new(STROKE_DEFAULT, BORDER_STRONG),
            egui::StrokeKind::Inside,
        );
    }
}

/// Returns (fill, draw_rect) for a custom-painted button with hover/press effects.
/// Lightens on hover, slightly lightens + shrinks on press.
pub fn button_visual(
    response: &egui::Response,
    base_fill: Color32,
    rect: egui::Rect,
) -> (Color32, egui::Rect) {
    if response.is_pointer_button_down_on() {
        (lighten(base_fill, 0.06), rect.shrink(1.0))
    } else if response.hovered() {
        (lighten(base_fill, 0.10), rect)
    } else {
        (base_fill, rect)
    }
}

fn lighten(c: Color32, amount: f32) -> Color32 {
    let r = (c.r() as f32 + (255.0 - c.r() as f32) * amount) as u8;
    let g = (c.g() as f32 + (255.0 - c.g() as f32) * amount) as u8;
    let b = (c.b() as f32 + (255.0 - c.b() as f32) * amount) as u8;
    Color32::from_rgba_unmultiplied(r, g, b, c.a())
}
