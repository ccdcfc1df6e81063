//! Virtualized list rendering
//!
//! Only the rows that intersect the scroll viewport (plus a buffer of rows on
//! each side) are materialized. The scroll track always spans the full list,
//! so the native scrollbar, wheel momentum and keyboard paging keep working
//! against the true list length.

use crate::constants::PROVISIONAL_VIEWPORT_HEIGHT;
use eframe::egui;
use std::ops::Range;
use tracing::{debug, trace};

/// Half-open row interval `[start, end)` that should be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibleRange {
    pub start: usize,
    pub end: usize,
}

impl VisibleRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Compute the window of rows to render.
///
/// `start = max(0, floor(offset / H) - B)`, `end = min(N, ceil((offset + height) / H) + B)`.
/// Requires `row_height > 0`. Offsets past the end of the track collapse to an
/// empty range at the tail instead of producing `start > end`.
pub fn compute_visible_range(
    len: usize,
    row_height: f32,
    buffer: usize,
    scroll_offset: f32,
    container_height: f32,
) -> VisibleRange {
    debug_assert!(row_height > 0.0, "row height must be positive");

    let offset = scroll_offset.max(0.0);
    let first = (offset / row_height).floor() as usize;
    let last = ((offset + container_height.max(0.0)) / row_height).ceil() as usize;

    let end = last.saturating_add(buffer).min(len);
    let start = first.saturating_sub(buffer).min(end);
    VisibleRange { start, end }
}

/// Viewport state and cached window for one virtualized list
#[derive(Debug, Clone)]
pub struct VirtualList {
    row_height: f32,
    buffer: usize,
    scroll_offset: f32,
    viewport_height: f32,
    len: usize,
    range: VisibleRange,
    measured: bool,
    pending_scroll: Option<f32>,
    recomputations: u64,
}

impl VirtualList {
    pub fn new(row_height: f32, buffer: usize) -> Self {
        debug_assert!(row_height > 0.0, "row height must be positive");
        Self {
            row_height,
            buffer,
            scroll_offset: 0.0,
            viewport_height: PROVISIONAL_VIEWPORT_HEIGHT,
            len: 0,
            range: VisibleRange::default(),
            measured: false,
            pending_scroll: None,
            recomputations: 0,
        }
    }

    /// Feed the current viewport into the list. The window is only recomputed
    /// when the offset, the container height or the row count changed.
    /// Returns true if a recomputation happened.
    pub fn observe(&mut self, scroll_offset: f32, viewport_height: f32, len: usize) -> bool {
        if self.recomputations > 0
            && self.scroll_offset == scroll_offset
            && self.viewport_height == viewport_height
            && self.len == len
        {
            return false;
        }

        self.scroll_offset = scroll_offset;
        self.viewport_height = viewport_height;
        self.len = len;
        self.range = compute_visible_range(
            len,
            self.row_height,
            self.buffer,
            scroll_offset,
            viewport_height,
        );
        self.recomputations += 1;
        true
    }

    pub fn range(&self) -> VisibleRange {
        self.range
    }

    pub fn row_height(&self) -> f32 {
        self.row_height
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    /// Total height of the scroll track for `len` rows
    pub fn track_height(&self, len: usize) -> f32 {
        len as f32 * self.row_height
    }

    /// Offset of the rendered block inside the track
    pub fn block_offset(&self) -> f32 {
        self.range.start as f32 * self.row_height
    }

    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    /// Jump back to the first row on the next frame (used when the list is replaced)
    pub fn scroll_to_top(&mut self) {
        self.pending_scroll = Some(0.0);
    }

    /// Render `items` inside a vertical scroll area.
    ///
    /// `render_row` receives a ui whose max rect is exactly one row tall, the
    /// item and its absolute index in `items`.
    pub fn show<T>(
        &mut self,
        ui: &mut egui::Ui,
        id_salt: impl std::hash::Hash,
        items: &[T],
        mut render_row: impl FnMut(&mut egui::Ui, &T, usize),
    ) -> egui::scroll_area::ScrollAreaOutput<()> {
        let mut scroll_area = egui::ScrollArea::vertical()
            .id_salt(id_salt)
            .auto_shrink([false, false]);
        if let Some(offset) = self.pending_scroll.take() {
            scroll_area = scroll_area.vertical_scroll_offset(offset);
        }

        scroll_area.show_viewport(ui, |ui, viewport| {
            let first_measurement = !self.measured;
            self.measured = true;

            if self.observe(viewport.min.y, viewport.height(), items.len()) {
                let range = self.range();
                trace!(
                    start = range.start,
                    end = range.end,
                    pass = self.recomputations(),
                    "Visible window recomputed"
                );
            }

            // First real measurement replaces the provisional height
            if first_measurement && self.viewport_height() != PROVISIONAL_VIEWPORT_HEIGHT {
                debug!(
                    measured = self.viewport_height(),
                    provisional = PROVISIONAL_VIEWPORT_HEIGHT,
                    "Virtual list container measured"
                );
                ui.ctx().request_repaint();
            }

            ui.set_height(self.track_height(items.len()));

            let range = self.range();
            if range.is_empty() {
                return;
            }

            let row_height = self.row_height();
            let top = ui.max_rect().top() + self.block_offset();
            let block = egui::Rect::from_x_y_ranges(
                ui.max_rect().x_range(),
                top..=top + range.len() as f32 * row_height,
            );

            // Rows are positioned from their index, never from the layout cursor
            for (i, item) in items[range.as_range()].iter().enumerate() {
                let index = range.start + i;
                let row_top = block.top() + i as f32 * row_height;
                let row_rect = egui::Rect::from_x_y_ranges(
                    block.x_range(),
                    row_top..=row_top + row_height,
                );
                let mut row_ui = ui.new_child(
                    egui::UiBuilder::new()
                        .id_salt(("virtual_row", index))
                        .max_rect(row_rect)
                        .layout(egui::Layout::top_down(egui::Align::Min)),
                );
                row_ui.set_clip_rect(row_rect.intersect(ui.clip_rect()));
                render_row(&mut row_ui, item, index);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_of_long_list() {
        let range = compute_visible_range(1000, 60.0, 5, 0.0, 600.0);
        assert_eq!(range, VisibleRange { start: 0, end: 15 });
    }

    #[test]
    fn middle_of_long_list() {
        let range = compute_visible_range(1000, 60.0, 5, 3000.0, 600.0);
        assert_eq!(range, VisibleRange { start: 45, end: 65 });
    }

    #[test]
    fn list_shorter_than_viewport() {
        let range = compute_visible_range(3, 60.0, 5, 0.0, 600.0);
        assert_eq!(range, VisibleRange { start: 0, end: 3 });
    }

    #[test]
    fn empty_list() {
        let range = compute_visible_range(0, 60.0, 5, 0.0, 600.0);
        assert!(range.is_empty());
        assert_eq!(range.start, 0);

        let list = VirtualList::new(60.0, 5);
        assert_eq!(list.track_height(0), 0.0);
    }

    #[test]
    fn bottom_of_list_is_clamped() {
        // 1000 rows, scrolled to the very end
        let max_offset = 1000.0 * 60.0 - 600.0;
        let range = compute_visible_range(1000, 60.0, 5, max_offset, 600.0);
        assert_eq!(range.end, 1000);
        assert_eq!(range.start, 985);
    }

    #[test]
    fn offset_past_track_never_inverts() {
        let range = compute_visible_range(10, 60.0, 2, 1_000_000.0, 600.0);
        assert!(range.start <= range.end);
        assert_eq!(range.end, 10);
        assert!(range.is_empty());
    }

    #[test]
    fn window_is_bounded_and_in_bounds() {
        let row_height = 60.0;
        for &len in &[0usize, 1, 3, 10, 999, 10_000] {
            for &buffer in &[0usize, 1, 5, 20] {
                for &container in &[0.0f32, 59.0, 600.0, 1234.5] {
                    let max_offset = (len as f32 * row_height - container).max(0.0);
                    for step in 0..=20 {
                        let offset = max_offset * step as f32 / 20.0;
                        let range =
                            compute_visible_range(len, row_height, buffer, offset, container);
                        assert!(range.start <= range.end, "{len} {buffer} {container} {offset}");
                        assert!(range.end <= len);
                        let bound = (container / row_height).ceil() as usize + 2 * buffer + 1;
                        assert!(range.len() <= bound, "window {} > {}", range.len(), bound);
                    }
                }
            }
        }
    }

    #[test]
    fn every_intersecting_row_is_included() {
        let (len, h, buffer, container) = (500usize, 24.0f32, 3usize, 333.0f32);
        for step in 0..100 {
            let offset = step as f32 * 37.25;
            let range = compute_visible_range(len, h, buffer, offset, container);
            let lo = offset - buffer as f32 * h;
            let hi = offset + container + buffer as f32 * h;
            for row in 0..len {
                let top = row as f32 * h;
                let bottom = top + h;
                if bottom > lo && top < hi {
                    assert!(range.as_range().contains(&row), "row {row} missing at {offset}");
                }
            }
        }
    }

    #[test]
    fn computation_is_idempotent() {
        let a = compute_visible_range(1000, 60.0, 5, 1234.0, 480.0);
        let b = compute_visible_range(1000, 60.0, 5, 1234.0, 480.0);
        assert_eq!(a, b);
    }

    #[test]
    fn observe_only_recomputes_on_relevant_change() {
        let mut list = VirtualList::new(60.0, 5);
        assert!(list.observe(0.0, 600.0, 1000));
        assert_eq!(list.range(), VisibleRange { start: 0, end: 15 });

        // Same inputs, e.g. row contents changed but count did not
        assert!(!list.observe(0.0, 600.0, 1000));
        assert_eq!(list.recomputations(), 1);

        assert!(list.observe(3000.0, 600.0, 1000));
        assert_eq!(list.range(), VisibleRange { start: 45, end: 65 });

        // Resize
        assert!(list.observe(3000.0, 300.0, 1000));
        assert_eq!(list.range(), VisibleRange { start: 45, end: 60 });

        // List replaced with a shorter one
        assert!(list.observe(3000.0, 300.0, 50));
        assert_eq!(list.range().end, 50);
        assert_eq!(list.recomputations(), 4);
    }

    #[test]
    fn track_and_block_geometry() {
        let mut list = VirtualList::new(60.0, 5);
        list.observe(3000.0, 600.0, 1000);
        assert_eq!(list.track_height(1000), 60_000.0);
        assert_eq!(list.block_offset(), 45.0 * 60.0);
    }

    #[test]
    fn provisional_height_before_measurement() {
        let list = VirtualList::new(60.0, 5);
        assert_eq!(list.viewport_height(), PROVISIONAL_VIEWPORT_HEIGHT);
        assert!(list.range().is_empty());
    }

    /// Rendered rows of one frame: (absolute index, top relative to the track top)
    fn render_frame(
        list: &mut VirtualList,
        items: &[u32],
        screen_height: f32,
        mut paint: impl FnMut(&mut egui::Ui),
    ) -> Vec<(usize, f32)> {
        let ctx = egui::Context::default();
        let input = egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(800.0, screen_height),
            )),
            ..Default::default()
        };
        let mut rows = Vec::new();
        let _ = ctx.run(input, |ctx| {
            egui::CentralPanel::default()
                .frame(egui::Frame::new())
                .show(ctx, |ui| {
                    let mut tops = Vec::new();
                    let output = list.show(ui, "rows", items, |ui, item, index| {
                        assert_eq!(*item as usize, index);
                        tops.push((index, ui.max_rect().top()));
                        paint(ui);
                    });
                    let track_top = output.inner_rect.top() - output.state.offset.y;
                    assert_eq!(output.content_size.y, list.track_height(items.len()));
                    rows = tops.into_iter().map(|(i, top)| (i, top - track_top)).collect();
                });
        });
        rows
    }

    fn assert_rows_at_index_offsets(rows: &[(usize, f32)], expected: std::ops::Range<usize>) {
        let indices: Vec<usize> = rows.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, expected.collect::<Vec<_>>());
        for (index, top) in rows {
            assert!(
                (top - *index as f32 * 60.0).abs() < 0.01,
                "row {index} placed at {top}"
            );
        }
    }

    #[test]
    fn show_renders_window_at_row_offsets() {
        let items: Vec<u32> = (0..1000).collect();
        let mut list = VirtualList::new(60.0, 5);
        list.pending_scroll = Some(3000.0);

        let rows = render_frame(&mut list, &items, 600.0, |ui| {
            ui.label("row");
        });
        assert_eq!(list.range(), VisibleRange { start: 45, end: 65 });
        assert_rows_at_index_offsets(&rows, 45..65);
    }

    #[test]
    fn row_pitch_does_not_depend_on_row_content() {
        let items: Vec<u32> = (0..30).collect();

        // Nothing painted
        let mut list = VirtualList::new(60.0, 5);
        let rows = render_frame(&mut list, &items, 600.0, |_| {});
        assert_rows_at_index_offsets(&rows, 0..15);

        // Content shorter than a row
        let mut list = VirtualList::new(60.0, 5);
        let rows = render_frame(&mut list, &items, 600.0, |ui| {
            ui.allocate_space(egui::vec2(10.0, 20.0));
        });
        assert_rows_at_index_offsets(&rows, 0..15);
    }

    #[test]
    fn first_measurement_replaces_provisional_height() {
        let items: Vec<u32> = (0..100).collect();
        let mut list = VirtualList::new(60.0, 5);
        let rows = render_frame(&mut list, &items, 300.0, |_| {});

        assert_eq!(list.viewport_height(), 300.0);
        // ceil(300 / 60) + 5
        assert_eq!(list.range(), VisibleRange { start: 0, end: 10 });
        assert_rows_at_index_offsets(&rows, 0..10);
    }

    #[test]
    fn show_with_no_items_renders_nothing() {
        let mut list = VirtualList::new(60.0, 5);
        let rows = render_frame(&mut list, &[], 600.0, |_| {});
        assert!(rows.is_empty());
        assert!(list.range().is_empty());
    }
}
