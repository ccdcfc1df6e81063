//! Page arithmetic for the pagination bar

use crate::constants::MAX_VISIBLE_PAGES;

pub fn total_pages(total: u64, limit: u32) -> u32 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(u64::from(limit)).min(u64::from(u32::MAX)) as u32
}

/// Up to five page numbers around `page`, shifted to stay inside `[1, total_pages]`
pub fn page_numbers(page: u32, total_pages: u32) -> Vec<u32> {
    if total_pages == 0 {
        return Vec::new();
    }
    let mut start = page.saturating_sub(MAX_VISIBLE_PAGES / 2).max(1);
    let end = (start + MAX_VISIBLE_PAGES - 1).min(total_pages);
    if end - start + 1 < MAX_VISIBLE_PAGES {
        start = (end + 1).saturating_sub(MAX_VISIBLE_PAGES).max(1);
    }
    (start..=end).collect()
}

/// The bar is only shown when there is more than one page
pub fn is_visible(total_pages: u32) -> bool {
    total_pages > 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(1000, 25), 40);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn window_centred_on_page() {
        assert_eq!(page_numbers(6, 20), vec![4, 5, 6, 7, 8]);
    }

    #[test]
    fn window_at_edges() {
        assert_eq!(page_numbers(1, 20), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_numbers(2, 20), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_numbers(20, 20), vec![16, 17, 18, 19, 20]);
        assert_eq!(page_numbers(19, 20), vec![16, 17, 18, 19, 20]);
    }

    #[test]
    fn few_pages() {
        assert_eq!(page_numbers(1, 3), vec![1, 2, 3]);
        assert_eq!(page_numbers(3, 3), vec![1, 2, 3]);
        assert_eq!(page_numbers(1, 1), vec![1]);
        assert!(page_numbers(1, 0).is_empty());
    }

    #[test]
    fn hidden_for_single_page() {
        assert!(!is_visible(0));
        assert!(!is_visible(1));
        assert!(is_visible(2));
    }
}
