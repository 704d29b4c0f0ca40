//! Page links for the listing footer.

/// Number of consecutive page links shown around the current page.
pub const MAX_VISIBLE_PAGES: u32 = 5;

/// Which page links to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    pub current: u32,
    pub last: u32,
    /// Consecutive pages around `current`.
    pub pages: Vec<u32>,
    /// Show a link to page 1 before `pages`.
    pub show_first: bool,
    /// Show "..." between page 1 and `pages`.
    pub leading_gap: bool,
    /// Show "..." between `pages` and the last page.
    pub trailing_gap: bool,
    /// Show a link to the last page after `pages`.
    pub show_last: bool,
}

impl PageWindow {
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.current > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current < self.last
    }
}

/// Compute the page links for `current` out of `last` pages.
///
/// Returns `None` when there is a single page (or none), in which case no
/// pagination is shown. `current` is clamped into `1..=last`.
#[must_use]
pub fn page_window(current: u32, last: u32) -> Option<PageWindow> {
    if last <= 1 {
        return None;
    }
    let current = current.clamp(1, last);

    let mut start = current.saturating_sub(MAX_VISIBLE_PAGES / 2).max(1);
    let end = start.saturating_add(MAX_VISIBLE_PAGES - 1).min(last);
    if end - start < MAX_VISIBLE_PAGES - 1 {
        start = end.saturating_sub(MAX_VISIBLE_PAGES - 1).max(1);
    }

    Some(PageWindow {
        current,
        last,
        pages: (start..=end).collect(),
        show_first: start > 1,
        leading_gap: start > 2,
        trailing_gap: last - end > 1,
        show_last: end < last,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_single_page_has_no_window() {
        assert_eq!(page_window(1, 1), None);
        assert_eq!(page_window(1, 0), None);
    }

    #[test]
    fn test_window_near_u32_max() {
        let window = page_window(u32::MAX, u32::MAX).unwrap();
        assert_eq!(window.pages.len(), 5);
        assert_eq!(window.pages.last(), Some(&u32::MAX));
        assert!(window.show_first);
        assert!(!window.show_last);
        assert!(!window.trailing_gap);
        assert!(!window.has_next());

        let window = page_window(1, u32::MAX).unwrap();
        assert_eq!(window.pages, vec![1, 2, 3, 4, 5]);
        assert!(window.trailing_gap);
    }

    #[test]
    fn test_window_at_start() {
        let window = page_window(1, 10).unwrap();
        assert_eq!(window.pages, vec![1, 2, 3, 4, 5]);
        assert!(!window.show_first);
        assert!(window.trailing_gap);
        assert!(window.show_last);
        assert!(!window.has_previous());
        assert!(window.has_next());
    }

    #[test]
    fn test_window_in_middle() {
        let window = page_window(6, 10).unwrap();
        assert_eq!(window.pages, vec![4, 5, 6, 7, 8]);
        assert!(window.show_first);
        assert!(window.leading_gap);
        assert!(window.trailing_gap);
        assert!(window.show_last);
    }

    #[test]
    fn test_window_at_end_is_shifted_back() {
        let window = page_window(10, 10).unwrap();
        assert_eq!(window.pages, vec![6, 7, 8, 9, 10]);
        assert!(!window.show_last);
        assert!(!window.has_next());

        let window = page_window(9, 10).unwrap();
        assert_eq!(window.pages, vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_no_gap_next_to_edges() {
        let window = page_window(4, 7).unwrap();
        assert_eq!(window.pages, vec![2, 3, 4, 5, 6]);
        assert!(window.show_first);
        assert!(!window.leading_gap);
        assert!(window.show_last);
        assert!(!window.trailing_gap);
    }

    #[test]
    fn test_short_listing_shows_everything() {
        let window = page_window(2, 3).unwrap();
        assert_eq!(window.pages, vec![1, 2, 3]);
        assert!(!window.show_first && !window.show_last);
    }

    #[test]
    fn test_out_of_range_current_is_clamped() {
        assert_eq!(page_window(40, 4).unwrap().current, 4);
        assert_eq!(page_window(0, 4).unwrap().current, 1);
    }
}
