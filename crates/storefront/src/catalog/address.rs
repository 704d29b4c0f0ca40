//! Address bar and viewport collaborators.

use super::query::QueryParams;

/// The navigable query string.
pub trait AddressBar {
    /// Current query parameters.
    fn read(&self) -> QueryParams;

    /// Replace the query string. `replace` overwrites the current history
    /// entry instead of pushing a new one.
    fn write(&mut self, params: &QueryParams, replace: bool);
}

/// In-memory address bar with a history stack.
#[derive(Debug, Clone)]
pub struct MemoryAddressBar {
    history: Vec<QueryParams>,
    cursor: usize,
    writes: usize,
}

impl Default for MemoryAddressBar {
    fn default() -> Self {
        Self::new(QueryParams::new())
    }
}

impl MemoryAddressBar {
    #[must_use]
    pub fn new(initial: QueryParams) -> Self {
        Self {
            history: vec![initial],
            cursor: 0,
            writes: 0,
        }
    }

    /// Start at `?query`.
    #[must_use]
    pub fn at(query: &str) -> Self {
        Self::new(QueryParams::parse(query))
    }

    /// External navigation to a new entry (link click, manual edit).
    ///
    /// Returns the new query so it can be fed to the synchronizer.
    pub fn navigate(&mut self, params: QueryParams) -> QueryParams {
        self.history.truncate(self.cursor + 1);
        self.history.push(params.clone());
        self.cursor = self.history.len() - 1;
        params
    }

    /// Browser "back". Returns the query now shown, or `None` at the
    /// oldest entry.
    pub fn back(&mut self) -> Option<QueryParams> {
        self.cursor = self.cursor.checked_sub(1)?;
        Some(self.read())
    }

    /// Browser "forward".
    pub fn forward(&mut self) -> Option<QueryParams> {
        if self.cursor + 1 >= self.history.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.read())
    }

    /// Number of history entries.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Number of [`AddressBar::write`] calls received.
    #[must_use]
    pub const fn write_count(&self) -> usize {
        self.writes
    }
}

impl AddressBar for MemoryAddressBar {
    fn read(&self) -> QueryParams {
        self.history.get(self.cursor).cloned().unwrap_or_default()
    }

    fn write(&mut self, params: &QueryParams, replace: bool) {
        self.writes += 1;
        if replace {
            if let Some(entry) = self.history.get_mut(self.cursor) {
                entry.clone_from(params);
            }
        } else {
            self.navigate(params.clone());
        }
    }
}

/// Scroll control for the listing.
pub trait Viewport {
    fn scroll_to_top(&mut self);
}

/// Viewport that does nothing, for headless use.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullViewport;

impl Viewport for NullViewport {
    fn scroll_to_top(&mut self) {}
}

/// Viewport that counts scroll requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordingViewport {
    pub scrolls: usize,
}

impl Viewport for RecordingViewport {
    fn scroll_to_top(&mut self) {
        self.scrolls += 1;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_keeps_history_length() {
        let mut bar = MemoryAddressBar::at("page=2");
        bar.write(&QueryParams::parse("page=3"), true);
        assert_eq!(bar.history_len(), 1);
        assert_eq!(bar.read().get("page"), Some("3"));
        assert_eq!(bar.write_count(), 1);
    }

    #[test]
    fn test_back_and_forward() {
        let mut bar = MemoryAddressBar::at("");
        bar.navigate(QueryParams::parse("category_id=1"));
        bar.navigate(QueryParams::parse("category_id=2"));

        assert_eq!(bar.back().unwrap().get("category_id"), Some("1"));
        assert!(bar.back().unwrap().is_empty());
        assert_eq!(bar.back(), None);
        assert_eq!(bar.forward().unwrap().get("category_id"), Some("1"));
    }

    #[test]
    fn test_navigate_drops_forward_entries() {
        let mut bar = MemoryAddressBar::at("");
        bar.navigate(QueryParams::parse("a=1"));
        bar.back();
        bar.navigate(QueryParams::parse("b=2"));
        assert_eq!(bar.history_len(), 2);
        assert_eq!(bar.forward(), None);
    }
}
