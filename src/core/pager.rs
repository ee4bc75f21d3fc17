use crate::utils::error::Result;
use crate::utils::validation::validate_positive_number;
use std::fmt;

pub const DEFAULT_ITEMS_PER_PAGE: usize = 50;

/// Pagination state for a paged listing.
///
/// `offset` always equals `items_per_page * current_page`; `current_page` never
/// goes below zero, nor past the last page whose offset fits in a `usize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    current_page: usize,
    items_per_page: usize,
    offset: usize,
    total_items: usize,
}

/// Which navigation directions the host should enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub forward: bool,
    pub backward: bool,
}

impl Pager {
    pub fn new(items_per_page: usize) -> Result<Self> {
        validate_positive_number("paging.items_per_page", items_per_page, 1)?;
        Ok(Self {
            current_page: 0,
            items_per_page,
            offset: 0,
            total_items: 0,
        })
    }

    /// Moves by `delta` pages, clamping at the first page. `advance(0)` recomputes
    /// in place after a reload.
    pub fn advance(&mut self, delta: i64) {
        let current = i64::try_from(self.current_page).unwrap_or(i64::MAX);
        let target = current.saturating_add(delta).max(0);
        let last_addressable = usize::MAX / self.items_per_page;
        self.current_page = usize::try_from(target)
            .unwrap_or(usize::MAX)
            .min(last_addressable);
        self.offset = self.items_per_page * self.current_page;
    }

    pub fn reset(&mut self) {
        self.current_page = 0;
        self.advance(0);
    }

    pub fn set_total_items(&mut self, total_items: usize) {
        self.total_items = total_items;
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.items_per_page).max(1)
    }

    pub fn can_advance_forward(&self) -> bool {
        self.total_pages() > self.current_page + 1
    }

    pub fn can_advance_backward(&self) -> bool {
        self.current_page >= 1 && self.current_page <= self.total_pages() - 1
    }

    pub fn is_single_page(&self) -> bool {
        self.current_page == 0 && self.total_pages() == 1
    }

    pub fn next_enabled(&self) -> bool {
        !self.is_single_page() && self.can_advance_forward()
    }

    pub fn previous_enabled(&self) -> bool {
        !self.is_single_page() && self.can_advance_backward()
    }

    pub fn navigation(&self) -> Navigation {
        Navigation {
            forward: self.next_enabled(),
            backward: self.previous_enabled(),
        }
    }

    pub fn status_text(&self) -> String {
        format!(
            "Page {} of {} (Total Parameters: {})",
            self.current_page + 1,
            self.total_pages(),
            self.total_items
        )
    }
}

impl Default for Pager {
    fn default() -> Self {
        Self {
            current_page: 0,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            offset: 0,
            total_items: 0,
        }
    }
}

impl fmt::Display for Pager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.status_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pager_with(total_items: usize) -> Pager {
        let mut pager = Pager::default();
        pager.set_total_items(total_items);
        pager.advance(0);
        pager
    }

    #[test]
    fn test_rejects_zero_page_size() {
        assert!(Pager::new(0).is_err());
        assert_eq!(Pager::new(25).unwrap().items_per_page(), 25);
    }

    #[test]
    fn test_offset_tracks_current_page() {
        let mut pager = pager_with(500);
        for expected_page in 1..=5 {
            pager.advance(1);
            assert_eq!(pager.current_page(), expected_page);
            assert_eq!(pager.offset(), 50 * expected_page);
        }
        pager.advance(-5);
        assert_eq!(pager.current_page(), 0);
        assert_eq!(pager.offset(), 0);
    }

    #[test]
    fn test_advance_clamps_below_first_page() {
        let mut pager = pager_with(120);
        pager.advance(-1);
        assert_eq!(pager.current_page(), 0);
        assert_eq!(pager.offset(), 0);

        pager.advance(-3);
        pager.advance(1);
        assert_eq!(pager.current_page(), 1);
        assert_eq!(pager.offset(), 50);
    }

    #[test]
    fn test_total_pages_rounds_up_with_minimum_of_one() {
        assert_eq!(pager_with(0).total_pages(), 1);
        assert_eq!(pager_with(50).total_pages(), 1);
        assert_eq!(pager_with(51).total_pages(), 2);
        assert_eq!(pager_with(120).total_pages(), 3);
    }

    #[test]
    fn test_forward_disabled_on_last_page() {
        let mut pager = pager_with(120);
        assert!(pager.can_advance_forward());
        pager.advance(1);
        assert!(pager.can_advance_forward());
        pager.advance(1);
        assert_eq!(pager.total_pages(), pager.current_page() + 1);
        assert!(!pager.can_advance_forward());
    }

    #[test]
    fn test_backward_requires_page_after_first() {
        let mut pager = pager_with(120);
        assert!(!pager.can_advance_backward());
        pager.advance(1);
        assert!(pager.can_advance_backward());
        pager.advance(1);
        assert!(pager.can_advance_backward());
    }

    #[test]
    fn test_backward_disabled_when_page_beyond_total() {
        let mut pager = pager_with(200);
        pager.advance(3);
        pager.set_total_items(60);
        pager.advance(0);
        assert!(!pager.can_advance_backward());
        assert!(!pager.can_advance_forward());
    }

    #[test]
    fn test_single_page_disables_both_directions() {
        let pager = pager_with(10);
        assert!(pager.is_single_page());
        assert_eq!(
            pager.navigation(),
            Navigation {
                forward: false,
                backward: false
            }
        );
    }

    #[test]
    fn test_navigation_in_middle_page() {
        let mut pager = pager_with(150);
        pager.advance(1);
        assert!(!pager.is_single_page());
        assert_eq!(
            pager.navigation(),
            Navigation {
                forward: true,
                backward: true
            }
        );
    }

    #[test]
    fn test_status_text() {
        let pager = pager_with(120);
        assert_eq!(pager.status_text(), "Page 1 of 3 (Total Parameters: 120)");
        assert_eq!(pager.to_string(), pager.status_text());
    }

    #[test]
    fn test_reset_returns_to_first_page() {
        let mut pager = pager_with(400);
        pager.advance(4);
        pager.reset();
        assert_eq!(pager.current_page(), 0);
        assert_eq!(pager.offset(), 0);
        assert_eq!(pager.total_items(), 400);
    }

    #[test]
    fn test_advance_saturates_on_extreme_deltas() {
        let mut pager = pager_with(120);
        pager.advance(1);
        pager.advance(i64::MAX);
        assert_eq!(pager.offset(), pager.items_per_page() * pager.current_page());
        assert!(pager.current_page() > 1);

        pager.advance(i64::MAX / 2);
        assert_eq!(pager.offset(), pager.items_per_page() * pager.current_page());

        pager.advance(i64::MIN);
        assert_eq!(pager.current_page(), 0);
        assert_eq!(pager.offset(), 0);
    }
}
