//! Windowed pagination for list endpoints.

use serde::Serialize;

pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;

/// Builds the page-number window rendered by clients: first/last edges,
/// a window around the current page, `None` marking elided gaps.
fn page_window(
    total_pages: usize,
    current_page: usize,
    left_edge: usize,
    left_current: usize,
    right_current: usize,
    right_edge: usize,
) -> Vec<Option<usize>> {
    if total_pages == 0 {
        return vec![];
    }

    let mut pages = Vec::new();

    let left_end = (1 + left_edge).min(total_pages + 1);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = (current_page + right_current + 1).min(total_pages + 1);
    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(total_pages.saturating_sub(right_edge) + 1);
    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=total_pages).map(Some));

    pages
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pages: Vec<Option<usize>>,
    pub page: usize,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, current_page: usize, total_pages: usize) -> Self {
        let current_page = current_page.max(1);
        let pages = page_window(total_pages, current_page, 2, 2, 4, 2);

        Self {
            items,
            pages,
            page: current_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_when_no_pages() {
        let p = Paginated::<i32>::new(vec![], 1, 0);
        assert!(p.pages.is_empty());
        assert_eq!(p.page, 1);
    }

    #[test]
    fn short_lists_have_no_gaps() {
        let p = Paginated::<i32>::new(vec![], 2, 5);
        assert_eq!(
            p.pages,
            vec![Some(1), Some(2), Some(3), Some(4), Some(5)]
        );
    }

    #[test]
    fn long_lists_elide_middle() {
        let p = Paginated::<i32>::new(vec![], 10, 30);
        assert!(p.pages.contains(&None));
        assert_eq!(p.pages.first(), Some(&Some(1)));
        assert_eq!(p.pages.last(), Some(&Some(30)));
    }

    #[test]
    fn zero_page_is_clamped_to_first() {
        let p = Paginated::<i32>::new(vec![], 0, 3);
        assert_eq!(p.page, 1);
    }
}
