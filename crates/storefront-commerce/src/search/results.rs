//! Pagination.

use serde::{Deserialize, Serialize};

/// Pagination info for a listing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page (1-indexed).
    pub page: i64,
    /// Items per page.
    pub limit: usize,
    /// Total number of items.
    pub total: usize,
    /// `ceil(total / limit)`; 0 when there are no items.
    pub total_pages: usize,
}

impl Pagination {
    /// Create pagination info.
    pub fn new(page: i64, limit: usize, total: usize) -> Self {
        let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }

    /// Whether there's a next page.
    pub fn has_next(&self) -> bool {
        self.page >= 1 && (self.page as usize) < self.total_pages
    }

    /// Whether there's a previous page.
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Index range of the current page, or `None` when out of range.
    pub fn bounds(&self) -> Option<(usize, usize)> {
        if self.page < 1 || self.limit == 0 {
            return None;
        }
        let start = (self.page as usize - 1).checked_mul(self.limit)?;
        if start >= self.total {
            return None;
        }
        Some((start, (start + self.limit).min(self.total)))
    }

    /// Get page numbers for display, centred on the current page.
    pub fn page_numbers(&self, max_visible: usize) -> Vec<usize> {
        if self.total_pages <= max_visible {
            return (1..=self.total_pages).collect();
        }

        let current = self.page.max(1) as usize;
        let start = current.saturating_sub(max_visible / 2).max(1);
        let end = (start + max_visible - 1).min(self.total_pages);
        let start = (end + 1).saturating_sub(max_visible).max(1);

        (start..=end).collect()
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, super::PRODUCTS_PAGE_SIZE, 0)
    }
}

/// One page of items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Pagination info for the whole list.
    pub pagination: Pagination,
}

impl<T> Page<T> {
    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get number of items in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// Slice `[(page-1)*limit, page*limit)` out of `items`.
///
/// A page below 1 or past the end (or a zero limit) gives an empty page.
pub fn paginate<T: Clone>(items: &[T], page: i64, limit: usize) -> Page<T> {
    let pagination = Pagination::new(page, limit, items.len());
    let items = match pagination.bounds() {
        Some((start, end)) => items[start..end].to_vec(),
        None => Vec::new(),
    };
    Page { items, pagination }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_middle_page() {
        let items: Vec<u32> = (1..=25).collect();
        let page = paginate(&items, 2, 10);
        assert_eq!(page.items, (11..=20).collect::<Vec<_>>());
        assert_eq!(page.pagination.total, 25);
        assert_eq!(page.pagination.total_pages, 3);
        assert!(page.pagination.has_next());
        assert!(page.pagination.has_prev());
    }

    #[test]
    fn test_pages_reconstruct_items() {
        let items: Vec<u32> = (1..=23).collect();
        let total_pages = paginate(&items, 1, 5).pagination.total_pages;
        let joined: Vec<u32> = (1..=total_pages as i64)
            .flat_map(|p| paginate(&items, p, 5).items)
            .collect();
        assert_eq!(joined, items);
    }

    #[test]
    fn test_out_of_range_pages_are_empty() {
        let items = vec![1, 2, 3];
        assert!(paginate(&items, 0, 2).is_empty());
        assert!(paginate(&items, -4, 2).is_empty());
        assert!(paginate(&items, 3, 2).is_empty());
        assert!(paginate(&items, 1, 0).is_empty());
    }

    #[test]
    fn test_empty_list_has_zero_pages() {
        let page = paginate::<u32>(&[], 1, 12);
        assert_eq!(page.pagination.total_pages, 0);
        assert!(!page.pagination.has_next());
    }

    #[test]
    fn test_page_numbers() {
        let p = Pagination::new(5, 10, 100);
        assert_eq!(p.page_numbers(5), vec![3, 4, 5, 6, 7]);
        let p = Pagination::new(1, 10, 30);
        assert_eq!(p.page_numbers(5), vec![1, 2, 3]);
    }
}
