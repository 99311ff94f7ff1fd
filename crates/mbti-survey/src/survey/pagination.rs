/// Questions shown per test page.
pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page, 1-indexed.
    pub page: usize,
    pub total_pages: usize,
    pub offset: usize,
}

impl Pagination {
    /// Non-numeric or missing input falls back to the first page; numbers are
    /// clamped into `[1, total_pages]`.
    pub fn from_query(total_items: usize, raw_page: Option<&str>) -> Self {
        let requested = raw_page
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .unwrap_or(1);
        Self::calculate(total_items, requested)
    }

    pub fn calculate(total_items: usize, requested_page: i64) -> Self {
        let total_pages = total_items.div_ceil(PAGE_SIZE);
        let last = total_pages.max(1) as i64;
        let page = requested_page.clamp(1, last) as usize;

        Self {
            page,
            total_pages,
            offset: (page - 1) * PAGE_SIZE,
        }
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset.min(items.len());
        let end = (start + PAGE_SIZE).min(items.len());
        &items[start..end]
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn middle_page() {
        let p = Pagination::calculate(25, 2);
        assert_eq!(p.page, 2);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.offset, 10);
        assert!(p.has_previous());
        assert!(p.has_next());
    }

    #[test]
    fn out_of_range_clamps_to_last_page() {
        let p = Pagination::calculate(25, 99);
        assert_eq!(p.page, 3);
        assert_eq!(p.offset, 20);
        assert!(!p.has_next());
    }

    #[test]
    fn below_range_clamps_to_first_page() {
        let p = Pagination::calculate(25, -4);
        assert_eq!(p.page, 1);
        assert_eq!(p.offset, 0);
        assert!(!p.has_previous());
    }

    #[test]
    fn non_numeric_query_uses_first_page() {
        assert_eq!(Pagination::from_query(25, Some("abc")).page, 1);
        assert_eq!(Pagination::from_query(25, None).page, 1);
        assert_eq!(Pagination::from_query(25, Some(" 3 ")).page, 3);
    }

    #[test]
    fn empty_set() {
        let p = Pagination::calculate(0, 1);
        assert_eq!(p.page, 1);
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn slice_returns_page_window() {
        let items: Vec<u32> = (0..25).collect();
        let p = Pagination::calculate(items.len(), 3);
        assert_eq!(p.slice(&items), &[20, 21, 22, 23, 24]);
    }
}
