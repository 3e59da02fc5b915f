use std::fmt;

use crate::error::AdminError;

/// Rows per page, restricted to the sizes the pager offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSize(usize);

impl PageSize {
    pub const ALLOWED: [usize; 4] = [5, 10, 25, 50];

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize(10)
    }
}

impl TryFrom<usize> for PageSize {
    type Error = AdminError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        if Self::ALLOWED.contains(&value) {
            Ok(PageSize(value))
        } else {
            Err(AdminError::Validation(format!(
                "page size {value} is not one of {:?}",
                Self::ALLOWED
            )))
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    page_size: PageSize,
}

impl Pagination {
    pub fn new(page_size: PageSize) -> Self {
        Self { page: 0, page_size }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Out-of-range pages are allowed; they produce an empty window.
    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.page_size = page_size;
        self.page = 0;
    }

    pub fn reset(&mut self) {
        self.page = 0;
    }

    /// Index range of the current page, clipped to `len`.
    pub fn bounds(&self, len: usize) -> std::ops::Range<usize> {
        let start = self.page.saturating_mul(self.page_size.get()).min(len);
        let end = start.saturating_add(self.page_size.get()).min(len);
        start..end
    }

    pub fn window<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.bounds(items.len())]
    }

    pub fn page_count(&self, len: usize) -> usize {
        len.div_ceil(self.page_size.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn window_clips_to_the_sequence() {
        let items: Vec<u32> = (1..=12).collect();
        let mut pager = Pagination::new(PageSize::try_from(5).unwrap());
        assert_eq!(pager.window(&items), &[1, 2, 3, 4, 5]);
        pager.set_page(2);
        assert_eq!(pager.window(&items), &[11, 12]);
        pager.set_page(3);
        assert!(pager.window(&items).is_empty());
        pager.set_page(usize::MAX);
        assert!(pager.window(&items).is_empty());
    }

    #[test]
    fn changing_page_size_returns_to_first_page() {
        let mut pager = Pagination::default();
        pager.set_page(4);
        pager.set_page_size(PageSize::try_from(25).unwrap());
        assert_eq!(pager.page(), 0);
        assert_eq!(pager.page_size().get(), 25);
    }

    #[test]
    fn rejects_sizes_outside_the_allowed_set() {
        assert!(matches!(PageSize::try_from(7), Err(AdminError::Validation(_))));
        assert!(PageSize::try_from(0).is_err());
        assert_eq!(PageSize::default().get(), 10);
    }

    #[test]
    fn page_count_rounds_up() {
        let pager = Pagination::new(PageSize::try_from(10).unwrap());
        assert_eq!(pager.page_count(0), 0);
        assert_eq!(pager.page_count(10), 1);
        assert_eq!(pager.page_count(11), 2);
    }

    proptest! {
        #[test]
        fn proptest_windows_partition_the_sequence(
            len in 0usize..200,
            size_index in 0usize..PageSize::ALLOWED.len(),
        ) {
            let items: Vec<usize> = (0..len).collect();
            let size = PageSize::try_from(PageSize::ALLOWED[size_index]).unwrap();
            let mut pager = Pagination::new(size);

            let mut seen = Vec::new();
            for page in 0..=pager.page_count(len) {
                pager.set_page(page);
                let window = pager.window(&items);
                prop_assert!(window.len() <= size.get());
                seen.extend_from_slice(window);
            }
            prop_assert_eq!(seen, items);
        }
    }
}
