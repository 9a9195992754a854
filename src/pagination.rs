//! Page links for the company list and the audit log.

use serde::Serialize;

pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;

/// How many page links surround the first, last and current page.
#[derive(Debug, Clone, Copy)]
struct PageWindow {
    edge: usize,
    before: usize,
    after: usize,
}

const WINDOW: PageWindow = PageWindow {
    edge: 2,
    before: 2,
    after: 4,
};

impl PageWindow {
    fn shows(&self, page: usize, current: usize, last: usize) -> bool {
        page <= self.edge
            || page + self.edge > last
            || (page + self.before >= current && page <= current + self.after)
    }

    /// Page numbers to link, with `None` marking a collapsed gap.
    fn links(&self, current: usize, last: usize) -> Vec<Option<usize>> {
        let mut links = Vec::new();
        let mut gap = false;
        for page in 1..=last {
            if self.shows(page, current, last) {
                links.push(Some(page));
                gap = false;
            } else if !gap {
                links.push(None);
                gap = true;
            }
        }
        links
    }
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pages: Vec<Option<usize>>,
    pub page: usize,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, page: usize, total_pages: usize) -> Self {
        let page = page.max(1);
        Self {
            items,
            pages: WINDOW.links(page, total_pages),
            page,
        }
    }

    /// Builds the page from a row count as returned by the repository.
    pub fn from_total(items: Vec<T>, page: usize, total_items: usize, per_page: usize) -> Self {
        Self::new(items, page, total_items.div_ceil(per_page.max(1)))
    }
}
