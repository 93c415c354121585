//! Page slicing for product listings
//!
//! A non-numeric page number means page 1; a number outside `1..=num_pages`
//! means the last page. An empty listing still has one (empty) page.

use serde::Serialize;

/// Products per page on a category page
pub const CATEGORY_PAGE_SIZE: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    pub count: usize,
    pub per_page: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub page: usize,
    pub num_pages: usize,
    pub has_next: bool,
    pub has_previous: bool,
    pub per_page: usize,
    #[serde(skip)]
    start: usize,
    #[serde(skip)]
    end: usize,
}

impl Page {
    /// Slice the full result list down to this page
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let end = self.end.min(items.len());
        let start = self.start.min(end);
        &items[start..end]
    }

    pub fn has_other_pages(&self) -> bool {
        self.has_next || self.has_previous
    }
}

impl Paginator {
    pub fn new(count: usize, per_page: usize) -> Self {
        Self {
            count,
            per_page: per_page.max(1),
        }
    }

    pub fn num_pages(&self) -> usize {
        self.count.div_ceil(self.per_page).max(1)
    }

    /// Page for a raw `page` parameter
    pub fn get_page(&self, raw: Option<&str>) -> Page {
        let num_pages = self.num_pages();
        let number = match raw.map(str::trim).map(str::parse::<i64>) {
            None | Some(Err(_)) => 1,
            Some(Ok(n)) if n >= 1 && (n as usize) <= num_pages => n as usize,
            Some(Ok(_)) => num_pages,
        };
        let start = (number - 1) * self.per_page;
        Page {
            page: number,
            num_pages,
            has_next: number < num_pages,
            has_previous: number > 1,
            per_page: self.per_page,
            start,
            end: (start + self.per_page).min(self.count),
        }
    }
}
