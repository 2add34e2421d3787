//! Page arithmetic for the catalog listings.

use serde::Serialize;

/// Pages shown on each side of the current page.
pub const INNER_WINDOW: u32 = 2;
/// Pages always shown at both ends.
pub const OUTER_WINDOW: u32 = 1;

/// Default message, formatted after translation.
pub const DISPLAY_MSG: &str = "Displaying <b>{start} - {end}</b> {record_name} of <b>{total}</b>";

/// Position of a listing page within `total` records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    per_page: u32,
    total: u64,
}

impl Pagination {
    /// Page and page size are clamped to at least 1.
    #[must_use]
    pub fn new(page: u32, per_page: u32, total: u64) -> Self {
        Self { page: page.max(1), per_page: per_page.max(1), total }
    }

    /// Reads the `page` query parameter; anything missing, malformed or below 1 means page 1.
    #[must_use]
    pub fn parse_page(raw: Option<&str>) -> u32 {
        raw.and_then(|value| value.trim().parse::<u32>().ok()).filter(|&p| p > 0).unwrap_or(1)
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Records to skip before this page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.per_page as u64
    }

    /// Number of pages; zero for an empty listing.
    #[must_use]
    pub fn pages(&self) -> u32 {
        u32::try_from(self.total.div_ceil(u64::from(self.per_page))).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.pages()
    }

    /// 1-based index of the first record on the page, 0 when the page is empty.
    #[must_use]
    pub const fn start(&self) -> u64 {
        if self.offset() >= self.total { 0 } else { self.offset() + 1 }
    }

    /// 1-based index of the last record on the page, 0 when the page is empty.
    #[must_use]
    pub fn end(&self) -> u64 {
        if self.start() == 0 { 0 } else { (self.offset() + u64::from(self.per_page)).min(self.total) }
    }

    /// Page numbers to link, `None` marking a gap.
    ///
    /// Keeps the first and last `outer` pages and `inner` pages around the current one.
    #[must_use]
    pub fn window(&self, inner: u32, outer: u32) -> Vec<Option<u32>> {
        let pages = self.pages();
        if pages == 0 {
            return Vec::new();
        }
        let current = self.page.min(pages);

        let mut numbers: Vec<u32> = Vec::new();
        numbers.extend(1..=outer.min(pages));
        numbers.extend(current.saturating_sub(inner).max(1)..=current.saturating_add(inner).min(pages));
        numbers.extend(pages.saturating_sub(outer).saturating_add(1).max(1)..=pages);
        numbers.sort_unstable();
        numbers.dedup();

        let mut links = Vec::with_capacity(numbers.len() * 2);
        let mut previous = 0;
        for number in numbers {
            if number > previous + 1 {
                links.push(None);
            }
            links.push(Some(number));
            previous = number;
        }
        links
    }

    /// Fills `{start}`, `{end}`, `{record_name}` and `{total}` in an (already translated) message.
    #[must_use]
    pub fn display_message(&self, message: &str, record_name: &str) -> String {
        message
            .replace("{start}", &self.start().to_string())
            .replace("{end}", &self.end().to_string())
            .replace("{record_name}", record_name)
            .replace("{total}", &self.total.to_string())
    }

    /// Template-facing snapshot.
    #[must_use]
    pub fn view(&self, info: String) -> PaginationView {
        let current = self.page;
        PaginationView {
            page: current,
            per_page: self.per_page,
            total: self.total,
            pages: self.pages(),
            has_prev: self.has_prev(),
            has_next: self.has_next(),
            prev: self.has_prev().then(|| current - 1),
            next: self.has_next().then(|| current + 1),
            start: self.start(),
            end: self.end(),
            links: self
                .window(INNER_WINDOW, OUTER_WINDOW)
                .into_iter()
                .map(|page| PageLink { page, current: page == Some(current) })
                .collect(),
            info,
        }
    }
}

/// Serializable pagination state handed to the templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationView {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub pages: u32,
    pub has_prev: bool,
    pub has_next: bool,
    pub prev: Option<u32>,
    pub next: Option<u32>,
    pub start: u64,
    pub end: u64,
    pub links: Vec<PageLink>,
    /// Rendered display message (contains markup).
    pub info: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageLink {
    /// `None` renders as an ellipsis.
    pub page: Option<u32>,
    pub current: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_of_a_partial_listing() {
        let p = Pagination::new(1, 20, 45);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.pages(), 3);
        assert_eq!((p.start(), p.end()), (1, 20));
        assert!(!p.has_prev());
        assert!(p.has_next());
    }

    #[test]
    fn last_page_is_short() {
        let p = Pagination::new(3, 20, 45);
        assert_eq!(p.offset(), 40);
        assert_eq!((p.start(), p.end()), (41, 45));
        assert!(p.has_prev());
        assert!(!p.has_next());
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let p = Pagination::new(9, 20, 45);
        assert_eq!((p.start(), p.end()), (0, 0));
        assert!(!p.has_next());
    }

    #[test]
    fn empty_listing_has_no_pages() {
        let p = Pagination::new(1, 20, 0);
        assert_eq!(p.pages(), 0);
        assert!(p.window(INNER_WINDOW, OUTER_WINDOW).is_empty());
        assert_eq!((p.start(), p.end()), (0, 0));
    }

    #[test]
    fn zero_inputs_are_clamped() {
        let p = Pagination::new(0, 0, 5);
        assert_eq!((p.page(), p.per_page()), (1, 1));
        assert_eq!(p.pages(), 5);
    }

    #[test]
    fn page_parameter_falls_back_to_first_page() {
        assert_eq!(Pagination::parse_page(None), 1);
        assert_eq!(Pagination::parse_page(Some("abc")), 1);
        assert_eq!(Pagination::parse_page(Some("-3")), 1);
        assert_eq!(Pagination::parse_page(Some("0")), 1);
        assert_eq!(Pagination::parse_page(Some(" 4 ")), 4);
    }

    #[test]
    fn window_marks_gaps() {
        let p = Pagination::new(10, 10, 200);
        assert_eq!(
            p.window(2, 1),
            vec![Some(1), None, Some(8), Some(9), Some(10), Some(11), Some(12), None, Some(20)]
        );
    }

    #[test]
    fn window_without_gaps_for_small_listings() {
        let p = Pagination::new(2, 10, 40);
        assert_eq!(p.window(2, 1), vec![Some(1), Some(2), Some(3), Some(4)]);
    }

    #[test]
    fn display_message_is_formatted() {
        let p = Pagination::new(2, 20, 45);
        assert_eq!(
            p.display_message(DISPLAY_MSG, "trainings"),
            "Displaying <b>21 - 40</b> trainings of <b>45</b>"
        );
    }

    #[test]
    fn view_flags_the_current_page() {
        let view = Pagination::new(2, 10, 30).view(String::new());
        assert_eq!(view.prev, Some(1));
        assert_eq!(view.next, Some(3));
        let current: Vec<_> = view.links.iter().filter(|l| l.current).collect();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].page, Some(2));
    }
}
