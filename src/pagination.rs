use log::debug;
use serde::{Serialize, Serializer};
use std::fmt;

/// One entry of the compressed page-number list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageToken {
    Page(u64),
    Ellipsis,
}

impl PageToken {
    pub const ELLIPSIS: &'static str = "...";

    pub fn is_ellipsis(&self) -> bool {
        matches!(self, PageToken::Ellipsis)
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageToken::Page(page) => write!(f, "{}", page),
            PageToken::Ellipsis => f.write_str(Self::ELLIPSIS),
        }
    }
}

// Templates compare tokens against "..." so they serialize as plain strings.
impl Serialize for PageToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PaginationData {
    pub table_name: String,
    pub item_total: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PaginationConfig {
    /// 1-based
    pub current_page: u64,
    pub items_per_page: u64,
}

impl PaginationConfig {
    pub fn new(current_page: u64, items_per_page: u64) -> Self {
        Self {
            current_page,
            items_per_page,
        }
    }

    /// Number of rows to fetch for the current page
    pub fn limit(&self) -> u64 {
        self.items_per_page.max(1)
    }

    /// Number of rows preceding the current page
    pub fn offset(&self) -> u64 {
        self.current_page
            .saturating_sub(1)
            .saturating_mul(self.limit())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PaginationDisplay {
    pub total_pages: u64,
    pub page_list: Vec<PageToken>,
    pub item_start: u64,
    pub item_end: u64,
}

/// Pagination state of one table
///
/// The display part is derived from the data and config parts and is
/// recomputed by every mutator, so it can never be set on its own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Pagination {
    data: PaginationData,
    config: PaginationConfig,
    display: PaginationDisplay,
    #[serde(skip)]
    inner_window: u64,
}

impl Pagination {
    /// Computes the pagination state for a table
    ///
    /// # Arguments
    /// * `table_name` - Label shown next to the item range
    /// * `item_total` - Total number of items across all pages
    /// * `current_page` - Requested page, clamped into `[1, total_pages]`
    /// * `items_per_page` - Page size, floored to 1
    /// * `inner_window` - Pages shown on each side of the current page
    ///
    /// # Examples
    /// ```
    /// use dashboard::pagination::Pagination;
    ///
    /// let pagination = Pagination::new("Invoices", 100, 6, 10, 2);
    /// let pages: Vec<String> = pagination
    ///     .display()
    ///     .page_list
    ///     .iter()
    ///     .map(|token| token.to_string())
    ///     .collect();
    /// assert_eq!(pages, ["1", "...", "4", "5", "6", "7", "8", "...", "10"]);
    /// ```
    pub fn new(
        table_name: &str,
        item_total: u64,
        current_page: u64,
        items_per_page: u64,
        inner_window: u64,
    ) -> Self {
        let mut pagination = Pagination {
            data: PaginationData {
                table_name: table_name.to_string(),
                item_total,
            },
            config: PaginationConfig::new(current_page, items_per_page),
            display: PaginationDisplay {
                total_pages: 0,
                page_list: Vec::new(),
                item_start: 0,
                item_end: 0,
            },
            inner_window,
        };
        pagination.recompute();
        pagination
    }

    pub fn data(&self) -> &PaginationData {
        &self.data
    }

    pub fn config(&self) -> PaginationConfig {
        self.config
    }

    pub fn display(&self) -> &PaginationDisplay {
        &self.display
    }

    pub fn set_item_total(&mut self, item_total: u64) {
        self.data.item_total = item_total;
        self.recompute();
    }

    pub fn set_config(&mut self, config: PaginationConfig) {
        self.config = config;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.set_page_bounds();
        self.display.page_list = build_page_list(
            self.config.current_page,
            self.display.total_pages,
            self.inner_window,
        );
    }

    fn set_page_bounds(&mut self) {
        self.config.items_per_page = self.config.items_per_page.max(1);
        let total = self.data.item_total;
        let per_page = self.config.items_per_page;

        self.display.total_pages = total.div_ceil(per_page);
        self.config.current_page = self
            .config
            .current_page
            .min(self.display.total_pages)
            .max(1);
        debug!(
            "{}: current page {} of {}",
            self.data.table_name, self.config.current_page, self.display.total_pages
        );

        if total == 0 {
            self.display.item_start = 0;
            self.display.item_end = 0;
            return;
        }
        self.display.item_start = self.config.offset().saturating_add(1);
        self.display.item_end = self
            .display
            .item_start
            .saturating_add(per_page - 1)
            .min(total);
    }
}

/// Clamps the requested inner window into `[2, (total_pages - 1) / 2]`.
///
/// The lower bound wins when the range is empty.
pub fn effective_inner_window(total_pages: u64, inner_window: u64) -> u64 {
    inner_window
        .min(total_pages.saturating_sub(1) / 2)
        .max(2)
}

/// Builds the page list, e.g. `1 ... 4 5 6 7 8 ... 99`
///
/// Page 1 and the last page are always present. The window around the
/// current page holds at most `2 * inner + 1` pages; hidden runs collapse into
/// an ellipsis, except for a lone trailing page that still fits the window.
pub fn build_page_list(current_page: u64, total_pages: u64, inner_window: u64) -> Vec<PageToken> {
    let mut pages = vec![PageToken::Page(1)];
    if total_pages <= 1 {
        return pages;
    }

    let inner = effective_inner_window(total_pages, inner_window);
    let max_width = 2 * inner + 1;
    let fits = total_pages <= max_width;

    if current_page > 1 + inner && !fits {
        pages.push(PageToken::Ellipsis);
    } else {
        pages.push(PageToken::Page(2));
    }
    if total_pages == 2 {
        return pages;
    }

    let (left, right) = if fits {
        (3, total_pages)
    } else {
        let left = current_page
            .saturating_sub(inner)
            .min(total_pages - 2 * inner)
            .max(3);
        let right = current_page
            .saturating_add(inner)
            .max(max_width)
            .min(total_pages);
        (left, right)
    };

    pages.extend((left..=right).map(PageToken::Page));
    if right == total_pages {
        return pages;
    }

    let gap = total_pages - 1 - right;
    if gap == 1 && right + 2 - left <= max_width {
        pages.push(PageToken::Page(right + 1));
    } else if gap >= 1 {
        pages.push(PageToken::Ellipsis);
    }
    pages.push(PageToken::Page(total_pages));
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn labels(pagination: &Pagination) -> Vec<String> {
        pagination
            .display()
            .page_list
            .iter()
            .map(|token| token.to_string())
            .collect()
    }

    #[test]
    fn middle_page_collapses_both_sides() {
        let pagination = Pagination::new("Invoices", 100, 6, 10, 2);
        assert_eq!(pagination.display().total_pages, 10);
        assert_eq!(
            labels(&pagination),
            ["1", "...", "4", "5", "6", "7", "8", "...", "10"]
        );
        assert_eq!(pagination.display().item_start, 51);
        assert_eq!(pagination.display().item_end, 60);
    }

    #[test]
    fn two_pages_with_large_window() {
        let pagination = Pagination::new("Invoices", 15, 1, 10, 7);
        assert_eq!(pagination.display().total_pages, 2);
        assert_eq!(labels(&pagination), ["1", "2"]);
        assert_eq!(pagination.display().item_start, 1);
        assert_eq!(pagination.display().item_end, 10);
    }

    #[test]
    fn empty_table() {
        let pagination = Pagination::new("Files", 0, 4, 10, 2);
        assert_eq!(pagination.display().total_pages, 0);
        assert_eq!(pagination.config().current_page, 1);
        assert_eq!(labels(&pagination), ["1"]);
        assert_eq!(pagination.display().item_start, 0);
        assert_eq!(pagination.display().item_end, 0);
    }

    #[test]
    fn zero_items_per_page_is_floored() {
        let pagination = Pagination::new("Files", 3, 2, 0, 2);
        assert_eq!(pagination.config().items_per_page, 1);
        assert_eq!(pagination.display().total_pages, 3);
        assert_eq!(labels(&pagination), ["1", "2", "3"]);
        assert_eq!(pagination.display().item_start, 2);
        assert_eq!(pagination.display().item_end, 2);
    }

    #[test]
    fn current_page_is_clamped() {
        let pagination = Pagination::new("Invoices", 45, 99, 10, 2);
        assert_eq!(pagination.config().current_page, 5);
        assert_eq!(pagination.display().item_start, 41);
        assert_eq!(pagination.display().item_end, 45);

        let pagination = Pagination::new("Invoices", 45, 0, 10, 2);
        assert_eq!(pagination.config().current_page, 1);
    }

    #[test]
    fn start_of_long_list() {
        let pagination = Pagination::new("Invoices", 990, 1, 10, 2);
        assert_eq!(labels(&pagination), ["1", "2", "3", "4", "5", "...", "99"]);
    }

    #[test]
    fn end_of_long_list() {
        let pagination = Pagination::new("Invoices", 990, 99, 10, 2);
        assert_eq!(
            labels(&pagination),
            ["1", "...", "95", "96", "97", "98", "99"]
        );
    }

    #[test]
    fn short_list_shows_every_page() {
        let pagination = Pagination::new("Invoices", 80, 4, 10, 3);
        assert_eq!(
            labels(&pagination),
            ["1", "2", "3", "4", "5", "6", "7", "8"]
        );
    }

    #[test]
    fn lone_trailing_page_is_shown_when_it_fits() {
        // window 3..=5 has room for page 6
        let pagination = Pagination::new("Invoices", 70, 1, 10, 2);
        assert_eq!(
            labels(&pagination),
            ["1", "2", "3", "4", "5", "6", "7"]
        );
    }

    #[test]
    fn mutators_recompute_display() {
        let mut pagination = Pagination::new("Invoices", 100, 6, 10, 2);
        pagination.set_item_total(20);
        assert_eq!(pagination.display().total_pages, 2);
        assert_eq!(pagination.config().current_page, 2);
        assert_eq!(labels(&pagination), ["1", "2"]);

        pagination.set_config(PaginationConfig::new(1, 5));
        assert_eq!(pagination.display().total_pages, 4);
        assert_eq!(pagination.display().item_end, 5);
        assert_eq!(labels(&pagination), ["1", "2", "3", "4"]);
    }

    #[test]
    fn limit_and_offset() {
        let config = PaginationConfig::new(3, 25);
        assert_eq!(config.limit(), 25);
        assert_eq!(config.offset(), 50);
    }

    #[test]
    fn tokens_serialize_as_strings() {
        let json = serde_json::to_string(&[PageToken::Page(7), PageToken::Ellipsis]).unwrap();
        assert_eq!(json, r#"["7","..."]"#);
    }

    #[test]
    fn huge_page_size_shows_every_item() {
        let pagination = Pagination::new("t", 50, 1, u64::MAX, 2);
        assert_eq!(pagination.display().total_pages, 1);
        assert_eq!(pagination.display().item_start, 1);
        assert_eq!(pagination.display().item_end, 50);
        assert_eq!(labels(&pagination), ["1"]);
    }

    #[test]
    fn last_page_of_maximal_total() {
        let pagination = Pagination::new("t", u64::MAX, u64::MAX, 1, 2);
        let display = pagination.display();
        assert_eq!(display.total_pages, u64::MAX);
        assert_eq!(display.item_start, u64::MAX);
        assert_eq!(display.item_end, u64::MAX);
        let last = labels(&pagination);
        assert_eq!(last.len(), 7);
        assert_eq!(last[1], "...");
        assert_eq!(last[6], u64::MAX.to_string());
    }

    fn edge_value() -> impl Strategy<Value = u64> {
        prop_oneof![
            Just(0u64),
            Just(1),
            Just(2),
            Just(3),
            0u64..200,
            1_000u64..1_000_000,
        ]
    }

    fn wide_value() -> impl Strategy<Value = u64> {
        prop_oneof![
            edge_value(),
            Just(u64::MAX),
            Just(u64::MAX - 1),
            (u64::MAX / 2)..=u64::MAX,
        ]
    }

    proptest! {
        #[test]
        fn page_bounds_hold(
            total in wide_value(),
            current in wide_value(),
            per_page in prop_oneof![1u64..500, wide_value().prop_map(|v| v.max(1))],
            inner in 0u64..64,
        ) {
            let pagination = Pagination::new("t", total, current, per_page, inner);
            let display = pagination.display();
            prop_assert_eq!(display.total_pages, total.div_ceil(per_page));
            if total == 0 {
                prop_assert_eq!(display.item_start, 0);
                prop_assert_eq!(display.item_end, 0);
            } else {
                prop_assert!(display.item_start >= 1);
                prop_assert!(display.item_start <= display.item_end);
                prop_assert!(display.item_end <= total);
            }
        }

        #[test]
        fn clamping_is_idempotent(
            total in wide_value(),
            current in wide_value(),
            per_page in prop_oneof![1u64..500, wide_value().prop_map(|v| v.max(1))],
            inner in 0u64..64,
        ) {
            let first = Pagination::new("t", total, current, per_page, inner);
            let clamped = first.config().current_page;
            prop_assert!(clamped >= 1);
            prop_assert!(clamped <= first.display().total_pages.max(1));

            let second = Pagination::new("t", total, clamped, per_page, inner);
            prop_assert_eq!(&first, &second);
        }

        #[test]
        fn page_list_shape(
            total_pages in edge_value(),
            current in edge_value(),
            inner in edge_value(),
        ) {
            let current = current.min(total_pages).max(1);
            let pages = build_page_list(current, total_pages, inner);

            prop_assert_eq!(pages[0], PageToken::Page(1));
            if total_pages >= 1 {
                prop_assert_eq!(*pages.last().unwrap(), PageToken::Page(total_pages));
            }

            let window = effective_inner_window(total_pages, inner);
            prop_assert!(pages.len() as u64 <= 2 * window + 5);

            for pair in pages.windows(2) {
                prop_assert!(!(pair[0].is_ellipsis() && pair[1].is_ellipsis()));
            }

            let numbers: Vec<u64> = pages
                .iter()
                .filter_map(|token| match token {
                    PageToken::Page(page) => Some(*page),
                    PageToken::Ellipsis => None,
                })
                .collect();
            prop_assert!(numbers.windows(2).all(|pair| pair[0] < pair[1]));
            if total_pages >= 1 {
                prop_assert!(numbers.contains(&current));
            }

            // an ellipsis always stands for at least one hidden page
            for (idx, token) in pages.iter().enumerate() {
                if token.is_ellipsis() {
                    let before = match pages[idx - 1] { PageToken::Page(p) => p, PageToken::Ellipsis => 0 };
                    let after = match pages[idx + 1] { PageToken::Page(p) => p, PageToken::Ellipsis => 0 };
                    prop_assert!(after > before + 1);
                }
            }
        }

        #[test]
        fn page_list_is_deterministic(
            total_pages in edge_value(),
            current in edge_value(),
            inner in edge_value(),
        ) {
            prop_assert_eq!(
                build_page_list(current, total_pages, inner),
                build_page_list(current, total_pages, inner)
            );
        }
    }
}
