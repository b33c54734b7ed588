//! Paginated table rendering.
//!
//! A table is described by a [`RowProcessor`]: it counts and fetches rows of
//! its own row type and turns each row into an ordered list of [`Cell`]s.
//! [`RowPipeline`] drives a processor through count, pagination, fetch and
//! rendering, and produces the table fragment.

pub mod account;
pub mod file;

use crate::cells::Cell;
use crate::error::Result;
use crate::identity::Identity;
use crate::pagination::{Pagination, PaginationConfig};
use crate::views::ViewRegistry;
use async_trait::async_trait;
use log::{debug, error, warn};
use serde::Serialize;

pub use account::{AccountRow, AccountRowProcessor};
pub use file::{FileRow, FileRowProcessor};

/// View that wraps headers, rendered rows and the pagination control
pub const TABLE_VIEW: &str = "table";

/// Default number of pages shown on each side of the current page
pub const DEFAULT_INNER_WINDOW: u64 = 2;

/// Capabilities of one table type
///
/// Implementations hold no mutable state and may be shared between
/// concurrent requests. The data source is handed in on every call.
#[async_trait]
pub trait RowProcessor: Send + Sync {
    /// One record of the table
    type Row: Send;
    /// Where rows come from, usually a connection pool
    type Source: ?Sized + Sync;

    /// Label shown next to the pagination control
    fn table_name(&self) -> &'static str;

    /// Column titles, aligned with the cells of every row
    fn headers(&self) -> &'static [&'static str];

    /// Number of rows visible to `identity`
    async fn count(&self, source: &Self::Source, identity: &Identity) -> Result<u64>;

    /// Rows of one page; `config.limit()` rows starting at `config.offset()`
    async fn fetch_page(
        &self,
        source: &Self::Source,
        identity: &Identity,
        config: PaginationConfig,
    ) -> Result<Vec<Self::Row>>;

    /// Display cells of one row, in header order
    fn build_cells(&self, row: &Self::Row) -> Vec<Cell>;
}

/// Rendered table plus the metadata a caller needs to assemble a page
#[derive(Clone, Debug)]
pub struct RenderedTable {
    pub headers: Vec<String>,
    pub rows: Vec<String>,
    pub pagination: Pagination,
    pub html: String,
}

#[derive(Serialize)]
struct TableView<'a> {
    headers: &'a [&'a str],
    rows: &'a [String],
    pagination: &'a Pagination,
}

/// Drives one [`RowProcessor`] for one request
pub struct RowPipeline<'a, P: RowProcessor> {
    processor: &'a P,
    source: &'a P::Source,
    views: &'a ViewRegistry,
    inner_window: u64,
}

impl<'a, P: RowProcessor> RowPipeline<'a, P> {
    pub fn new(processor: &'a P, source: &'a P::Source, views: &'a ViewRegistry) -> Self {
        RowPipeline {
            processor,
            source,
            views,
            inner_window: DEFAULT_INNER_WINDOW,
        }
    }

    pub fn with_inner_window(mut self, inner_window: u64) -> Self {
        self.inner_window = inner_window;
        self
    }

    pub async fn count(&self, identity: &Identity) -> Result<u64> {
        self.processor
            .count(self.source, identity)
            .await
            .inspect_err(|e| error!("Failed to count {} rows: {}", self.processor.table_name(), e))
    }

    pub async fn fetch_page(
        &self,
        identity: &Identity,
        config: PaginationConfig,
    ) -> Result<Vec<P::Row>> {
        let rows = self
            .processor
            .fetch_page(self.source, identity, config)
            .await
            .inspect_err(|e| error!("Failed to fetch {} rows: {}", self.processor.table_name(), e))?;
        debug!(
            "Fetched {} {} rows (limit {}, offset {})",
            rows.len(),
            self.processor.table_name(),
            config.limit(),
            config.offset()
        );
        Ok(rows)
    }

    pub fn build_cells(&self, row: &P::Row) -> Vec<Cell> {
        self.processor.build_cells(row)
    }

    pub fn headers(&self) -> &'static [&'static str] {
        self.processor.headers()
    }

    /// Renders every cell of a row through its view, in cell order
    ///
    /// The first failing cell aborts the row; nothing of it is returned.
    pub fn render_row(&self, row: &P::Row) -> Result<String> {
        let cells = self.build_cells(row);
        if cells.len() != self.headers().len() {
            warn!(
                "{} row has {} cells for {} headers",
                self.processor.table_name(),
                cells.len(),
                self.headers().len()
            );
        }

        let mut rendered = String::new();
        for cell in &cells {
            let html = cell.render(self.views).inspect_err(|e| {
                error!("Could not render {} cell: {}", cell.view(), e);
            })?;
            rendered.push_str(&html);
        }
        Ok(rendered)
    }

    /// Counts, paginates, fetches and renders one page of the table
    ///
    /// # Arguments
    /// * `identity` - Caller identity handed to the processor
    /// * `config` - Requested page and page size; the page is clamped
    ///
    /// # Returns
    /// * `Result<RenderedTable>` - Table fragment with its headers, rows and
    ///   pagination state, or the first error encountered
    pub async fn render_table(
        &self,
        identity: &Identity,
        config: PaginationConfig,
    ) -> Result<RenderedTable> {
        let total = self.count(identity).await?;
        let pagination = Pagination::new(
            self.processor.table_name(),
            total,
            config.current_page,
            config.items_per_page,
            self.inner_window,
        );

        let rows = if total == 0 {
            Vec::new()
        } else {
            self.fetch_page(identity, pagination.config()).await?
        };

        let rendered_rows = rows
            .iter()
            .map(|row| self.render_row(row))
            .collect::<Result<Vec<String>>>()?;

        let view = TableView {
            headers: self.headers(),
            rows: &rendered_rows,
            pagination: &pagination,
        };
        let html = self.views.render(TABLE_VIEW, &view)?;

        Ok(RenderedTable {
            headers: self.headers().iter().map(|h| h.to_string()).collect(),
            rows: rendered_rows,
            pagination,
            html,
        })
    }
}

impl<P: RowProcessor> std::fmt::Debug for RowPipeline<'_, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowPipeline")
            .field("table", &self.processor.table_name())
            .field("inner_window", &self.inner_window)
            .finish()
    }
}
