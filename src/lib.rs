/*!
# Dashboard

Server-rendered table and chart fragments for a web dashboard, backed by
PostgreSQL.

## Overview

A dashboard page is assembled from independent fragments. Each fragment is
produced by a processor that knows how to query one kind of data and how to
present it, and by a generic pipeline that runs the processor and renders the
result through named view templates.

## Architecture

### Tables
- **RowProcessor**: counts and fetches the rows of one table and turns each
  row into ordered display cells
- **RowPipeline**: count, pagination, page fetch, cell rendering and table
  rendering for any processor
- **Pagination**: page clamping, item range and a windowed page list with
  ellipses

### Charts
- **ChartProcessor**: fetches datapoints for a chart query and fills a display
  model for the browser chart library
- **ChartPipeline**: fetch, population, legend derivation, serialization and
  view rendering for any processor

### Views
- Handlebars templates loaded from a directory, addressed by relative path
  (`tableCell/status`, `charts/pie`)
- Helpers `add`, `sub` and `html_id` for templates

## Modules

- **pagination**: Pagination state and page list computation
- **cells**: Cell variants, their views and status colors
- **palette**: Named color palettes for charts
- **views**: View registry and template helpers
- **rows**: Row processors (accounts, files) and the table pipeline
- **charts**: Chart processors (pie) and the chart pipeline
- **identity**: Caller identity tokens
- **config**: Environment configuration and connection pool
- **db**: Row decoding helpers shared by processors
- **error**: Error type of the crate
- **app**: HTTP routes and identity middleware (`web` feature)

## REST API Endpoints

- `/app/tables/invoices?page=&per_page=` - Invoice table fragment
- `/app/tables/files?page=&per_page=` - File table fragment of the caller
- `/app/charts/pie?table=&column=&group_by=` - Pie chart fragment, optionally
  filtered with `time_column`, `after` and `before`
- `/assets/{path}` - Static assets
*/

#[cfg(feature = "web")]
pub mod app;
pub mod cells;
pub mod charts;
pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod pagination;
pub mod palette;
pub mod rows;
pub mod views;

pub use cells::Cell;
pub use charts::{ChartDisplay, ChartPipeline, ChartProcessor, Legend, RenderedChart};
pub use config::Config;
pub use error::{DashboardError, Result};
pub use identity::Identity;
pub use pagination::{PageToken, Pagination, PaginationConfig};
pub use rows::{RenderedTable, RowPipeline, RowProcessor};
pub use views::ViewRegistry;
