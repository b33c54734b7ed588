use thiserror::Error;

/// Errors raised while counting, fetching or rendering dashboard fragments.
///
/// Pagination never produces an error. Row decode failures are logged and the
/// row skipped; every other variant aborts the fragment being rendered.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Query execution or scan failure, or a missing result where one was expected
    #[error("data source error: {0}")]
    DataSource(#[from] sqlx::Error),

    /// A single row could not be decoded
    #[error("failed to decode row: {0}")]
    RowDecode(#[source] sqlx::Error),

    #[error("view not found: {0}")]
    ViewNotFound(String),

    #[error("failed to render view {view}: {source}")]
    Render {
        view: String,
        #[source]
        source: handlebars::RenderError,
    },

    #[error("chart display has no datapoints, cannot build a legend")]
    EmptyDisplay,

    #[error("unknown color palette: {0}")]
    UnknownPalette(String),

    #[error("identifier is not allowed in queries: {0}")]
    UnknownIdentifier(String),

    #[error("invalid query parameters: {0}")]
    InvalidQuery(String),

    #[error("invalid identity token: {0}")]
    InvalidIdentity(String),

    #[error("failed to load view templates: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
