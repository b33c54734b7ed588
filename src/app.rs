#![cfg(not(tarpaulin_include))]

use axum::{
    Extension, Router,
    extract::{Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::cells::Cell;
use crate::charts::{ChartPipeline, PieProcessor, PieQuery, pie::PIE_VIEW};
use crate::config::Config;
use crate::error::{DashboardError, Result};
use crate::identity::Identity;
use crate::pagination::PaginationConfig;
use crate::palette::DARK_TO_LIGHT;
use crate::rows::{AccountRowProcessor, FileRowProcessor, RowPipeline, RowProcessor, TABLE_VIEW};
use crate::views::ViewRegistry;

/// Header carrying the caller identity
pub const IDENTITY_HEADER: &str = "x-user-id";
/// Cookie consulted when the header is absent
pub const IDENTITY_COOKIE: &str = "user_id";

const PAGINATION_VIEW: &str = "pagination";

/// Shared, read-only state of the server
pub struct AppState {
    pub pool: PgPool,
    pub views: ViewRegistry,
    pub config: Config,
}

#[derive(Debug, Default, Deserialize)]
struct PageParams {
    page: Option<u64>,
    per_page: Option<u64>,
}

impl PageParams {
    fn config(&self, config: &Config) -> PaginationConfig {
        PaginationConfig::new(
            self.page.unwrap_or(1),
            self.per_page.unwrap_or(config.items_per_page),
        )
    }
}

#[derive(Debug, Deserialize)]
struct PieParams {
    table: String,
    column: String,
    group_by: String,
    time_column: Option<String>,
    after: Option<DateTime<Utc>>,
    before: Option<DateTime<Utc>>,
    palette: Option<String>,
    title: Option<String>,
}

impl PieParams {
    fn query(&self) -> Result<PieQuery> {
        let query = PieQuery::new(&self.table, &self.column, &self.group_by);
        match (&self.time_column, self.after, self.before) {
            (None, None, None) => Ok(query),
            (Some(column), Some(after), Some(before)) => Ok(query.between(column, after, before)),
            _ => Err(DashboardError::InvalidQuery(
                "time_column, after and before must be given together".to_string(),
            )),
        }
    }

    fn processor(&self) -> Result<PieProcessor> {
        PieProcessor::new(
            self.palette.as_deref().unwrap_or(DARK_TO_LIGHT),
            self.title.as_deref().unwrap_or("Invoices"),
        )
    }
}

impl DashboardError {
    /// HTTP status a failed fragment is answered with
    pub fn status_code(&self) -> StatusCode {
        match self {
            DashboardError::InvalidIdentity(_) => StatusCode::UNAUTHORIZED,
            DashboardError::UnknownIdentifier(_)
            | DashboardError::UnknownPalette(_)
            | DashboardError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // internal failures are logged, not shown to the browser
        let body = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, body).into_response()
    }
}

/// Views the server cannot start without
pub fn required_views() -> Vec<&'static str> {
    let mut views = vec![TABLE_VIEW, PAGINATION_VIEW, PIE_VIEW];
    views.extend_from_slice(&Cell::VIEWS);
    views
}

/// Starts the dashboard server
///
/// # Arguments
/// * `config` - Runtime configuration, usually from [`Config::from_env`]
///
/// # Returns
/// * `Result<(), Box<dyn std::error::Error>>` - Returns when the server stops,
///   or the first start-up failure (missing views, unreachable database)
pub async fn run(config: Config) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let views = ViewRegistry::load(&config.views_dir)?;
    views.require(&required_views())?;

    let pool = config.connect().await?;
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState {
        pool,
        views,
        config,
    });

    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Listening on http://{}", bind_addr);
    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Fragment routes under `/app`, static assets under `/assets`
pub fn router(state: Arc<AppState>) -> Router {
    let fragments = Router::new()
        .route("/tables/invoices", get(invoices_table))
        .route("/tables/files", get(files_table))
        .route("/charts/pie", get(pie_chart))
        .route_layer(middleware::from_fn(require_identity));

    Router::new()
        .nest("/app", fragments)
        .nest_service("/assets", ServeDir::new(&state.config.static_dir))
        .with_state(state)
}

/// Resolves the caller identity from the `X-User-Id` header or the `user_id` cookie
///
/// On success the [`Identity`] is stored in the request extensions; otherwise
/// the request is answered with 401 and never reaches a handler.
pub async fn require_identity(jar: CookieJar, mut request: Request, next: Next) -> Response {
    let token = request
        .headers()
        .get(IDENTITY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| jar.get(IDENTITY_COOKIE).map(|c| c.value().to_string()));

    let Some(token) = token else {
        return (StatusCode::UNAUTHORIZED, "Missing identity").into_response();
    };

    match Identity::parse(&token) {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => {
            warn!("Rejected request to {}: {}", request.uri().path(), e);
            e.into_response()
        }
    }
}

async fn render_table<P>(
    processor: &P,
    state: &AppState,
    identity: &Identity,
    params: &PageParams,
) -> Result<Html<String>>
where
    P: RowProcessor<Source = PgPool>,
{
    let table = RowPipeline::new(processor, &state.pool, &state.views)
        .with_inner_window(state.config.inner_window)
        .render_table(identity, params.config(&state.config))
        .await?;
    Ok(Html(table.html))
}

async fn invoices_table(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<PageParams>,
) -> Result<Html<String>> {
    render_table(&AccountRowProcessor, &state, &identity, &params).await
}

async fn files_table(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<PageParams>,
) -> Result<Html<String>> {
    render_table(&FileRowProcessor, &state, &identity, &params).await
}

async fn pie_chart(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<PieParams>,
) -> Result<Html<String>> {
    let query = params.query()?;
    let processor = params.processor()?;
    let chart = ChartPipeline::new(&processor, &state.pool, &state.views)
        .render_chart(&identity, &query)
        .await?;
    Ok(Html(chart.html))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    const CALLER: &str = "0b8f3c1e-4a5d-4e2f-9c3b-7d6a5e4f3c2b";

    // the pool never connects: every request below is answered before a query runs
    fn app() -> Router {
        let config = Config::default();
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.connection_string)
            .unwrap();
        let views = ViewRegistry::load(concat!(env!("CARGO_MANIFEST_DIR"), "/views")).unwrap();
        router(Arc::new(AppState {
            pool,
            views,
            config,
        }))
    }

    async fn status_of(request: HttpRequest<Body>) -> StatusCode {
        app().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn missing_identity_is_unauthorized() {
        let request = HttpRequest::get("/app/tables/invoices")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_of(request).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn malformed_identity_is_unauthorized() {
        let request = HttpRequest::get("/app/tables/files")
            .header(IDENTITY_HEADER, "not-a-uuid")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_of(request).await, StatusCode::UNAUTHORIZED);

        let request = HttpRequest::get("/app/tables/files")
            .header("cookie", "user_id=123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_of(request).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_chart_identifier_is_bad_request() {
        let request = HttpRequest::get("/app/charts/pie?table=users&column=id&group_by=name")
            .header(IDENTITY_HEADER, CALLER)
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_of(request).await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn identity_cookie_is_accepted() {
        let uri = "/app/charts/pie?table=SampleInvoices&column=id&group_by=status&palette=Neon";
        let request = HttpRequest::get(uri)
            .header("cookie", format!("{}={}", IDENTITY_COOKIE, CALLER))
            .body(Body::empty())
            .unwrap();
        // passes the identity check, then fails on the palette
        assert_eq!(status_of(request).await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn partial_time_filter_is_bad_request() {
        let request = HttpRequest::get(
            "/app/charts/pie?table=SampleInvoices&column=id&group_by=status&time_column=date",
        )
        .header(IDENTITY_HEADER, CALLER)
        .body(Body::empty())
        .unwrap();
        assert_eq!(status_of(request).await, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn error_status_mapping() {
        assert_eq!(
            DashboardError::InvalidIdentity("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            DashboardError::UnknownIdentifier("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DashboardError::EmptyDisplay.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            DashboardError::ViewNotFound("table".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
