//! Chart rendering.
//!
//! A [`ChartProcessor`] ties together three independent types: the query that
//! selects data, the raw datapoints the data source returns, and the display
//! model that gets serialized for the browser-side chart library.
//! [`ChartPipeline`] runs fetch, population, legend derivation, serialization
//! and view rendering for any such triple.

pub mod pie;
pub mod schema;

use crate::error::Result;
use crate::identity::Identity;
use crate::views::ViewRegistry;
use async_trait::async_trait;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub use pie::{PieDisplay, PieProcessor, PieQuery, PieRawData, TimeRange};

/// Legend entry: a label and the color it is drawn with
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColoredItem {
    pub label: String,
    pub hex_color: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Legend {
    pub title: String,
    pub labels: Vec<ColoredItem>,
}

/// Display model of one chart type
pub trait ChartDisplay: Serialize + Default + Send {
    /// View the chart renders through
    fn view(&self) -> &'static str;

    /// Establishes default styling; called before the display is filled
    fn init(&mut self);

    /// Legend of a populated display; `EmptyDisplay` if nothing was populated
    fn legend(&self) -> Result<Legend>;

    /// A fresh, initialized display
    fn initialized() -> Self {
        let mut display = Self::default();
        display.init();
        display
    }
}

/// Capabilities of one chart type
///
/// Implementations hold only immutable configuration and may be shared
/// between concurrent requests.
#[async_trait]
pub trait ChartProcessor: Send + Sync {
    type Query: Debug + Send + Sync;
    type Raw: Send;
    type Display: ChartDisplay;
    type Source: ?Sized + Sync;

    async fn fetch_data(
        &self,
        source: &Self::Source,
        identity: &Identity,
        query: &Self::Query,
    ) -> Result<Vec<Self::Raw>>;

    /// Builds an initialized display from the fetched datapoints
    fn populate_display(&self, raw: Vec<Self::Raw>) -> Result<Self::Display>;
}

/// Rendered chart plus its serialized payload and legend
#[derive(Clone, Debug)]
pub struct RenderedChart {
    pub payload: String,
    pub legend: Legend,
    pub html: String,
}

#[derive(Serialize)]
struct ChartView<'a> {
    json: &'a str,
    legend: &'a Legend,
}

/// Makes a JSON payload safe to inline in a `<script>` element
fn script_safe(payload: &str) -> String {
    payload.replace("</", "<\\/")
}

/// Drives one [`ChartProcessor`] for one request
pub struct ChartPipeline<'a, P: ChartProcessor> {
    processor: &'a P,
    source: &'a P::Source,
    views: &'a ViewRegistry,
}

impl<'a, P: ChartProcessor> ChartPipeline<'a, P> {
    pub fn new(processor: &'a P, source: &'a P::Source, views: &'a ViewRegistry) -> Self {
        ChartPipeline {
            processor,
            source,
            views,
        }
    }

    /// Fetches, populates and renders a chart
    ///
    /// # Arguments
    /// * `identity` - Caller identity handed to the processor
    /// * `query` - Chart-specific query parameters
    ///
    /// # Returns
    /// * `Result<RenderedChart>` - Chart fragment, or the first error; an empty
    ///   chart fails with `EmptyDisplay` before anything is rendered
    pub async fn render_chart(&self, identity: &Identity, query: &P::Query) -> Result<RenderedChart> {
        let raw = self
            .processor
            .fetch_data(self.source, identity, query)
            .await
            .inspect_err(|e| error!("Failed to fetch chart data for {:?}: {}", query, e))?;
        debug!("Fetched {} datapoints for {:?}", raw.len(), query);

        let display = self
            .processor
            .populate_display(raw)
            .inspect_err(|e| error!("Failed to populate display for {:?}: {}", query, e))?;
        let legend = display.legend()?;
        let payload = serde_json::to_string(&display)?;

        let view = ChartView {
            json: &script_safe(&payload),
            legend: &legend,
        };
        let html = self.views.render(display.view(), &view)?;

        Ok(RenderedChart {
            payload,
            legend,
            html,
        })
    }
}
