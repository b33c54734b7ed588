use crate::charts::schema::{quote, validate_column, validate_table};
use crate::charts::{ChartDisplay, ChartProcessor, ColoredItem, Legend};
use crate::db::decode_rows;
use crate::error::{DashboardError, Result};
use crate::identity::Identity;
use crate::palette::{self, DARK_TO_LIGHT};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};

pub const PIE_VIEW: &str = "charts/pie";

/// Legend label of the group whose group-by value is NULL
pub const NULL_LABEL: &str = "None";

fn group_label(value: Option<String>) -> String {
    value.unwrap_or_else(|| NULL_LABEL.to_string())
}

/// Doughnut chart in the shape Chart.js expects
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PieDisplay {
    #[serde(rename = "type")]
    pub chart_type: String,
    pub data: PieData,
    pub options: PieOptions,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PieData {
    pub datasets: Vec<PieDataset>,
    pub labels: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieDataset {
    pub data: Vec<i64>,
    pub background_color: Vec<String>,
    pub label: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieOptions {
    pub responsive: bool,
    pub cutout_percentage: u32,
    pub legend: LegendOptions,
    pub title: TitleOptions,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LegendOptions {
    pub display: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TitleOptions {
    pub display: bool,
    pub text: String,
}

impl ChartDisplay for PieDisplay {
    fn view(&self) -> &'static str {
        PIE_VIEW
    }

    fn init(&mut self) {
        self.chart_type = "doughnut".to_string();
        self.data = PieData {
            datasets: vec![PieDataset::default()],
            labels: Vec::new(),
        };
        // the legend is drawn by the view, not by Chart.js
        self.options = PieOptions {
            responsive: true,
            cutout_percentage: 80,
            legend: LegendOptions { display: false },
            title: TitleOptions::default(),
        };
    }

    fn legend(&self) -> Result<Legend> {
        let dataset = self.data.datasets.first().ok_or(DashboardError::EmptyDisplay)?;
        if self.data.labels.is_empty() {
            return Err(DashboardError::EmptyDisplay);
        }

        let labels = self
            .data
            .labels
            .iter()
            .zip(&dataset.background_color)
            .map(|(label, color)| ColoredItem {
                label: label.clone(),
                hex_color: color.clone(),
            })
            .collect();
        Ok(Legend {
            title: self.options.title.text.clone(),
            labels,
        })
    }
}

/// Optional time filter of a pie query
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeRange {
    pub column: String,
    pub after: DateTime<Utc>,
    pub before: DateTime<Utc>,
}

/// Counts of `column` grouped by `group_by` in `table`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PieQuery {
    pub table: String,
    pub column: String,
    pub group_by: String,
    pub time: Option<TimeRange>,
}

impl PieQuery {
    pub fn new(table: &str, column: &str, group_by: &str) -> Self {
        PieQuery {
            table: table.to_string(),
            column: column.to_string(),
            group_by: group_by.to_string(),
            time: None,
        }
    }

    pub fn between(mut self, column: &str, after: DateTime<Utc>, before: DateTime<Utc>) -> Self {
        self.time = Some(TimeRange {
            column: column.to_string(),
            after,
            before,
        });
        self
    }

    /// Builds the aggregate SQL after checking every identifier
    ///
    /// Only the time bounds are left as bind parameters (`$1`, `$2`).
    pub fn to_sql(&self) -> Result<String> {
        validate_column(&self.table, &self.column)?;
        validate_column(&self.table, &self.group_by)?;

        let group_by = format!("t.{}", quote(&self.group_by));
        let mut sql = format!(
            "SELECT COUNT(t.{}), {}::text FROM {} t",
            quote(&self.column),
            group_by,
            quote(&self.table)
        );
        if let Some(time) = &self.time {
            validate_column(&self.table, &time.column)?;
            sql.push_str(&format!(
                " WHERE t.{} BETWEEN $1 AND $2",
                quote(&time.column)
            ));
        }
        sql.push_str(&format!(" GROUP BY {} ORDER BY {}", group_by, group_by));
        Ok(sql)
    }
}

/// One slice: how many rows fall into a group
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PieRawData {
    pub count: i64,
    pub label: String,
}

/// Doughnut charts colored from a named palette
#[derive(Clone, Debug)]
pub struct PieProcessor {
    palette: &'static str,
    title: String,
}

impl Default for PieProcessor {
    fn default() -> Self {
        PieProcessor {
            palette: DARK_TO_LIGHT,
            title: "Invoices".to_string(),
        }
    }
}

impl PieProcessor {
    /// Fails with `UnknownPalette` if `palette_name` is not registered
    pub fn new(palette_name: &str, title: &str) -> Result<Self> {
        let palette = palette::palette(palette_name)?;
        Ok(PieProcessor {
            palette: palette.name,
            title: title.to_string(),
        })
    }
}

#[async_trait]
impl ChartProcessor for PieProcessor {
    type Query = PieQuery;
    type Raw = PieRawData;
    type Display = PieDisplay;
    type Source = PgPool;

    async fn fetch_data(
        &self,
        pool: &PgPool,
        _identity: &Identity,
        query: &PieQuery,
    ) -> Result<Vec<PieRawData>> {
        let sql = query.to_sql()?;
        let mut statement = sqlx::query(&sql);
        if let Some(time) = &query.time {
            statement = statement.bind(time.after).bind(time.before);
        }
        let rows = statement.fetch_all(pool).await?;

        Ok(decode_rows(rows, |row| {
            Ok(PieRawData {
                count: row.try_get(0)?,
                label: group_label(row.try_get(1)?),
            })
        }))
    }

    fn populate_display(&self, raw: Vec<PieRawData>) -> Result<PieDisplay> {
        let palette = palette::palette(self.palette)?;
        let mut display = PieDisplay::initialized();
        display.options.title.text = self.title.clone();
        display.data.datasets[0].label = self.title.clone();

        for (i, point) in raw.into_iter().enumerate() {
            let dataset = &mut display.data.datasets[0];
            dataset.data.push(point.count);
            dataset.background_color.push(palette.color(i).to_string());
            display.data.labels.push(point.label);
        }
        Ok(display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn init_sets_doughnut_defaults() {
        let display = PieDisplay::initialized();
        assert_eq!(display.chart_type, "doughnut");
        assert_eq!(display.data.datasets.len(), 1);
        assert!(display.options.responsive);
        assert_eq!(display.options.cutout_percentage, 80);
        assert!(!display.options.legend.display);
    }

    #[test]
    fn populated_display_serializes_for_chart_js() {
        let display = PieProcessor::default()
            .populate_display(vec![
                PieRawData {
                    count: 3,
                    label: "Approved".to_string(),
                },
                PieRawData {
                    count: 1,
                    label: "Denied".to_string(),
                },
            ])
            .unwrap();
        let json = serde_json::to_value(&display).unwrap();
        assert_eq!(json["type"], "doughnut");
        assert_eq!(json["data"]["labels"], serde_json::json!(["Approved", "Denied"]));
        assert_eq!(json["data"]["datasets"][0]["data"], serde_json::json!([3, 1]));
        assert_eq!(
            json["data"]["datasets"][0]["backgroundColor"],
            serde_json::json!(["#029356", "#009EB0"])
        );
        assert_eq!(json["options"]["cutoutPercentage"], 80);
        assert_eq!(json["options"]["title"]["text"], "Invoices");
    }

    #[test]
    fn empty_display_has_no_legend() {
        let display = PieProcessor::default().populate_display(Vec::new()).unwrap();
        assert!(matches!(display.legend(), Err(DashboardError::EmptyDisplay)));
        assert!(matches!(
            PieDisplay::default().legend(),
            Err(DashboardError::EmptyDisplay)
        ));
    }

    #[test]
    fn null_group_gets_its_own_label() {
        assert_eq!(group_label(None), NULL_LABEL);
        assert_eq!(group_label(Some("Pending".to_string())), "Pending");

        let display = PieProcessor::default()
            .populate_display(vec![PieRawData {
                count: 4,
                label: group_label(None),
            }])
            .unwrap();
        assert_eq!(display.data.labels, [NULL_LABEL]);
        assert_eq!(display.data.datasets[0].data, [4]);
    }

    #[test]
    fn unknown_palette_is_rejected() {
        assert!(matches!(
            PieProcessor::new("Neon", "x"),
            Err(DashboardError::UnknownPalette(_))
        ));
    }

    #[test]
    fn aggregate_sql() {
        let sql = PieQuery::new("SampleInvoices", "id", "status").to_sql().unwrap();
        assert_eq!(
            sql,
            r#"SELECT COUNT(t."id"), t."status"::text FROM "SampleInvoices" t GROUP BY t."status" ORDER BY t."status""#
        );

        let after = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let sql = PieQuery::new("SampleInvoices", "id", "status")
            .between("date", after, before)
            .to_sql()
            .unwrap();
        assert!(sql.contains(r#"WHERE t."date" BETWEEN $1 AND $2 GROUP BY"#));
    }

    #[test]
    fn aggregate_sql_rejects_unknown_identifiers() {
        let err = PieQuery::new("SampleInvoices", "id", "status; --")
            .to_sql()
            .unwrap_err();
        assert!(matches!(err, DashboardError::UnknownIdentifier(_)));

        let after = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let err = PieQuery::new("SampleInvoices", "id", "status")
            .between("created_at", after, after)
            .to_sql()
            .unwrap_err();
        assert!(matches!(err, DashboardError::UnknownIdentifier(_)));
    }
}
