use crate::cells::{Cell, ProfileCell, StatusCell};
use crate::db::{decode_rows, expect_count, to_bind};
use crate::error::Result;
use crate::identity::Identity;
use crate::pagination::PaginationConfig;
use crate::rows::RowProcessor;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

const COUNT_QUERY: &str = r#"
    SELECT COUNT(*)
    FROM "SampleAccounts" a
    JOIN "SampleInvoices" i ON a.id = i.account_id
"#;

const PAGE_QUERY: &str = r#"
    SELECT a.avatar, a.name, a.title, i.amount::float8 AS amount, i.status, i.date::date AS date
    FROM "SampleAccounts" a
    JOIN "SampleInvoices" i ON a.id = i.account_id
    WHERE a.id IS NOT NULL
    ORDER BY i.date DESC
    LIMIT $1
    OFFSET $2
"#;

/// One invoice together with the account it was billed to
#[derive(Clone, Debug, PartialEq)]
pub struct AccountRow {
    pub profile_avatar: String,
    pub profile_name: String,
    pub profile_title: String,
    pub amount: f64,
    pub status: String,
    pub date: NaiveDate,
}

impl AccountRow {
    fn from_pg_row(row: &PgRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(AccountRow {
            profile_avatar: row.try_get("avatar")?,
            profile_name: row.try_get("name")?,
            profile_title: row.try_get("title")?,
            amount: row.try_get("amount")?,
            status: row.try_get("status")?,
            date: row.try_get("date")?,
        })
    }
}

/// Invoices table, most recent invoice first
#[derive(Clone, Copy, Debug, Default)]
pub struct AccountRowProcessor;

#[async_trait]
impl RowProcessor for AccountRowProcessor {
    type Row = AccountRow;
    type Source = PgPool;

    fn table_name(&self) -> &'static str {
        "Invoices"
    }

    fn headers(&self) -> &'static [&'static str] {
        &["Client", "Amount", "Status", "Date"]
    }

    async fn count(&self, pool: &PgPool, _identity: &Identity) -> Result<u64> {
        let count: Option<i64> = sqlx::query_scalar(COUNT_QUERY).fetch_optional(pool).await?;
        expect_count(count)
    }

    async fn fetch_page(
        &self,
        pool: &PgPool,
        _identity: &Identity,
        config: PaginationConfig,
    ) -> Result<Vec<AccountRow>> {
        let rows = sqlx::query(PAGE_QUERY)
            .bind(to_bind(config.limit()))
            .bind(to_bind(config.offset()))
            .fetch_all(pool)
            .await?;
        Ok(decode_rows(rows, AccountRow::from_pg_row))
    }

    fn build_cells(&self, row: &AccountRow) -> Vec<Cell> {
        let profile = Cell::Profile(ProfileCell {
            avatar: row.profile_avatar.clone(),
            name: row.profile_name.clone(),
            title: row.profile_title.clone(),
        });
        let amount = Cell::basic(format!("{:.2}", row.amount));
        let status = Cell::Status(StatusCell::new(&row.status));
        let date = Cell::basic(row.date.format("%Y-%m-%d"));
        vec![profile, amount, status, date]
    }
}
