use crate::cells::{Cell, HiddenCell, ModalCell, TrashCell};
use crate::db::{decode_rows, expect_count, to_bind};
use crate::error::Result;
use crate::identity::Identity;
use crate::pagination::PaginationConfig;
use crate::rows::RowProcessor;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

const COUNT_QUERY: &str = r#"
    SELECT COUNT(*)
    FROM files f
    WHERE f.owner_id::text = $1
"#;

const PAGE_QUERY: &str = r#"
    SELECT f.id::text AS id, f.filename, f.file_ext, f.upload_time::timestamptz AS upload_time,
           f.raw_text, f.bucket_dir, f.location, f.file_url
    FROM files f
    WHERE f.owner_id::text = $1
    ORDER BY f.upload_time DESC
    LIMIT $2
    OFFSET $3
"#;

/// An uploaded file and the text extracted from it
#[derive(Clone, Debug, PartialEq)]
pub struct FileRow {
    pub id: String,
    pub filename: String,
    pub upload_time: DateTime<Utc>,
    pub file_ext: String,
    pub raw_text: String,
    pub bucket_dir: String,
    pub location: String,
    pub file_url: String,
}

impl FileRow {
    fn from_pg_row(row: &PgRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(FileRow {
            id: row.try_get("id")?,
            filename: row.try_get("filename")?,
            upload_time: row.try_get("upload_time")?,
            file_ext: row.try_get("file_ext")?,
            raw_text: row.try_get("raw_text")?,
            bucket_dir: row.try_get("bucket_dir")?,
            location: row.try_get("location")?,
            file_url: row.try_get("file_url")?,
        })
    }
}

/// Files owned by the caller, newest upload first
#[derive(Clone, Copy, Debug, Default)]
pub struct FileRowProcessor;

#[async_trait]
impl RowProcessor for FileRowProcessor {
    type Row = FileRow;
    type Source = PgPool;

    fn table_name(&self) -> &'static str {
        "Files"
    }

    fn headers(&self) -> &'static [&'static str] {
        &["File", "Uploaded", "Type", "Contents", "", ""]
    }

    async fn count(&self, pool: &PgPool, identity: &Identity) -> Result<u64> {
        let count: Option<i64> = sqlx::query_scalar(COUNT_QUERY)
            .bind(identity.to_string())
            .fetch_optional(pool)
            .await?;
        expect_count(count)
    }

    async fn fetch_page(
        &self,
        pool: &PgPool,
        identity: &Identity,
        config: PaginationConfig,
    ) -> Result<Vec<FileRow>> {
        let rows = sqlx::query(PAGE_QUERY)
            .bind(identity.to_string())
            .bind(to_bind(config.limit()))
            .bind(to_bind(config.offset()))
            .fetch_all(pool)
            .await?;
        Ok(decode_rows(rows, FileRow::from_pg_row))
    }

    fn build_cells(&self, row: &FileRow) -> Vec<Cell> {
        vec![
            Cell::basic(&row.filename),
            Cell::basic(row.upload_time.format("%Y-%m-%d %H:%M")),
            Cell::basic(&row.file_ext),
            Cell::Modal(ModalCell {
                link_text: "View".to_string(),
                body: row.raw_text.clone(),
            }),
            Cell::Trash(TrashCell {
                filename: row.filename.clone(),
                file_id: row.id.clone(),
            }),
            Cell::Hidden(HiddenCell {
                value: row.file_url.clone(),
            }),
        ]
    }
}
