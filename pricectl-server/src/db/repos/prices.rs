//! Price repository
//!
//! Export reads the whole table; import writes a batch inside a
//! caller-owned transaction and reads the table-wide totals through the
//! same transaction so the pending inserts are counted.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use pricectl_core::PriceRecord;

use super::DbError;

/// Row shape of `SELECT ... FROM prices`
#[derive(Debug, Clone, FromRow)]
struct PriceRow {
    id: i64,
    name: String,
    category: String,
    price: Decimal,
    create_date: NaiveDate,
}

impl From<PriceRow> for PriceRecord {
    fn from(row: PriceRow) -> Self {
        PriceRecord::new(row.name, row.category, row.price, row.create_date).with_id(row.id)
    }
}

/// Price repository
pub struct PriceRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> PriceRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every row in storage order (no ORDER BY).
    pub async fn fetch_all(&self) -> Result<Vec<PriceRecord>, DbError> {
        let rows: Vec<PriceRow> = sqlx::query_as(
            r#"
            SELECT
                id::bigint AS id,
                name,
                category,
                price::numeric AS price,
                create_date::date AS create_date
            FROM prices
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(PriceRecord::from).collect())
    }

    /// Open a transaction on the pool.
    ///
    /// Dropping the returned transaction without committing rolls it back.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, DbError> {
        Ok(self.pool.begin().await?)
    }

    /// Insert rows one at a time, returning how many went in.
    ///
    /// On failure the error carries the count inserted before it; the caller
    /// is expected to drop the transaction.
    pub async fn insert_batch(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        rows: &[PriceRecord],
    ) -> Result<u64, DbError> {
        let mut inserted = 0u64;

        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO prices (name, category, price, create_date)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(&row.name)
            .bind(&row.category)
            .bind(row.price)
            .bind(row.created_at)
            .execute(&mut **tx)
            .await
            .map_err(|source| DbError::Insert { inserted, source })?;

            inserted += 1;
        }

        Ok(inserted)
    }

    /// Distinct category count and price sum over the entire table.
    pub async fn aggregate_summary(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<(i64, Decimal), DbError> {
        let totals: (i64, Decimal) = sqlx::query_as(
            r#"
            SELECT
                COUNT(DISTINCT category) AS total_categories,
                COALESCE(SUM(price), 0)::numeric AS total_price
            FROM prices
            "#,
        )
        .fetch_one(&mut **tx)
        .await?;

        Ok(totals)
    }
}
