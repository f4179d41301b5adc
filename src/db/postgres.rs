//! PostgreSQL storage behind a bb8 connection pool

use bb8::{Pool, PooledConnection};
use bb8_postgres::PostgresConnectionManager;
use chrono::Utc;
use tokio_postgres::{types::ToSql, Client, NoTls};
use uuid::Uuid;

use super::{Pagination, Record};
use crate::config::DatabaseConfig;
use crate::error::{Error, Result};

pub type PgPool = Pool<PostgresConnectionManager<NoTls>>;

type PgConnection = PooledConnection<'static, PostgresConnectionManager<NoTls>>;

/// Build the connection pool
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    let manager = PostgresConnectionManager::new_from_stringlike(config.url.as_str(), NoTls)?;
    let pool = Pool::builder()
        .max_size(config.max_connections.max(1))
        .build(manager)
        .await?;
    Ok(pool)
}

/// An open transaction owning one pooled connection until it is committed or
/// rolled back
pub struct PgTx {
    conn: Option<PgConnection>,
}

fn select_sql<R: Record>() -> String {
    format!(
        "SELECT id, created_at, updated_at, {} FROM {}",
        R::COLUMNS.join(", "),
        R::TABLE
    )
}

impl PgTx {
    pub(super) async fn begin(pool: &PgPool) -> Result<Self> {
        let conn = pool.get_owned().await?;
        conn.batch_execute("BEGIN").await?;
        Ok(Self { conn: Some(conn) })
    }

    fn client(&self) -> Result<&Client> {
        self.conn
            .as_ref()
            .map(|conn| &**conn)
            .ok_or(Error::MissingTransaction)
    }

    pub async fn find<R: Record>(&mut self, id: Uuid) -> Result<Option<R>> {
        let sql = format!("{} WHERE id = $1", select_sql::<R>());
        let row = self.client()?.query_opt(sql.as_str(), &[&id]).await?;
        Ok(row.as_ref().map(R::from_row).transpose()?)
    }

    pub async fn find_by<R: Record>(&mut self, column: &str, value: &str) -> Result<Option<R>> {
        if !R::COLUMNS.contains(&column) {
            return Err(Error::Other(format!(
                "unknown column {} on {}",
                column,
                R::TABLE
            )));
        }
        let sql = format!("{} WHERE {} = $1 LIMIT 1", select_sql::<R>(), column);
        let row = self.client()?.query_opt(sql.as_str(), &[&value]).await?;
        Ok(row.as_ref().map(R::from_row).transpose()?)
    }

    pub async fn count<R: Record>(&mut self) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", R::TABLE);
        let row = self.client()?.query_one(sql.as_str(), &[]).await?;
        let count: i64 = row.get(0);
        Ok(u64::try_from(count).unwrap_or_default())
    }

    pub async fn page<R: Record>(&mut self, pagination: &Pagination) -> Result<Vec<R>> {
        let sql = format!(
            "{} ORDER BY created_at, id LIMIT $1 OFFSET $2",
            select_sql::<R>()
        );
        let limit = i64::try_from(pagination.limit()).unwrap_or(i64::MAX);
        let offset = i64::try_from(pagination.offset).unwrap_or(i64::MAX);
        let rows = self
            .client()?
            .query(sql.as_str(), &[&limit, &offset])
            .await?;
        Ok(rows.iter().map(R::from_row).collect::<std::result::Result<_, _>>()?)
    }

    pub async fn all<R: Record>(&mut self) -> Result<Vec<R>> {
        let sql = format!("{} ORDER BY created_at, id", select_sql::<R>());
        let rows = self.client()?.query(sql.as_str(), &[]).await?;
        Ok(rows.iter().map(R::from_row).collect::<std::result::Result<_, _>>()?)
    }

    pub async fn create<R: Record>(&mut self, record: &mut R) -> Result<()> {
        let now = Utc::now();
        record.stamp(Uuid::new_v4(), now, now);

        let placeholders: Vec<String> = (1..=R::COLUMNS.len() + 3)
            .map(|i| format!("${}", i))
            .collect();
        let sql = format!(
            "INSERT INTO {} (id, created_at, updated_at, {}) VALUES ({})",
            R::TABLE,
            R::COLUMNS.join(", "),
            placeholders.join(", ")
        );

        let id = record.id();
        let mut params: Vec<&(dyn ToSql + Sync)> = vec![&id, &now, &now];
        params.extend(record.params());
        self.client()?.execute(sql.as_str(), &params).await?;
        Ok(())
    }

    pub async fn update<R: Record>(&mut self, record: &mut R) -> Result<()> {
        let now = Utc::now();
        record.stamp(record.id(), record.created_at(), now);

        let assignments: Vec<String> = R::COLUMNS
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{} = ${}", column, i + 3))
            .collect();
        let sql = format!(
            "UPDATE {} SET updated_at = $2, {} WHERE id = $1",
            R::TABLE,
            assignments.join(", ")
        );

        let id = record.id();
        let mut params: Vec<&(dyn ToSql + Sync)> = vec![&id, &now];
        params.extend(record.params());
        self.client()?.execute(sql.as_str(), &params).await?;
        Ok(())
    }

    pub async fn destroy<R: Record>(&mut self, id: Uuid) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", R::TABLE);
        let deleted = self.client()?.execute(sql.as_str(), &[&id]).await?;
        Ok(deleted > 0)
    }

    pub async fn execute_batch(&mut self, sql: &str) -> Result<()> {
        self.client()?.batch_execute(sql).await?;
        Ok(())
    }

    pub async fn commit(mut self) -> Result<()> {
        let conn = self.conn.take().ok_or(Error::MissingTransaction)?;
        conn.batch_execute("COMMIT").await?;
        Ok(())
    }

    pub async fn rollback(mut self) -> Result<()> {
        let conn = self.conn.take().ok_or(Error::MissingTransaction)?;
        conn.batch_execute("ROLLBACK").await?;
        Ok(())
    }
}

impl Drop for PgTx {
    fn drop(&mut self) {
        // The request future was dropped mid-transaction; the connection must
        // not go back to the pool with the transaction still open.
        let Some(conn) = self.conn.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = conn.batch_execute("ROLLBACK").await {
                        tracing::warn!("Failed to roll back abandoned transaction: {}", e);
                    }
                });
            }
            Err(_) => tracing::warn!("Abandoned transaction dropped outside a runtime"),
        }
    }
}
