//! Storage: connection handling, transactions and row mapping

mod memory;
mod pagination;
pub mod postgres;
mod record;
pub mod schema;

pub use memory::{MemoryDatabase, MemoryTx};
pub use pagination::{PageParams, Pagination};
pub use postgres::{PgPool, PgTx};
pub use record::Record;

use uuid::Uuid;

use crate::config::{DatabaseBackend, DatabaseConfig};
use crate::error::Result;

/// The credential and resource store
#[derive(Clone)]
pub enum Database {
    Postgres(PgPool),
    Memory(MemoryDatabase),
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        match config.backend {
            DatabaseBackend::Postgres => Ok(Database::Postgres(postgres::connect(config).await?)),
            DatabaseBackend::Memory => Ok(Database::Memory(MemoryDatabase::new())),
        }
    }

    pub async fn begin(&self) -> Result<Tx> {
        match self {
            Database::Postgres(pool) => Ok(Tx::Postgres(PgTx::begin(pool).await?)),
            Database::Memory(db) => Ok(Tx::Memory(db.begin().await)),
        }
    }

    /// Create any missing tables
    pub async fn migrate(&self) -> Result<()> {
        let mut tx = self.begin().await?;
        if let Tx::Postgres(pg) = &mut tx {
            pg.execute_batch(schema::MIGRATION).await?;
        }
        tx.commit().await
    }
}

/// One open transaction, shared by the gates and the handler of a request
pub enum Tx {
    Postgres(PgTx),
    Memory(MemoryTx),
}

impl Tx {
    pub async fn find<R: Record>(&mut self, id: Uuid) -> Result<Option<R>> {
        match self {
            Tx::Postgres(tx) => tx.find(id).await,
            Tx::Memory(tx) => Ok(tx.find(id)),
        }
    }

    /// First row whose text column equals `value`
    pub async fn find_by<R: Record>(&mut self, column: &str, value: &str) -> Result<Option<R>> {
        match self {
            Tx::Postgres(tx) => tx.find_by(column, value).await,
            Tx::Memory(tx) => Ok(tx.find_by(column, value)),
        }
    }

    pub async fn count<R: Record>(&mut self) -> Result<u64> {
        match self {
            Tx::Postgres(tx) => tx.count::<R>().await,
            Tx::Memory(tx) => Ok(tx.count::<R>()),
        }
    }

    pub async fn page<R: Record>(&mut self, pagination: &Pagination) -> Result<Vec<R>> {
        match self {
            Tx::Postgres(tx) => tx.page(pagination).await,
            Tx::Memory(tx) => Ok(tx.page(pagination)),
        }
    }

    pub async fn all<R: Record>(&mut self) -> Result<Vec<R>> {
        match self {
            Tx::Postgres(tx) => tx.all().await,
            Tx::Memory(tx) => Ok(tx.all()),
        }
    }

    /// Insert a new row, assigning its id and timestamps
    pub async fn create<R: Record>(&mut self, record: &mut R) -> Result<()> {
        match self {
            Tx::Postgres(tx) => tx.create(record).await,
            Tx::Memory(tx) => {
                tx.create(record);
                Ok(())
            }
        }
    }

    pub async fn update<R: Record>(&mut self, record: &mut R) -> Result<()> {
        match self {
            Tx::Postgres(tx) => tx.update(record).await,
            Tx::Memory(tx) => {
                tx.update(record);
                Ok(())
            }
        }
    }

    /// Delete by id, reporting whether a row was removed
    pub async fn destroy<R: Record>(&mut self, id: Uuid) -> Result<bool> {
        match self {
            Tx::Postgres(tx) => tx.destroy::<R>(id).await,
            Tx::Memory(tx) => Ok(tx.destroy::<R>(id)),
        }
    }

    pub async fn commit(self) -> Result<()> {
        match self {
            Tx::Postgres(tx) => tx.commit().await,
            Tx::Memory(tx) => {
                tx.commit();
                Ok(())
            }
        }
    }

    pub async fn rollback(self) -> Result<()> {
        match self {
            Tx::Postgres(tx) => tx.rollback().await,
            Tx::Memory(_) => Ok(()),
        }
    }
}
