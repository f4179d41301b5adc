//! Mapping between model structs and table rows

use chrono::{DateTime, Utc};
use tokio_postgres::{types::ToSql, Row};
use uuid::Uuid;

/// A model persisted in its own table with a UUID primary key and
/// `created_at`/`updated_at` timestamps.
///
/// The identity and timestamp columns are owned by the store: `stamp` is
/// called on insert and update, and they are never part of `COLUMNS`.
pub trait Record: Clone + Send + Sync + 'static {
    const TABLE: &'static str;

    /// Data columns, in the order `params` yields their values
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> Uuid;

    fn created_at(&self) -> DateTime<Utc>;

    fn stamp(&mut self, id: Uuid, created_at: DateTime<Utc>, updated_at: DateTime<Utc>);

    fn params(&self) -> Vec<&(dyn ToSql + Sync)>;

    fn from_row(row: &Row) -> std::result::Result<Self, tokio_postgres::Error>;

    /// Clear fields that exist only on the request side and never reach a
    /// column. Stores that keep whole structs call this before writing.
    fn scrub(&mut self) {}

    /// Text value of a data column, for lookups on stores that cannot run SQL
    fn text_column(&self, _column: &str) -> Option<&str> {
        None
    }
}
