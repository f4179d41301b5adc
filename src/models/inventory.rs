use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::{types::ToSql, Row};
use uuid::Uuid;

use super::{Book, Errors};
use crate::db::Record;

/// Stock count for one book
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Inventory {
    pub id: Uuid,
    pub book_id: String,
    pub qty: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book: Option<Book>,
}

impl Inventory {
    pub fn check(&self) -> Errors {
        let mut errors = Errors::new();
        errors.require_present("book_id", "BookID", &self.book_id);
        errors
    }

    pub fn book_uuid(&self) -> Option<Uuid> {
        Uuid::parse_str(self.book_id.trim()).ok()
    }
}

impl Record for Inventory {
    const TABLE: &'static str = "inventories";
    const COLUMNS: &'static [&'static str] = &["book_id", "qty"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn stamp(&mut self, id: Uuid, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) {
        self.id = id;
        self.created_at = created_at;
        self.updated_at = updated_at;
    }

    fn params(&self) -> Vec<&(dyn ToSql + Sync)> {
        vec![&self.book_id, &self.qty]
    }

    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            book_id: row.try_get("book_id")?,
            qty: row.try_get("qty")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            book: None,
        })
    }

    fn text_column(&self, column: &str) -> Option<&str> {
        match column {
            "book_id" => Some(&self.book_id),
            _ => None,
        }
    }
}
