use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::{types::ToSql, Row};
use uuid::Uuid;

use super::{Category, Errors};
use crate::db::Record;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Book {
    pub id: Uuid,
    pub category_id: String,
    pub title: String,
    pub book_no: String,
    pub author: String,
    pub picture_path: Option<String>,
    pub price: String,
    pub status: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Eagerly loaded for show and list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl Book {
    pub fn check(&self) -> Errors {
        let mut errors = Errors::new();
        errors.require_present("title", "Title", &self.title);
        errors.require_present("category_id", "CategoryID", &self.category_id);
        errors.require_present("book_no", "BookNo", &self.book_no);
        errors.require_present("author", "Author", &self.author);
        errors.require_present("price", "Price", &self.price);
        errors
    }

    pub fn category_uuid(&self) -> Option<Uuid> {
        Uuid::parse_str(self.category_id.trim()).ok()
    }
}

impl Record for Book {
    const TABLE: &'static str = "books";
    const COLUMNS: &'static [&'static str] = &[
        "category_id",
        "title",
        "book_no",
        "author",
        "picture_path",
        "price",
        "status",
    ];

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
        vec![
            &self.category_id,
            &self.title,
            &self.book_no,
            &self.author,
            &self.picture_path,
            &self.price,
            &self.status,
        ]
    }

    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            category_id: row.try_get("category_id")?,
            title: row.try_get("title")?,
            book_no: row.try_get("book_no")?,
            author: row.try_get("author")?,
            picture_path: row.try_get("picture_path")?,
            price: row.try_get("price")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            category: None,
        })
    }

    fn text_column(&self, column: &str) -> Option<&str> {
        match column {
            "title" => Some(&self.title),
            "book_no" => Some(&self.book_no),
            "category_id" => Some(&self.category_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_are_named() {
        let book = Book {
            title: "Dune".to_string(),
            ..Default::default()
        };
        let errors = book.check();
        let fields: Vec<&str> = errors.fields().keys().map(String::as_str).collect();
        assert_eq!(fields, ["author", "book_no", "category_id", "price"]);
        assert_eq!(
            errors.get("category_id").unwrap(),
            ["CategoryID can not be blank."]
        );
    }

    #[test]
    fn test_category_is_not_serialized_when_not_loaded() {
        let json = serde_json::to_value(Book::default()).unwrap();
        assert!(json.get("category").is_none());
        assert!(json.get("picture_path").is_some());
    }
}
