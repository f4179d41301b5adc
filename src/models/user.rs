use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio_postgres::{types::ToSql, Row};
use uuid::Uuid;

use super::{Errors, Op};
use crate::db::Record;

/// A librarian account.
///
/// `password` and `password_confirmation` only live for the duration of a
/// request: they are never stored and never serialized. The hash is stored
/// but also kept out of every representation.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub name: String,
    pub mobile: String,
    pub address: String,
    pub profile_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub password: String,
    #[serde(skip)]
    pub password_confirmation: String,
}

impl User {
    /// Emails are compared lower-cased and trimmed
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// Field checks that need no store access. Email uniqueness is checked
    /// against the open transaction by the caller.
    pub fn check(&self, op: Op) -> Errors {
        let mut errors = Errors::new();
        errors.require_present("email", "Email", &self.email);
        errors.require_present("password_hash", "PasswordHash", &self.password_hash);

        if op == Op::Create {
            errors.require_present("password", "Password", &self.password);
            if self.password != self.password_confirmation {
                errors.add("password", "Password does not match confirmation");
            }
        }
        errors
    }

    pub fn taken_email_error(&self) -> Errors {
        let mut errors = Errors::new();
        errors.add("email", format!("{} is already taken", self.email));
        errors
    }

    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("profile_path", &self.profile_path)
            .finish_non_exhaustive()
    }
}

impl Record for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &[
        "email",
        "password_hash",
        "name",
        "mobile",
        "address",
        "profile_path",
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
            &self.email,
            &self.password_hash,
            &self.name,
            &self.mobile,
            &self.address,
            &self.profile_path,
        ]
    }

    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            name: row.try_get("name")?,
            mobile: row.try_get("mobile")?,
            address: row.try_get("address")?,
            profile_path: row.try_get("profile_path")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            password: String::new(),
            password_confirmation: String::new(),
        })
    }

    fn scrub(&mut self) {
        self.password.clear();
        self.password_confirmation.clear();
    }

    fn text_column(&self, column: &str) -> Option<&str> {
        match column {
            "email" => Some(&self.email),
            "name" => Some(&self.name),
            _ => None,
        }
    }
}
