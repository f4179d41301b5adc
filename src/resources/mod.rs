//! CRUD resources exposed under `/auth/{plural}`
//!
//! Every resource shares one set of handlers; what differs per model is how
//! a form binds onto it, what happens before it is saved (uploads, password
//! hashing), how it validates and which associations it loads.

mod books;
mod categories;
mod customers;
mod handlers;
mod inventories;
mod users;

use async_trait::async_trait;
use minijinja::Value;
use serde::Serialize;

use crate::api::form::FormData;
use crate::config::AuthConfig;
use crate::db::{Record, Tx};
use crate::error::Result;
use crate::models::{Errors, Op};
use crate::uploads::UploadStore;

pub use handlers::resource_routes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Created,
    Updated,
    Destroyed,
}

impl Action {
    pub fn past_tense(self) -> &'static str {
        match self {
            Action::Created => "created",
            Action::Updated => "updated",
            Action::Destroyed => "destroyed",
        }
    }
}

/// What a save needs beyond the record itself
pub struct SaveContext<'a> {
    pub op: Op,
    pub form: &'a FormData,
    pub uploads: &'a UploadStore,
    pub auth: &'a AuthConfig,
}

/// Names rendered into the shared templates
#[derive(Debug, Serialize)]
pub struct ResourceInfo {
    pub plural: &'static str,
    pub singular: &'static str,
    pub label: &'static str,
    pub index_path: String,
}

#[async_trait]
pub trait Resource: Record + Serialize + Default {
    /// Route segment and XML list element, e.g. `books`
    const PLURAL: &'static str;
    /// XML element for one record, e.g. `book`
    const SINGULAR: &'static str;
    /// Human name used in flashes and errors, e.g. `Book`
    const LABEL: &'static str;

    /// Copy submitted fields onto the record. Fields absent from the form
    /// keep their current values.
    fn bind(&mut self, form: &FormData) -> Result<()>;

    /// Work done before validation, such as storing uploads
    async fn prepare(&mut self, _ctx: &SaveContext<'_>) -> Result<()> {
        Ok(())
    }

    async fn validate(&self, tx: &mut Tx, op: Op) -> Result<Errors>;

    async fn load_associations(&mut self, _tx: &mut Tx) -> Result<()> {
        Ok(())
    }

    /// Select-list choices for the form
    async fn form_options(_tx: &mut Tx) -> Result<Value> {
        Ok(Value::UNDEFINED)
    }

    fn index_path() -> String {
        format!("/auth/{}", Self::PLURAL)
    }

    fn show_path(&self) -> String {
        format!("/auth/{}/{}", Self::PLURAL, self.id())
    }

    /// Where a browser goes after a successful create or update
    fn saved_location(&self) -> String {
        self.show_path()
    }

    fn flash_message(action: Action) -> String {
        format!("{} was successfully {}.", Self::LABEL, action.past_tense())
    }

    fn info() -> ResourceInfo {
        ResourceInfo {
            plural: Self::PLURAL,
            singular: Self::SINGULAR,
            label: Self::LABEL,
            index_path: Self::index_path(),
        }
    }
}

/// Prepare, validate and write a record inside `tx`.
///
/// Returns the validation errors; the record is only written when there are
/// none.
pub async fn save<R: Resource>(tx: &mut Tx, record: &mut R, ctx: &SaveContext<'_>) -> Result<Errors> {
    record.prepare(ctx).await?;
    let errors = record.validate(tx, ctx.op).await?;
    if errors.has_any() {
        return Ok(errors);
    }
    match ctx.op {
        Op::Create => tx.create(record).await?,
        Op::Update => tx.update(record).await?,
    }
    Ok(errors)
}
