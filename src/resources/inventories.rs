use async_trait::async_trait;
use minijinja::Value;

use super::Resource;
use crate::api::form::FormData;
use crate::db::Tx;
use crate::error::Result;
use crate::models::{Book, Errors, Inventory, Op};

#[async_trait]
impl Resource for Inventory {
    const PLURAL: &'static str = "inventories";
    const SINGULAR: &'static str = "inventory";
    const LABEL: &'static str = "Inventory";

    fn bind(&mut self, form: &FormData) -> Result<()> {
        form.bind_text("book_id", &mut self.book_id);
        form.bind_int("qty", &mut self.qty)
    }

    async fn validate(&self, _tx: &mut Tx, _op: Op) -> Result<Errors> {
        Ok(self.check())
    }

    async fn load_associations(&mut self, tx: &mut Tx) -> Result<()> {
        self.book = match self.book_uuid() {
            Some(id) => tx.find::<Book>(id).await?,
            None => None,
        };
        Ok(())
    }

    async fn form_options(tx: &mut Tx) -> Result<Value> {
        let books: Vec<Book> = tx.all().await?;
        Ok(Value::from_serialize(&books))
    }
}
