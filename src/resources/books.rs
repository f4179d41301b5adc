use async_trait::async_trait;
use minijinja::Value;

use super::{Resource, SaveContext};
use crate::api::form::FormData;
use crate::db::Tx;
use crate::error::Result;
use crate::models::{Book, Category, Errors, Op};
use crate::uploads::book_cover_filename;

const COVER_FIELD: &str = "picture";
const COVER_DIR: &str = "books";

#[async_trait]
impl Resource for Book {
    const PLURAL: &'static str = "books";
    const SINGULAR: &'static str = "book";
    const LABEL: &'static str = "Book";

    fn bind(&mut self, form: &FormData) -> Result<()> {
        form.bind_text("category_id", &mut self.category_id);
        form.bind_text("title", &mut self.title);
        form.bind_text("book_no", &mut self.book_no);
        form.bind_text("author", &mut self.author);
        form.bind_text("price", &mut self.price);
        form.bind_int("status", &mut self.status)
    }

    async fn prepare(&mut self, ctx: &SaveContext<'_>) -> Result<()> {
        if let Some(upload) = ctx.form.file(COVER_FIELD).filter(|u| u.is_present()) {
            let filename = book_cover_filename(upload);
            let path = ctx.uploads.save(Some(COVER_DIR), &filename, &upload.bytes).await?;
            self.picture_path = Some(path);
        }
        Ok(())
    }

    async fn validate(&self, _tx: &mut Tx, _op: Op) -> Result<Errors> {
        Ok(self.check())
    }

    async fn load_associations(&mut self, tx: &mut Tx) -> Result<()> {
        self.category = match self.category_uuid() {
            Some(id) => tx.find::<Category>(id).await?,
            None => None,
        };
        Ok(())
    }

    async fn form_options(tx: &mut Tx) -> Result<Value> {
        let categories: Vec<Category> = tx.all().await?;
        Ok(Value::from_serialize(&categories))
    }
}
