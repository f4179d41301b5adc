use async_trait::async_trait;

use super::Resource;
use crate::api::form::FormData;
use crate::db::Tx;
use crate::error::Result;
use crate::models::{Category, Errors, Op};

#[async_trait]
impl Resource for Category {
    const PLURAL: &'static str = "categories";
    const SINGULAR: &'static str = "category";
    const LABEL: &'static str = "Category";

    fn bind(&mut self, form: &FormData) -> Result<()> {
        form.bind_text("category_name", &mut self.category_name);
        form.bind_int("status", &mut self.status)
    }

    async fn validate(&self, _tx: &mut Tx, _op: Op) -> Result<Errors> {
        Ok(self.check())
    }
}
