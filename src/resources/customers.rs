use async_trait::async_trait;

use super::Resource;
use crate::api::form::FormData;
use crate::db::Tx;
use crate::error::Result;
use crate::models::{Customer, Errors, Op};

#[async_trait]
impl Resource for Customer {
    const PLURAL: &'static str = "customers";
    const SINGULAR: &'static str = "customer";
    const LABEL: &'static str = "Customer";

    fn bind(&mut self, form: &FormData) -> Result<()> {
        form.bind_text("name", &mut self.name);
        form.bind_text("email", &mut self.email);
        form.bind_text("mobile", &mut self.mobile);
        form.bind_text("address", &mut self.address);
        Ok(())
    }

    async fn validate(&self, _tx: &mut Tx, _op: Op) -> Result<Errors> {
        Ok(self.check())
    }
}
