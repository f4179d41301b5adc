//! Page templates, embedded at build time

use minijinja::{Environment, Value};
use rust_embed::RustEmbed;

use crate::error::Result;

#[derive(RustEmbed)]
#[folder = "templates/"]
struct TemplateFiles;

pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_loader(|name| {
            Ok(TemplateFiles::get(name).map(|file| String::from_utf8_lossy(&file.data).into_owned()))
        });
        Self { env }
    }

    pub fn render(&self, name: &str, ctx: Value) -> Result<String> {
        let template = self.env.get_template(name)?;
        Ok(template.render(ctx)?)
    }
}

impl Default for Templates {
    fn default() -> Self {
        Self::new()
    }
}
