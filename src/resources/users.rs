use async_trait::async_trait;

use super::{Action, Resource, SaveContext};
use crate::api::form::FormData;
use crate::auth::password;
use crate::db::Tx;
use crate::error::Result;
use crate::models::{Errors, Op, User};
use crate::uploads::sanitize_filename;

const PROFILE_FIELD: &str = "profile";

#[async_trait]
impl Resource for User {
    const PLURAL: &'static str = "users";
    const SINGULAR: &'static str = "user";
    const LABEL: &'static str = "User";

    fn bind(&mut self, form: &FormData) -> Result<()> {
        form.bind_text("email", &mut self.email);
        form.bind_text("name", &mut self.name);
        form.bind_text("mobile", &mut self.mobile);
        form.bind_text("address", &mut self.address);
        form.bind_text("password", &mut self.password);
        form.bind_text("password_confirmation", &mut self.password_confirmation);
        Ok(())
    }

    /// Normalizes the email, stores a new profile photo and derives the hash.
    ///
    /// On update the hash is only re-derived when a password was submitted,
    /// unless `auth.always_rehash_password` asks for the old behaviour of
    /// hashing whatever arrived, including an empty string.
    async fn prepare(&mut self, ctx: &SaveContext<'_>) -> Result<()> {
        self.email = User::normalize_email(&self.email);

        if let Some(upload) = ctx.form.file(PROFILE_FIELD).filter(|u| u.is_present()) {
            if let Some(filename) = sanitize_filename(&upload.filename) {
                let path = ctx.uploads.save(None, &filename, &upload.bytes).await?;
                // Removed before validation, so a rejected save leaves the
                // stored row pointing at a file that is gone.
                if let Some(previous) = self.profile_path.as_deref().filter(|p| *p != path) {
                    ctx.uploads.remove(previous).await?;
                }
                self.profile_path = Some(path);
            }
        }

        let rehash = match ctx.op {
            Op::Create => true,
            Op::Update => ctx.auth.always_rehash_password || !self.password.is_empty(),
        };
        if rehash {
            self.password_hash = password::hash(self.password.clone(), ctx.auth.bcrypt_cost).await?;
        }
        Ok(())
    }

    async fn validate(&self, tx: &mut Tx, op: Op) -> Result<Errors> {
        let mut errors = self.check(op);
        if !self.email.is_empty() {
            if let Some(existing) = tx.find_by::<User>("email", &self.email).await? {
                if existing.id != self.id {
                    errors.merge(self.taken_email_error());
                }
            }
        }
        Ok(errors)
    }

    fn saved_location(&self) -> String {
        Self::index_path()
    }

    fn flash_message(action: Action) -> String {
        match action {
            Action::Created => "User successfully added.",
            Action::Updated => "User successfully Updated.",
            Action::Destroyed => "User successfully deleted.",
        }
        .to_string()
    }
}
