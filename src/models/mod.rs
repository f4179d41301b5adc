//! Library records and their field validation

mod book;
mod category;
mod customer;
mod inventory;
mod user;
mod validation;

pub use book::Book;
pub use category::Category;
pub use customer::Customer;
pub use inventory::Inventory;
pub use user::User;
pub use validation::Errors;

/// Which kind of write a record is being validated for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Create,
    Update,
}
