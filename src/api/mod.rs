//! HTTP server and request plumbing

pub mod form;
pub mod negotiate;
pub mod respond;
pub mod server;
pub mod transaction;
pub mod view;

pub use server::*;
