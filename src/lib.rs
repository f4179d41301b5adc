//! Library - manage books, categories, inventories, customers and users
//!
//! This is the library interface for the `library` binary: the web server,
//! its storage layer and the CLI commands.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod resources;
pub mod ui;
pub mod uploads;

pub use config::Config;
pub use error::Error;
