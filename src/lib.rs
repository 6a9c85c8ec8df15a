pub mod config;
pub mod database;
pub mod error;
pub mod inspect;
pub mod migrations;
pub mod schema;

pub use error::{Error, Result};
pub use migrations::Migrator;
