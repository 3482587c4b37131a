//! PostgreSQL record source
//!
//! Reads the ambulatory production of a competency from the facility
//! database.

pub mod client;
pub mod source;

pub use client::PostgresClient;
pub use source::{production_query, PostgresSource};
