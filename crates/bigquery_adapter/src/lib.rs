//! Query execution for BigQuery sources.
//!
//! Takes queries that were already resolved and compiled upstream, defers
//! their execution against BigQuery and turns the returned rows into JSON.
//! Also renders compiled queries for explain output, and rejects the
//! operation classes BigQuery sources can't serve.
pub mod capability;
pub mod config;
pub mod encode;
pub mod engine;
pub mod errors;
pub mod execute;
pub mod explain;
pub mod plan;
pub mod sql;
pub mod step;
pub mod user;
pub mod value;

pub use errors::{BigQueryError, Result};
pub use execute::BigQueryExecutor;
