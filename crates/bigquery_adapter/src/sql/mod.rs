//! BigQuery SQL representation of a compiled query.
pub mod ast;
pub mod printer;
