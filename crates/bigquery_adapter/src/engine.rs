//! Interfaces of the query compiler and the execution engine.
//!
//! Neither is implemented here. The compiler turns a resolved query IR into a
//! [`QueryPlan`], the engine runs a plan against BigQuery and returns rows.
use async_trait::async_trait;
use serde::Serialize;

use crate::config::BigQuerySourceConfig;
use crate::plan::QueryPlan;
use crate::user::UserInfo;
use crate::value::RowSet;

/// Reasons a query IR can't be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompileError {
    #[error("Unsupported operator: {operator}")]
    UnsupportedOperator { operator: String },

    #[error("Malformed argument '{argument}': {message}")]
    MalformedArgument { argument: String, message: String },

    #[error("Unknown table: {table}")]
    UnknownTable { table: String },

    #[error("{message}")]
    Other { message: String },
}

/// Failures reported by the execution engine.
///
/// Serialized as-is into the `internal` detail of error reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineError {
    #[error("Request failed with status {status}: {body}")]
    RequestNonOk { status: u16, body: String },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Query job {job_id} failed: {message}")]
    JobFailed {
        job_id: String,
        reason: Option<String>,
        message: String,
    },

    #[error("Execution was cancelled")]
    Cancelled,

    #[error("{message}")]
    Other { message: String },
}

/// Compiles a resolved, backend-agnostic query IR into a plan.
pub trait QueryCompiler: Send + Sync {
    type Ir: ?Sized;

    fn compile(
        &self,
        config: &BigQuerySourceConfig,
        user: &UserInfo,
        ir: &Self::Ir,
    ) -> Result<QueryPlan, CompileError>;
}

/// Executes plans against BigQuery.
///
/// Retries and cancellation are the engine's concern. One call is one
/// execution attempt from the point of view of the caller.
#[async_trait]
pub trait ExecutionEngine: Send + Sync + 'static {
    async fn execute(
        &self,
        config: &BigQuerySourceConfig,
        plan: &QueryPlan,
    ) -> Result<RowSet, EngineError>;
}
