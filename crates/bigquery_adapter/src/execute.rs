//! Building query steps for BigQuery sources.
//!
//! Compilation happens when the step is built, so planning errors surface
//! right away. Execution is deferred to the step's action.
use std::sync::Arc;

use tracing::{debug, warn};

use crate::capability::{self, UnsupportedOperation};
use crate::config::BigQuerySourceConfig;
use crate::encode::encode_rowset;
use crate::engine::{EngineError, ExecutionEngine, QueryCompiler};
use crate::errors::{BigQueryError, Result};
use crate::explain::ExplainPlan;
use crate::plan::QueryPlan;
use crate::step::{DeferredAction, EncJson, QueryStep};
use crate::user::{SourceName, UserInfo};

pub struct BigQueryExecutor<C, E> {
    compiler: C,
    engine: Arc<E>,
}

impl<C, E> BigQueryExecutor<C, E>
where
    C: QueryCompiler,
    E: ExecutionEngine,
{
    pub fn new(compiler: C, engine: Arc<E>) -> Self {
        BigQueryExecutor { compiler, engine }
    }

    /// Compile `ir` and return a step that runs it when invoked.
    #[tracing::instrument(level = "debug", skip_all, fields(source = %source_name))]
    pub fn query_step(
        &self,
        user: &UserInfo,
        source_name: &SourceName,
        config: Arc<BigQuerySourceConfig>,
        ir: &C::Ir,
    ) -> Result<QueryStep> {
        let plan = self.compile(user, source_name, &config, ir)?;
        debug!(cardinality = %plan.cardinality(), "built query step");

        let action = {
            let engine = self.engine.clone();
            let config = config.clone();
            let source_name = source_name.clone();
            DeferredAction::new(move || execute_plan(engine, config, source_name, plan))
        };

        Ok(QueryStep {
            source_name: source_name.clone(),
            source_config: config,
            explain: None,
            action,
        })
    }

    /// Compile `ir` and return a step that produces its explain output. The
    /// warehouse is never contacted.
    #[tracing::instrument(level = "debug", skip_all, fields(source = %source_name, field = field_name))]
    pub fn explain_step(
        &self,
        field_name: &str,
        user: &UserInfo,
        source_name: &SourceName,
        config: Arc<BigQuerySourceConfig>,
        ir: &C::Ir,
    ) -> Result<QueryStep> {
        let plan = self.compile(user, source_name, &config, ir)?;
        let explain = ExplainPlan::for_plan(field_name, &plan);
        debug!("built explain step");

        Ok(QueryStep {
            source_name: source_name.clone(),
            source_config: config,
            explain: explain.query.clone(),
            action: DeferredAction::constant(EncJson::encode(&explain)?),
        })
    }

    pub fn mutation_step(
        &self,
        user: &UserInfo,
        source_name: &SourceName,
        config: Arc<BigQuerySourceConfig>,
        ir: &C::Ir,
    ) -> Result<QueryStep> {
        capability::reject(
            UnsupportedOperation::Mutation,
            (user, source_name, config, ir),
        )
    }

    pub fn subscription_step(
        &self,
        user: &UserInfo,
        source_name: &SourceName,
        config: Arc<BigQuerySourceConfig>,
        ir: &C::Ir,
    ) -> Result<QueryStep> {
        capability::reject(
            UnsupportedOperation::Subscription,
            (user, source_name, config, ir),
        )
    }

    pub fn subscription_explain_step(
        &self,
        field_name: &str,
        user: &UserInfo,
        source_name: &SourceName,
        config: Arc<BigQuerySourceConfig>,
        ir: &C::Ir,
    ) -> Result<QueryStep> {
        capability::reject(
            UnsupportedOperation::SubscriptionExplain,
            (field_name, user, source_name, config, ir),
        )
    }

    /// Join rows coming from another source against this one.
    pub fn remote_relationship_step(
        &self,
        user: &UserInfo,
        source_name: &SourceName,
        config: Arc<BigQuerySourceConfig>,
        ir: &C::Ir,
        lhs_rows: &[serde_json::Value],
    ) -> Result<QueryStep> {
        capability::reject(
            UnsupportedOperation::RemoteRelationship,
            (user, source_name, config, ir, lhs_rows),
        )
    }

    fn compile(
        &self,
        user: &UserInfo,
        source_name: &SourceName,
        config: &BigQuerySourceConfig,
        ir: &C::Ir,
    ) -> Result<QueryPlan> {
        self.compiler
            .compile(config, user, ir)
            .map_err(|error| BigQueryError::Planning {
                source_name: source_name.clone(),
                error,
            })
    }
}

async fn execute_plan<E: ExecutionEngine>(
    engine: Arc<E>,
    config: Arc<BigQuerySourceConfig>,
    source_name: SourceName,
    plan: QueryPlan,
) -> Result<EncJson> {
    debug!(source = %source_name, "executing query plan");

    match engine.execute(&config, &plan).await {
        Ok(rowset) => {
            debug!(source = %source_name, rows = rowset.len(), "query plan executed");
            EncJson::encode(&encode_rowset(plan.cardinality(), &rowset))
        }
        Err(EngineError::Cancelled) => Err(BigQueryError::Cancelled { source_name }),
        Err(error) => {
            warn!(%error, source = %source_name, "query execution failed");
            Err(BigQueryError::Execution { source_name, error })
        }
    }
}
