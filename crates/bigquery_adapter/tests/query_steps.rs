use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bigquery_adapter::capability::UnsupportedOperation;
use bigquery_adapter::config::{
    BigQueryConnSourceConfig, BigQuerySourceConfig, ConfigValue, ServiceAccount,
    ServiceAccountInput,
};
use bigquery_adapter::engine::{CompileError, EngineError, ExecutionEngine, QueryCompiler};
use bigquery_adapter::errors::{DATA_LOADER_ERROR, ErrorCode};
use bigquery_adapter::plan::{Cardinality, QueryPlan};
use bigquery_adapter::sql::ast::{
    BinaryOperator, Expression, Projection, ScalarValue, Select, Source, TableName,
};
use bigquery_adapter::user::{SourceName, UserInfo};
use bigquery_adapter::value::{Int64, OutputValue, Record, RowSet};
use bigquery_adapter::{BigQueryError, BigQueryExecutor};
use serde_json::json;

struct CountingCompiler {
    calls: Arc<AtomicUsize>,
    result: Result<QueryPlan, CompileError>,
}

impl QueryCompiler for CountingCompiler {
    type Ir = str;

    fn compile(
        &self,
        _config: &BigQuerySourceConfig,
        _user: &UserInfo,
        _ir: &str,
    ) -> Result<QueryPlan, CompileError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

struct CountingEngine {
    calls: AtomicUsize,
    result: Result<RowSet, EngineError>,
}

impl CountingEngine {
    fn new(result: Result<RowSet, EngineError>) -> Arc<Self> {
        Arc::new(CountingEngine {
            calls: AtomicUsize::new(0),
            result,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExecutionEngine for CountingEngine {
    async fn execute(
        &self,
        _config: &BigQuerySourceConfig,
        _plan: &QueryPlan,
    ) -> Result<RowSet, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

struct Harness {
    compiler_calls: Arc<AtomicUsize>,
    engine: Arc<CountingEngine>,
    executor: BigQueryExecutor<CountingCompiler, CountingEngine>,
}

impl Harness {
    fn new(plan: Result<QueryPlan, CompileError>, rows: Result<RowSet, EngineError>) -> Self {
        logutil::init_test();

        let compiler_calls = Arc::new(AtomicUsize::new(0));
        let engine = CountingEngine::new(rows);
        let compiler = CountingCompiler {
            calls: compiler_calls.clone(),
            result: plan,
        };

        Harness {
            compiler_calls,
            engine: engine.clone(),
            executor: BigQueryExecutor::new(compiler, engine),
        }
    }

    fn compiler_calls(&self) -> usize {
        self.compiler_calls.load(Ordering::SeqCst)
    }
}

fn source_config() -> Arc<BigQuerySourceConfig> {
    let conn = BigQueryConnSourceConfig {
        service_account: ServiceAccountInput::Object(ServiceAccount {
            client_email: "sa@proj.iam.gserviceaccount.com".to_string(),
            private_key: "key".to_string(),
            project_id: "proj".to_string(),
        }),
        project_id: ConfigValue::Inline("proj".to_string()),
        datasets: ConfigValue::Inline(vec!["chinook".to_string()]),
        global_select_limit: 1000,
        retry_base_delay: 500_000,
        retry_limit: 5,
    };
    Arc::new(conn.resolve_with(|_| None).unwrap())
}

fn artist_plan(cardinality: Cardinality) -> QueryPlan {
    let mut select = Select::new(
        vec![
            Projection::aliased(Expression::column("t", "id"), "id"),
            Projection::aliased(Expression::column("t", "name"), "name"),
        ],
        Source::Table {
            table: TableName::new("chinook", "artist"),
            alias: "t".to_string(),
        },
    );
    select.where_clause = vec![Expression::binary(
        BinaryOperator::GtEq,
        Expression::column("t", "id"),
        Expression::Value(ScalarValue::Int64("1".to_string())),
    )];
    QueryPlan::new(select, cardinality)
}

fn artist(id: &str, name: &str) -> Record {
    Record::try_from_fields([
        ("id", OutputValue::Integer(Int64::new(id))),
        ("name", OutputValue::Text(name.to_string())),
    ])
    .unwrap()
}

fn source() -> SourceName {
    SourceName::new("bigquery")
}

fn user() -> UserInfo {
    UserInfo::new("admin")
}

#[tokio::test]
async fn query_step_defers_execution() {
    let rows = RowSet::new(vec![artist("1", "AC/DC"), artist("2", "Accept")]);
    let h = Harness::new(Ok(artist_plan(Cardinality::Many)), Ok(rows));

    let step = h
        .executor
        .query_step(&user(), &source(), source_config(), "artists")
        .unwrap();

    assert_eq!(1, h.compiler_calls());
    assert_eq!(0, h.engine.calls());
    assert_eq!(None, step.explain);
    assert_eq!(source(), step.source_name);

    let out = step.run().await.unwrap();
    assert_eq!(1, h.engine.calls());
    assert_eq!(
        json!([
            {"id": "1", "name": "AC/DC"},
            {"id": "2", "name": "Accept"}
        ]),
        out.to_value().unwrap()
    );
}

#[tokio::test]
async fn dropped_step_does_no_work() {
    let h = Harness::new(Ok(artist_plan(Cardinality::Many)), Ok(RowSet::empty()));

    let step = h
        .executor
        .query_step(&user(), &source(), source_config(), "artists")
        .unwrap();
    drop(step);

    assert_eq!(0, h.engine.calls());
}

#[tokio::test]
async fn one_cardinality_returns_first_row_as_object() {
    let rows = RowSet::new(vec![artist("7", "Queen"), artist("8", "Rush")]);
    let h = Harness::new(Ok(artist_plan(Cardinality::One)), Ok(rows));

    let out = h
        .executor
        .query_step(&user(), &source(), source_config(), "artist_by_pk")
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(json!({"id": "7", "name": "Queen"}), out.to_value().unwrap());
}

#[tokio::test]
async fn one_cardinality_without_rows_returns_empty_array() {
    let h = Harness::new(Ok(artist_plan(Cardinality::One)), Ok(RowSet::empty()));

    let out = h
        .executor
        .query_step(&user(), &source(), source_config(), "artist_by_pk")
        .unwrap()
        .run()
        .await
        .unwrap();

    // Not null and not an object.
    assert_eq!(json!([]), out.to_value().unwrap());
}

#[tokio::test]
async fn engine_error_is_reported_with_detail() {
    let h = Harness::new(
        Ok(artist_plan(Cardinality::Many)),
        Err(EngineError::RequestNonOk {
            status: 403,
            body: "Access Denied: Project proj".to_string(),
        }),
    );

    let err = h
        .executor
        .query_step(&user(), &source(), source_config(), "artists")
        .unwrap()
        .run()
        .await
        .unwrap_err();

    match &err {
        BigQueryError::Execution { source_name, error } => {
            assert_eq!(&source(), source_name);
            assert!(matches!(error, EngineError::RequestNonOk { status: 403, .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let report = err.report();
    assert_eq!(ErrorCode::BigqueryError, report.code);
    assert_eq!(DATA_LOADER_ERROR, report.error);
    assert_eq!(
        Some(json!({
            "kind": "request_non_ok",
            "status": 403,
            "body": "Access Denied: Project proj"
        })),
        report.internal
    );
}

#[tokio::test]
async fn engine_cancellation_is_not_masked() {
    let h = Harness::new(
        Ok(artist_plan(Cardinality::Many)),
        Err(EngineError::Cancelled),
    );

    let err = h
        .executor
        .query_step(&user(), &source(), source_config(), "artists")
        .unwrap()
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, BigQueryError::Cancelled { .. }));
    assert_eq!(ErrorCode::Cancelled, err.code());
}

#[tokio::test]
async fn planning_error_surfaces_when_building() {
    let h = Harness::new(
        Err(CompileError::UnsupportedOperator {
            operator: "_st_within".to_string(),
        }),
        Ok(RowSet::empty()),
    );

    let err = h
        .executor
        .query_step(&user(), &source(), source_config(), "artists")
        .unwrap_err();

    assert!(matches!(
        &err,
        BigQueryError::Planning {
            error: CompileError::UnsupportedOperator { .. },
            ..
        }
    ));
    assert_eq!(ErrorCode::ValidationFailed, err.code());
    assert_eq!(0, h.engine.calls());
}

#[tokio::test]
async fn explain_step_never_executes() {
    let h = Harness::new(Ok(artist_plan(Cardinality::Many)), Ok(RowSet::empty()));

    let step = h
        .executor
        .explain_step("artists", &user(), &source(), source_config(), "artists")
        .unwrap();

    let expected_sql = [
        "SELECT",
        "  `t`.`id` AS `id`,",
        "  `t`.`name` AS `name`",
        "FROM `chinook`.`artist` AS `t`",
        "WHERE `t`.`id` >= $1",
    ]
    .join("\n");
    assert_eq!(Some(expected_sql.clone()), step.explain);

    let out = step.run().await.unwrap();
    assert_eq!(0, h.engine.calls());
    assert_eq!(
        json!({
            "fieldName": "artists",
            "query": expected_sql,
            "lines": [
                "SELECT",
                "  `t`.`id` AS `id`,",
                "  `t`.`name` AS `name`",
                "FROM `chinook`.`artist` AS `t`",
                "WHERE `t`.`id` >= $1"
            ]
        }),
        out.to_value().unwrap()
    );
}

#[tokio::test]
async fn explain_is_stable_across_builds() {
    let h = Harness::new(Ok(artist_plan(Cardinality::Many)), Ok(RowSet::empty()));

    let a = h
        .executor
        .explain_step("artists", &user(), &source(), source_config(), "artists")
        .unwrap();
    let b = h
        .executor
        .explain_step("artists", &user(), &source(), source_config(), "artists")
        .unwrap();

    assert_eq!(a.explain, b.explain);
    assert_eq!(
        a.run().await.unwrap().as_bytes(),
        b.run().await.unwrap().as_bytes()
    );
}

#[test]
fn unsupported_operations_always_fail() {
    let h = Harness::new(Ok(artist_plan(Cardinality::Many)), Ok(RowSet::empty()));
    let config = source_config();

    let results = [
        (
            UnsupportedOperation::Mutation,
            h.executor
                .mutation_step(&user(), &source(), config.clone(), "insert_artist"),
        ),
        (
            UnsupportedOperation::Subscription,
            h.executor
                .subscription_step(&user(), &source(), config.clone(), "artists"),
        ),
        (
            UnsupportedOperation::SubscriptionExplain,
            h.executor.subscription_explain_step(
                "artists",
                &user(),
                &source(),
                config.clone(),
                "artists",
            ),
        ),
        (
            UnsupportedOperation::RemoteRelationship,
            h.executor.remote_relationship_step(
                &user(),
                &source(),
                config.clone(),
                "albums",
                &[json!({"artist_id": 1})],
            ),
        ),
    ];

    for (op, result) in results {
        match result {
            Err(BigQueryError::Unsupported(got)) => {
                assert_eq!(op, got);
                let err = BigQueryError::Unsupported(got);
                assert_eq!(op.message(), err.to_string());
                assert_eq!(ErrorCode::NotSupported, err.code());
            }
            other => panic!("expected {op:?} to be rejected, got {other:?}"),
        }
    }

    assert_eq!(0, h.compiler_calls());
    assert_eq!(0, h.engine.calls());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn shared_config_across_concurrent_steps() {
    let rows = RowSet::new(vec![artist("1", "AC/DC")]);
    let h = Harness::new(Ok(artist_plan(Cardinality::One)), Ok(rows));
    let config = source_config();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let step = h
                .executor
                .query_step(&user(), &source(), config.clone(), "artist_by_pk")
                .unwrap();
            tokio::spawn(step.run())
        })
        .collect();

    for handle in handles {
        let out = handle.await.unwrap().unwrap();
        assert_eq!(json!({"id": "1", "name": "AC/DC"}), out.to_value().unwrap());
    }

    assert_eq!(8, h.engine.calls());
    assert_eq!(8, h.compiler_calls());
}
