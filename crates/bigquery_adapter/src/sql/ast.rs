//! Compiled query AST for BigQuery standard SQL.
//!
//! Only read queries are represented. Literal values never appear inline in
//! rendered text, they're always emitted as parameters.
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Select {
    /// Must not be empty.
    pub projections: Vec<Projection>,
    pub from: Source,
    #[serde(default)]
    pub joins: Vec<Join>,
    /// Conjunction of predicates.
    #[serde(default, rename = "where")]
    pub where_clause: Vec<Expression>,
    #[serde(default)]
    pub group_by: Vec<FieldName>,
    #[serde(default)]
    pub order_by: Vec<OrderBy>,
    /// LIMIT
    #[serde(default)]
    pub top: Option<u64>,
    #[serde(default)]
    pub offset: Option<Expression>,
}

impl Select {
    /// Select the given projections from a source with no other clauses.
    pub fn new(projections: Vec<Projection>, from: Source) -> Self {
        Select {
            projections,
            from,
            joins: Vec::new(),
            where_clause: Vec::new(),
            group_by: Vec::new(),
            order_by: Vec::new(),
            top: None,
            offset: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    Expression { expression: Expression, alias: String },
    /// `entity.*`, or plain `*` when no entity is given.
    Star { entity: Option<String> },
}

impl Projection {
    pub fn aliased(expression: Expression, alias: impl Into<String>) -> Self {
        Projection::Expression {
            expression,
            alias: alias.into(),
        }
    }
}

/// A column qualified by the alias of the entity it comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldName {
    pub entity: String,
    pub name: String,
}

impl FieldName {
    pub fn new(entity: impl Into<String>, name: impl Into<String>) -> Self {
        FieldName {
            entity: entity.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableName {
    pub dataset: String,
    pub name: String,
}

impl TableName {
    pub fn new(dataset: impl Into<String>, name: impl Into<String>) -> Self {
        TableName {
            dataset: dataset.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Table { table: TableName, alias: String },
    Select { select: Box<Select>, alias: String },
}

impl Source {
    pub fn alias(&self) -> &str {
        match self {
            Source::Table { alias, .. } | Source::Select { alias, .. } => alias,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    Left,
    Inner,
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinKind::Left => write!(f, "LEFT OUTER JOIN"),
            JoinKind::Inner => write!(f, "INNER JOIN"),
        }
    }
}

/// Join against another source of the same BigQuery project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Join {
    pub kind: JoinKind,
    pub source: Source,
    /// Pairs of (outer, joined) columns compared for equality.
    pub on: Vec<(FieldName, FieldName)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    Value(ScalarValue),
    Column(FieldName),
    Not(Box<Expression>),
    And(Vec<Expression>),
    Or(Vec<Expression>),
    IsNull(Box<Expression>),
    IsNotNull(Box<Expression>),
    Binary {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Function {
        name: String,
        args: Vec<Expression>,
    },
}

impl Expression {
    pub fn column(entity: impl Into<String>, name: impl Into<String>) -> Self {
        Expression::Column(FieldName::new(entity, name))
    }

    pub fn binary(op: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOperator {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Like,
    NotLike,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOperator::Eq => "=",
            BinaryOperator::NotEq => "!=",
            BinaryOperator::Lt => "<",
            BinaryOperator::LtEq => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::GtEq => ">=",
            BinaryOperator::Like => "LIKE",
            BinaryOperator::NotLike => "NOT LIKE",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullsOrder {
    First,
    Last,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: FieldName,
    pub direction: OrderDirection,
    #[serde(default)]
    pub nulls: Option<NullsOrder>,
}

/// Parameter value bound to a query.
///
/// Numeric values are kept as text, same as the values coming back from
/// execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Int64(String),
    Float64(String),
    Numeric(String),
    String(String),
    Bytes(String),
    Date(String),
    Timestamp(String),
    Array(Vec<ScalarValue>),
}

impl ScalarValue {
    /// Name of the BigQuery type used when binding this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarValue::Null => "STRING",
            ScalarValue::Bool(_) => "BOOL",
            ScalarValue::Int64(_) => "INT64",
            ScalarValue::Float64(_) => "FLOAT64",
            ScalarValue::Numeric(_) => "NUMERIC",
            ScalarValue::String(_) => "STRING",
            ScalarValue::Bytes(_) => "BYTES",
            ScalarValue::Date(_) => "DATE",
            ScalarValue::Timestamp(_) => "TIMESTAMP",
            ScalarValue::Array(_) => "ARRAY",
        }
    }
}
