use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sql::ast::Select;
use crate::sql::printer::{self, ParamStyle, RenderedQuery};

/// Declared number of logical rows a query produces.
///
/// Fixed when the plan is compiled. The row count seen at execution never
/// changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// At most one row is expected. The engine may still return more, or
    /// none.
    One,
    Many,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::One => write!(f, "one"),
            Cardinality::Many => write!(f, "many"),
        }
    }
}

/// A compiled read query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPlan {
    select: Select,
    cardinality: Cardinality,
}

impl QueryPlan {
    pub fn new(select: Select, cardinality: Cardinality) -> Self {
        QueryPlan {
            select,
            cardinality,
        }
    }

    pub fn select(&self) -> &Select {
        &self.select
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// Query text with `@paramN` placeholders and the values to bind, for
    /// execution.
    pub fn to_query(&self) -> RenderedQuery {
        printer::render(&self.select, ParamStyle::Named)
    }
}
