use serde::{Deserialize, Serialize};

use crate::plan::QueryPlan;
use crate::sql::printer::{self, ParamStyle};

/// Render a plan for explain output.
///
/// Parameters show up as `$1`, `$2`, ... and never as their values.
pub fn render_text(plan: &QueryPlan) -> String {
    printer::render(plan.select(), ParamStyle::Positional).sql
}

/// Explain output for a single root field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainPlan {
    pub field_name: String,
    pub query: Option<String>,
    pub lines: Option<Vec<String>>,
}

impl ExplainPlan {
    pub fn new(field_name: impl Into<String>, query: String) -> Self {
        let lines = query.lines().map(|line| line.to_string()).collect();
        ExplainPlan {
            field_name: field_name.into(),
            query: Some(query),
            lines: Some(lines),
        }
    }

    pub fn for_plan(field_name: impl Into<String>, plan: &QueryPlan) -> Self {
        Self::new(field_name, render_text(plan))
    }
}
