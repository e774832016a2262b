//! Rendering of the compiled AST to query text.
//!
//! Output only depends on the AST, the same select always renders to the same
//! bytes. Parameters are numbered in the order they appear in the text.
use super::ast::{
    Expression, FieldName, Join, NullsOrder, OrderBy, OrderDirection, Projection, ScalarValue,
    Select, Source, TableName,
};

const INDENT: &str = "  ";

/// How parameter holes are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamStyle {
    /// `$1`, `$2`, ... Used for explain output, values are never shown.
    Positional,
    /// `@param1`, `@param2`, ... BigQuery named query parameters.
    Named,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedQuery {
    pub sql: String,
    /// Parameter values, index `i` fills placeholder `i + 1`.
    pub params: Vec<ScalarValue>,
}

impl RenderedQuery {
    /// Name, BigQuery type and value of each parameter for
    /// [`ParamStyle::Named`] rendering.
    pub fn bindings(&self) -> impl Iterator<Item = (String, &'static str, &ScalarValue)> + '_ {
        self.params
            .iter()
            .enumerate()
            .map(|(idx, value)| (format!("param{}", idx + 1), value.type_name(), value))
    }
}

pub fn render(select: &Select, style: ParamStyle) -> RenderedQuery {
    let mut printer = Printer {
        buf: String::new(),
        indent: 0,
        style,
        params: Vec::new(),
    };
    printer.select(select);

    RenderedQuery {
        sql: printer.buf,
        params: printer.params,
    }
}

/// Quote an identifier with backticks.
pub fn quote_ident(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 2);
    out.push('`');
    for c in ident.chars() {
        match c {
            '`' => out.push_str("\\`"),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out.push('`');
    out
}

struct Printer {
    buf: String,
    indent: usize,
    style: ParamStyle,
    params: Vec<ScalarValue>,
}

impl Printer {
    fn push(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    fn newline(&mut self) {
        self.buf.push('\n');
        for _ in 0..self.indent {
            self.buf.push_str(INDENT);
        }
    }

    fn select(&mut self, select: &Select) {
        self.push("SELECT");
        self.indent += 1;
        if select.projections.is_empty() {
            self.newline();
            self.push("NULL");
        }
        for (idx, proj) in select.projections.iter().enumerate() {
            if idx > 0 {
                self.push(",");
            }
            self.newline();
            self.projection(proj);
        }
        self.indent -= 1;

        self.newline();
        self.push("FROM ");
        self.source(&select.from);

        for join in &select.joins {
            self.join(join);
        }

        if !select.where_clause.is_empty() {
            self.newline();
            self.push("WHERE ");
            self.connective(&select.where_clause, " AND ", "TRUE");
        }

        if !select.group_by.is_empty() {
            self.newline();
            self.push("GROUP BY ");
            for (idx, field) in select.group_by.iter().enumerate() {
                if idx > 0 {
                    self.push(", ");
                }
                self.field(field);
            }
        }

        if !select.order_by.is_empty() {
            self.newline();
            self.push("ORDER BY ");
            for (idx, order) in select.order_by.iter().enumerate() {
                if idx > 0 {
                    self.push(", ");
                }
                self.order_by(order);
            }
        }

        if let Some(top) = select.top {
            self.newline();
            self.push(&format!("LIMIT {top}"));
        }

        if let Some(offset) = &select.offset {
            self.newline();
            self.push("OFFSET ");
            self.expression(offset);
        }
    }

    fn projection(&mut self, proj: &Projection) {
        match proj {
            Projection::Expression { expression, alias } => {
                self.expression(expression);
                self.push(" AS ");
                self.push(&quote_ident(alias));
            }
            Projection::Star { entity: Some(entity) } => {
                self.push(&quote_ident(entity));
                self.push(".*");
            }
            Projection::Star { entity: None } => self.push("*"),
        }
    }

    fn source(&mut self, source: &Source) {
        match source {
            Source::Table { table, .. } => self.table(table),
            Source::Select { select, .. } => {
                self.push("(");
                self.indent += 1;
                self.newline();
                self.select(select);
                self.indent -= 1;
                self.newline();
                self.push(")");
            }
        }
        self.push(" AS ");
        self.push(&quote_ident(source.alias()));
    }

    fn join(&mut self, join: &Join) {
        self.newline();
        self.push(&join.kind.to_string());
        self.push(" ");
        self.source(&join.source);
        self.newline();
        self.push("ON (");
        if join.on.is_empty() {
            self.push("TRUE");
        }
        for (idx, (outer, joined)) in join.on.iter().enumerate() {
            if idx > 0 {
                self.push(" AND ");
            }
            self.field(outer);
            self.push(" = ");
            self.field(joined);
        }
        self.push(")");
    }

    fn order_by(&mut self, order: &OrderBy) {
        self.field(&order.field);
        self.push(match order.direction {
            OrderDirection::Asc => " ASC",
            OrderDirection::Desc => " DESC",
        });
        match order.nulls {
            Some(NullsOrder::First) => self.push(" NULLS FIRST"),
            Some(NullsOrder::Last) => self.push(" NULLS LAST"),
            None => (),
        }
    }

    fn table(&mut self, table: &TableName) {
        self.push(&quote_ident(&table.dataset));
        self.push(".");
        self.push(&quote_ident(&table.name));
    }

    fn field(&mut self, field: &FieldName) {
        self.push(&quote_ident(&field.entity));
        self.push(".");
        self.push(&quote_ident(&field.name));
    }

    fn expression(&mut self, expr: &Expression) {
        match expr {
            Expression::Value(value) => self.param(value),
            Expression::Column(field) => self.field(field),
            Expression::Not(inner) => {
                self.push("NOT ");
                self.operand(inner);
            }
            Expression::And(exprs) => self.connective(exprs, " AND ", "TRUE"),
            Expression::Or(exprs) => self.connective(exprs, " OR ", "FALSE"),
            Expression::IsNull(inner) => {
                self.operand(inner);
                self.push(" IS NULL");
            }
            Expression::IsNotNull(inner) => {
                self.operand(inner);
                self.push(" IS NOT NULL");
            }
            Expression::Binary { op, left, right } => {
                self.operand(left);
                self.push(&format!(" {op} "));
                self.operand(right);
            }
            Expression::Function { name, args } => {
                self.push(name);
                self.push("(");
                for (idx, arg) in args.iter().enumerate() {
                    if idx > 0 {
                        self.push(", ");
                    }
                    self.expression(arg);
                }
                self.push(")");
            }
        }
    }

    /// Write an operand of a larger expression, parenthesized if compound.
    fn operand(&mut self, expr: &Expression) {
        let compound = !matches!(
            expr,
            Expression::Value(_) | Expression::Column(_) | Expression::Function { .. }
        );
        if compound {
            self.push("(");
            self.expression(expr);
            self.push(")");
        } else {
            self.expression(expr);
        }
    }

    fn connective(&mut self, exprs: &[Expression], sep: &str, empty: &str) {
        match exprs {
            [] => self.push(empty),
            [single] => self.expression(single),
            exprs => {
                for (idx, expr) in exprs.iter().enumerate() {
                    if idx > 0 {
                        self.push(sep);
                    }
                    self.operand(expr);
                }
            }
        }
    }

    fn param(&mut self, value: &ScalarValue) {
        self.params.push(value.clone());
        let idx = self.params.len();
        let placeholder = match self.style {
            ParamStyle::Positional => format!("${idx}"),
            ParamStyle::Named => format!("@param{idx}"),
        };
        self.push(&placeholder);
    }
}
