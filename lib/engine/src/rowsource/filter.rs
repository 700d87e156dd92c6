use super::{bindings_of, RowSource};
use sparq_functions::{evaluate, EvaluationContext, Expression};
use sparq_model::{Literal, Row, RowSchema};
use std::sync::Arc;

/// Pulls from `inner` one row at a time, evaluating `expr`'s effective boolean value
/// against each and dropping any row that errors or evaluates to `false` (§4.3: a
/// `FILTER` never ends the stream early, it only thins it).
pub struct FilterRowSource<'a> {
    inner: Box<dyn RowSource>,
    expr: Expression,
    ctx: &'a EvaluationContext<'a>,
}

impl<'a> FilterRowSource<'a> {
    pub fn new(inner: Box<dyn RowSource>, expr: Expression, ctx: &super::BuildContext<'a>) -> Self {
        Self { inner, expr, ctx: ctx.eval_ctx }
    }
}

impl<'a> RowSource for FilterRowSource<'a> {
    fn schema(&self) -> &Arc<RowSchema> {
        self.inner.schema()
    }

    fn read_row(&mut self) -> Option<Row> {
        loop {
            let row = self.inner.read_row()?;
            let bindings = bindings_of(&row);
            if let Ok(value) = evaluate(&self.expr, &bindings, self.ctx) {
                if bool::try_from(&value).unwrap_or(false) {
                    return Some(row);
                }
            }
        }
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}

/// `BIND`/`LET` (§3 `Assign`): extends every inner row's schema by one variable,
/// evaluated fresh per row; a failed evaluation leaves the cell unbound rather than
/// dropping the row (§4.2).
pub struct AssignRowSource<'a> {
    inner: Box<dyn RowSource>,
    variable: Literal,
    expr: Expression,
    ctx: &'a EvaluationContext<'a>,
    schema: Arc<RowSchema>,
}

impl<'a> AssignRowSource<'a> {
    pub fn new(
        inner: Box<dyn RowSource>,
        variable: Literal,
        expr: Expression,
        ctx: &super::BuildContext<'a>,
    ) -> Self {
        let offset = variable.as_variable_offset().expect("Assign target is always a Variable literal");
        let mut offsets = inner.schema().variables().to_vec();
        if !offsets.contains(&offset) {
            offsets.push(offset);
        }
        let schema = Arc::new(RowSchema::new(offsets));
        Self { inner, variable, expr, ctx: ctx.eval_ctx, schema }
    }
}

impl<'a> RowSource for AssignRowSource<'a> {
    fn schema(&self) -> &Arc<RowSchema> {
        &self.schema
    }

    fn read_row(&mut self) -> Option<Row> {
        let row = self.inner.read_row()?;
        let bindings = bindings_of(&row);
        let value = evaluate(&self.expr, &bindings, self.ctx).ok();
        let offset = self.variable.as_variable_offset().expect("checked in new()");
        let mut cells: Vec<Option<Literal>> =
            self.schema.variables().iter().map(|o| row.get(*o).cloned()).collect();
        if let Some(pos) = self.schema.position_of(offset) {
            cells[pos] = value;
        }
        Some(Row::new(Arc::clone(&self.schema), cells))
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}
