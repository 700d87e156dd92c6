use super::{bindings_of, BuildContext, RowSource};
use sparq_functions::{evaluate, EvaluationContext, Expression};
use sparq_model::{Row, RowSchema};
use std::sync::Arc;

/// `HAVING` (§3): like `Filter`, but sits above `Aggregation`/`Group` so its
/// expressions see synthetic aggregate variables. A row passes only if every
/// condition evaluates to true; any that errors or evaluates to false drops the row.
pub struct HavingRowSource<'a> {
    inner: Box<dyn RowSource>,
    exprs: Vec<Expression>,
    ctx: &'a EvaluationContext<'a>,
}

impl<'a> HavingRowSource<'a> {
    pub fn new(inner: Box<dyn RowSource>, exprs: Vec<Expression>, ctx: &BuildContext<'a>) -> Self {
        Self { inner, exprs, ctx: ctx.eval_ctx }
    }
}

impl<'a> RowSource for HavingRowSource<'a> {
    fn schema(&self) -> &Arc<RowSchema> {
        self.inner.schema()
    }

    fn read_row(&mut self) -> Option<Row> {
        loop {
            let row = self.inner.read_row()?;
            let bindings = bindings_of(&row);
            let passes = self.exprs.iter().all(|expr| {
                evaluate(expr, &bindings, self.ctx)
                    .ok()
                    .and_then(|v| bool::try_from(&v).ok())
                    .unwrap_or(false)
            });
            if passes {
                return Some(row);
            }
        }
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}
