use super::{bindings_of, compatible, shared_offsets, union_schema, BuildContext, RowSource};
use sparq_functions::{evaluate, Expression};
use sparq_model::{Row, RowSchema};
use std::sync::Arc;

/// `OPTIONAL` (§3 `LeftJoin`, §4.3): every right-side row that is join-compatible with
/// a left row *and* satisfies `expr` is emitted merged; if none qualify, the left row
/// alone is emitted, padded with `NULL`s for the right-only variables (`Row::reshape`
/// already does the padding — a variable absent from the left row's own schema simply
/// has nothing to look up).
pub struct LeftJoinRowSource {
    schema: Arc<RowSchema>,
    rows: Vec<Row>,
    idx: usize,
}

impl LeftJoinRowSource {
    pub fn new(
        mut left: Box<dyn RowSource>,
        mut right: Box<dyn RowSource>,
        expr: Expression,
        ctx: &BuildContext<'_>,
    ) -> Self {
        let schema = union_schema(left.schema(), right.schema());
        let shared = shared_offsets(left.schema(), right.schema());
        let left_rows = left.read_all_rows();
        let right_rows = right.read_all_rows();
        let mut rows = Vec::new();
        for l in &left_rows {
            let mut matched_any = false;
            for r in &right_rows {
                if !compatible(l, r, &shared) {
                    continue;
                }
                let merged = l.merge(r, Arc::clone(&schema));
                let bindings = bindings_of(&merged);
                let keep = evaluate(&expr, &bindings, ctx.eval_ctx)
                    .ok()
                    .and_then(|v| bool::try_from(&v).ok())
                    .unwrap_or(false);
                if keep {
                    matched_any = true;
                    rows.push(merged);
                }
            }
            if !matched_any {
                rows.push(l.reshape(Arc::clone(&schema)));
            }
        }
        Self { schema, rows, idx: 0 }
    }
}

impl RowSource for LeftJoinRowSource {
    fn schema(&self) -> &Arc<RowSchema> {
        &self.schema
    }

    fn read_row(&mut self) -> Option<Row> {
        let row = self.rows.get(self.idx).cloned();
        if row.is_some() {
            self.idx += 1;
        }
        row
    }

    fn reset(&mut self) {
        self.idx = 0;
    }
}
