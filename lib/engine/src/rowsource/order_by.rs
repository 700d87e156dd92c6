use super::{bindings_of, compare_optional, BuildContext, RowSource};
use crate::algebra::OrderCondition;
use sparq_functions::evaluate;
use sparq_model::{Row, RowSchema};
use std::sync::Arc;

fn rows_equal(a: &Row, b: &Row) -> bool {
    a.cells().len() == b.cells().len()
        && a.cells().iter().zip(b.cells()).all(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => x.same_term(y),
            (None, None) => true,
            _ => false,
        })
}

fn dedupe(rows: Vec<Row>) -> Vec<Row> {
    let mut out: Vec<Row> = Vec::with_capacity(rows.len());
    for row in rows {
        if !out.iter().any(|r| rows_equal(r, &row)) {
            out.push(row);
        }
    }
    out
}

/// `ORDER BY` (§3/§4.3): buffers every row, evaluates each ordering condition once per
/// row (a failed evaluation is an unbound/`None` key — errored keys sort first, §4.3),
/// then performs one stable, lexicographic sort across all conditions together so that
/// ties on an earlier key fall back to later keys instead of re-sorting from scratch.
pub struct OrderByRowSource {
    schema: Arc<RowSchema>,
    rows: Vec<Row>,
    idx: usize,
}

impl OrderByRowSource {
    pub fn new(
        mut inner: Box<dyn RowSource>,
        conditions: &[OrderCondition],
        distinct: bool,
        ctx: &BuildContext<'_>,
    ) -> Self {
        let schema = Arc::clone(inner.schema());
        let mut rows = inner.read_all_rows();
        if distinct {
            rows = dedupe(rows);
        }

        let mut keyed: Vec<(Vec<Option<sparq_model::Literal>>, Row)> = rows
            .drain(..)
            .map(|row| {
                let bindings = bindings_of(&row);
                let key = conditions
                    .iter()
                    .map(|c| evaluate(&c.expr, &bindings, ctx.eval_ctx).ok())
                    .collect();
                (key, row)
            })
            .collect();

        keyed.sort_by(|(a, _), (b, _)| {
            for (i, cond) in conditions.iter().enumerate() {
                let ord = compare_optional(a[i].as_ref(), b[i].as_ref());
                let ord = if cond.descending { ord.reverse() } else { ord };
                if ord != std::cmp::Ordering::Equal {
                    return ord;
                }
            }
            std::cmp::Ordering::Equal
        });

        let rows = keyed.into_iter().map(|(key, row)| row.with_order_key(key)).collect();
        Self { schema, rows, idx: 0 }
    }
}

impl RowSource for OrderByRowSource {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exists::ExistsRegistry;
    use crate::rowsource::BufferedRowSource;
    use crate::triples_source::MemoryTriplesSource;
    use sparq_functions::{EvaluationContext, Expression};
    use sparq_model::Literal;

    #[test]
    fn sorts_ascending_with_unbound_first() {
        let schema = Arc::new(RowSchema::new(vec![0_u32]));
        let rows = vec![
            Row::new(Arc::clone(&schema), vec![Some(Literal::Integer(3.into()))]),
            Row::new(Arc::clone(&schema), vec![None]),
            Row::new(Arc::clone(&schema), vec![Some(Literal::Integer(1.into()))]),
        ];
        let source = MemoryTriplesSource::new();
        let exists = ExistsRegistry::default();
        let now = sparq_model::DateTime::now().unwrap();
        let eval_ctx = EvaluationContext::new(None, now, 0);
        let ctx = BuildContext {
            source: &source,
            exists: &exists,
            eval_ctx: &eval_ctx,
        };
        let conditions = vec![OrderCondition {
            expr: Expression::Literal(Literal::Variable(0, "x".into())),
            descending: false,
        }];
        let mut sorted =
            OrderByRowSource::new(Box::new(BufferedRowSource::new(schema, rows)), &conditions, false, &ctx);
        let all = sorted.read_all_rows();
        assert_eq!(all[0].get(0), None);
        assert_eq!(all[1].get(0), Some(&Literal::Integer(1.into())));
        assert_eq!(all[2].get(0), Some(&Literal::Integer(3.into())));
    }
}
