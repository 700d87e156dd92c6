use super::{bindings_of, compare_literals, BuildContext, RowSource};
use crate::algebra::AlgebraNode;
use sparq_functions::{evaluate, AggregateExpression, AggregateFunction, EvaluationContext, Expression};
use sparq_model::{checked_numeric_op, Literal, Numeric, Row, RowSchema};
use std::sync::Arc;

fn keys_equal(a: &[Option<Literal>], b: &[Option<Literal>]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => x.same_term(y),
            (None, None) => true,
            _ => false,
        })
}

fn dedup_values(values: Vec<Literal>) -> Vec<Literal> {
    let mut out: Vec<Literal> = Vec::with_capacity(values.len());
    for v in values {
        if !out.iter().any(|o| o.same_term(&v)) {
            out.push(v);
        }
    }
    out
}

/// Evaluates `agg` over `members` — the rows belonging to one group — per SPARQL
/// 1.1 §18.5.1. Every member that errors when evaluating the aggregate's own argument
/// expression is silently skipped rather than failing the whole aggregate (the general
/// evaluator's rule that a per-row error only thins the input, never aborts, applies to
/// aggregates too). `COUNT(*)` is the one case with no argument expression, so it
/// counts members directly instead of evaluated values.
fn evaluate_aggregate(agg: &AggregateExpression, members: &[Row], ctx: &EvaluationContext<'_>) -> Option<Literal> {
    if agg.function == AggregateFunction::Count && agg.expr.is_none() {
        return Some(Literal::Integer((members.len() as i64).into()));
    }

    let expr = agg.expr.as_ref()?;
    let mut values: Vec<Literal> = members
        .iter()
        .filter_map(|row| {
            let bindings = bindings_of(row);
            evaluate(expr, &bindings, ctx).ok()
        })
        .collect();
    if agg.distinct {
        values = dedup_values(values);
    }

    match agg.function {
        AggregateFunction::Count => Some(Literal::Integer((values.len() as i64).into())),
        AggregateFunction::Sum => {
            let mut total = Literal::Integer(0.into());
            for v in &values {
                if Numeric::from_literal(v).is_err() {
                    continue;
                }
                total = checked_numeric_op(
                    &total,
                    v,
                    |a, b| a.checked_add(b),
                    |a, b| a.checked_add(b),
                    |a, b| a + b,
                )
                .unwrap_or(total);
            }
            Some(total)
        }
        AggregateFunction::Avg => {
            let numeric: Vec<&Literal> = values.iter().filter(|v| Numeric::from_literal(v).is_ok()).collect();
            if numeric.is_empty() {
                return None;
            }
            let mut total = Literal::Integer(0.into());
            for v in &numeric {
                total = checked_numeric_op(
                    &total,
                    v,
                    |a, b| a.checked_add(b),
                    |a, b| a.checked_add(b),
                    |a, b| a + b,
                )
                .unwrap_or(total);
            }
            let count = Literal::Integer((numeric.len() as i64).into());
            checked_numeric_op(&total, &count, |a, b| a.checked_div(b), |a, b| a.checked_div(b), |a, b| a / b).ok()
        }
        AggregateFunction::Min => values.into_iter().min_by(compare_literals),
        AggregateFunction::Max => values.into_iter().max_by(compare_literals),
        AggregateFunction::Sample => values.into_iter().next(),
        AggregateFunction::GroupConcat => {
            let separator = agg.separator.as_deref().unwrap_or(" ");
            let joined = values
                .iter()
                .map(|v| v.lexical_form().to_string())
                .collect::<Vec<_>>()
                .join(separator);
            Some(Literal::plain(joined))
        }
    }
}

struct AggregationRowSource {
    schema: Arc<RowSchema>,
    rows: Vec<Row>,
    idx: usize,
}

impl AggregationRowSource {
    fn new(
        mut child: Box<dyn RowSource>,
        group_vars: &[Literal],
        exprs: &[Expression],
        synth_vars: &[Literal],
        ctx: &BuildContext<'_>,
    ) -> Self {
        let group_offsets: Vec<u32> = group_vars.iter().filter_map(Literal::as_variable_offset).collect();
        let synth_offsets: Vec<u32> = synth_vars.iter().filter_map(Literal::as_variable_offset).collect();
        let mut schema_offsets = group_offsets.clone();
        schema_offsets.extend(synth_offsets.iter().copied());
        let schema = Arc::new(RowSchema::new(schema_offsets));

        let all = child.read_all_rows();
        let mut groups: Vec<(Vec<Option<Literal>>, Vec<Row>)> = Vec::new();
        if group_offsets.is_empty() {
            // No GROUP BY: the whole (possibly empty) input forms one implicit group,
            // per SPARQL 1.1 §18.5 — `COUNT(*)` over zero matching rows still reports 0.
            groups.push((Vec::new(), all));
        } else {
            for row in all {
                let key: Vec<Option<Literal>> = group_offsets.iter().map(|o| row.get(*o).cloned()).collect();
                match groups.iter_mut().find(|(k, _)| keys_equal(k, &key)) {
                    Some((_, members)) => members.push(row),
                    None => groups.push((key, vec![row])),
                }
            }
        }

        let rows = groups
            .into_iter()
            .enumerate()
            .map(|(gid, (key, members))| {
                let mut cells = key;
                for (expr, var) in exprs.iter().zip(synth_vars.iter()) {
                    let _ = var;
                    let value = match expr {
                        Expression::Aggregate(agg) => evaluate_aggregate(agg, &members, ctx.eval_ctx),
                        _ => None,
                    };
                    cells.push(value);
                }
                Row::new(Arc::clone(&schema), cells).with_group_id(gid as i64)
            })
            .collect();

        Self { schema, rows, idx: 0 }
    }
}

impl RowSource for AggregationRowSource {
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

/// `Aggregation` (§3/§4.1): the compiler always wraps aggregates directly around the
/// `Group` node they were extracted from, so building it here means pulling the
/// grouping variables straight out of `inner` instead of building a separate
/// materialized `Group` rowsource first.
pub fn build<'a>(
    inner: &AlgebraNode,
    exprs: &[Expression],
    synth_vars: &[Literal],
    ctx: &BuildContext<'a>,
    origin: Option<&Literal>,
) -> Box<dyn RowSource + 'a> {
    match inner {
        AlgebraNode::Group { inner: group_inner, variables } => {
            let child = super::build(group_inner, ctx, origin);
            Box::new(AggregationRowSource::new(child, variables, exprs, synth_vars, ctx))
        }
        other => {
            let child = super::build(other, ctx, origin);
            Box::new(AggregationRowSource::new(child, &[], exprs, synth_vars, ctx))
        }
    }
}
