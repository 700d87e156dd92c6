//! The pull-based rowsource pipeline (spec §4.3): one [`RowSource`] implementation per
//! compiled [`AlgebraNode`], built bottom-up by [`build`]. Multi-row operators (`Join`,
//! `LeftJoin`, `Union`, `Diff`, `OrderBy`, `Group`, `Aggregation`) necessarily look at
//! more than one row of their input at a time, so they materialize their input eagerly
//! via [`RowSource::read_all_rows`] rather than streaming it — a deliberate
//! simplification the spec's "no cost-based optimization" non-goal (§1) leaves room
//! for for; see DESIGN.md. Strictly unary, row-at-a-time operators (`Filter`,
//! `Project`, `Slice`) still pull their inner source one row at a time.

mod aggregation;
mod bgp;
mod diff;
mod distinct;
mod empty;
mod filter;
mod graph;
mod group;
mod having;
mod join;
mod left_join;
mod order_by;
mod path;
mod project;
mod service;
mod slice;
mod union;
mod values;

pub use empty::EmptyRowSource;

use crate::algebra::AlgebraNode;
use crate::exists::ExistsRegistry;
use crate::triples_source::TriplesSource;
use sparq_functions::EvaluationContext;
use sparq_model::{Bindings, Literal, Row, RowSchema};
use std::sync::Arc;

/// The pull iterator every compiled operator implements (§4.3). `reset` rewinds to the
/// beginning without recompiling the tree — used by `EXISTS`'s re-evaluation per outer
/// row in earlier designs; kept here since a caller re-running the same prepared query
/// needs it too.
pub trait RowSource {
    fn schema(&self) -> &Arc<RowSchema>;
    fn read_row(&mut self) -> Option<Row>;
    fn reset(&mut self);

    fn read_all_rows(&mut self) -> Vec<Row> {
        let mut out = Vec::new();
        while let Some(row) = self.read_row() {
            out.push(row);
        }
        out
    }
}

/// Everything a rowsource needs besides the algebra node it was built from.
pub struct BuildContext<'a> {
    pub source: &'a dyn TriplesSource,
    pub exists: &'a ExistsRegistry,
    pub eval_ctx: &'a EvaluationContext<'a>,
}

/// Builds the rowsource tree for `node`, rooted under `origin` (the currently active
/// named graph — `None` for the default graph, threaded down from an enclosing
/// `Graph` node). The `'a` bound ties the returned trait object to the lifetime of
/// the `EvaluationContext`/`TriplesSource`/`ExistsRegistry` `ctx` borrows from — the
/// lazily-pulling operators (`Filter`, `Assign`, `Having`) hold on to `ctx.eval_ctx`
/// for the life of the tree instead of re-looking it up per row.
pub fn build<'a>(node: &AlgebraNode, ctx: &BuildContext<'a>, origin: Option<&Literal>) -> Box<dyn RowSource + 'a> {
    match node {
        AlgebraNode::Bgp(triples) => Box::new(bgp::BgpRowSource::new(triples, ctx.source, origin)),
        AlgebraNode::Path { subject, path, object, .. } => {
            Box::new(path::PathRowSource::new(subject, path, object, ctx.source, origin))
        }
        AlgebraNode::Filter { expr, inner } => {
            Box::new(filter::FilterRowSource::new(build(inner, ctx, origin), expr.clone(), ctx))
        }
        AlgebraNode::Join(left, right) => {
            Box::new(join::JoinRowSource::new(build(left, ctx, origin), build(right, ctx, origin)))
        }
        AlgebraNode::LeftJoin { left, right, expr } => Box::new(left_join::LeftJoinRowSource::new(
            build(left, ctx, origin),
            build(right, ctx, origin),
            expr.clone(),
            ctx,
        )),
        AlgebraNode::Diff(left, right) => {
            Box::new(diff::DiffRowSource::new(build(left, ctx, origin), build(right, ctx, origin)))
        }
        AlgebraNode::Union(left, right) => {
            Box::new(union::UnionRowSource::new(build(left, ctx, origin), build(right, ctx, origin)))
        }
        AlgebraNode::ToList(inner) => build(inner, ctx, origin),
        AlgebraNode::OrderBy { inner, conditions, distinct } => Box::new(order_by::OrderByRowSource::new(
            build(inner, ctx, origin),
            conditions,
            *distinct,
            ctx,
        )),
        AlgebraNode::Project { inner, variables } => {
            Box::new(project::ProjectRowSource::new(build(inner, ctx, origin), variables))
        }
        AlgebraNode::Distinct(inner) => Box::new(distinct::DistinctRowSource::new(build(inner, ctx, origin))),
        AlgebraNode::Reduced(inner) => Box::new(distinct::DistinctRowSource::new(build(inner, ctx, origin))),
        AlgebraNode::Slice { inner, limit, offset } => {
            Box::new(slice::SliceRowSource::new(build(inner, ctx, origin), *limit, *offset))
        }
        AlgebraNode::Graph { inner, origin: graph_origin } => {
            Box::new(graph::GraphRowSource::new(inner, graph_origin, ctx))
        }
        AlgebraNode::Assign { inner, variable, expr } => {
            Box::new(filter::AssignRowSource::new(build(inner, ctx, origin), variable.clone(), expr.clone(), ctx))
        }
        AlgebraNode::Group { inner, variables } => {
            Box::new(group::GroupRowSource::new(build(inner, ctx, origin), variables))
        }
        AlgebraNode::Aggregation { inner, exprs, synth_vars } => {
            aggregation::build(inner, exprs, synth_vars, ctx, origin)
        }
        AlgebraNode::Having { inner, exprs } => {
            Box::new(having::HavingRowSource::new(build(inner, ctx, origin), exprs.clone(), ctx))
        }
        AlgebraNode::Values(block) => Box::new(values::ValuesRowSource::new(block)),
        AlgebraNode::Service { inner, silent, uri, .. } => {
            Box::new(service::ServiceRowSource::new(build(inner, ctx, origin), uri, *silent))
        }
    }
}

/// The ordered, de-duplicated union of two schemas' variable offsets, `a`'s first.
pub(crate) fn union_schema(a: &RowSchema, b: &RowSchema) -> Arc<RowSchema> {
    let mut offsets: Vec<u32> = a.variables().to_vec();
    for o in b.variables() {
        if !offsets.contains(o) {
            offsets.push(*o);
        }
    }
    Arc::new(RowSchema::new(offsets))
}

/// Every variable `a` and `b` both bind, for join-compatibility checks.
pub(crate) fn shared_offsets(a: &RowSchema, b: &RowSchema) -> Vec<u32> {
    a.variables().iter().copied().filter(|o| b.variables().contains(o)).collect()
}

/// Two rows are join-compatible iff they agree (by `same_term`) on every variable they
/// both bind.
pub(crate) fn compatible(left: &Row, right: &Row, shared: &[u32]) -> bool {
    shared.iter().all(|offset| match (left.get(*offset), right.get(*offset)) {
        (Some(a), Some(b)) => a.same_term(b),
        _ => true,
    })
}

/// Builds the immutable environment [`sparq_functions::evaluate`] needs from a row.
pub(crate) fn bindings_of(row: &Row) -> Arc<Bindings> {
    Arc::new(Bindings::Empty).extended_with_row(row.schema().variables(), row.cells())
}

/// A plain in-memory buffer the eager, multi-row operators produce; also the leaf
/// representation `Bgp`/`Values` build directly.
pub(crate) struct BufferedRowSource {
    schema: Arc<RowSchema>,
    rows: Vec<Row>,
    idx: usize,
}

impl BufferedRowSource {
    pub(crate) fn new(schema: Arc<RowSchema>, rows: Vec<Row>) -> Self {
        Self { schema, rows, idx: 0 }
    }
}

impl RowSource for BufferedRowSource {
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

/// The `ORDER BY`/aggregate `MIN`/`MAX` comparator (§4.3): unbound sorts first, then
/// numeric promotion, then a handful of same-kind comparisons, with a lexical
/// fallback for anything else (cross-type comparisons have no defined SPARQL order).
pub(crate) fn compare_optional(a: Option<&Literal>, b: Option<&Literal>) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare_literals(a, b),
    }
}

pub(crate) fn compare_literals(a: &Literal, b: &Literal) -> std::cmp::Ordering {
    use sparq_model::Numeric;
    use std::cmp::Ordering;
    if let (Ok(na), Ok(nb)) = (Numeric::from_literal(a), Numeric::from_literal(b)) {
        return na.partial_cmp(&nb).unwrap_or(Ordering::Equal);
    }
    match (a, b) {
        (Literal::Boolean(x), Literal::Boolean(y)) => x.to_string().cmp(&y.to_string()),
        (Literal::DateTime(x), Literal::DateTime(y)) => x.to_string().cmp(&y.to_string()),
        _ => a.lexical_form().cmp(&b.lexical_form()),
    }
}
