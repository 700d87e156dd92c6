//! The algebra compiler (spec §4.1): a near-1:1 structural lowering of `spargebra`'s
//! already-SPARQL-1.1-algebra-shaped `GraphPattern` into [`AlgebraNode`], plus the
//! genuine work `spargebra` does *not* do for us — aggregate sub-expression dedup
//! (§4.1), Z-node (unit BGP) pruning around `Join`/`LeftJoin` (§3), and rejecting a
//! `HAVING` clause that names an aggregate the `SELECT` list never projects (§4.2).
//!
//! `spargebra` performs the official W3C SPARQL 1.1 algebra translation itself
//! (`Group`/`Optional`/`Filter`/`Extend` already assembled, aggregates already
//! extracted per occurrence), which is considerably closer to our own `AlgebraNode`
//! than the raw parse tree a from-scratch parser would hand us. We lean into that:
//! most of this module is a direct variant-to-variant translation, and the aggregate
//! dedup pass below is the one place real compiler logic, not just translation, is
//! required — `spargebra` assigns a fresh variable to every textual aggregate
//! occurrence, even when two occurrences are structurally identical. It also hoists
//! every aggregate occurrence, `HAVING`'s included, into the enclosing `Group` before
//! we ever see a `Filter`, which is why the `HAVING`-only-aggregate check below walks
//! the raw pattern up front rather than inspecting the lowered `Filter` expression.

pub use crate::convert::Converter;
use crate::exists::ExistsRegistry;
use crate::CompileError;
use sparq_functions::Expression;
use sparq_model::{Literal, VariablesTable};
use spargebra::algebra::{GraphPattern, PropertyPathExpression};

use super::{AlgebraNode, PathExpression};

/// The result of compiling one parsed query: the operator tree, the variables table
/// built up while lowering it, and the EXISTS handle registry the tree's `Exists`/
/// `NotExists` expressions index into.
pub struct CompiledPattern {
    pub root: AlgebraNode,
    pub variables: VariablesTable,
    pub exists: ExistsRegistry,
}

/// Compiles a top-level `GraphPattern` (the body of any of the four query forms) with
/// a fresh [`Converter`].
pub fn compile_pattern(pattern: &GraphPattern) -> Result<CompiledPattern, CompileError> {
    let mut conv = Converter::new();
    let root = compile_pattern_with(&mut conv, pattern)?;
    Ok(CompiledPattern {
        root,
        variables: conv.variables,
        exists: conv.exists,
    })
}

/// Compiles `pattern` using an already-populated [`Converter`], so its variable
/// offsets share the same space as whatever else `conv` has already lowered — needed
/// by `CONSTRUCT`, whose template triples must resolve to the same variable offsets
/// the `WHERE` pattern bound.
pub fn compile_pattern_with(conv: &mut Converter, pattern: &GraphPattern) -> Result<AlgebraNode, CompileError> {
    conv.having_only_aggregates.extend(collect_having_only_aggregates(pattern));
    lower(pattern, conv)
}

fn lower(pattern: &GraphPattern, conv: &mut Converter) -> Result<AlgebraNode, CompileError> {
    match pattern {
        GraphPattern::Bgp { patterns } => Ok(AlgebraNode::Bgp(
            patterns.iter().map(|t| conv.triple_pattern(t)).collect::<Result<_, _>>()?,
        )),
        GraphPattern::Path { subject, path, object } => lower_path(subject, path, object, conv),
        GraphPattern::Join { left, right } => {
            let left = lower(left, conv)?;
            let right = lower(right, conv)?;
            Ok(join(left, right))
        }
        GraphPattern::LeftJoin { left, right, expression } => {
            let left = lower(left, conv)?;
            let right = lower(right, conv)?;
            let expr = expression
                .as_ref()
                .map(|e| conv.expression(e))
                .transpose()?
                .unwrap_or(Expression::Literal(Literal::Boolean(true.into())));
            Ok(left_join(left, right, expr))
        }
        GraphPattern::Minus { left, right } => Ok(AlgebraNode::Diff(
            Box::new(lower(left, conv)?),
            Box::new(lower(right, conv)?),
        )),
        GraphPattern::Union { left, right } => Ok(AlgebraNode::Union(
            Box::new(lower(left, conv)?),
            Box::new(lower(right, conv)?),
        )),
        GraphPattern::Graph { name, inner } => Ok(AlgebraNode::Graph {
            inner: Box::new(lower(inner, conv)?),
            origin: conv.named_node_pattern(name),
        }),
        GraphPattern::Extend { inner, variable, expression } => Ok(AlgebraNode::Assign {
            inner: Box::new(lower(inner, conv)?),
            variable: conv.variable(variable),
            expr: conv.expression(expression)?,
        }),
        GraphPattern::Filter { expr, inner } => lower_filter(expr, inner, conv),
        GraphPattern::Values { variables, bindings } => {
            Ok(AlgebraNode::Values(conv.values_block(variables, bindings)?))
        }
        GraphPattern::OrderBy { inner, expression } => Ok(AlgebraNode::OrderBy {
            inner: Box::new(lower(inner, conv)?),
            conditions: expression
                .iter()
                .map(|e| conv.order_expression(e))
                .collect::<Result<_, _>>()?,
            distinct: false,
        }),
        GraphPattern::Project { inner, variables } => Ok(AlgebraNode::Project {
            inner: Box::new(lower(inner, conv)?),
            variables: variables.iter().map(|v| conv.variable(v)).collect(),
        }),
        GraphPattern::Distinct { inner } => Ok(AlgebraNode::Distinct(Box::new(lower(inner, conv)?))),
        GraphPattern::Reduced { inner } => Ok(AlgebraNode::Reduced(Box::new(lower(inner, conv)?))),
        GraphPattern::Slice { inner, start, length } => Ok(AlgebraNode::Slice {
            inner: Box::new(lower(inner, conv)?),
            offset: *start as i64,
            limit: length.map(|l| l as i64).unwrap_or(-1),
        }),
        GraphPattern::Group { inner, variables, aggregates } => lower_group(inner, variables, aggregates, conv),
        GraphPattern::Service { name, inner, silent } => {
            let inner_node = lower(inner, conv)?;
            let query = inner_node.to_string();
            Ok(AlgebraNode::Service {
                inner: Box::new(inner_node),
                uri: match conv.named_node_pattern(name) {
                    Literal::Uri(n) => n.as_str().to_string(),
                    other => other.to_string(),
                },
                query,
                silent: *silent,
            })
        }
    }
}

/// `Join`'s identity element is the unit BGP (§3): a `Join` where either side is an
/// empty `Bgp` collapses to the other side rather than being kept as a real node.
fn join(left: AlgebraNode, right: AlgebraNode) -> AlgebraNode {
    match (left.is_unit_bgp(), right.is_unit_bgp()) {
        (true, _) => right,
        (_, true) => left,
        _ => AlgebraNode::Join(Box::new(left), Box::new(right)),
    }
}

/// `LeftJoin` shares `Join`'s unit-Bgp identity (§3, §8 Property 2): `OPTIONAL` with
/// nothing preceding it lowers to `LeftJoin(Z, A, true)`, and once the attached
/// expression is the trivial `true` a unit-Bgp left side collapses the node to its
/// right side exactly as `join` does, discarding the now-meaningless expression along
/// with it.
fn left_join(left: AlgebraNode, right: AlgebraNode, expr: Expression) -> AlgebraNode {
    let trivial = expr == Expression::Literal(Literal::Boolean(true.into()));
    if left.is_unit_bgp() && trivial {
        right
    } else {
        AlgebraNode::LeftJoin {
            left: Box::new(left),
            right: Box::new(right),
            expr,
        }
    }
}

/// A `Filter` directly above a `Group`/`Aggregation` is `HAVING` (spargebra does not
/// distinguish the two syntactically); every other `Filter` stays a plain `Filter`.
fn lower_filter(
    expr: &spargebra::algebra::Expression,
    inner: &GraphPattern,
    conv: &mut Converter,
) -> Result<AlgebraNode, CompileError> {
    if let GraphPattern::Group { aggregates, .. } = inner {
        if aggregates
            .iter()
            .any(|(var, _)| conv.having_only_aggregates.contains(var.as_str()))
        {
            return Err(CompileError::NewAggregateInHaving);
        }
    }
    let inner_node = lower(inner, conv)?;
    let expr = conv.expression(expr)?;
    if matches!(inner_node, AlgebraNode::Aggregation { .. } | AlgebraNode::Group { .. }) {
        Ok(AlgebraNode::Having {
            inner: Box::new(inner_node),
            exprs: vec![expr],
        })
    } else {
        Ok(AlgebraNode::Filter {
            expr,
            inner: Box::new(inner_node),
        })
    }
}

/// Finds every aggregate `spargebra` hoisted into a `Group.aggregates` list whose
/// *shape* (function, `DISTINCT` flag, inner expression) is referenced only by that
/// group's `HAVING` expression and matches none of the aggregates the enclosing
/// `SELECT` projects via an `Extend` between the `Group` and its `Project` (spec
/// §4.2, §8 Property 3: such a `HAVING` is a compile error, not a silently accepted
/// new aggregate). `spargebra` assigns every textual aggregate occurrence its own
/// fresh variable regardless of shape (the same reason `lower_group`'s own dedup
/// pass exists below), so two occurrences of `COUNT(?x)` — one in `SELECT`, one in
/// `HAVING` — show up as two distinct `Group.aggregates` entries; comparing by shape
/// rather than by variable is what lets `HAVING(COUNT(?x) > 1)` legally "see" a
/// `SELECT (COUNT(?x) AS ?c)` even though they're different entries. Runs once over
/// the whole raw pattern before lowering, since the `Extend` chain that names the
/// `SELECT`-side aggregates sits *above* the `HAVING` `Filter` it needs to be checked
/// against, not below it.
fn collect_having_only_aggregates(pattern: &GraphPattern) -> std::collections::HashSet<String> {
    let mut out = std::collections::HashSet::new();
    collect_having_only(pattern, &[], &mut out);
    out
}

/// `select_vars`: raw variable names referenced by the enclosing `SELECT`'s `Extend`
/// chain seen so far — an aggregate-derived projection expression is just a reference
/// to its `Group.aggregates` variable, so this doubles as "which aggregate entries
/// `SELECT` claims".
fn collect_having_only(pattern: &GraphPattern, select_vars: &[String], out: &mut std::collections::HashSet<String>) {
    match pattern {
        GraphPattern::Bgp { .. } | GraphPattern::Path { .. } | GraphPattern::Values { .. } => {}
        GraphPattern::Join { left, right }
        | GraphPattern::LeftJoin { left, right, .. }
        | GraphPattern::Minus { left, right }
        | GraphPattern::Union { left, right } => {
            collect_having_only(left, select_vars, out);
            collect_having_only(right, select_vars, out);
        }
        GraphPattern::Graph { inner, .. }
        | GraphPattern::Distinct { inner }
        | GraphPattern::Reduced { inner }
        | GraphPattern::Slice { inner, .. }
        | GraphPattern::OrderBy { inner, .. }
        | GraphPattern::Service { inner, .. }
        | GraphPattern::Group { inner, .. } => collect_having_only(inner, select_vars, out),
        GraphPattern::Extend { inner, expression, .. } => {
            let mut extended = select_vars.to_vec();
            collect_vars_in_raw_expr(expression, &mut extended);
            collect_having_only(inner, &extended, out);
        }
        GraphPattern::Filter { expr, inner } => {
            if let GraphPattern::Group { aggregates, inner: group_inner, .. } = inner.as_ref() {
                let mut having_vars = Vec::new();
                collect_vars_in_raw_expr(expr, &mut having_vars);

                let select_shapes: Vec<&spargebra::algebra::AggregateExpression> = aggregates
                    .iter()
                    .filter(|(var, _)| select_vars.iter().any(|n| n == var.as_str()))
                    .map(|(_, agg)| agg)
                    .collect();

                for (var, agg) in aggregates {
                    let referenced_by_having = having_vars.iter().any(|n| n == var.as_str());
                    let claimed_by_select = select_shapes.iter().any(|shape| raw_aggregate_eq(shape, agg));
                    if referenced_by_having && !claimed_by_select {
                        out.insert(var.as_str().to_string());
                    }
                }
                collect_having_only(group_inner, select_vars, out);
            } else {
                collect_having_only(inner, select_vars, out);
            }
        }
        // A nested `{ SELECT ... }` opens a fresh projection scope: its own `HAVING`,
        // if any, can only be satisfied by its own `SELECT` list.
        GraphPattern::Project { inner, .. } => collect_having_only(inner, &[], out),
    }
}

/// Every `?variable`/`BOUND(?variable)` reference in a raw (not yet lowered)
/// `spargebra` expression tree.
fn collect_vars_in_raw_expr(expr: &spargebra::algebra::Expression, out: &mut Vec<String>) {
    use spargebra::algebra::Expression as E;
    match expr {
        E::Variable(v) | E::Bound(v) => out.push(v.as_str().to_string()),
        E::NamedNode(_) | E::Literal(_) | E::Exists(_) => {}
        E::Not(e) | E::UnaryPlus(e) | E::UnaryMinus(e) => collect_vars_in_raw_expr(e, out),
        E::Or(l, r) | E::And(l, r) | E::Equal(l, r) | E::SameTerm(l, r) | E::Greater(l, r)
        | E::GreaterOrEqual(l, r) | E::Less(l, r) | E::LessOrEqual(l, r) | E::Add(l, r)
        | E::Subtract(l, r) | E::Multiply(l, r) | E::Divide(l, r) => {
            collect_vars_in_raw_expr(l, out);
            collect_vars_in_raw_expr(r, out);
        }
        E::In(needle, haystack) => {
            collect_vars_in_raw_expr(needle, out);
            haystack.iter().for_each(|e| collect_vars_in_raw_expr(e, out));
        }
        E::If(c, y, n) => {
            collect_vars_in_raw_expr(c, out);
            collect_vars_in_raw_expr(y, out);
            collect_vars_in_raw_expr(n, out);
        }
        E::Coalesce(parts) => parts.iter().for_each(|e| collect_vars_in_raw_expr(e, out)),
        E::FunctionCall(_, args) => args.iter().for_each(|e| collect_vars_in_raw_expr(e, out)),
    }
}

/// Structural equality for two raw `spargebra` aggregate calls, ignoring which
/// variable each was bound to — the same notion of "the same aggregate" `lower_group`
/// dedups by, just computed before conversion.
fn raw_aggregate_eq(
    a: &spargebra::algebra::AggregateExpression,
    b: &spargebra::algebra::AggregateExpression,
) -> bool {
    use spargebra::algebra::AggregateExpression as A;
    match (a, b) {
        (A::Count { expr: e1, distinct: d1 }, A::Count { expr: e2, distinct: d2 }) => {
            d1 == d2
                && match (e1, e2) {
                    (Some(e1), Some(e2)) => raw_expr_eq(e1, e2),
                    (None, None) => true,
                    _ => false,
                }
        }
        (A::Sum { expr: e1, distinct: d1 }, A::Sum { expr: e2, distinct: d2 })
        | (A::Avg { expr: e1, distinct: d1 }, A::Avg { expr: e2, distinct: d2 })
        | (A::Min { expr: e1, distinct: d1 }, A::Min { expr: e2, distinct: d2 })
        | (A::Max { expr: e1, distinct: d1 }, A::Max { expr: e2, distinct: d2 })
        | (A::Sample { expr: e1, distinct: d1 }, A::Sample { expr: e2, distinct: d2 }) => {
            d1 == d2 && raw_expr_eq(e1, e2)
        }
        (
            A::GroupConcat { expr: e1, distinct: d1, separator: s1 },
            A::GroupConcat { expr: e2, distinct: d2, separator: s2 },
        ) => d1 == d2 && raw_expr_eq(e1, e2) && s1 == s2,
        _ => false,
    }
}

/// Structural equality for two raw `spargebra` expressions, by term/variable name
/// rather than by offset (neither side has been registered in a [`Converter`] yet).
fn raw_expr_eq(a: &spargebra::algebra::Expression, b: &spargebra::algebra::Expression) -> bool {
    use spargebra::algebra::Expression as E;
    match (a, b) {
        (E::NamedNode(x), E::NamedNode(y)) => x.as_str() == y.as_str(),
        (E::Literal(x), E::Literal(y)) => x == y,
        (E::Variable(x), E::Variable(y)) | (E::Bound(x), E::Bound(y)) => x.as_str() == y.as_str(),
        (E::Or(l1, r1), E::Or(l2, r2))
        | (E::And(l1, r1), E::And(l2, r2))
        | (E::Equal(l1, r1), E::Equal(l2, r2))
        | (E::SameTerm(l1, r1), E::SameTerm(l2, r2))
        | (E::Greater(l1, r1), E::Greater(l2, r2))
        | (E::GreaterOrEqual(l1, r1), E::GreaterOrEqual(l2, r2))
        | (E::Less(l1, r1), E::Less(l2, r2))
        | (E::LessOrEqual(l1, r1), E::LessOrEqual(l2, r2))
        | (E::Add(l1, r1), E::Add(l2, r2))
        | (E::Subtract(l1, r1), E::Subtract(l2, r2))
        | (E::Multiply(l1, r1), E::Multiply(l2, r2))
        | (E::Divide(l1, r1), E::Divide(l2, r2)) => raw_expr_eq(l1, l2) && raw_expr_eq(r1, r2),
        (E::Not(x), E::Not(y)) | (E::UnaryPlus(x), E::UnaryPlus(y)) | (E::UnaryMinus(x), E::UnaryMinus(y)) => {
            raw_expr_eq(x, y)
        }
        (E::In(n1, h1), E::In(n2, h2)) => {
            raw_expr_eq(n1, n2) && h1.len() == h2.len() && h1.iter().zip(h2).all(|(x, y)| raw_expr_eq(x, y))
        }
        (E::If(c1, y1, n1), E::If(c2, y2, n2)) => raw_expr_eq(c1, c2) && raw_expr_eq(y1, y2) && raw_expr_eq(n1, n2),
        (E::Coalesce(p1), E::Coalesce(p2)) => {
            p1.len() == p2.len() && p1.iter().zip(p2).all(|(x, y)| raw_expr_eq(x, y))
        }
        (E::FunctionCall(f1, a1), E::FunctionCall(f2, a2)) => {
            f1 == f2 && a1.len() == a2.len() && a1.iter().zip(a2).all(|(x, y)| raw_expr_eq(x, y))
        }
        _ => false,
    }
}

fn lower_group(
    inner: &GraphPattern,
    variables: &[spargebra::term::Variable],
    aggregates: &[(spargebra::term::Variable, spargebra::algebra::AggregateExpression)],
    conv: &mut Converter,
) -> Result<AlgebraNode, CompileError> {
    let inner_node = lower(inner, conv)?;
    let group_variables = variables.iter().map(|v| conv.variable(v)).collect();
    let group_node = AlgebraNode::Group {
        inner: Box::new(inner_node),
        variables: group_variables,
    };
    if aggregates.is_empty() {
        return Ok(group_node);
    }

    let mut exprs: Vec<Expression> = Vec::new();
    let mut synth_vars: Vec<Literal> = Vec::new();
    for (var, agg) in aggregates {
        let converted = conv.aggregate_expression(agg)?;
        let duplicate_of = exprs.iter().position(|e| match e {
            Expression::Aggregate(existing) => existing.as_ref() == &converted,
            _ => false,
        });
        match duplicate_of {
            Some(i) => {
                let canonical = synth_vars[i]
                    .as_variable_offset()
                    .expect("synthetic aggregate variables are always Literal::Variable");
                conv.alias_aggregate_variable(var, canonical);
            }
            None => {
                let var_literal = conv.variable(var);
                exprs.push(Expression::Aggregate(std::sync::Arc::new(converted)));
                synth_vars.push(var_literal);
            }
        }
    }

    Ok(AlgebraNode::Aggregation {
        inner: Box::new(group_node),
        exprs,
        synth_vars,
    })
}

fn lower_path(
    subject: &spargebra::term::TermPattern,
    path: &PropertyPathExpression,
    object: &spargebra::term::TermPattern,
    conv: &mut Converter,
) -> Result<AlgebraNode, CompileError> {
    let subject_lit = conv.term_pattern(subject)?;
    let object_lit = conv.term_pattern(object)?;
    if let PropertyPathExpression::NamedNode(predicate) = path {
        // A bare predicate path lowers straight into an ordinary triple pattern
        // (SPEC_FULL.md §3 "Property paths").
        return Ok(AlgebraNode::Bgp(vec![sparq_model::TriplePattern::new(
            subject_lit,
            Literal::Uri(predicate.clone()),
            object_lit,
        )]));
    }
    Ok(AlgebraNode::Path {
        subject: subject_lit,
        path: path_expression(path, conv)?,
        object: object_lit,
        origin: None,
    })
}

fn path_expression(path: &PropertyPathExpression, conv: &mut Converter) -> Result<PathExpression, CompileError> {
    Ok(match path {
        PropertyPathExpression::NamedNode(n) => PathExpression::Predicate(Literal::Uri(n.clone())),
        PropertyPathExpression::Reverse(p) => PathExpression::Inverse(Box::new(path_expression(p, conv)?)),
        PropertyPathExpression::Sequence(l, r) => PathExpression::Sequence(
            Box::new(path_expression(l, conv)?),
            Box::new(path_expression(r, conv)?),
        ),
        PropertyPathExpression::Alternative(l, r) => PathExpression::Alternative(
            Box::new(path_expression(l, conv)?),
            Box::new(path_expression(r, conv)?),
        ),
        PropertyPathExpression::ZeroOrMore(p) => PathExpression::ZeroOrMore(Box::new(path_expression(p, conv)?)),
        PropertyPathExpression::OneOrMore(p) => PathExpression::OneOrMore(Box::new(path_expression(p, conv)?)),
        PropertyPathExpression::ZeroOrOne(p) => PathExpression::ZeroOrOne(Box::new(path_expression(p, conv)?)),
        PropertyPathExpression::NegatedPropertySet(items) => {
            PathExpression::NegatedPropertySet(items.iter().map(|n| Literal::Uri(n.clone())).collect())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(query: &str) -> GraphPattern {
        match spargebra::Query::parse(query, None).unwrap() {
            spargebra::Query::Select { pattern, .. } => pattern,
            _ => panic!("expected a SELECT query"),
        }
    }

    #[test]
    fn unit_bgp_is_the_join_identity() {
        let concrete = AlgebraNode::Bgp(vec![sparq_model::TriplePattern::new(
            Literal::Variable(0, "s".into()),
            Literal::Variable(1, "p".into()),
            Literal::Variable(2, "o".into()),
        )]);
        let pruned_left = join(AlgebraNode::unit(), concrete.clone());
        let pruned_right = join(concrete.clone(), AlgebraNode::unit());
        assert_eq!(pruned_left, concrete);
        assert_eq!(pruned_right, concrete);

        let real_join = join(concrete.clone(), concrete.clone());
        assert!(matches!(real_join, AlgebraNode::Join(_, _)));
    }

    #[test]
    fn leftjoin_with_unit_bgp_left_and_trivial_true_collapses() {
        let pattern = parse("SELECT * WHERE { OPTIONAL { ?s ?p ?o } }");
        let compiled = compile_pattern(&pattern).unwrap();
        match &compiled.root {
            AlgebraNode::Project { inner, .. } => {
                assert!(matches!(&**inner, AlgebraNode::Bgp(triples) if triples.len() == 1));
            }
            other => panic!("expected a Project at the root, got {other:?}"),
        }
    }

    #[test]
    fn leftjoin_with_real_left_and_constant_false_is_not_pruned() {
        let pattern = parse("SELECT * WHERE { ?s ?p ?o OPTIONAL { ?s ?q ?w . FILTER(false) } }");
        let compiled = compile_pattern(&pattern).unwrap();
        match &compiled.root {
            AlgebraNode::Project { inner, .. } => {
                assert!(matches!(&**inner, AlgebraNode::LeftJoin { .. }));
            }
            other => panic!("expected a Project at the root, got {other:?}"),
        }
    }

    #[test]
    fn having_only_aggregate_is_a_compile_error() {
        let pattern = parse(
            "SELECT (COUNT(?x) AS ?c) WHERE { ?s ?p ?x } GROUP BY ?s HAVING(SUM(?x) > 1)",
        );
        assert_eq!(compile_pattern(&pattern).unwrap_err(), CompileError::NewAggregateInHaving);
    }

    #[test]
    fn having_referencing_a_selected_aggregate_compiles() {
        let pattern = parse(
            "SELECT (COUNT(?x) AS ?c) WHERE { ?s ?p ?x } GROUP BY ?s HAVING(COUNT(?x) > 1)",
        );
        assert!(compile_pattern(&pattern).is_ok());
    }

    #[test]
    fn duplicate_aggregates_share_one_synthetic_variable() {
        let pattern = parse(
            "SELECT (COUNT(?x) AS ?a) (COUNT(?x) AS ?b) WHERE { ?x ?p ?o } GROUP BY ?p",
        );
        let compiled = compile_pattern(&pattern).unwrap();
        let mut node = &compiled.root;
        while let AlgebraNode::Project { inner, .. } = node {
            node = inner;
        }
        match node {
            AlgebraNode::Aggregation { exprs, synth_vars, .. } => {
                assert_eq!(exprs.len(), 1);
                assert_eq!(synth_vars.len(), 1);
            }
            other => panic!("expected an Aggregation node, got {other:?}"),
        }
    }
}
