//! `EXISTS`/`NOT EXISTS` evaluation (spec §4.4): a purpose-built pattern tree, kept
//! separate from [`crate::algebra::AlgebraNode`] because by the time a sub-pattern
//! would be lowered into algebra it has already been merged into `Join`/`LeftJoin`/
//! `Filter` nodes and lost the structural distinctions the pattern-specific evaluators
//! below need — in particular, `Optional`'s required branch is the only one that
//! contributes to EXISTS truth (§4.4), a fact the merged `LeftJoin` representation no
//! longer states directly.

use crate::bgp::{bgp_all_bindings, bgp_has_match};
use crate::triples_source::TriplesSource;
use sparq_functions::{evaluate, EvaluationContext, Expression, ExistsMode, ExistsProbe};
use sparq_model::{Bindings, BindingsBlock, ThinError, ThinResult, TriplePattern};
use std::sync::Arc;

/// A reduced graph pattern, retained only for `EXISTS`/`NOT EXISTS` evaluation.
#[derive(Clone, Debug, PartialEq)]
pub enum ExistsPattern {
    Basic(Vec<TriplePattern>),
    Group(Vec<ExistsPattern>),
    Union(Vec<ExistsPattern>),
    /// Only `required` contributes to EXISTS truth (§4.4); `optional` is evaluated
    /// solely for its side effect of none (EXISTS never looks at OPTIONAL's bindings).
    Optional {
        required: Box<ExistsPattern>,
        optional: Box<ExistsPattern>,
    },
    Filter {
        expr: Expression,
        inner: Box<ExistsPattern>,
    },
    Graph {
        origin: sparq_model::Literal,
        inner: Box<ExistsPattern>,
    },
    Values(BindingsBlock),
}

/// The handle table the compiler builds alongside the main algebra tree; `Expression::
/// Exists(handle)`/`NotExists(handle)` index into it.
#[derive(Clone, Debug, Default)]
pub struct ExistsRegistry {
    patterns: Vec<ExistsPattern>,
}

impl ExistsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, pattern: ExistsPattern) -> u32 {
        let handle = self.patterns.len() as u32;
        self.patterns.push(pattern);
        handle
    }

    pub fn get(&self, handle: u32) -> Option<&ExistsPattern> {
        self.patterns.get(handle as usize)
    }
}

/// Evaluates `Expression::Exists`/`NotExists` against a [`TriplesSource`], building a
/// fresh, self-contained [`EvaluationContext`] per probe so the probe can lend itself
/// (`&self`) as that context's own `ExistsProbe` for nested `EXISTS` without a
/// self-referential struct.
pub struct ExistsEvaluator<'a> {
    registry: &'a ExistsRegistry,
    source: &'a dyn TriplesSource,
    base_iri: Option<String>,
    now: sparq_model::DateTime,
    seed: u64,
}

impl<'a> ExistsEvaluator<'a> {
    pub fn new(
        registry: &'a ExistsRegistry,
        source: &'a dyn TriplesSource,
        base_iri: Option<String>,
        now: sparq_model::DateTime,
        seed: u64,
    ) -> Self {
        Self {
            registry,
            source,
            base_iri,
            now,
            seed,
        }
    }
}

impl<'a> ExistsProbe for ExistsEvaluator<'a> {
    fn probe(&self, handle: u32, mode: ExistsMode, bindings: &Arc<Bindings>) -> ThinResult<bool> {
        let pattern = self.registry.get(handle).ok_or(ThinError)?;
        let ctx = EvaluationContext::new(self.base_iri.clone(), self.now, self.seed).with_exists_probe(self);
        let matched = evaluate_pattern(pattern, self.source, None, bindings, &ctx)?;
        Ok(matched ^ mode.negated())
    }
}

fn evaluate_pattern(
    pattern: &ExistsPattern,
    source: &dyn TriplesSource,
    origin: Option<&sparq_model::Literal>,
    bindings: &Arc<Bindings>,
    ctx: &EvaluationContext<'_>,
) -> ThinResult<bool> {
    match pattern {
        ExistsPattern::Basic(triples) => Ok(bgp_has_match(triples, source, origin, bindings)),
        ExistsPattern::Group(parts) => {
            for part in parts {
                if !evaluate_pattern(part, source, origin, bindings, ctx)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        ExistsPattern::Union(parts) => {
            for part in parts {
                if evaluate_pattern(part, source, origin, bindings, ctx)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        ExistsPattern::Optional { required, .. } => evaluate_pattern(required, source, origin, bindings, ctx),
        ExistsPattern::Filter { expr, inner } => {
            if !evaluate_pattern(inner, source, origin, bindings, ctx)? {
                return Ok(false);
            }
            // The filter is checked against every joint binding the inner pattern
            // produces, not just the first — a filter can reject the one match a
            // bare pattern check would have accepted.
            let candidates = match &**inner {
                ExistsPattern::Basic(triples) => bgp_all_bindings(triples, source, origin, bindings),
                _ => vec![Arc::clone(bindings)],
            };
            for candidate in candidates {
                let value = evaluate(expr, &candidate, ctx)?;
                if bool::try_from(&value).unwrap_or(false) {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        ExistsPattern::Graph { origin: new_origin, inner } => {
            evaluate_pattern(inner, source, Some(new_origin), bindings, ctx)
        }
        ExistsPattern::Values(block) => Ok(!block.is_empty()),
    }
}
