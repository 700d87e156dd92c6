//! The shared backtracking join used by both the `Bgp` rowsource (`rowsource::triples`)
//! and the EXISTS evaluator's joint variable-triple match (§4.4: "the correct
//! semantics are joint", not per-triple). Eagerly materializes every consistent
//! binding for a conjunction of triple patterns rather than streaming them — a
//! simplification the spec's "no cost-based optimization" non-goal (§1) leaves room
//! for; see DESIGN.md.

use crate::triples_source::TriplesSource;
use sparq_model::{Bindings, Literal, TriplePattern};
use std::sync::Arc;

fn substitute(term: &Literal, bindings: &Bindings) -> Literal {
    match term.as_variable_offset() {
        Some(offset) => bindings.get(offset).cloned().unwrap_or_else(|| term.clone()),
        None => term.clone(),
    }
}

/// Extends `base` with the bindings `matched` gives to `pattern`'s variable positions,
/// rejecting the triple if a repeated variable (e.g. `?x ?p ?x`) is bound
/// inconsistently across the two occurrences.
fn bind_triple(
    pattern: &TriplePattern,
    matched_subject: &Literal,
    matched_predicate: &Literal,
    matched_object: &Literal,
    base: &Arc<Bindings>,
) -> Option<Arc<Bindings>> {
    let mut current = Arc::clone(base);
    for (pos, value) in [
        (&pattern.subject, matched_subject),
        (&pattern.predicate, matched_predicate),
        (&pattern.object, matched_object),
    ] {
        if let Some(offset) = pos.as_variable_offset() {
            match current.get(offset) {
                Some(existing) if !existing.same_term(value) => return None,
                Some(_) => {}
                None => current = current.pushed(offset, value.clone()),
            }
        }
    }
    Some(current)
}

/// Every binding that satisfies the full conjunction of `triples`, given a starting
/// environment `base` (outer-row substitutions already applied for EXISTS, or the
/// empty environment for a top-level `Bgp`).
pub fn bgp_all_bindings(
    triples: &[TriplePattern],
    source: &dyn TriplesSource,
    origin: Option<&Literal>,
    base: &Arc<Bindings>,
) -> Vec<Arc<Bindings>> {
    match triples.split_first() {
        None => vec![Arc::clone(base)],
        Some((first, rest)) => {
            let subject = substitute(&first.subject, base);
            let predicate = substitute(&first.predicate, base);
            let object = substitute(&first.object, base);
            let mut out = Vec::new();
            for candidate in source.match_triples(&subject, &predicate, &object, origin) {
                if let Some(extended) = bind_triple(
                    first,
                    &candidate.subject,
                    &candidate.predicate,
                    &candidate.object,
                    base,
                ) {
                    out.extend(bgp_all_bindings(rest, source, origin, &extended));
                }
            }
            out
        }
    }
}

/// `true` iff the full conjunction has at least one consistent match — short-circuits
/// at the first one instead of collecting every binding (the EXISTS basic-pattern
/// variable-subset check, §4.4).
pub fn bgp_has_match(
    triples: &[TriplePattern],
    source: &dyn TriplesSource,
    origin: Option<&Literal>,
    base: &Arc<Bindings>,
) -> bool {
    match triples.split_first() {
        None => true,
        Some((first, rest)) => {
            let subject = substitute(&first.subject, base);
            let predicate = substitute(&first.predicate, base);
            let object = substitute(&first.object, base);
            for candidate in source.match_triples(&subject, &predicate, &object, origin) {
                if let Some(extended) = bind_triple(
                    first,
                    &candidate.subject,
                    &candidate.predicate,
                    &candidate.object,
                    base,
                ) {
                    if bgp_has_match(rest, source, origin, &extended) {
                        return true;
                    }
                }
            }
            false
        }
    }
}

/// The ordered, de-duplicated set of variable offsets a BGP binds, in
/// first-occurrence order — the schema of the `Bgp` rowsource's output rows.
pub fn bgp_variables(triples: &[TriplePattern]) -> Vec<u32> {
    let mut seen = Vec::new();
    for t in triples {
        for offset in t.variable_offsets() {
            if !seen.contains(&offset) {
                seen.push(offset);
            }
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triples_source::MemoryTriplesSource;

    fn uri(s: &str) -> Literal {
        Literal::Uri(oxrdf::NamedNode::new(s).unwrap())
    }

    #[test]
    fn joint_match_requires_same_variable_value_across_triples() {
        let source = MemoryTriplesSource::new();
        source.insert(uri("urn:a"), uri("urn:p"), Literal::Integer(1.into()), None);
        source.insert(uri("urn:a"), uri("urn:q"), Literal::Integer(2.into()), None);

        let x = Literal::Variable(0, "x".into());
        let triples = vec![
            TriplePattern::new(uri("urn:a"), uri("urn:p"), x.clone()),
            TriplePattern::new(uri("urn:a"), uri("urn:q"), x),
        ];
        // ?x can't be both 1 (from ?p) and 2 (from ?q) at once.
        assert!(!bgp_has_match(&triples, &source, None, &Arc::new(Bindings::Empty)));
    }
}
