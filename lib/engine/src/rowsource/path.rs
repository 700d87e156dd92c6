use super::RowSource;
use crate::algebra::PathExpression;
use crate::triples_source::TriplesSource;
use sparq_model::{Literal, Row, RowSchema};
use std::sync::Arc;

/// Depth bound for `*`/`+` transitive closures (SPEC_FULL.md §3 "Property paths":
/// "a depth-bounded breadth-first walk"). No query-visible construct needs more hops
/// than this to reach every node in a reasonably sized graph, and it keeps an
/// accidental cycle in the data from looping forever.
const MAX_PATH_DEPTH: usize = 64;

fn wildcard() -> Literal {
    Literal::Variable(u32::MAX, Arc::from("$$path$$"))
}

fn dedup_pairs(pairs: Vec<(Literal, Literal)>) -> Vec<(Literal, Literal)> {
    let mut out: Vec<(Literal, Literal)> = Vec::with_capacity(pairs.len());
    for (s, o) in pairs {
        if !out.iter().any(|(es, eo)| es.same_term(&s) && eo.same_term(&o)) {
            out.push((s, o));
        }
    }
    out
}

fn all_nodes(source: &dyn TriplesSource, origin: Option<&Literal>) -> Vec<Literal> {
    let w = wildcard();
    let mut out: Vec<Literal> = Vec::new();
    for m in source.match_triples(&w, &w, &w, origin) {
        if !out.iter().any(|n| n.same_term(&m.subject)) {
            out.push(m.subject.clone());
        }
        if !out.iter().any(|n| n.same_term(&m.object)) {
            out.push(m.object.clone());
        }
    }
    out
}

fn reflexive_pairs(subject: &Literal, object: &Literal, source: &dyn TriplesSource, origin: Option<&Literal>) -> Vec<(Literal, Literal)> {
    match (subject.is_variable(), object.is_variable()) {
        (false, false) => {
            if subject.same_term(object) {
                vec![(subject.clone(), object.clone())]
            } else {
                Vec::new()
            }
        }
        (false, true) => vec![(subject.clone(), subject.clone())],
        (true, false) => vec![(object.clone(), object.clone())],
        (true, true) => all_nodes(source, origin).into_iter().map(|n| (n.clone(), n)).collect(),
    }
}

/// One step of path evaluation: every `(subject, object)` pair satisfying `path`,
/// given that either endpoint may be a concrete term or [`wildcard`] (meaning "match
/// anything, report what it bound"). `subject`/`object` passed in from the rowsource
/// may additionally be real query variables — those are just wildcards too, since the
/// caller resolves the actual variable binding from the returned concrete values.
fn direct_step(
    path: &PathExpression,
    subject: &Literal,
    object: &Literal,
    source: &dyn TriplesSource,
    origin: Option<&Literal>,
) -> Vec<(Literal, Literal)> {
    match path {
        PathExpression::Predicate(p) => source
            .match_triples(subject, p, object, origin)
            .map(|m| (m.subject, m.object))
            .collect(),
        PathExpression::Inverse(inner) => direct_step(inner, object, subject, source, origin)
            .into_iter()
            .map(|(s, o)| (o, s))
            .collect(),
        PathExpression::Sequence(l, r) => {
            let mid = wildcard();
            let mut out = Vec::new();
            for (s, m) in direct_step(l, subject, &mid, source, origin) {
                for (_, o) in direct_step(r, &m, object, source, origin) {
                    out.push((s.clone(), o));
                }
            }
            dedup_pairs(out)
        }
        PathExpression::Alternative(l, r) => {
            let mut out = direct_step(l, subject, object, source, origin);
            out.extend(direct_step(r, subject, object, source, origin));
            dedup_pairs(out)
        }
        PathExpression::ZeroOrMore(inner) => closure(inner, subject, object, source, origin, true),
        PathExpression::OneOrMore(inner) => closure(inner, subject, object, source, origin, false),
        PathExpression::ZeroOrOne(inner) => {
            let mut out = direct_step(inner, subject, object, source, origin);
            out.extend(reflexive_pairs(subject, object, source, origin));
            dedup_pairs(out)
        }
        PathExpression::NegatedPropertySet(excluded) => source
            .match_triples(subject, &wildcard(), object, origin)
            .filter(|m| !excluded.iter().any(|p| p.same_term(&m.predicate)))
            .map(|m| (m.subject, m.object))
            .collect(),
    }
}

fn closure(
    inner: &PathExpression,
    subject: &Literal,
    object: &Literal,
    source: &dyn TriplesSource,
    origin: Option<&Literal>,
    zero_allowed: bool,
) -> Vec<(Literal, Literal)> {
    let starts: Vec<Literal> = if subject.is_variable() {
        all_nodes(source, origin)
    } else {
        vec![subject.clone()]
    };

    let mut out = Vec::new();
    for start in starts {
        let mut visited = vec![start.clone()];
        let mut frontier = vec![start.clone()];
        if zero_allowed {
            out.push((start.clone(), start.clone()));
        }
        let mut depth = 0;
        while !frontier.is_empty() && depth < MAX_PATH_DEPTH {
            let mut next = Vec::new();
            for node in &frontier {
                for (_, reached) in direct_step(inner, node, &wildcard(), source, origin) {
                    if !visited.iter().any(|v| v.same_term(&reached)) {
                        visited.push(reached.clone());
                        next.push(reached.clone());
                        out.push((start.clone(), reached));
                    }
                }
            }
            frontier = next;
            depth += 1;
        }
    }

    if !object.is_variable() {
        out.retain(|(_, o)| o.same_term(object));
    }
    dedup_pairs(out)
}

/// Property-path evaluation (SPEC_FULL.md §3). Bare `Predicate` steps never reach
/// here at the top level — the compiler lowers them directly into a `Bgp` triple — but
/// they do appear nested inside composite paths, which this walk handles uniformly.
pub struct PathRowSource {
    schema: Arc<RowSchema>,
    rows: Vec<Row>,
    idx: usize,
}

impl PathRowSource {
    pub fn new(
        subject: &Literal,
        path: &PathExpression,
        object: &Literal,
        source: &dyn TriplesSource,
        origin: Option<&Literal>,
    ) -> Self {
        let pairs = direct_step(path, subject, object, source, origin);

        let subject_offset = subject.as_variable_offset();
        let object_offset = object.as_variable_offset();
        let mut offsets = Vec::new();
        if let Some(o) = subject_offset {
            offsets.push(o);
        }
        if let Some(o) = object_offset {
            if Some(o) != subject_offset {
                offsets.push(o);
            }
        }
        let schema = Arc::new(RowSchema::new(offsets));

        let rows = pairs
            .into_iter()
            .map(|(s, o)| {
                let cells = schema
                    .variables()
                    .iter()
                    .map(|offset| {
                        if Some(*offset) == subject_offset {
                            Some(s.clone())
                        } else if Some(*offset) == object_offset {
                            Some(o.clone())
                        } else {
                            None
                        }
                    })
                    .collect();
                Row::new(Arc::clone(&schema), cells)
            })
            .collect();

        Self { schema, rows, idx: 0 }
    }
}

impl RowSource for PathRowSource {
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
    use crate::triples_source::MemoryTriplesSource;

    fn uri(s: &str) -> Literal {
        Literal::Uri(oxrdf::NamedNode::new(s).unwrap())
    }

    #[test]
    fn zero_or_more_includes_the_start_node() {
        let source = MemoryTriplesSource::new();
        source.insert(uri("urn:a"), uri("urn:knows"), uri("urn:b"), None);
        source.insert(uri("urn:b"), uri("urn:knows"), uri("urn:c"), None);

        let path = PathExpression::ZeroOrMore(Box::new(PathExpression::Predicate(uri("urn:knows"))));
        let object = Literal::Variable(0, "o".into());
        let mut rows = PathRowSource::new(&uri("urn:a"), &path, &object, &source, None);
        let all = rows.read_all_rows();
        let reached: Vec<_> = all.iter().map(|r| r.get(0).cloned().unwrap()).collect();
        assert!(reached.iter().any(|l| l.same_term(&uri("urn:a"))));
        assert!(reached.iter().any(|l| l.same_term(&uri("urn:b"))));
        assert!(reached.iter().any(|l| l.same_term(&uri("urn:c"))));
    }

    #[test]
    fn one_or_more_excludes_the_start_node_unless_reachable() {
        let source = MemoryTriplesSource::new();
        source.insert(uri("urn:a"), uri("urn:knows"), uri("urn:b"), None);

        let path = PathExpression::OneOrMore(Box::new(PathExpression::Predicate(uri("urn:knows"))));
        let object = Literal::Variable(0, "o".into());
        let mut rows = PathRowSource::new(&uri("urn:a"), &path, &object, &source, None);
        let all = rows.read_all_rows();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].get(0), Some(&uri("urn:b")));
    }

    #[test]
    fn inverse_swaps_endpoints() {
        let source = MemoryTriplesSource::new();
        source.insert(uri("urn:a"), uri("urn:knows"), uri("urn:b"), None);

        let path = PathExpression::Inverse(Box::new(PathExpression::Predicate(uri("urn:knows"))));
        let subject = Literal::Variable(0, "s".into());
        let mut rows = PathRowSource::new(&subject, &path, &uri("urn:a"), &source, None);
        let all = rows.read_all_rows();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].get(0), Some(&uri("urn:b")));
    }
}
