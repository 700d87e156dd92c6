//! The triples source adapter (spec §6): the one external collaborator the core
//! consumes for data access. `TriplesSource` is deliberately narrow — a ground-triple
//! probe and a pattern-match iterator — so any backing store (in-memory, on-disk,
//! federated) can sit behind it without the rest of the engine knowing the
//! difference.

use sparq_model::Literal;
use std::sync::RwLock;

/// One matched ground triple, in triples-source storage order (no guarantee beyond
/// "deterministic relative to insertion", §5 Ordering guarantees).
#[derive(Clone, Debug, PartialEq)]
pub struct MatchedTriple {
    pub subject: Literal,
    pub predicate: Literal,
    pub object: Literal,
}

/// The external interface §6 describes: "is this ground triple present?" and
/// "iterate triples matching this pattern". A `Literal::Variable` in any position of
/// `subject`/`predicate`/`object` is a wildcard for that position; `origin` scopes the
/// match to a named graph (`None` = default graph).
pub trait TriplesSource: Send + Sync {
    fn triple_present(
        &self,
        subject: &Literal,
        predicate: &Literal,
        object: &Literal,
        origin: Option<&Literal>,
    ) -> bool;

    fn match_triples<'a>(
        &'a self,
        subject: &Literal,
        predicate: &Literal,
        object: &Literal,
        origin: Option<&Literal>,
    ) -> Box<dyn Iterator<Item = MatchedTriple> + 'a>;

    /// The distinct named-graph origins known to this source, for `GRAPH ?g { }`
    /// iterating over all graphs.
    fn origins(&self) -> Vec<Literal> {
        Vec::new()
    }
}

#[derive(Clone, Debug, PartialEq)]
struct StoredQuad {
    subject: Literal,
    predicate: Literal,
    object: Literal,
    graph: Option<Literal>,
}

/// A reference in-memory triples source (spec §9 Non-goals: "the system does not
/// persist data" — this is the store a caller plugs in when it has no real backing
/// store of its own). Backed by a flat, unindexed `Vec`, matching the spec's
/// "no cost-based optimization" stance: every match is a linear scan.
#[derive(Default)]
pub struct MemoryTriplesSource {
    quads: RwLock<Vec<StoredQuad>>,
}

impl MemoryTriplesSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, subject: Literal, predicate: Literal, object: Literal, graph: Option<Literal>) {
        self.quads.write().unwrap().push(StoredQuad {
            subject,
            predicate,
            object,
            graph,
        });
    }

    /// Parses `data` as one of the upstream `oxttl` formats and inserts every produced
    /// quad into `graph` (or the quad's own graph name, for quad-based formats).
    pub fn load_n_triples(
        &self,
        data: &str,
        graph: Option<Literal>,
    ) -> Result<usize, oxttl::ParseError> {
        let mut count = 0;
        for triple in oxttl::NTriplesParser::new().for_reader(data.as_bytes()) {
            let triple = triple?;
            self.insert(
                subject_to_literal(&triple.subject),
                Literal::Uri(triple.predicate),
                term_to_literal(&triple.object),
                graph.clone(),
            );
            count += 1;
        }
        Ok(count)
    }

    pub fn load_turtle(
        &self,
        data: &str,
        base_iri: Option<&str>,
        graph: Option<Literal>,
    ) -> Result<usize, oxttl::TurtleParseError> {
        let mut parser = oxttl::TurtleParser::new();
        if let Some(base) = base_iri {
            parser = parser.with_base_iri(base).map_err(oxttl::TurtleParseError::from)?;
        }
        let mut count = 0;
        for triple in parser.for_reader(data.as_bytes()) {
            let triple = triple?;
            self.insert(
                subject_to_literal(&triple.subject),
                Literal::Uri(triple.predicate),
                term_to_literal(&triple.object),
                graph.clone(),
            );
            count += 1;
        }
        Ok(count)
    }
}

fn subject_to_literal(subject: &oxrdf::Subject) -> Literal {
    match subject {
        oxrdf::Subject::NamedNode(n) => Literal::Uri(n.clone()),
        oxrdf::Subject::BlankNode(b) => Literal::Blank(b.clone()),
        #[cfg(feature = "rdf-star")]
        oxrdf::Subject::Triple(_) => Literal::Blank(oxrdf::BlankNode::default()),
    }
}

fn term_to_literal(term: &oxrdf::Term) -> Literal {
    match term {
        oxrdf::Term::NamedNode(n) => Literal::Uri(n.clone()),
        oxrdf::Term::BlankNode(b) => Literal::Blank(b.clone()),
        oxrdf::Term::Literal(l) => Literal::from_oxrdf(l),
        #[cfg(feature = "rdf-star")]
        oxrdf::Term::Triple(_) => Literal::Blank(oxrdf::BlankNode::default()),
    }
}

fn matches(pattern: &Literal, value: &Literal) -> bool {
    pattern.is_variable() || pattern.same_term(value)
}

fn origin_matches(origin: Option<&Literal>, graph: Option<&Literal>) -> bool {
    match (origin, graph) {
        (None, None) => true,
        (None, Some(_)) => false,
        (Some(o), g) => o.is_variable() || g.is_some_and(|g| o.same_term(g)),
    }
}

impl TriplesSource for MemoryTriplesSource {
    fn triple_present(
        &self,
        subject: &Literal,
        predicate: &Literal,
        object: &Literal,
        origin: Option<&Literal>,
    ) -> bool {
        debug_assert!(!subject.is_variable() && !predicate.is_variable() && !object.is_variable());
        self.quads.read().unwrap().iter().any(|q| {
            q.subject.same_term(subject)
                && q.predicate.same_term(predicate)
                && q.object.same_term(object)
                && origin_matches(origin, q.graph.as_ref())
        })
    }

    fn match_triples<'a>(
        &'a self,
        subject: &Literal,
        predicate: &Literal,
        object: &Literal,
        origin: Option<&Literal>,
    ) -> Box<dyn Iterator<Item = MatchedTriple> + 'a> {
        let subject = subject.clone();
        let predicate = predicate.clone();
        let object = object.clone();
        let origin = origin.cloned();
        let snapshot = self.quads.read().unwrap().clone();
        Box::new(snapshot.into_iter().filter_map(move |q| {
            if matches(&subject, &q.subject)
                && matches(&predicate, &q.predicate)
                && matches(&object, &q.object)
                && origin_matches(origin.as_ref(), q.graph.as_ref())
            {
                Some(MatchedTriple {
                    subject: q.subject,
                    predicate: q.predicate,
                    object: q.object,
                })
            } else {
                None
            }
        }))
    }

    fn origins(&self) -> Vec<Literal> {
        let mut seen = Vec::new();
        for q in self.quads.read().unwrap().iter() {
            if let Some(g) = &q.graph {
                if !seen.iter().any(|s: &Literal| s.same_term(g)) {
                    seen.push(g.clone());
                }
            }
        }
        seen
    }
}

/// Wraps a [`TriplesSource`] so an unscoped match (`origin = None`, the default graph)
/// also sees every named graph's triples — the `default_graph_union` toggle in
/// [`crate::QueryOptions`] (SPEC_FULL.md §2 "Configuration"). A `GRAPH <name>` or
/// `GRAPH ?g` block still only sees the graph(s) it names; only the unscoped case is
/// widened.
pub struct UnionDefaultGraphSource<'a> {
    inner: &'a dyn TriplesSource,
}

impl<'a> UnionDefaultGraphSource<'a> {
    pub fn new(inner: &'a dyn TriplesSource) -> Self {
        Self { inner }
    }
}

impl<'a> TriplesSource for UnionDefaultGraphSource<'a> {
    fn triple_present(
        &self,
        subject: &Literal,
        predicate: &Literal,
        object: &Literal,
        origin: Option<&Literal>,
    ) -> bool {
        if origin.is_some() {
            return self.inner.triple_present(subject, predicate, object, origin);
        }
        self.inner.triple_present(subject, predicate, object, None)
            || self
                .inner
                .origins()
                .iter()
                .any(|g| self.inner.triple_present(subject, predicate, object, Some(g)))
    }

    fn match_triples<'b>(
        &'b self,
        subject: &Literal,
        predicate: &Literal,
        object: &Literal,
        origin: Option<&Literal>,
    ) -> Box<dyn Iterator<Item = MatchedTriple> + 'b> {
        if origin.is_some() {
            return self.inner.match_triples(subject, predicate, object, origin);
        }
        let mut all: Vec<MatchedTriple> = self.inner.match_triples(subject, predicate, object, None).collect();
        for graph in self.inner.origins() {
            all.extend(self.inner.match_triples(subject, predicate, object, Some(&graph)));
        }
        Box::new(all.into_iter())
    }

    fn origins(&self) -> Vec<Literal> {
        self.inner.origins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(s: &str) -> Literal {
        Literal::Uri(oxrdf::NamedNode::new(s).unwrap())
    }

    #[test]
    fn ground_probe_and_pattern_match_round_trip() {
        let source = MemoryTriplesSource::new();
        source.insert(uri("urn:a"), uri("urn:p"), Literal::Integer(3.into()), None);

        assert!(source.triple_present(&uri("urn:a"), &uri("urn:p"), &Literal::Integer(3.into()), None));
        assert!(!source.triple_present(&uri("urn:a"), &uri("urn:p"), &Literal::Integer(4.into()), None));

        let var = Literal::Variable(0, "v".into());
        let matched: Vec<_> = source.match_triples(&uri("urn:a"), &uri("urn:p"), &var, None).collect();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].object, Literal::Integer(3.into()));
    }

    #[test]
    fn named_graph_scoping() {
        let source = MemoryTriplesSource::new();
        let g = uri("urn:g");
        source.insert(uri("urn:a"), uri("urn:p"), Literal::Integer(1.into()), Some(g.clone()));

        assert!(!source.triple_present(&uri("urn:a"), &uri("urn:p"), &Literal::Integer(1.into()), None));
        assert!(source.triple_present(&uri("urn:a"), &uri("urn:p"), &Literal::Integer(1.into()), Some(&g)));
    }

    #[test]
    fn union_default_graph_widens_unscoped_matches_only() {
        let source = MemoryTriplesSource::new();
        let g = uri("urn:g");
        source.insert(uri("urn:a"), uri("urn:p"), Literal::Integer(1.into()), Some(g.clone()));
        let union = UnionDefaultGraphSource::new(&source);

        assert!(union.triple_present(&uri("urn:a"), &uri("urn:p"), &Literal::Integer(1.into()), None));
        assert!(union.triple_present(&uri("urn:a"), &uri("urn:p"), &Literal::Integer(1.into()), Some(&g)));
        assert!(!union.triple_present(&uri("urn:a"), &uri("urn:p"), &Literal::Integer(1.into()), Some(&uri("urn:other"))));

        let var = Literal::Variable(0, "v".into());
        let matched: Vec<_> = union.match_triples(&uri("urn:a"), &uri("urn:p"), &var, None).collect();
        assert_eq!(matched.len(), 1);
    }
}
