//! The algebra compiler and rowsource pipeline for the sparq SPARQL engine: parses a
//! query with `spargebra`, lowers its algebra into an [`algebra::AlgebraNode`] tree
//! (§4), then builds a [`rowsource::RowSource`] pipeline over it (§4.3) that a caller
//! pulls rows from through [`Query`]/[`QueryResults`] (§6, "Query-engine factory
//! surface").

pub mod algebra;
mod bgp;
mod convert;
mod error;
mod exists;
mod results;
pub mod rowsource;
mod sparql;
pub mod triples_source;

pub use error::{CompileError, QueryEvaluationError};
pub use results::format_row;
pub use sparql::QueryForm;
pub use triples_source::{MatchedTriple, MemoryTriplesSource, TriplesSource, UnionDefaultGraphSource};

use algebra::AlgebraNode;
use exists::{ExistsEvaluator, ExistsRegistry};
use rowsource::{build, BuildContext, RowSource};
use sparq_functions::EvaluationContext;
use sparq_model::{Bindings, DateTime, Literal, Row, VariablesTable};
use sparql::{instantiate, PreparedQuery};
use std::collections::HashMap;
use std::sync::Arc;

/// The query language a [`Query`] is prepared for (§6). Rasqal's own factory surface
/// takes a language *name* at query-creation time (`"sparql"`, `"rdql"`, ...); this
/// engine only implements SPARQL, so `Rdql` exists to give that factory argument a
/// typed rejection instead of silently parsing RDQL syntax as SPARQL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryLanguage {
    Sparql,
    Rdql,
}

/// Preparation-time configuration (SPEC_FULL.md §2 "Configuration"), passed once to
/// [`Query::new`] rather than mutated mid-lifecycle — mirrors the teacher's
/// `QueryOptions` argument to `evaluate_query`.
#[derive(Clone, Debug)]
pub struct QueryOptions {
    /// Widens every unscoped (no `GRAPH`) triple pattern match to the union of the
    /// default graph and every named graph, via [`UnionDefaultGraphSource`].
    pub default_graph_union: bool,
    /// Mirrors spec §5's `NO_NET` flag. The `Service` algebra node never executes a
    /// network request regardless of this flag (§9 Open Question, resolved: SERVICE
    /// compiles to a no-op that warns and yields zero rows) — the flag is carried here
    /// so a caller's intent is recorded and can gate a future real SERVICE executor,
    /// but it has no enforcement point to gate today.
    pub no_net: bool,
    /// A fixed PRNG seed for reproducible `BNODE()`/`RAND()`/`UUID()` evaluation
    /// (§7 scenario determinism). `None` draws a fresh seed per [`Query::execute`] call
    /// from the system RNG.
    pub seed: Option<u64>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            default_graph_union: false,
            no_net: false,
            seed: None,
        }
    }
}

/// The world a query is created in (§6: "create a world"). Rasqal's world is a
/// reference-counted registry of loaded query-language plugins and global state; this
/// engine has exactly one language and no global state to register, so `World` is a
/// near-zero-sized factory kept only so [`Query::new`]'s call shape matches the
/// spec'd "world creates queries" lifecycle rather than a bare constructor function.
#[derive(Clone, Copy, Debug, Default)]
pub struct World;

impl World {
    pub fn new() -> Self {
        Self
    }

    /// Creates a query for `language`, bound to `source` for its whole lifetime (§3
    /// "Query object" Lifecycle: "the triples sequence is shared with the query and
    /// must not be freed by the algebra").
    pub fn create_query<'a>(
        &self,
        language: QueryLanguage,
        source: &'a dyn TriplesSource,
        options: QueryOptions,
    ) -> Query<'a> {
        Query {
            source,
            language,
            options,
            state: QueryState::Unprepared,
        }
    }
}

enum QueryState {
    Unprepared,
    /// The query's `failed` bit (§7): once set, `execute` is a guarded no-op.
    Failed(CompileError),
    Prepared(PreparedQuery),
}

/// Owns the parsed form, compiled algebra, and (once executed) rowsource tree for one
/// query (§3 "Query object" Lifecycle). Dropping a `Query` drops all of that; `source`
/// is borrowed, never owned, so the caller's triples source outlives every query built
/// over it.
pub struct Query<'a> {
    source: &'a dyn TriplesSource,
    language: QueryLanguage,
    options: QueryOptions,
    state: QueryState,
}

/// What [`Query::execute`] produces, one variant per query form (§6/SPEC_FULL.md §3).
#[derive(Debug)]
pub enum QueryResults {
    /// `SELECT`: one row per solution, in solution-modifier order, each carrying its
    /// own projected-variable schema (§3 "Row" — "a fixed-width value array over the
    /// projected variables of its producing rowsource") so a caller can render columns
    /// in `SELECT`'s own order without re-deriving it from the query-wide
    /// [`VariablesTable`].
    Solutions(Vec<Row>, Arc<VariablesTable>),
    /// `ASK`: true iff the compiled pattern yielded at least one row.
    Boolean(bool),
    /// `CONSTRUCT`/`DESCRIBE`: the instantiated result graph, one `Vec` entry per
    /// template triple that resolved to ground RDF terms across every output row.
    Graph(Vec<oxrdf::Triple>),
}

impl<'a> Query<'a> {
    /// Parses and compiles `text` (§6 "prepare(string, base_uri)"). A failed prepare
    /// sets the query's failed state; every later [`Query::execute`] call then returns
    /// [`QueryEvaluationError::NotPrepared`] without re-attempting compilation.
    pub fn prepare(&mut self, text: &str, base_uri: Option<&str>) {
        if self.language != QueryLanguage::Sparql {
            self.state = QueryState::Failed(CompileError::UnsupportedLanguage(format!(
                "{:?}",
                self.language
            )));
            return;
        }
        match sparql::prepare(text, base_uri) {
            Ok(prepared) => self.state = QueryState::Prepared(prepared),
            Err(err) => self.state = QueryState::Failed(err),
        }
    }

    /// True once [`Query::prepare`] has succeeded and no later step has failed.
    pub fn is_prepared(&self) -> bool {
        matches!(self.state, QueryState::Prepared(_))
    }

    /// The compiled algebra tree's manifest-facing textual form (§6 "Algebra node
    /// textual form"), for a CLI `--explain` flag or test-suite debugging output.
    /// `None` if the query has not been prepared or preparation failed.
    pub fn explain(&self) -> Option<String> {
        match &self.state {
            QueryState::Prepared(prepared) => Some(prepared.root.to_string()),
            _ => None,
        }
    }

    /// Runs the compiled algebra to completion and returns its results (§6 "execute").
    /// A no-op on an unprepared or failed query — it returns
    /// [`QueryEvaluationError::NotPrepared`] rather than panicking, consistent with
    /// Rasqal's "further `execute()` calls become no-ops" rule (§6).
    pub fn execute(&mut self) -> Result<QueryResults, QueryEvaluationError> {
        let prepared = match &self.state {
            QueryState::Prepared(prepared) => prepared,
            _ => return Err(QueryEvaluationError::NotPrepared),
        };

        let now = DateTime::now().map_err(|e| QueryEvaluationError::Source(e.to_string()))?;
        let seed = self.options.seed.unwrap_or_else(rand::random);
        let eval_ctx = EvaluationContext::new(prepared.base_iri.clone(), now, seed);
        let exists_eval = ExistsEvaluator::new(
            &prepared.exists,
            self.source,
            prepared.base_iri.clone(),
            now,
            seed,
        );
        let eval_ctx = eval_ctx.with_exists_probe(&exists_eval);

        let union_source;
        let source: &dyn TriplesSource = if self.options.default_graph_union {
            union_source = UnionDefaultGraphSource::new(self.source);
            &union_source
        } else {
            self.source
        };

        let build_ctx = BuildContext {
            source,
            exists: &prepared.exists,
            eval_ctx: &eval_ctx,
        };
        let mut rows = build(&prepared.root, &build_ctx, None);

        match &prepared.form {
            sparql::QueryForm::Select => {
                let out = rows.read_all_rows();
                Ok(QueryResults::Solutions(out, Arc::new(prepared.variables.clone())))
            }
            sparql::QueryForm::Ask => Ok(QueryResults::Boolean(rows.read_row().is_some())),
            sparql::QueryForm::Construct(template) | sparql::QueryForm::Describe(template) => {
                let schema = Arc::clone(rows.schema());
                let mut graph = Vec::new();
                while let Some(row) = rows.read_row() {
                    let bindings = Arc::new(Bindings::Empty).extended_with_row(schema.variables(), row.cells());
                    let mut scope: HashMap<sparq_model::BlankNode, sparq_model::BlankNode> = HashMap::new();
                    graph.extend(instantiate(template, &bindings, &mut scope));
                }
                dedup_triples(&mut graph);
                Ok(QueryResults::Graph(graph))
            }
        }
    }
}

fn dedup_triples(triples: &mut Vec<oxrdf::Triple>) {
    let mut seen = std::collections::HashSet::new();
    triples.retain(|t| seen.insert(t.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(s: &str) -> Literal {
        Literal::Uri(oxrdf::NamedNode::new(s).unwrap())
    }

    fn populated_source() -> MemoryTriplesSource {
        let source = MemoryTriplesSource::new();
        source.insert(uri("urn:a"), uri("urn:p"), Literal::Integer(1.into()), None);
        source.insert(uri("urn:b"), uri("urn:p"), Literal::Integer(2.into()), None);
        source
    }

    #[test]
    fn select_returns_one_row_per_match() {
        let source = populated_source();
        let world = World::new();
        let mut query = world.create_query(QueryLanguage::Sparql, &source, QueryOptions::default());
        query.prepare("SELECT ?o WHERE { ?s <urn:p> ?o }", None);
        assert!(query.is_prepared());
        match query.execute().unwrap() {
            QueryResults::Solutions(rows, _) => assert_eq!(rows.len(), 2),
            other => panic!("expected Solutions, got a different form"),
        }
    }

    #[test]
    fn ask_reports_whether_any_row_matched() {
        let source = populated_source();
        let world = World::new();
        let mut query = world.create_query(QueryLanguage::Sparql, &source, QueryOptions::default());
        query.prepare("ASK { ?s <urn:p> 1 }", None);
        assert!(matches!(query.execute().unwrap(), QueryResults::Boolean(true)));

        let mut query = world.create_query(QueryLanguage::Sparql, &source, QueryOptions::default());
        query.prepare("ASK { ?s <urn:p> 99 }", None);
        assert!(matches!(query.execute().unwrap(), QueryResults::Boolean(false)));
    }

    #[test]
    fn construct_instantiates_a_triple_per_row() {
        let source = populated_source();
        let world = World::new();
        let mut query = world.create_query(QueryLanguage::Sparql, &source, QueryOptions::default());
        query.prepare("CONSTRUCT { ?s <urn:copy> ?o } WHERE { ?s <urn:p> ?o }", None);
        match query.execute().unwrap() {
            QueryResults::Graph(triples) => assert_eq!(triples.len(), 2),
            _ => panic!("expected Graph"),
        }
    }

    #[test]
    fn unprepared_query_fails_to_execute() {
        let source = populated_source();
        let world = World::new();
        let mut query = world.create_query(QueryLanguage::Sparql, &source, QueryOptions::default());
        assert!(matches!(query.execute(), Err(QueryEvaluationError::NotPrepared)));
    }

    #[test]
    fn rdql_language_is_rejected_at_prepare_time() {
        let source = populated_source();
        let world = World::new();
        let mut query = world.create_query(QueryLanguage::Rdql, &source, QueryOptions::default());
        query.prepare("SELECT ?o WHERE { ?s <urn:p> ?o }", None);
        assert!(!query.is_prepared());
        assert!(matches!(
            query.execute(),
            Err(QueryEvaluationError::NotPrepared)
        ));
    }
}
