use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about, version, name = "sparq")]
/// sparq SPARQL query engine command line toolkit
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a SPARQL query over one or more RDF data files
    Query {
        /// File to read the query text from
        ///
        /// If neither this nor --query-string is given, the query is read from stdin.
        #[arg(short, long, value_hint = ValueHint::FilePath, conflicts_with = "query_string")]
        query: Option<PathBuf>,
        /// The query text itself, given directly on the command line
        #[arg(long)]
        query_string: Option<String>,
        /// A Turtle or N-Triples file to load into the default graph
        ///
        /// May be given more than once; every file is loaded into the same default graph.
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        data: Vec<PathBuf>,
        /// A `<named-graph-uri>=<file>` pair to load into a named graph
        #[arg(long = "named-graph", value_name = "URI=FILE")]
        named_graph: Vec<String>,
        /// Base IRI used to resolve relative IRIs in the query
        #[arg(long, value_hint = ValueHint::Url)]
        base: Option<String>,
        /// Widen every unscoped triple pattern to the union of the default graph and
        /// every named graph (§5's `default_graph_union` toggle)
        #[arg(long)]
        union_default_graph: bool,
        /// Print the compiled algebra's textual form (§6) instead of running the query
        #[arg(long)]
        explain: bool,
        /// Fix the PRNG seed used for `BNODE()`/`RAND()`/`UUID()`, for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run a W3C-manifest-style test suite against the engine (§6/§8)
    Test {
        /// Path to one or more `mf:Manifest` Turtle files
        manifest: Vec<PathBuf>,
        /// Print one line per test instead of only the summary
        #[arg(short, long)]
        verbose: bool,
    },
}
