//! The `query` subcommand: load RDF data files into an in-memory triples source, run
//! one SPARQL query over them, and print the results in the manifest-facing textual
//! forms `sparq-engine` already defines (§6) — this binary does no serialization work
//! of its own, consistent with spec.md's "result-set formatters... are out of scope"
//! (those cover XML/JSON/CSV; the plain debugging form below is the engine's own).

use anyhow::{bail, Context, Result};
use sparq_engine::{
    format_row, MemoryTriplesSource, QueryLanguage, QueryOptions, QueryResults, World,
};
use sparq_model::Literal;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

pub struct QueryArgs {
    pub query_file: Option<PathBuf>,
    pub query_string: Option<String>,
    pub data: Vec<PathBuf>,
    pub named_graph: Vec<String>,
    pub base: Option<String>,
    pub union_default_graph: bool,
    pub explain: bool,
    pub seed: Option<u64>,
}

pub fn run(args: QueryArgs) -> Result<()> {
    let text = match (&args.query_file, &args.query_string) {
        (Some(path), _) => fs::read_to_string(path)
            .with_context(|| format!("reading query file {}", path.display()))?,
        (None, Some(s)) => s.clone(),
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading query text from stdin")?;
            buf
        }
    };

    let source = MemoryTriplesSource::new();
    for file in &args.data {
        load_file(&source, file, None).with_context(|| format!("loading {}", file.display()))?;
    }
    for pair in &args.named_graph {
        let (uri, file) = pair
            .split_once('=')
            .with_context(|| format!("expected URI=FILE, got `{pair}`"))?;
        let graph = Literal::Uri(
            oxrdf::NamedNode::new(uri).with_context(|| format!("invalid graph URI `{uri}`"))?,
        );
        load_file(&source, Path::new(file), Some(graph))
            .with_context(|| format!("loading {file}"))?;
    }

    let world = World::new();
    let options = QueryOptions {
        default_graph_union: args.union_default_graph,
        no_net: false,
        seed: args.seed,
    };
    let mut query = world.create_query(QueryLanguage::Sparql, &source, options);
    query.prepare(&text, args.base.as_deref());
    if !query.is_prepared() {
        bail!("query failed to prepare (see log output above for the parse/compile error)");
    }

    if args.explain {
        println!("{}", query.explain().unwrap_or_default());
        return Ok(());
    }

    match query.execute()? {
        QueryResults::Solutions(rows, variables) => {
            for row in &rows {
                println!("{}", format_row(row, &variables));
            }
            eprintln!("{} row(s)", rows.len());
        }
        QueryResults::Boolean(b) => println!("{b}"),
        QueryResults::Graph(triples) => {
            for triple in &triples {
                println!("{triple} .");
            }
        }
    }
    Ok(())
}

fn load_file(source: &MemoryTriplesSource, path: &Path, graph: Option<Literal>) -> Result<()> {
    let data = fs::read_to_string(path)?;
    let base = path.to_str();
    match path.extension().and_then(|e| e.to_str()) {
        Some("nt") => {
            source.load_n_triples(&data, graph)?;
        }
        _ => {
            source.load_turtle(&data, base, graph)?;
        }
    }
    Ok(())
}
