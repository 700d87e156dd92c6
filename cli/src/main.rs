//! `sparq`: a command line SPARQL query runner and W3C-manifest test-suite driver
//! built on top of the `sparq-engine`/`sparq-model`/`sparq-functions` crates.

mod cli;
mod manifest;
mod query;
mod report;

use anyhow::Result;
use clap::Parser;
use cli::{Args, Command};
use std::process::ExitCode;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let result = match args.command {
        Command::Query {
            query,
            query_string,
            data,
            named_graph,
            base,
            union_default_graph,
            explain,
            seed,
        } => query::run(query::QueryArgs {
            query_file: query,
            query_string,
            data,
            named_graph,
            base,
            union_default_graph,
            explain,
            seed,
        }),
        Command::Test { manifest, verbose } => run_test(&manifest, verbose),
    };

    if let Err(err) = result {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run_test(manifests: &[std::path::PathBuf], verbose: bool) -> Result<()> {
    let mut total = report::Summary::default();
    for path in manifests {
        let outcomes = manifest::run_manifest(path)?;
        for outcome in &outcomes {
            if verbose {
                println!("{} {}", outcome.state.short_code(), outcome.name);
                if let Some(detail) = &outcome.detail {
                    if outcome.state.is_failure() {
                        println!("    {detail}");
                    }
                }
            }
            total.record(outcome.state);
        }
    }
    println!("{total}");
    if total.failed() {
        anyhow::bail!("test suite reported failures");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic_in_result_fn)]
mod tests {
    use anyhow::Result;
    use assert_cmd::Command;
    use assert_fs::prelude::*;
    use assert_fs::NamedTempFile;
    use predicates::prelude::*;

    fn cli_command() -> Command {
        let mut command = Command::new(env!("CARGO"));
        command
            .arg("run")
            .arg("--bin")
            .arg("sparq")
            .arg("--");
        command
    }

    #[test]
    fn cli_help() {
        cli_command()
            .assert()
            .failure()
            .stderr(predicate::str::contains("sparq"));
    }

    #[test]
    fn cli_query_select_prints_one_row_per_solution() -> Result<()> {
        let data_file = NamedTempFile::new("data.ttl")?;
        data_file.write_str("<urn:a> <urn:p> 1 .\n<urn:b> <urn:p> 2 .\n")?;

        cli_command()
            .arg("query")
            .arg("--data")
            .arg(data_file.path())
            .arg("--query-string")
            .arg("SELECT ?o WHERE { ?s <urn:p> ?o } ORDER BY ?o")
            .assert()
            .success()
            .stdout(predicate::str::contains("row[o=1]").and(predicate::str::contains("row[o=2]")));
        Ok(())
    }

    #[test]
    fn cli_query_ask_prints_a_boolean() -> Result<()> {
        let data_file = NamedTempFile::new("data.ttl")?;
        data_file.write_str("<urn:a> <urn:p> 1 .\n")?;

        cli_command()
            .arg("query")
            .arg("--data")
            .arg(data_file.path())
            .arg("--query-string")
            .arg("ASK { ?s <urn:p> 1 }")
            .assert()
            .success()
            .stdout("true\n");
        Ok(())
    }

    #[test]
    fn cli_query_explain_prints_the_algebra_instead_of_running() -> Result<()> {
        let data_file = NamedTempFile::new("data.ttl")?;
        data_file.write_str("<urn:a> <urn:p> 1 .\n")?;

        cli_command()
            .arg("query")
            .arg("--data")
            .arg(data_file.path())
            .arg("--query-string")
            .arg("SELECT ?o WHERE { ?s <urn:p> ?o }")
            .arg("--explain")
            .assert()
            .success();
        Ok(())
    }

    #[test]
    fn clap_debug() {
        use clap::CommandFactory;
        use crate::cli::Args;

        Args::command().debug_assert()
    }
}
