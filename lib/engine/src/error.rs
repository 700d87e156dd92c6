use thiserror::Error;

/// Errors raised while lowering a parsed graph pattern into algebra (§4.1). Unlike
/// [`sparq_model::ThinError`] these are not expected per-row outcomes: a [`Query`]
/// that hits one of these is marked failed (§7) and produces no algebra at all.
///
/// [`Query`]: crate::Query
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum CompileError {
    #[error("the SPARQL query could not be parsed: {0}")]
    Parse(String),
    #[error("found new aggregate expression in HAVING")]
    NewAggregateInHaving,
    #[error("property paths are not implemented: {0}")]
    UnsupportedPath(String),
    #[error("SPARQL Update is out of scope for this engine")]
    UpdateNotSupported,
    #[error("variable `{0}` is not registered in this query's variables table")]
    UnknownVariable(String),
    #[error("query language `{0}` is not supported")]
    UnsupportedLanguage(String),
}

/// Errors surfaced while pulling rows from a prepared query (§7 "Fatal"). Expression
/// evaluation failures never reach this type — they are absorbed per-row by the
/// rowsource that hit them (Filter drops the row, Project unbinds the cell, ...).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QueryEvaluationError {
    #[error("query has not been prepared, or preparation failed")]
    NotPrepared,
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("the triples source failed: {0}")]
    Source(String),
}
