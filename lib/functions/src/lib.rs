//! The SPARQL expression evaluator (spec §4.2): a recursive tagged-sum expression
//! tree over [`sparq_model::Literal`], a seeded [`EvaluationContext`], and the ~50
//! scalar/aggregate operators. Never panics and never logs on an expected evaluation
//! failure — every operator returns a [`sparq_model::ThinResult`].

mod cast;
mod context;
mod eval;
mod expr;
mod hashing;
mod langmatches;

pub use context::{EvaluationContext, ExistsProbe, ExistsMode};
pub use eval::evaluate;
pub use expr::{AggregateExpression, AggregateFunction, Expression};
pub use langmatches::lang_matches;
