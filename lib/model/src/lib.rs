//! The RDF term, variable and row data model (spec §3) shared by the algebra
//! compiler, the expression evaluator, and the rowsource pipeline.
//!
//! Large portions of the value representation are built on top of
//! [`oxrdf`]/[`oxsdatatypes`] rather than reimplemented, the same way the teacher this
//! workspace was grown from leans on those upstream Oxigraph crates.

mod bindings;
mod error;
mod literal;
mod numeric;
mod pattern;
mod row;
mod variable;

pub use bindings::Bindings;
pub use error::{ModelError, ThinError, ThinResult};
pub use literal::Literal;
pub use numeric::{Numeric, NumericPair, checked_numeric_op};
pub use pattern::TriplePattern;
pub use row::{BindingsBlock, Row, RowSchema};
pub use variable::{Variable, VariableKind, VariablesTable};

// Re-export the upstream term types our `Literal` wraps, so downstream crates do not
// need a direct `oxrdf`/`oxiri`/`oxsdatatypes` dependency just to name a type.
pub use oxiri::Iri;
pub use oxrdf::{BlankNode, NamedNode};
pub use oxsdatatypes::{Boolean, DateTime, Decimal, Double, Integer};
