use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// A light-weight result, used pervasively by the expression evaluator (§4.2) and by
/// the scalar RDF operators in `sparq-functions`.
pub type ThinResult<T> = Result<T, ThinError>;

/// A thin error type that indicates an *expected* failure without any reason.
///
/// SPARQL expression evaluation routinely fails for reasons that are themselves part
/// of the language semantics (type mismatch, unbound variable, division by zero...).
/// All of these are treated identically by callers (§4.2, §7: "does not abort the
/// pipeline"), so there is no value in storing why the error occurred.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Default)]
#[error("an expected evaluation error occurred")]
pub struct ThinError;

impl ThinError {
    pub fn expected<T>() -> ThinResult<T> {
        Err(ThinError)
    }
}

macro_rules! implement_from {
    ($t:ty) => {
        impl From<$t> for ThinError {
            fn from(_: $t) -> Self {
                ThinError
            }
        }
    };
}

implement_from!(ParseIntError);
implement_from!(ParseFloatError);
implement_from!(oxsdatatypes::ParseDecimalError);
implement_from!(oxsdatatypes::ParseDateTimeError);
implement_from!(oxsdatatypes::DateTimeOverflowError);
implement_from!(oxsdatatypes::OppositeSignInDurationComponentsError);
implement_from!(oxrdf::BlankNodeIdParseError);
implement_from!(oxiri::IriParseError);
implement_from!(oxrdf::TermParseError);

/// An error raised while building the variables table or a triple pattern (distinct
/// from [`ThinError`]: these are *bugs* in how the compiler constructed the query, not
/// expected per-row failures).
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModelError {
    #[error("variable `{0}` is not registered in this query's variables table")]
    UnknownVariable(String),
    #[error("a language-tagged literal cannot also carry a non-string datatype")]
    LanguageWithDatatype,
}
