use crate::Literal;
use crate::error::{ThinError, ThinResult};
use oxsdatatypes::{Decimal, Double, Integer};
use std::cmp::Ordering;

/// The numeric subset of [`Literal`], extracted so arithmetic and comparison operators
/// (§4.2) can promote operands without re-matching the full term sum each time. Mirrors
/// the teacher's `datamodel::xsd::numeric::Numeric`/`NumericPair`, minus the `xsd:int`
/// variant the spec's data model does not carry (spec §3 only names `Integer`, `Decimal`
/// and `Double`).
#[derive(Copy, Clone, Debug)]
pub enum Numeric {
    Integer(Integer),
    Decimal(Decimal),
    Double(Double),
}

impl Numeric {
    pub fn from_literal(literal: &Literal) -> ThinResult<Self> {
        match literal {
            Literal::Integer(i) => Ok(Self::Integer(*i)),
            Literal::Decimal(d) => Ok(Self::Decimal(*d)),
            Literal::Double(d) => Ok(Self::Double(*d)),
            _ => ThinError::expected(),
        }
    }

    pub fn into_literal(self) -> Literal {
        match self {
            Self::Integer(v) => Literal::Integer(v),
            Self::Decimal(v) => Literal::Decimal(v),
            Self::Double(v) => Literal::Double(v),
        }
    }
}

impl PartialEq for Numeric {
    fn eq(&self, other: &Self) -> bool {
        match NumericPair::promote(*self, *other) {
            NumericPair::Integer(a, b) => a == b,
            NumericPair::Decimal(a, b) => a == b,
            NumericPair::Double(a, b) => a == b,
        }
    }
}

impl PartialOrd for Numeric {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match NumericPair::promote(*self, *other) {
            NumericPair::Integer(a, b) => Some(a.cmp(&b)),
            NumericPair::Decimal(a, b) => Some(a.cmp(&b)),
            NumericPair::Double(a, b) => a.partial_cmp(&b),
        }
    }
}

/// A pair of numeric operands promoted to a common representation, following the
/// standard XSD numeric type promotion hierarchy `integer < decimal < float < double`
/// (restricted here to the three variants the data model carries).
pub enum NumericPair {
    Integer(Integer, Integer),
    Decimal(Decimal, Decimal),
    Double(Double, Double),
}

impl NumericPair {
    pub fn promote(lhs: Numeric, rhs: Numeric) -> Self {
        use Numeric::{Decimal as D, Double as Db, Integer as I};
        match (lhs, rhs) {
            (I(a), I(b)) => Self::Integer(a, b),
            (I(a), D(b)) => Self::Decimal(Decimal::from(a), b),
            (I(a), Db(b)) => Self::Double(Double::from(a), b),
            (D(a), I(b)) => Self::Decimal(a, Decimal::from(b)),
            (D(a), D(b)) => Self::Decimal(a, b),
            (D(a), Db(b)) => Self::Double(Double::from(a), b),
            (Db(a), I(b)) => Self::Double(a, Double::from(b)),
            (Db(a), D(b)) => Self::Double(a, Double::from(b)),
            (Db(a), Db(b)) => Self::Double(a, b),
        }
    }
}

/// `op` on two [`Literal`]s after promotion to a common numeric type, for the
/// arithmetic operators in `sparq-functions`.
pub fn checked_numeric_op(
    lhs: &Literal,
    rhs: &Literal,
    int_op: impl FnOnce(Integer, Integer) -> Option<Integer>,
    dec_op: impl FnOnce(Decimal, Decimal) -> Option<Decimal>,
    dbl_op: impl FnOnce(Double, Double) -> Double,
) -> ThinResult<Literal> {
    let lhs = Numeric::from_literal(lhs)?;
    let rhs = Numeric::from_literal(rhs)?;
    let result = match NumericPair::promote(lhs, rhs) {
        NumericPair::Integer(a, b) => Numeric::Integer(int_op(a, b).ok_or(ThinError)?),
        NumericPair::Decimal(a, b) => Numeric::Decimal(dec_op(a, b).ok_or(ThinError)?),
        NumericPair::Double(a, b) => Numeric::Double(dbl_op(a, b)),
    };
    Ok(result.into_literal())
}
