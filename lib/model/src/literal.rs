use crate::error::ThinError;
use oxrdf::{BlankNode, NamedNode};
use oxsdatatypes::{Boolean, DateTime, Decimal, Double, Integer};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// The RDF term tagged sum (§3). Strings and URIs are `Arc<str>`/[`NamedNode`] (itself
/// `Arc`-backed internally by `oxrdf`), giving the "cheap clone with interned content"
/// contract the spec asks for without a full arena.
///
/// Invariant: a [`Literal::PlainString`] with a language tag never also carries a
/// non-string datatype — that combination is represented by [`Literal::TypedString`]
/// for everything except `xsd:string`, and by the language tag itself when a language
/// is present. [`Literal::QName`] is only ever produced before prefix resolution; the
/// compiler resolves every `QName` to a [`Literal::Uri`] before it reaches the algebra.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Uri(NamedNode),
    Blank(BlankNode),
    /// `(prefix, local)`, pre-resolution only.
    QName(Arc<str>, Arc<str>),
    /// `(lexical value, language tag)`.
    PlainString(Arc<str>, Option<Arc<str>>),
    /// `(lexical value, datatype IRI)`. Not guaranteed syntactically valid for
    /// `datatype` — comparisons against an invalid typed string are errors (§3).
    TypedString(Arc<str>, NamedNode),
    Integer(Integer),
    Decimal(Decimal),
    Double(Double),
    Boolean(Boolean),
    DateTime(DateTime),
    /// A reference to a variable slot, resolved through a [`crate::Bindings`] map at
    /// evaluation time — not itself a value. Carries the variable's name alongside its
    /// offset purely so algebra/expression textual forms (§6) can render `?name`
    /// without threading a [`crate::VariablesTable`] handle through every `Display`
    /// call; the offset remains the only thing identity and lookup ever use.
    Variable(u32, Arc<str>),
}

impl Literal {
    pub fn plain(value: impl Into<Arc<str>>) -> Self {
        Self::PlainString(value.into(), None)
    }

    pub fn plain_with_language(value: impl Into<Arc<str>>, language: impl Into<Arc<str>>) -> Self {
        Self::PlainString(value.into(), Some(language.into()))
    }

    pub fn typed(value: impl Into<Arc<str>>, datatype: NamedNode) -> Self {
        Self::TypedString(value.into(), datatype)
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_, _))
    }

    pub fn as_variable_offset(&self) -> Option<u32> {
        match self {
            Self::Variable(offset, _) => Some(*offset),
            _ => None,
        }
    }

    /// `xsd:string` for a plain string without a language, the RDF-defined datatype for
    /// every other typed variant, or `rdf:langString` for a language-tagged string.
    pub fn datatype_iri(&self) -> ThinResultOrNone {
        use oxrdf::vocab::{rdf, xsd};
        match self {
            Self::Uri(_) | Self::Blank(_) | Self::QName(_, _) => None,
            Self::PlainString(_, None) => Some(xsd::STRING.into_owned()),
            Self::PlainString(_, Some(_)) => Some(rdf::LANG_STRING.into_owned()),
            Self::TypedString(_, dt) => Some(dt.clone()),
            Self::Integer(_) => Some(xsd::INTEGER.into_owned()),
            Self::Decimal(_) => Some(xsd::DECIMAL.into_owned()),
            Self::Double(_) => Some(xsd::DOUBLE.into_owned()),
            Self::Boolean(_) => Some(xsd::BOOLEAN.into_owned()),
            Self::DateTime(_) => Some(xsd::DATE_TIME.into_owned()),
            Self::Variable(_, _) => None,
        }
    }

    /// `sameTerm` semantics (§4.2): strict structural identity, never coercing numeric
    /// or lexical types into one another — stricter than [`PartialEq`] would be if we
    /// implemented value-equality there, which is why we keep our own method instead.
    pub fn same_term(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Uri(a), Self::Uri(b)) => a == b,
            (Self::Blank(a), Self::Blank(b)) => a == b,
            (Self::PlainString(a, la), Self::PlainString(b, lb)) => {
                a == b && lang_eq(la.as_deref(), lb.as_deref())
            }
            (Self::TypedString(a, da), Self::TypedString(b, db)) => a == b && da == db,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Decimal(a), Self::Decimal(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            _ => false,
        }
    }

    /// Ingests a concrete `oxrdf` literal term (triples-source data, or a ground
    /// `VALUES`/triple-pattern term) into our tagged sum. Ingestion never fails: a
    /// lexical form that does not parse for its own datatype is kept as
    /// [`Literal::TypedString`] rather than rejected (§3 invariant — "the evaluator
    /// treats comparisons involving them as errors", not ingestion itself).
    pub fn from_oxrdf(lit: &oxrdf::Literal) -> Self {
        use oxrdf::vocab::xsd;
        if let Some(lang) = lit.language() {
            return Self::PlainString(Arc::from(lit.value()), Some(Arc::from(lang)));
        }
        let datatype = lit.datatype();
        let value = lit.value();
        match datatype.as_str() {
            s if s == xsd::STRING.as_str() => Self::PlainString(Arc::from(value), None),
            s if s == xsd::INTEGER.as_str() => Integer::from_str(value)
                .map(Self::Integer)
                .unwrap_or_else(|_| Self::TypedString(Arc::from(value), datatype.into_owned())),
            s if s == xsd::DECIMAL.as_str() => Decimal::from_str(value)
                .map(Self::Decimal)
                .unwrap_or_else(|_| Self::TypedString(Arc::from(value), datatype.into_owned())),
            s if s == xsd::DOUBLE.as_str() || s == xsd::FLOAT.as_str() => Double::from_str(value)
                .map(Self::Double)
                .unwrap_or_else(|_| Self::TypedString(Arc::from(value), datatype.into_owned())),
            s if s == xsd::BOOLEAN.as_str() => Boolean::from_str(value)
                .map(Self::Boolean)
                .unwrap_or_else(|_| Self::TypedString(Arc::from(value), datatype.into_owned())),
            s if s == xsd::DATE_TIME.as_str() => DateTime::from_str(value)
                .map(Self::DateTime)
                .unwrap_or_else(|_| Self::TypedString(Arc::from(value), datatype.into_owned())),
            _ => Self::TypedString(Arc::from(value), datatype.into_owned()),
        }
    }

    /// The inverse of [`Literal::from_oxrdf`], used when materializing a bound cell
    /// back into an `oxrdf` term (`CONSTRUCT`/`DESCRIBE` template instantiation,
    /// triples-source probes). Returns `None` for [`Literal::QName`] (never resolved)
    /// and [`Literal::Variable`] (not a term).
    pub fn to_oxrdf_term(&self) -> Option<oxrdf::Term> {
        use oxrdf::vocab::xsd;
        let lit = match self {
            Self::Uri(n) => return Some(oxrdf::Term::NamedNode(n.clone())),
            Self::Blank(b) => return Some(oxrdf::Term::BlankNode(b.clone())),
            Self::QName(_, _) | Self::Variable(_, _) => return None,
            Self::PlainString(v, None) => oxrdf::Literal::new_simple_literal(v.as_ref()),
            Self::PlainString(v, Some(lang)) => {
                oxrdf::Literal::new_language_tagged_literal_unchecked(v.as_ref(), lang.as_ref())
            }
            Self::TypedString(v, dt) => oxrdf::Literal::new_typed_literal(v.as_ref(), dt.clone()),
            Self::Integer(i) => oxrdf::Literal::new_typed_literal(i.to_string(), xsd::INTEGER.into_owned()),
            Self::Decimal(d) => oxrdf::Literal::new_typed_literal(d.to_string(), xsd::DECIMAL.into_owned()),
            Self::Double(d) => oxrdf::Literal::new_typed_literal(d.to_string(), xsd::DOUBLE.into_owned()),
            Self::Boolean(b) => oxrdf::Literal::new_typed_literal(b.to_string(), xsd::BOOLEAN.into_owned()),
            Self::DateTime(d) => oxrdf::Literal::new_typed_literal(d.to_string(), xsd::DATE_TIME.into_owned()),
        };
        Some(oxrdf::Term::Literal(lit))
    }

    /// The lexical form as used by `STR()` — discards datatype and language.
    pub fn lexical_form(&self) -> Arc<str> {
        match self {
            Self::Uri(n) => Arc::from(n.as_str()),
            Self::Blank(b) => Arc::from(b.as_str()),
            Self::QName(p, l) => Arc::from(format!("{p}:{l}").as_str()),
            Self::PlainString(v, _) | Self::TypedString(v, _) => v.clone(),
            Self::Integer(i) => Arc::from(i.to_string().as_str()),
            Self::Decimal(d) => Arc::from(d.to_string().as_str()),
            Self::Double(d) => Arc::from(d.to_string().as_str()),
            Self::Boolean(b) => Arc::from(b.to_string().as_str()),
            Self::DateTime(d) => Arc::from(d.to_string().as_str()),
            Self::Variable(_, _) => Arc::from(""),
        }
    }
}

fn lang_eq(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        (None, None) => true,
        _ => false,
    }
}

type ThinResultOrNone = Option<NamedNode>;

impl From<NamedNode> for Literal {
    fn from(v: NamedNode) -> Self {
        Self::Uri(v)
    }
}

impl From<BlankNode> for Literal {
    fn from(v: BlankNode) -> Self {
        Self::Blank(v)
    }
}

impl From<bool> for Literal {
    fn from(v: bool) -> Self {
        Self::Boolean(v.into())
    }
}

impl From<i64> for Literal {
    fn from(v: i64) -> Self {
        Self::Integer(v.into())
    }
}

impl TryFrom<&Literal> for bool {
    type Error = ThinError;

    /// Effective boolean value coercion (SPARQL `EBV`), used by `FILTER`, `IF`,
    /// boolean connectives, and `HAVING`.
    fn try_from(value: &Literal) -> Result<Self, Self::Error> {
        match value {
            Literal::Boolean(b) => Ok((*b).into()),
            Literal::PlainString(s, None) => Ok(!s.is_empty()),
            Literal::TypedString(s, dt) if dt.as_str() == oxrdf::vocab::xsd::STRING.as_str() => {
                Ok(!s.is_empty())
            }
            Literal::Integer(i) => Ok(*i != Integer::from(0_i64)),
            Literal::Decimal(d) => Ok(*d != Decimal::from(0_i64)),
            Literal::Double(d) => {
                let v = f64::from(*d);
                Ok(v != 0.0 && !v.is_nan())
            }
            _ => Err(ThinError),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uri(n) => write!(f, "<{}>", n.as_str()),
            Self::Blank(b) => write!(f, "_:{}", b.as_str()),
            Self::QName(p, l) => write!(f, "{p}:{l}"),
            Self::PlainString(v, None) => write!(f, "\"{v}\""),
            Self::PlainString(v, Some(lang)) => write!(f, "\"{v}\"@{lang}"),
            Self::TypedString(v, dt) => write!(f, "\"{v}\"^^<{}>", dt.as_str()),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Double(d) => write!(f, "{d}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::DateTime(d) => write!(f, "{d}"),
            Self::Variable(_, name) => write!(f, "?{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_term_is_reflexive() {
        let lit = Literal::plain_with_language("abc", "en");
        assert!(lit.same_term(&lit));
    }

    #[test]
    fn same_term_rejects_typed_vs_plain() {
        let plain = Literal::Integer(1.into());
        let typed = Literal::TypedString(Arc::from("1"), oxrdf::vocab::xsd::INTEGER.into_owned());
        assert!(!plain.same_term(&typed));
    }

    #[test]
    fn same_term_language_tags_are_case_insensitive() {
        let a = Literal::plain_with_language("abc", "en");
        let b = Literal::plain_with_language("abc", "EN");
        assert!(a.same_term(&b));
    }
}
