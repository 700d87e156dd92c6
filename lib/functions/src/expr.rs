use sparq_model::{Literal, NamedNode};
use std::fmt;
use std::sync::Arc;

/// The expression tree (§4.2): a recursive tagged operator tree over [`Literal`]s. A
/// plain variable reference is `Literal(Literal::Variable(offset, name))`; every
/// operator flattens that to the variable's bound value as early as possible during
/// evaluation, except [`Expression::Bound`] which is its own node precisely so it can
/// skip that flattening (§4.2 "Flattening invariant").
#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Literal(Literal),

    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Not(Box<Expression>),

    Equal(Box<Expression>, Box<Expression>),
    NotEqual(Box<Expression>, Box<Expression>),
    Less(Box<Expression>, Box<Expression>),
    LessOrEqual(Box<Expression>, Box<Expression>),
    Greater(Box<Expression>, Box<Expression>),
    GreaterOrEqual(Box<Expression>, Box<Expression>),
    SameTerm(Box<Expression>, Box<Expression>),
    In(Box<Expression>, Vec<Expression>),
    NotIn(Box<Expression>, Vec<Expression>),

    UnaryPlus(Box<Expression>),
    UnaryMinus(Box<Expression>),
    Add(Box<Expression>, Box<Expression>),
    Subtract(Box<Expression>, Box<Expression>),
    Multiply(Box<Expression>, Box<Expression>),
    Divide(Box<Expression>, Box<Expression>),
    Abs(Box<Expression>),
    Ceil(Box<Expression>),
    Floor(Box<Expression>),
    Round(Box<Expression>),
    Rand,

    /// Special-cased: does *not* flatten its argument to the bound value first.
    Bound(u32),
    If(Box<Expression>, Box<Expression>, Box<Expression>),
    Coalesce(Vec<Expression>),

    Str(Box<Expression>),
    Lang(Box<Expression>),
    LangMatches(Box<Expression>, Box<Expression>),
    Datatype(Box<Expression>),
    Bnode(Option<Box<Expression>>),
    Iri(Box<Expression>),
    StrDt(Box<Expression>, Box<Expression>),
    StrLang(Box<Expression>, Box<Expression>),

    StrLen(Box<Expression>),
    UCase(Box<Expression>),
    LCase(Box<Expression>),
    Concat(Vec<Expression>),
    SubStr {
        source: Box<Expression>,
        starting_loc: Box<Expression>,
        length: Option<Box<Expression>>,
    },
    Replace {
        arg: Box<Expression>,
        pattern: Box<Expression>,
        replacement: Box<Expression>,
        flags: Option<Box<Expression>>,
    },
    Regex {
        text: Box<Expression>,
        pattern: Box<Expression>,
        flags: Option<Box<Expression>>,
    },
    Contains(Box<Expression>, Box<Expression>),
    StrStarts(Box<Expression>, Box<Expression>),
    StrEnds(Box<Expression>, Box<Expression>),
    StrBefore(Box<Expression>, Box<Expression>),
    StrAfter(Box<Expression>, Box<Expression>),
    EncodeForUri(Box<Expression>),

    Year(Box<Expression>),
    Month(Box<Expression>),
    Day(Box<Expression>),
    Hours(Box<Expression>),
    Minutes(Box<Expression>),
    Seconds(Box<Expression>),
    Timezone(Box<Expression>),
    Tz(Box<Expression>),
    Now,

    Uuid,
    StrUuid,
    Md5(Box<Expression>),
    Sha1(Box<Expression>),
    Sha256(Box<Expression>),
    Sha384(Box<Expression>),
    Sha512(Box<Expression>),

    IsIri(Box<Expression>),
    IsBlank(Box<Expression>),
    IsLiteral(Box<Expression>),
    IsNumeric(Box<Expression>),

    Cast {
        target: NamedNode,
        arg: Box<Expression>,
    },

    /// References a sub-pattern registered with the engine's exists registry by
    /// handle (§4.4) — `sparq-functions` never sees the pattern tree itself so this
    /// crate stays independent of the algebra representation.
    Exists(u32),
    NotExists(u32),

    /// An aggregate call. Only ever valid as the direct argument of the `Aggregation`
    /// rowsource; appearing anywhere else in a scalar expression is an evaluation
    /// error (§4.2).
    Aggregate(Arc<AggregateExpression>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
    Sample,
    GroupConcat,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AggregateExpression {
    pub function: AggregateFunction,
    pub distinct: bool,
    /// `None` only for `COUNT(*)`.
    pub expr: Option<Expression>,
    /// `GROUP_CONCAT`'s `SEPARATOR`, defaulting to `" "` per SPARQL 1.1 §18.5.
    pub separator: Option<String>,
}

impl Expression {
    /// Structural equality honoring comparison flags (distinct, separator...), used
    /// by aggregate extraction (§4.1) to decide whether two aggregate sub-expressions
    /// should share a synthetic variable. Plain `PartialEq` already gives us this.
    pub fn structurally_equal(&self, other: &Self) -> bool {
        self == other
    }

    /// Finds the first `Aggregate` sub-expression in left-to-right, depth-first
    /// order, without crossing into a nested non-scalar context. There is none of
    /// that here since our tree only ever holds scalar sub-expressions.
    pub fn is_aggregate_call(&self) -> bool {
        matches!(self, Self::Aggregate(_))
    }
}

/// The `op <name>(args...)` textual form the manifest test suite's algebra dump
/// relies on (spec §6, scenario S2): a bare [`Expression::Literal`] prints through
/// [`Literal`]'s own `Display` with no `op` wrapper; every other node prints its
/// operator name followed by its arguments in parens.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(lit) => write!(f, "{lit}"),
            Self::And(l, r) => op(f, "and", &[l, r]),
            Self::Or(l, r) => op(f, "or", &[l, r]),
            Self::Not(e) => op(f, "not", &[e]),
            Self::Equal(l, r) => op(f, "eq", &[l, r]),
            Self::NotEqual(l, r) => op(f, "ne", &[l, r]),
            Self::Less(l, r) => op(f, "lt", &[l, r]),
            Self::LessOrEqual(l, r) => op(f, "le", &[l, r]),
            Self::Greater(l, r) => op(f, "gt", &[l, r]),
            Self::GreaterOrEqual(l, r) => op(f, "ge", &[l, r]),
            Self::SameTerm(l, r) => op(f, "sameterm", &[l, r]),
            Self::In(needle, haystack) => op_list(f, "in", needle, haystack),
            Self::NotIn(needle, haystack) => op_list(f, "notin", needle, haystack),
            Self::UnaryPlus(e) => op(f, "uplus", &[e]),
            Self::UnaryMinus(e) => op(f, "umin", &[e]),
            Self::Add(l, r) => op(f, "plus", &[l, r]),
            Self::Subtract(l, r) => op(f, "minus", &[l, r]),
            Self::Multiply(l, r) => op(f, "star", &[l, r]),
            Self::Divide(l, r) => op(f, "slash", &[l, r]),
            Self::Abs(e) => op(f, "abs", &[e]),
            Self::Ceil(e) => op(f, "ceil", &[e]),
            Self::Floor(e) => op(f, "floor", &[e]),
            Self::Round(e) => op(f, "round", &[e]),
            Self::Rand => write!(f, "op rand()"),
            Self::Bound(offset) => write!(f, "op bound(${offset})"),
            Self::If(c, y, n) => op(f, "if", &[c, y, n]),
            Self::Coalesce(parts) => op_n(f, "coalesce", parts),
            Self::Str(e) => op(f, "str", &[e]),
            Self::Lang(e) => op(f, "lang", &[e]),
            Self::LangMatches(t, r) => op(f, "langmatches", &[t, r]),
            Self::Datatype(e) => op(f, "datatype", &[e]),
            Self::Bnode(None) => write!(f, "op bnode()"),
            Self::Bnode(Some(e)) => op(f, "bnode", &[e]),
            Self::Iri(e) => op(f, "iri", &[e]),
            Self::StrDt(v, d) => op(f, "strdt", &[v, d]),
            Self::StrLang(v, l) => op(f, "strlang", &[v, l]),
            Self::StrLen(e) => op(f, "strlen", &[e]),
            Self::UCase(e) => op(f, "ucase", &[e]),
            Self::LCase(e) => op(f, "lcase", &[e]),
            Self::Concat(parts) => op_n(f, "concat", parts),
            Self::SubStr { source, starting_loc, length: None } => op(f, "substr", &[source, starting_loc]),
            Self::SubStr { source, starting_loc, length: Some(length) } => {
                op(f, "substr", &[source, starting_loc, length])
            }
            Self::Replace { arg, pattern, replacement, flags: None } => {
                op(f, "replace", &[arg, pattern, replacement])
            }
            Self::Replace { arg, pattern, replacement, flags: Some(flags) } => {
                op(f, "replace", &[arg, pattern, replacement, flags])
            }
            Self::Regex { text, pattern, flags: None } => op(f, "regex", &[text, pattern]),
            Self::Regex { text, pattern, flags: Some(flags) } => op(f, "regex", &[text, pattern, flags]),
            Self::Contains(h, n) => op(f, "contains", &[h, n]),
            Self::StrStarts(h, n) => op(f, "strstarts", &[h, n]),
            Self::StrEnds(h, n) => op(f, "strends", &[h, n]),
            Self::StrBefore(h, n) => op(f, "strbefore", &[h, n]),
            Self::StrAfter(h, n) => op(f, "strafter", &[h, n]),
            Self::EncodeForUri(e) => op(f, "encode_for_uri", &[e]),
            Self::Year(e) => op(f, "year", &[e]),
            Self::Month(e) => op(f, "month", &[e]),
            Self::Day(e) => op(f, "day", &[e]),
            Self::Hours(e) => op(f, "hours", &[e]),
            Self::Minutes(e) => op(f, "minutes", &[e]),
            Self::Seconds(e) => op(f, "seconds", &[e]),
            Self::Timezone(e) => op(f, "timezone", &[e]),
            Self::Tz(e) => op(f, "tz", &[e]),
            Self::Now => write!(f, "op now()"),
            Self::Uuid => write!(f, "op uuid()"),
            Self::StrUuid => write!(f, "op struuid()"),
            Self::Md5(e) => op(f, "md5", &[e]),
            Self::Sha1(e) => op(f, "sha1", &[e]),
            Self::Sha256(e) => op(f, "sha256", &[e]),
            Self::Sha384(e) => op(f, "sha384", &[e]),
            Self::Sha512(e) => op(f, "sha512", &[e]),
            Self::IsIri(e) => op(f, "isiri", &[e]),
            Self::IsBlank(e) => op(f, "isblank", &[e]),
            Self::IsLiteral(e) => op(f, "isliteral", &[e]),
            Self::IsNumeric(e) => op(f, "isnumeric", &[e]),
            Self::Cast { target, arg } => write!(f, "op cast<{}>({arg})", target.as_str()),
            Self::Exists(handle) => write!(f, "op exists(#{handle})"),
            Self::NotExists(handle) => write!(f, "op notexists(#{handle})"),
            Self::Aggregate(agg) => write!(f, "{agg}"),
        }
    }
}

fn op(f: &mut fmt::Formatter<'_>, name: &str, args: &[&Expression]) -> fmt::Result {
    write!(f, "op {name}(")?;
    for (i, a) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{a}")?;
    }
    write!(f, ")")
}

fn op_n(f: &mut fmt::Formatter<'_>, name: &str, args: &[Expression]) -> fmt::Result {
    let refs: Vec<&Expression> = args.iter().collect();
    op(f, name, &refs)
}

fn op_list(f: &mut fmt::Formatter<'_>, name: &str, needle: &Expression, rest: &[Expression]) -> fmt::Result {
    write!(f, "op {name}({needle}")?;
    for r in rest {
        write!(f, ", {r}")?;
    }
    write!(f, ")")
}

impl fmt::Display for AggregateExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.function {
            AggregateFunction::Count => "count",
            AggregateFunction::Sum => "sum",
            AggregateFunction::Avg => "avg",
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
            AggregateFunction::Sample => "sample",
            AggregateFunction::GroupConcat => "group_concat",
        };
        write!(f, "{name}(")?;
        if self.distinct {
            write!(f, "distinct ")?;
        }
        match &self.expr {
            Some(e) => write!(f, "{e}")?,
            None => write!(f, "*")?,
        }
        if let Some(sep) = &self.separator {
            write!(f, "; separator={sep:?}")?;
        }
        write!(f, ")")
    }
}
