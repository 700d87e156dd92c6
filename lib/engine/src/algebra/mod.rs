//! The compiled operator tree (spec §3 "Algebra Node", §6 textual form) that the
//! algebra compiler (`compile`) produces and `crate::rowsource::build` consumes.

mod compile;
mod display;

pub use compile::{compile_pattern, compile_pattern_with, CompiledPattern, Converter};

use sparq_functions::Expression;
use sparq_model::{BindingsBlock, Literal, TriplePattern};

/// A single step of a property path (spec's supplementary "property paths" feature,
/// SPEC_FULL.md §3): reserved the same way `spargebra` keeps `Path` as its own
/// `GraphPattern` variant rather than lowering it into a `Bgp`, since a path step may
/// need an unbounded walk a triple pattern cannot express.
#[derive(Clone, Debug, PartialEq)]
pub enum PathExpression {
    Predicate(Literal),
    Inverse(Box<PathExpression>),
    Sequence(Box<PathExpression>, Box<PathExpression>),
    Alternative(Box<PathExpression>, Box<PathExpression>),
    ZeroOrMore(Box<PathExpression>),
    OneOrMore(Box<PathExpression>),
    ZeroOrOne(Box<PathExpression>),
    NegatedPropertySet(Vec<Literal>),
}

/// One ordering key (`ORDER BY`): an expression plus direction. The source represents
/// `DESC` by wrapping the condition in a `UMINUS`-tagged node (§4.3); we carry the
/// direction as an explicit flag instead — see DESIGN.md for why.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderCondition {
    pub expr: Expression,
    pub descending: bool,
}

/// The tagged operator tree (§3 "Algebra Node"). Every variable reference is carried
/// as a [`Literal::Variable`] rather than a bare offset, so the textual form (§6) can
/// print `?name` without a side-channel handle to the query's variables table.
#[derive(Clone, Debug, PartialEq)]
pub enum AlgebraNode {
    /// The unit element when `triples` is empty (§3 "Unit BGP / Z-node").
    Bgp(Vec<TriplePattern>),
    Filter {
        expr: Expression,
        inner: Box<AlgebraNode>,
    },
    Join(Box<AlgebraNode>, Box<AlgebraNode>),
    /// Always carries a condition; `OPTIONAL` without an explicit filter substitutes
    /// `Literal::Boolean(true)` (§3 invariant).
    LeftJoin {
        left: Box<AlgebraNode>,
        right: Box<AlgebraNode>,
        expr: Expression,
    },
    /// `MINUS` (spec's `Diff`).
    Diff(Box<AlgebraNode>, Box<AlgebraNode>),
    Union(Box<AlgebraNode>, Box<AlgebraNode>),
    ToList(Box<AlgebraNode>),
    OrderBy {
        inner: Box<AlgebraNode>,
        conditions: Vec<OrderCondition>,
        distinct: bool,
    },
    Project {
        inner: Box<AlgebraNode>,
        variables: Vec<Literal>,
    },
    Distinct(Box<AlgebraNode>),
    Reduced(Box<AlgebraNode>),
    Slice {
        inner: Box<AlgebraNode>,
        limit: i64,
        offset: i64,
    },
    Graph {
        inner: Box<AlgebraNode>,
        origin: Literal,
    },
    Assign {
        inner: Box<AlgebraNode>,
        variable: Literal,
        expr: Expression,
    },
    Group {
        inner: Box<AlgebraNode>,
        variables: Vec<Literal>,
    },
    /// Elided entirely when aggregate extraction (§4.1/§4.2) finds no aggregates.
    Aggregation {
        inner: Box<AlgebraNode>,
        exprs: Vec<Expression>,
        synth_vars: Vec<Literal>,
    },
    Having {
        inner: Box<AlgebraNode>,
        exprs: Vec<Expression>,
    },
    Values(BindingsBlock),
    /// A property path (SPEC_FULL.md §3 "Property paths"), evaluated by a
    /// depth-bounded breadth-first walk rather than rewritten into a fixed `Bgp`,
    /// since `*`/`+`/`?` have no fixed arity.
    Path {
        subject: Literal,
        path: PathExpression,
        object: Literal,
        origin: Option<Literal>,
    },
    /// `SERVICE` is reserved but never executed in-core (spec §9 Open Question,
    /// resolved as option (b) — see DESIGN.md); the rowsource warns and yields zero
    /// rows.
    Service {
        inner: Box<AlgebraNode>,
        uri: String,
        query: String,
        silent: bool,
    },
}

impl AlgebraNode {
    /// The unit BGP: matches exactly one row of zero bindings, the identity for
    /// [`AlgebraNode::Join`] (§3).
    pub fn unit() -> Self {
        Self::Bgp(Vec::new())
    }

    pub fn is_unit_bgp(&self) -> bool {
        matches!(self, Self::Bgp(triples) if triples.is_empty())
    }

    /// Replaces `self` with `other` in place (spec §9 Design Notes: the `memcpy an
    /// algebra node over its child` re-architecture target — logical swap, no byte
    /// copy, no parent pointer invalidated since `&mut self` already *is* that
    /// pointer's target).
    pub fn replace_with(&mut self, other: AlgebraNode) {
        *self = other;
    }
}
