use std::fmt;
use std::sync::Arc;

/// The three variable kinds distinguished by the compiler (§3). `Anonymous` is used for
/// synthetic aggregate-extraction variables (`$$agg$$N`, §4.1); `Existential` is used
/// for pattern-local variables introduced inside an `EXISTS`/`NOT EXISTS` sub-pattern
/// that must never leak into the outer projection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Normal,
    Anonymous,
    Existential,
}

/// A named slot with a stable numeric offset within a query-level [`VariablesTable`].
///
/// Unlike the source this is reimplemented from, a `Variable` carries *no* current
/// value: the evaluator threads an explicit, immutable [`crate::Bindings`] map through
/// the call chain instead of mutating a shared table slot (§9 Design Notes: "re-architect
/// by passing an immutable environment explicitly down the evaluator call chain").
/// Variable identity is the `offset`, not the `name` — two queries may reuse names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variable {
    kind: VariableKind,
    name: Arc<str>,
    offset: u32,
}

impl Variable {
    pub fn new(offset: u32, name: impl Into<Arc<str>>, kind: VariableKind) -> Self {
        Self {
            kind,
            name: name.into(),
            offset,
        }
    }

    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.name)
    }
}

/// The query-level table of all variables known to a compiled query, indexed by
/// offset. Owned by the [`crate::Query`] in `sparq-engine`; algebra nodes and
/// expressions only ever refer to variables by offset.
#[derive(Clone, Debug, Default)]
pub struct VariablesTable {
    variables: Vec<Variable>,
}

impl VariablesTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an existing variable by name, or allocates a fresh [`VariableKind::Normal`]
    /// one with the next offset.
    pub fn get_or_insert(&mut self, name: &str) -> u32 {
        if let Some(v) = self.variables.iter().find(|v| v.name() == name) {
            return v.offset();
        }
        self.insert_fresh(name, VariableKind::Normal)
    }

    /// Allocates a brand-new variable, even if `name` collides with an existing one
    /// (used for synthetic `$$agg$$N` and existential variables, which must never be
    /// confused with a user-written variable of the same spelling).
    pub fn insert_fresh(&mut self, name: impl Into<Arc<str>>, kind: VariableKind) -> u32 {
        let offset = self.variables.len() as u32;
        self.variables.push(Variable::new(offset, name, kind));
        offset
    }

    pub fn fresh_aggregate_variable(&mut self, counter: u32) -> u32 {
        self.insert_fresh(format!("$$agg$${counter}"), VariableKind::Anonymous)
    }

    pub fn get(&self, offset: u32) -> Option<&Variable> {
        self.variables.get(offset as usize)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name() == name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter()
    }
}
