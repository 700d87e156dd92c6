use crate::Literal;

/// An ordered triple of terms, any position of which may be [`Literal::Variable`]
/// (§3). `origin` scopes the pattern to a named graph — `None` means the default
/// (or currently active, if nested inside a `GRAPH` block) graph.
#[derive(Clone, Debug, PartialEq)]
pub struct TriplePattern {
    pub subject: Literal,
    pub predicate: Literal,
    pub object: Literal,
}

impl TriplePattern {
    pub fn new(subject: Literal, predicate: Literal, object: Literal) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// A triple pattern with no variable in any position.
    pub fn is_ground(&self) -> bool {
        !self.subject.is_variable() && !self.predicate.is_variable() && !self.object.is_variable()
    }

    pub fn variable_offsets(&self) -> impl Iterator<Item = u32> + '_ {
        [&self.subject, &self.predicate, &self.object]
            .into_iter()
            .filter_map(Literal::as_variable_offset)
    }
}
