use crate::Literal;
use std::sync::Arc;

/// An immutable variable environment threaded explicitly through expression
/// evaluation and EXISTS sub-plan evaluation (§9 Design Notes: "re-architect by
/// passing an immutable environment... EXISTS pushes a child environment, never
/// mutates a parent"). Looking a variable up walks a persistent chain of overlays, so
/// pushing a child environment for a nested `EXISTS` is O(1) and never disturbs the
/// parent — there is no save/restore dance and therefore nothing that can violate the
/// "EXISTS purity" invariant (§8, property 4).
#[derive(Clone, Debug, Default)]
pub enum Bindings {
    #[default]
    Empty,
    Extend {
        parent: Arc<Bindings>,
        offset: u32,
        value: Literal,
    },
}

impl Bindings {
    pub fn get(&self, offset: u32) -> Option<&Literal> {
        match self {
            Self::Empty => None,
            Self::Extend {
                parent,
                offset: o,
                value,
            } => {
                if *o == offset {
                    Some(value)
                } else {
                    parent.get(offset)
                }
            }
        }
    }

    /// Pushes one binding as a *child* environment; `self` is left untouched.
    #[must_use]
    pub fn pushed(self: &Arc<Self>, offset: u32, value: Literal) -> Arc<Self> {
        Arc::new(Self::Extend {
            parent: Arc::clone(self),
            offset,
            value,
        })
    }

    /// Pushes every binding in `row` (by variable offset), skipping unbound cells.
    #[must_use]
    pub fn extended_with_row(
        self: &Arc<Self>,
        schema: &[u32],
        cells: &[Option<Literal>],
    ) -> Arc<Self> {
        let mut current = Arc::clone(self);
        for (offset, cell) in schema.iter().zip(cells.iter()) {
            if let Some(value) = cell {
                current = current.pushed(*offset, value.clone());
            }
        }
        current
    }
}
