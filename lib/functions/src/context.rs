use sparq_model::{Bindings, DateTime, ThinResult};
use std::cell::RefCell;
use std::sync::Arc;

/// Short-circuit-aware EXISTS/NOT EXISTS mode (§4.4). The mode is threaded down to
/// the pattern-specific evaluators because short-circuiting is only correct when it
/// matches the mode — e.g. a `Group` evaluator under `NotExists` mode short-circuits
/// on the first *false* child (meaning "NOT EXISTS already succeeded"), which is a
/// different condition than `Exists` mode short-circuiting on the first false child
/// (meaning "EXISTS already failed").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExistsMode {
    Exists,
    NotExists,
}

impl ExistsMode {
    pub fn negated(self) -> bool {
        matches!(self, Self::NotExists)
    }
}

/// Callback the engine registers so `Expression::Exists`/`NotExists` can be evaluated
/// without `sparq-functions` depending on the algebra/rowsource crate. `handle` is an
/// opaque index assigned by the compiler when it lowered the `EXISTS` pattern (§4.1).
pub trait ExistsProbe {
    fn probe(&self, handle: u32, mode: ExistsMode, bindings: &Arc<Bindings>) -> ThinResult<bool>;
}

/// Everything the evaluator needs besides the expression tree and the current row's
/// bindings (§3 "Evaluation context"): a base IRI for `URI()`/`IRI()` resolution, a
/// fixed `NOW()` timestamp (constant for the whole query per SPARQL 1.1 §17.4.3.7), a
/// seeded RNG for `RAND()`/`BNODE()`/`UUID()`/`STRUUID()` reproducibility, and the
/// EXISTS callback.
pub struct EvaluationContext<'a> {
    base_iri: Option<String>,
    now: DateTime,
    rng: RefCell<rand::rngs::StdRng>,
    exists: Option<&'a dyn ExistsProbe>,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(base_iri: Option<String>, now: DateTime, seed: u64) -> Self {
        use rand::SeedableRng;
        Self {
            base_iri,
            now,
            rng: RefCell::new(rand::rngs::StdRng::seed_from_u64(seed)),
            exists: None,
        }
    }

    pub fn with_exists_probe(mut self, probe: &'a dyn ExistsProbe) -> Self {
        self.exists = Some(probe);
        self
    }

    pub fn base_iri(&self) -> Option<&str> {
        self.base_iri.as_deref()
    }

    pub fn now(&self) -> DateTime {
        self.now
    }

    pub fn next_f64(&self) -> f64 {
        use rand::Rng;
        self.rng.borrow_mut().random::<f64>()
    }

    pub fn next_u128(&self) -> u128 {
        use rand::RngCore;
        let mut bytes = [0_u8; 16];
        self.rng.borrow_mut().fill_bytes(&mut bytes);
        u128::from_be_bytes(bytes)
    }

    pub fn exists_probe(&self) -> Option<&'a dyn ExistsProbe> {
        self.exists
    }
}
