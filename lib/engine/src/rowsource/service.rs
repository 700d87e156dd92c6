use super::RowSource;
use sparq_model::{Row, RowSchema};
use std::sync::Arc;

/// `SERVICE` (§9 Non-goals/Open Questions): federated query execution is out of scope,
/// so this rowsource never runs `inner` against anything — it only borrows its schema
/// to keep the outer query's variable set consistent, then always yields zero rows.
/// `silent` only controls whether the stub logs a warning; a non-silent `SERVICE`
/// still degrades to zero rows rather than failing the query, matching the spec's
/// resolved "preserve the defined no-op" decision (see DESIGN.md).
pub struct ServiceRowSource {
    schema: Arc<RowSchema>,
}

impl ServiceRowSource {
    pub fn new(inner: Box<dyn RowSource>, uri: &str, silent: bool) -> Self {
        if !silent {
            tracing::warn!(uri, "SERVICE execution is not implemented; yielding zero rows");
        }
        Self {
            schema: Arc::clone(inner.schema()),
        }
    }
}

impl RowSource for ServiceRowSource {
    fn schema(&self) -> &Arc<RowSchema> {
        &self.schema
    }

    fn read_row(&mut self) -> Option<Row> {
        None
    }

    fn reset(&mut self) {}
}
