use super::RowSource;
use sparq_model::{Literal, Row, RowSchema};
use std::sync::Arc;

/// Reshapes every inner row onto the projected variable list, in the order `SELECT`
/// named them (§3 `Project`). A variable the inner schema never bound becomes an
/// unbound cell rather than an error.
pub struct ProjectRowSource {
    inner: Box<dyn RowSource>,
    schema: Arc<RowSchema>,
}

impl ProjectRowSource {
    pub fn new(inner: Box<dyn RowSource>, variables: &[Literal]) -> Self {
        let offsets: Vec<u32> = variables.iter().filter_map(Literal::as_variable_offset).collect();
        Self {
            inner,
            schema: Arc::new(RowSchema::new(offsets)),
        }
    }
}

impl RowSource for ProjectRowSource {
    fn schema(&self) -> &Arc<RowSchema> {
        &self.schema
    }

    fn read_row(&mut self) -> Option<Row> {
        self.inner.read_row().map(|row| row.reshape(Arc::clone(&self.schema)))
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}
