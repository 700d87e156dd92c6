use super::{union_schema, RowSource};
use sparq_model::{Row, RowSchema};
use std::sync::Arc;

/// `UNION` (§3/§4.3): concatenates the left child's rows followed by the right's,
/// reshaping each onto the combined schema so a variable one side never binds reads
/// back as unbound rather than missing a column entirely.
pub struct UnionRowSource {
    schema: Arc<RowSchema>,
    left: Box<dyn RowSource>,
    right: Box<dyn RowSource>,
    on_left: bool,
}

impl UnionRowSource {
    pub fn new(left: Box<dyn RowSource>, right: Box<dyn RowSource>) -> Self {
        let schema = union_schema(left.schema(), right.schema());
        Self { schema, left, right, on_left: true }
    }
}

impl RowSource for UnionRowSource {
    fn schema(&self) -> &Arc<RowSchema> {
        &self.schema
    }

    fn read_row(&mut self) -> Option<Row> {
        if self.on_left {
            if let Some(row) = self.left.read_row() {
                return Some(row.reshape(Arc::clone(&self.schema)));
            }
            self.on_left = false;
        }
        self.right.read_row().map(|row| row.reshape(Arc::clone(&self.schema)))
    }

    fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
        self.on_left = true;
    }
}
