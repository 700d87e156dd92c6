use super::RowSource;
use sparq_model::{Row, RowSchema};
use std::sync::Arc;

/// The zero-width unit row (§3 "Unit BGP / Z-node" runtime counterpart, §4.3): one row
/// of zero bindings, then end-of-stream. Not reached by `crate::rowsource::build` today
/// (`Bgp(vec![])` already produces the same single empty row through the ordinary BGP
/// path) but kept as the rowsource an ASK/boolean-result caller can hand an empty
/// pattern without special-casing it.
pub struct EmptyRowSource {
    schema: Arc<RowSchema>,
    done: bool,
}

impl EmptyRowSource {
    pub fn new() -> Self {
        Self {
            schema: Arc::new(RowSchema::new(Vec::<u32>::new())),
            done: false,
        }
    }
}

impl Default for EmptyRowSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RowSource for EmptyRowSource {
    fn schema(&self) -> &Arc<RowSchema> {
        &self.schema
    }

    fn read_row(&mut self) -> Option<Row> {
        if self.done {
            None
        } else {
            self.done = true;
            Some(Row::empty(Arc::clone(&self.schema)))
        }
    }

    fn reset(&mut self) {
        self.done = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_exactly_one_zero_width_row() {
        let mut source = EmptyRowSource::new();
        assert_eq!(source.schema().width(), 0);
        assert!(source.read_row().is_some());
        assert!(source.read_row().is_none());
        source.reset();
        assert!(source.read_row().is_some());
    }
}
