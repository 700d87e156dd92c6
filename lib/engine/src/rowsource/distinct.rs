use super::RowSource;
use sparq_model::{Row, RowSchema};
use std::sync::Arc;

fn rows_equal(a: &Row, b: &Row) -> bool {
    a.cells().len() == b.cells().len()
        && a.cells().iter().zip(b.cells()).all(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => x.same_term(y),
            (None, None) => true,
            _ => false,
        })
}

/// `DISTINCT`/`REDUCED` (§3): both compile to the same rowsource here — a `REDUCED`
/// solution-modifier only licenses, not requires, duplicate elimination, and eliminating
/// every duplicate is always a conforming implementation of it.
pub struct DistinctRowSource {
    inner: Box<dyn RowSource>,
    seen: Vec<Row>,
}

impl DistinctRowSource {
    pub fn new(inner: Box<dyn RowSource>) -> Self {
        Self { inner, seen: Vec::new() }
    }
}

impl RowSource for DistinctRowSource {
    fn schema(&self) -> &Arc<RowSchema> {
        self.inner.schema()
    }

    fn read_row(&mut self) -> Option<Row> {
        loop {
            let row = self.inner.read_row()?;
            if self.seen.iter().any(|s| rows_equal(s, &row)) {
                continue;
            }
            self.seen.push(row.clone());
            return Some(row);
        }
    }

    fn reset(&mut self) {
        self.inner.reset();
        self.seen.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rowsource::BufferedRowSource;
    use sparq_model::Literal;

    #[test]
    fn drops_repeat_rows() {
        let schema = Arc::new(RowSchema::new(vec![0_u32]));
        let rows = vec![
            Row::new(Arc::clone(&schema), vec![Some(Literal::Integer(1.into()))]),
            Row::new(Arc::clone(&schema), vec![Some(Literal::Integer(1.into()))]),
            Row::new(Arc::clone(&schema), vec![Some(Literal::Integer(2.into()))]),
        ];
        let mut distinct = DistinctRowSource::new(Box::new(BufferedRowSource::new(schema, rows)));
        assert_eq!(distinct.read_all_rows().len(), 2);
    }
}
