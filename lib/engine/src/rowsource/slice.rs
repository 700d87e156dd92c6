use super::RowSource;
use sparq_model::{Row, RowSchema};
use std::sync::Arc;

/// `LIMIT`/`OFFSET` (§3/§4.3): drops the first `offset` rows from `inner`, then emits
/// at most `limit` further rows (`limit < 0` means unbounded). Tags every emitted row
/// with its position in the sliced output via [`Row::with_row_index`], which the
/// manifest textual row form's trailing `offset N]` (§6) reads back.
pub struct SliceRowSource {
    inner: Box<dyn RowSource>,
    offset: i64,
    limit: i64,
    skipped: i64,
    taken: i64,
}

impl SliceRowSource {
    pub fn new(inner: Box<dyn RowSource>, limit: i64, offset: i64) -> Self {
        Self {
            inner,
            offset: offset.max(0),
            limit,
            skipped: 0,
            taken: 0,
        }
    }
}

impl RowSource for SliceRowSource {
    fn schema(&self) -> &Arc<RowSchema> {
        self.inner.schema()
    }

    fn read_row(&mut self) -> Option<Row> {
        while self.skipped < self.offset {
            self.inner.read_row()?;
            self.skipped += 1;
        }
        if self.limit >= 0 && self.taken >= self.limit {
            return None;
        }
        let row = self.inner.read_row()?;
        let index = self.taken as u64;
        self.taken += 1;
        Some(row.with_row_index(index))
    }

    fn reset(&mut self) {
        self.inner.reset();
        self.skipped = 0;
        self.taken = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rowsource::BufferedRowSource;
    use sparq_model::Literal;

    fn source(n: i64) -> BufferedRowSource {
        let schema = Arc::new(RowSchema::new(vec![0_u32]));
        let rows = (0..n)
            .map(|i| Row::new(Arc::clone(&schema), vec![Some(Literal::Integer(i.into()))]))
            .collect();
        BufferedRowSource::new(schema, rows)
    }

    #[test]
    fn offset_and_limit_compose() {
        // Slice(offset=a, limit=b)(Slice(offset=c, limit=d)(S))
        //   == Slice(offset=a+c, limit=min(b, d-a))(S)   (§8 property 7)
        let (a, b, c, d) = (1_i64, 2_i64, 1_i64, 4_i64);

        let mut nested = SliceRowSource::new(Box::new(SliceRowSource::new(Box::new(source(10)), d, c)), b, a);
        let nested_rows = nested.read_all_rows();

        let mut flattened = SliceRowSource::new(Box::new(source(10)), b.min(d - a), a + c);
        let flattened_rows = flattened.read_all_rows();

        assert_eq!(nested_rows, flattened_rows);
    }

    #[test]
    fn negative_limit_is_unbounded() {
        let mut rows = SliceRowSource::new(Box::new(source(3)), -1, 1);
        assert_eq!(rows.read_all_rows().len(), 2);
    }
}
