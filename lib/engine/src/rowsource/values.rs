use super::RowSource;
use sparq_model::{BindingsBlock, Row, RowSchema};
use std::sync::Arc;

/// `VALUES` (§3): replays a literal bindings table. Rows with a cell of `None` carry
/// `UNDEF` in that position, same as any other rowsource's unbound cell.
pub struct ValuesRowSource {
    schema: Arc<RowSchema>,
    rows: Vec<Row>,
    idx: usize,
}

impl ValuesRowSource {
    pub fn new(block: &BindingsBlock) -> Self {
        Self {
            schema: Arc::clone(block.schema()),
            rows: block.rows().collect(),
            idx: 0,
        }
    }
}

impl RowSource for ValuesRowSource {
    fn schema(&self) -> &Arc<RowSchema> {
        &self.schema
    }

    fn read_row(&mut self) -> Option<Row> {
        let row = self.rows.get(self.idx).cloned();
        if row.is_some() {
            self.idx += 1;
        }
        row
    }

    fn reset(&mut self) {
        self.idx = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparq_model::Literal;

    #[test]
    fn replays_every_row_in_order() {
        let schema = Arc::new(RowSchema::new(vec![0_u32]));
        let block = BindingsBlock::new(
            Arc::clone(&schema),
            vec![vec![Some(Literal::Integer(1.into()))], vec![None]],
        );
        let mut rows = ValuesRowSource::new(&block);
        let all = rows.read_all_rows();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].get(0), Some(&Literal::Integer(1.into())));
        assert_eq!(all[1].get(0), None);
    }
}
