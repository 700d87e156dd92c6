use super::{compatible, shared_offsets, union_schema, RowSource};
use sparq_model::{Row, RowSchema};
use std::sync::Arc;

/// Inner nested-loop join over the variable intersection of both children (§3/§4.3).
/// Both sides are materialized up front since join compatibility can only be checked
/// once every candidate on the inner side is known.
pub struct JoinRowSource {
    schema: Arc<RowSchema>,
    rows: Vec<Row>,
    idx: usize,
}

impl JoinRowSource {
    pub fn new(mut left: Box<dyn RowSource>, mut right: Box<dyn RowSource>) -> Self {
        let schema = union_schema(left.schema(), right.schema());
        let shared = shared_offsets(left.schema(), right.schema());
        let left_rows = left.read_all_rows();
        let right_rows = right.read_all_rows();
        let mut rows = Vec::new();
        for l in &left_rows {
            for r in &right_rows {
                if compatible(l, r, &shared) {
                    rows.push(l.merge(r, Arc::clone(&schema)));
                }
            }
        }
        Self { schema, rows, idx: 0 }
    }
}

impl RowSource for JoinRowSource {
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
    use crate::rowsource::BufferedRowSource;
    use sparq_model::Literal;

    fn row(schema: &Arc<RowSchema>, cells: Vec<Option<Literal>>) -> Row {
        Row::new(Arc::clone(schema), cells)
    }

    #[test]
    fn joins_on_shared_variable() {
        let left_schema = Arc::new(RowSchema::new(vec![0_u32]));
        let right_schema = Arc::new(RowSchema::new(vec![0_u32, 1_u32]));
        let left = BufferedRowSource::new(
            Arc::clone(&left_schema),
            vec![row(&left_schema, vec![Some(Literal::Integer(1.into()))])],
        );
        let right = BufferedRowSource::new(
            Arc::clone(&right_schema),
            vec![
                row(&right_schema, vec![Some(Literal::Integer(1.into())), Some(Literal::Integer(2.into()))]),
                row(&right_schema, vec![Some(Literal::Integer(9.into())), Some(Literal::Integer(9.into()))]),
            ],
        );
        let mut joined = JoinRowSource::new(Box::new(left), Box::new(right));
        let all = joined.read_all_rows();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].get(1), Some(&Literal::Integer(2.into())));
    }
}
