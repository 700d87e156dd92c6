use super::{shared_offsets, RowSource};
use sparq_model::{Row, RowSchema};
use std::sync::Arc;

/// `MINUS` (§3): a left row is dropped only if some right row is both compatible with
/// it *and* shares at least one bound variable with it — two solutions that share no
/// variable never interact under `MINUS` (SPARQL 1.1 §18.5, the "disjoint domains"
/// carve-out), so an all-ground right side never removes anything from an
/// all-different-variables left side.
pub struct DiffRowSource {
    schema: Arc<RowSchema>,
    rows: Vec<Row>,
    idx: usize,
}

impl DiffRowSource {
    pub fn new(mut left: Box<dyn RowSource>, mut right: Box<dyn RowSource>) -> Self {
        let schema = Arc::clone(left.schema());
        let right_rows = right.read_all_rows();
        let rows = left
            .read_all_rows()
            .into_iter()
            .filter(|l| {
                !right_rows.iter().any(|r| {
                    let shared = shared_offsets(l.schema(), r.schema());
                    !shared.is_empty() && super::compatible(l, r, &shared)
                })
            })
            .collect();
        Self { schema, rows, idx: 0 }
    }
}

impl RowSource for DiffRowSource {
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
    fn removes_compatible_overlapping_rows() {
        let schema = Arc::new(RowSchema::new(vec![0_u32]));
        let left = BufferedRowSource::new(
            Arc::clone(&schema),
            vec![
                row(&schema, vec![Some(Literal::Integer(1.into()))]),
                row(&schema, vec![Some(Literal::Integer(2.into()))]),
            ],
        );
        let right = BufferedRowSource::new(
            Arc::clone(&schema),
            vec![row(&schema, vec![Some(Literal::Integer(1.into()))])],
        );
        let mut diff = DiffRowSource::new(Box::new(left), Box::new(right));
        let all = diff.read_all_rows();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].get(0), Some(&Literal::Integer(2.into())));
    }

    #[test]
    fn disjoint_variables_never_interact() {
        let left_schema = Arc::new(RowSchema::new(vec![0_u32]));
        let right_schema = Arc::new(RowSchema::new(vec![1_u32]));
        let left = BufferedRowSource::new(
            Arc::clone(&left_schema),
            vec![row(&left_schema, vec![Some(Literal::Integer(1.into()))])],
        );
        let right = BufferedRowSource::new(
            Arc::clone(&right_schema),
            vec![row(&right_schema, vec![Some(Literal::Integer(1.into()))])],
        );
        let mut diff = DiffRowSource::new(Box::new(left), Box::new(right));
        assert_eq!(diff.read_all_rows().len(), 1);
    }
}
