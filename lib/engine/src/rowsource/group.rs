use super::RowSource;
use sparq_model::{Literal, Row, RowSchema};
use std::sync::Arc;

fn keys_equal(a: &[Option<Literal>], b: &[Option<Literal>]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => x.same_term(y),
            (None, None) => true,
            _ => false,
        })
}

/// `GROUP BY` with no aggregate functions (§3): the compiler elides the `Aggregation`
/// wrapper entirely when a `GROUP BY` has nothing to aggregate, leaving a bare `Group`
/// node that just buckets rows and re-emits them in group-id order, tagging each with
/// its `group_id` (§4.3). An empty `variables` list is one implicit group over the
/// whole input, matching `Aggregation`'s convention.
pub struct GroupRowSource {
    schema: Arc<RowSchema>,
    rows: Vec<Row>,
    idx: usize,
}

impl GroupRowSource {
    pub fn new(mut inner: Box<dyn RowSource>, variables: &[Literal]) -> Self {
        let schema = Arc::clone(inner.schema());
        let offsets: Vec<u32> = variables.iter().filter_map(Literal::as_variable_offset).collect();

        let mut keys: Vec<Vec<Option<Literal>>> = Vec::new();
        let mut tagged: Vec<(i64, Row)> = Vec::new();
        for row in inner.read_all_rows() {
            let key: Vec<Option<Literal>> = offsets.iter().map(|o| row.get(*o).cloned()).collect();
            let gid = match keys.iter().position(|k| keys_equal(k, &key)) {
                Some(pos) => pos,
                None => {
                    keys.push(key);
                    keys.len() - 1
                }
            };
            tagged.push((gid as i64, row.with_group_id(gid as i64)));
        }
        tagged.sort_by_key(|(gid, _)| *gid);
        let rows = tagged.into_iter().map(|(_, row)| row).collect();
        Self { schema, rows, idx: 0 }
    }
}

impl RowSource for GroupRowSource {
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

    #[test]
    fn buckets_rows_by_group_variable() {
        let schema = Arc::new(RowSchema::new(vec![0_u32]));
        let rows = vec![
            Row::new(Arc::clone(&schema), vec![Some(Literal::Integer(1.into()))]),
            Row::new(Arc::clone(&schema), vec![Some(Literal::Integer(2.into()))]),
            Row::new(Arc::clone(&schema), vec![Some(Literal::Integer(1.into()))]),
        ];
        let variables = vec![Literal::Variable(0, "x".into())];
        let mut grouped =
            GroupRowSource::new(Box::new(BufferedRowSource::new(schema, rows)), &variables);
        let all = grouped.read_all_rows();
        assert_eq!(all[0].group_id(), all[2].group_id());
        assert_ne!(all[0].group_id(), all[1].group_id());
    }
}
