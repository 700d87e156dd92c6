use super::{BuildContext, RowSource};
use crate::algebra::AlgebraNode;
use sparq_model::{Literal, Row, RowSchema};
use std::sync::Arc;

/// `GRAPH` (§3): pushes `origin` — a concrete named-graph URI from the query, or a
/// variable to be bound — down into `inner`'s triple matching. A concrete origin just
/// rebuilds the subtree scoped to it; a variable origin rebuilds the subtree once per
/// distinct named graph the triples source knows about and tags every resulting row
/// with the graph it came from.
pub struct GraphRowSource {
    schema: Arc<RowSchema>,
    rows: Vec<Row>,
    idx: usize,
}

impl GraphRowSource {
    pub fn new(inner: &AlgebraNode, origin: &Literal, ctx: &BuildContext<'_>) -> Self {
        match origin.as_variable_offset() {
            None => {
                let mut child = super::build(inner, ctx, Some(origin));
                let schema = Arc::clone(child.schema());
                let rows = child.read_all_rows();
                Self { schema, rows, idx: 0 }
            }
            Some(var_offset) => {
                let graphs = ctx.source.origins();
                let mut base_offsets: Vec<u32> = Vec::new();
                let mut collected: Vec<(Row, Literal)> = Vec::new();
                for graph in &graphs {
                    let mut child = super::build(inner, ctx, Some(graph));
                    if base_offsets.is_empty() {
                        base_offsets = child.schema().variables().to_vec();
                    }
                    for row in child.read_all_rows() {
                        collected.push((row, graph.clone()));
                    }
                }
                let mut offsets = base_offsets;
                if !offsets.contains(&var_offset) {
                    offsets.push(var_offset);
                }
                let schema = Arc::new(RowSchema::new(offsets));
                let rows = collected
                    .into_iter()
                    .map(|(row, graph)| {
                        let mut cells: Vec<Option<Literal>> =
                            schema.variables().iter().map(|o| row.get(*o).cloned()).collect();
                        if let Some(pos) = schema.position_of(var_offset) {
                            cells[pos] = Some(graph);
                        }
                        Row::new(Arc::clone(&schema), cells)
                    })
                    .collect();
                Self { schema, rows, idx: 0 }
            }
        }
    }
}

impl RowSource for GraphRowSource {
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
