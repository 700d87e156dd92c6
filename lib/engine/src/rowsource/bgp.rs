use super::RowSource;
use crate::bgp::{bgp_all_bindings, bgp_variables};
use crate::triples_source::TriplesSource;
use sparq_model::{Bindings, Literal, Row, RowSchema, TriplePattern};
use std::sync::Arc;

/// The `Bgp` leaf (§4.3): eagerly materializes every consistent joint binding via the
/// shared backtracking join (`crate::bgp`) rather than streaming a nested-loop join —
/// the spec's "no cost-based optimization" non-goal (§1) leaves no reason to do better.
pub struct BgpRowSource {
    schema: Arc<RowSchema>,
    rows: Vec<Row>,
    idx: usize,
}

impl BgpRowSource {
    pub fn new(triples: &[TriplePattern], source: &dyn TriplesSource, origin: Option<&Literal>) -> Self {
        let schema = Arc::new(RowSchema::new(bgp_variables(triples)));
        let base = Arc::new(Bindings::Empty);
        let rows = bgp_all_bindings(triples, source, origin, &base)
            .into_iter()
            .map(|bindings| row_from_bindings(&schema, &bindings))
            .collect();
        Self { schema, rows, idx: 0 }
    }
}

fn row_from_bindings(schema: &Arc<RowSchema>, bindings: &Bindings) -> Row {
    let cells = schema.variables().iter().map(|offset| bindings.get(*offset).cloned()).collect();
    Row::new(Arc::clone(schema), cells)
}

impl RowSource for BgpRowSource {
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
    use crate::triples_source::MemoryTriplesSource;

    fn uri(s: &str) -> Literal {
        Literal::Uri(oxrdf::NamedNode::new(s).unwrap())
    }

    #[test]
    fn empty_pattern_yields_one_empty_row() {
        let source = MemoryTriplesSource::new();
        let mut rows = BgpRowSource::new(&[], &source, None);
        assert_eq!(rows.read_all_rows().len(), 1);
    }

    #[test]
    fn binds_matching_variable_across_triples() {
        let source = MemoryTriplesSource::new();
        source.insert(uri("urn:a"), uri("urn:p"), uri("urn:b"), None);
        let x = Literal::Variable(0, "x".into());
        let triples = vec![TriplePattern::new(uri("urn:a"), uri("urn:p"), x)];
        let mut rows = BgpRowSource::new(&triples, &source, None);
        let all = rows.read_all_rows();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].get(0), Some(&uri("urn:b")));
    }
}
