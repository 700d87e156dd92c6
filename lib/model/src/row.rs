use crate::Literal;
use std::sync::Arc;

/// The read-only column schema shared by every [`Row`] produced by one rowsource.
/// Rows hold a handle to their schema instead of a back-reference to the rowsource
/// that produced them (§9 Design Notes: avoids the source's `RASQAL_ROW_FLAG_WEAK_ROWSOURCE`
/// hazard — a row only ever needs the schema to resolve a cell's variable name, and a
/// `Arc<RowSchema>` handle gives it that without any ownership ambiguity).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowSchema {
    variables: Arc<[u32]>,
}

impl RowSchema {
    pub fn new(variables: impl Into<Arc<[u32]>>) -> Self {
        Self {
            variables: variables.into(),
        }
    }

    pub fn variables(&self) -> &[u32] {
        &self.variables
    }

    pub fn width(&self) -> usize {
        self.variables.len()
    }

    pub fn position_of(&self, offset: u32) -> Option<usize> {
        self.variables.iter().position(|v| *v == offset)
    }
}

/// A fixed-width result row (§3). `order_key` is populated by `OrderBy`; `group_id` is
/// `-1` outside of `Group`/`Aggregation`/`Having`; `row_index` is an optional
/// debugging/offset counter set by `Slice`.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    schema: Arc<RowSchema>,
    cells: Vec<Option<Literal>>,
    order_key: Option<Vec<Option<Literal>>>,
    group_id: i64,
    row_index: Option<u64>,
}

impl Row {
    pub fn new(schema: Arc<RowSchema>, cells: Vec<Option<Literal>>) -> Self {
        debug_assert_eq!(schema.width(), cells.len());
        Self {
            schema,
            cells,
            order_key: None,
            group_id: -1,
            row_index: None,
        }
    }

    pub fn empty(schema: Arc<RowSchema>) -> Self {
        let width = schema.width();
        Self::new(schema, vec![None; width])
    }

    pub fn schema(&self) -> &Arc<RowSchema> {
        &self.schema
    }

    pub fn cells(&self) -> &[Option<Literal>] {
        &self.cells
    }

    pub fn get(&self, offset: u32) -> Option<&Literal> {
        self.schema
            .position_of(offset)
            .and_then(|pos| self.cells[pos].as_ref())
    }

    pub fn get_by_position(&self, position: usize) -> Option<&Literal> {
        self.cells.get(position).and_then(Option::as_ref)
    }

    pub fn order_key(&self) -> Option<&[Option<Literal>]> {
        self.order_key.as_deref()
    }

    pub fn with_order_key(mut self, key: Vec<Option<Literal>>) -> Self {
        self.order_key = Some(key);
        self
    }

    pub fn group_id(&self) -> i64 {
        self.group_id
    }

    pub fn with_group_id(mut self, group_id: i64) -> Self {
        self.group_id = group_id;
        self
    }

    pub fn row_index(&self) -> Option<u64> {
        self.row_index
    }

    pub fn with_row_index(mut self, index: u64) -> Self {
        self.row_index = Some(index);
        self
    }

    /// Reshapes this row onto a different (possibly wider, possibly reordered) schema;
    /// cells for variables absent from `self` become unbound. Used by `Project` and by
    /// the padding step of `LeftJoin`/`Union`.
    pub fn reshape(&self, schema: Arc<RowSchema>) -> Self {
        let cells = schema
            .variables()
            .iter()
            .map(|offset| self.get(*offset).cloned())
            .collect();
        Self::new(schema, cells)
    }

    /// Merges two rows whose schemas are assumed variable-disjoint or compatible
    /// (`Join`/`LeftJoin` match semantics: any shared variable is already consistent —
    /// otherwise the rows would not have been paired up in the first place).
    pub fn merge(&self, other: &Self, merged_schema: Arc<RowSchema>) -> Self {
        let cells = merged_schema
            .variables()
            .iter()
            .map(|offset| {
                self.get(*offset)
                    .or_else(|| other.get(*offset))
                    .cloned()
            })
            .collect();
        Self::new(merged_schema, cells)
    }
}

/// A rectangular `VALUES` table: a named variable list plus rows where any cell may be
/// `None` ("unbound in this row", §3).
#[derive(Clone, Debug, PartialEq)]
pub struct BindingsBlock {
    schema: Arc<RowSchema>,
    rows: Vec<Vec<Option<Literal>>>,
}

impl BindingsBlock {
    pub fn new(schema: Arc<RowSchema>, rows: Vec<Vec<Option<Literal>>>) -> Self {
        Self { schema, rows }
    }

    pub fn schema(&self) -> &Arc<RowSchema> {
        &self.schema
    }

    pub fn rows(&self) -> impl Iterator<Item = Row> + '_ {
        self.rows
            .iter()
            .map(|cells| Row::new(Arc::clone(&self.schema), cells.clone()))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
