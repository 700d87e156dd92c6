//! The result-row textual form (spec §6): `row[var1=lit, var2=lit, ...]`, with the
//! ordering-values/group/offset suffixes a row may carry once it has passed through
//! `OrderBy`/`Group`/`Slice`. Used by the CLI query runner and the manifest test
//! driver to render a solution the same way across runs.

use sparq_model::{Row, VariablesTable};
use std::fmt::Write as _;

/// Renders one [`Row`] exactly as spec §6 describes: the bound cells first (unbound
/// cells print as `UNDEF`), then ` with ordering values [...]` if `OrderBy` attached a
/// sort key, then ` group N` if `Group`/`Aggregation` assigned one, then the terminal
/// ` offset N]` if `Slice` tagged a row index — the closing `]` belongs to the
/// outermost `row[`, not to the last suffix.
pub fn format_row(row: &Row, variables: &VariablesTable) -> String {
    let mut out = String::from("row[");
    for (i, offset) in row.schema().variables().iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let name = variables.get(*offset).map(|v| v.name()).unwrap_or("?");
        match row.get_by_position(i) {
            Some(lit) => {
                let _ = write!(out, "{name}={lit}");
            }
            None => {
                let _ = write!(out, "{name}=UNDEF");
            }
        }
    }
    if let Some(keys) = row.order_key() {
        out.push_str(" with ordering values [");
        for (i, key) in keys.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            match key {
                Some(lit) => {
                    let _ = write!(out, "{lit}");
                }
                None => out.push_str("UNDEF"),
            }
        }
        out.push(']');
    }
    if row.group_id() >= 0 {
        let _ = write!(out, " group {}", row.group_id());
    }
    if let Some(index) = row.row_index() {
        let _ = write!(out, " offset {index}");
    }
    out.push(']');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparq_model::{Literal, RowSchema, VariableKind};
    use std::sync::Arc;

    fn table_with_vars(names: &[&str]) -> VariablesTable {
        let mut table = VariablesTable::new();
        for name in names {
            table.insert_fresh(*name, VariableKind::Normal);
        }
        table
    }

    #[test]
    fn renders_bound_and_unbound_cells() {
        let table = table_with_vars(&["s", "o"]);
        let schema = Arc::new(RowSchema::new(vec![0, 1]));
        let row = Row::new(schema, vec![Some(Literal::Integer(1.into())), None]);
        assert_eq!(format_row(&row, &table), "row[s=1, o=UNDEF]");
    }

    #[test]
    fn renders_group_and_offset_suffixes() {
        let table = table_with_vars(&["s"]);
        let schema = Arc::new(RowSchema::new(vec![0]));
        let row = Row::new(schema, vec![Some(Literal::Integer(1.into()))])
            .with_group_id(2)
            .with_row_index(5);
        assert_eq!(format_row(&row, &table), "row[s=1 group 2 offset 5]");
    }

    #[test]
    fn renders_ordering_values() {
        let table = table_with_vars(&["s"]);
        let schema = Arc::new(RowSchema::new(vec![0]));
        let row = Row::new(schema, vec![Some(Literal::Integer(1.into()))])
            .with_order_key(vec![Some(Literal::Integer(1.into())), None]);
        assert_eq!(format_row(&row, &table), "row[s=1 with ordering values [1, UNDEF]]");
    }
}
