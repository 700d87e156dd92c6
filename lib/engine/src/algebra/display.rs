use super::{AlgebraNode, PathExpression};
use std::fmt;

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Predicate(p) => write!(f, "{p}"),
            Self::Inverse(p) => write!(f, "^{p}"),
            Self::Sequence(l, r) => write!(f, "({l}/{r})"),
            Self::Alternative(l, r) => write!(f, "({l}|{r})"),
            Self::ZeroOrMore(p) => write!(f, "{p}*"),
            Self::OneOrMore(p) => write!(f, "{p}+"),
            Self::ZeroOrOne(p) => write!(f, "{p}?"),
            Self::NegatedPropertySet(items) => {
                write!(f, "!(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// The manifest-facing textual form (spec §6): operator label, `(`, indented children
/// separated by ` ,\n`, `)`. Byte-stable by construction since every branch writes a
/// fixed literal shape.
impl fmt::Display for AlgebraNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(self, f, 0)
    }
}

fn indent(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        write!(f, "  ")?;
    }
    Ok(())
}

fn write_node(node: &AlgebraNode, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    match node {
        AlgebraNode::Bgp(triples) => {
            if triples.is_empty() {
                write!(f, "Z")
            } else {
                writeln!(f, "BGP(")?;
                for (i, t) in triples.iter().enumerate() {
                    indent(f, depth + 1)?;
                    write!(f, "{} {} {}", t.subject, t.predicate, t.object)?;
                    if i + 1 < triples.len() {
                        writeln!(f, " ,")?;
                    } else {
                        writeln!(f)?;
                    }
                }
                indent(f, depth)?;
                write!(f, ")")
            }
        }
        AlgebraNode::Filter { expr, inner } => {
            writeln!(f, "Filter(")?;
            indent(f, depth + 1)?;
            write_node(inner, f, depth + 1)?;
            writeln!(f, " ,")?;
            indent(f, depth + 1)?;
            writeln!(f, "{expr}")?;
            indent(f, depth)?;
            write!(f, ")")
        }
        AlgebraNode::Join(l, r) => write_binary(f, "Join", l, r, depth),
        AlgebraNode::LeftJoin { left, right, expr } => {
            writeln!(f, "LeftJoin(")?;
            indent(f, depth + 1)?;
            write_node(left, f, depth + 1)?;
            writeln!(f, " ,")?;
            indent(f, depth + 1)?;
            write_node(right, f, depth + 1)?;
            writeln!(f, " ,")?;
            indent(f, depth + 1)?;
            writeln!(f, "{expr}")?;
            indent(f, depth)?;
            write!(f, ")")
        }
        AlgebraNode::Diff(l, r) => write_binary(f, "Diff", l, r, depth),
        AlgebraNode::Union(l, r) => write_binary(f, "Union", l, r, depth),
        AlgebraNode::ToList(inner) => write_unary(f, "ToList", inner, depth),
        AlgebraNode::OrderBy {
            inner,
            conditions,
            distinct,
        } => {
            writeln!(f, "OrderBy(")?;
            indent(f, depth + 1)?;
            write_node(inner, f, depth + 1)?;
            writeln!(f, " ,")?;
            indent(f, depth + 1)?;
            write!(f, "Conditions([ ")?;
            for (i, c) in conditions.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                if c.descending {
                    write!(f, "desc({})", c.expr)?;
                } else {
                    write!(f, "{}", c.expr)?;
                }
            }
            writeln!(f, " ])")?;
            if *distinct {
                indent(f, depth + 1)?;
                writeln!(f, "distinct")?;
            }
            indent(f, depth)?;
            write!(f, ")")
        }
        AlgebraNode::Project { inner, variables } => {
            writeln!(f, "Project(")?;
            indent(f, depth + 1)?;
            write_node(inner, f, depth + 1)?;
            writeln!(f, " ,")?;
            indent(f, depth + 1)?;
            write!(f, "Variables([ ")?;
            for v in variables {
                write!(f, "{v} ")?;
            }
            writeln!(f, "])")?;
            indent(f, depth)?;
            write!(f, ")")
        }
        AlgebraNode::Distinct(inner) => write_unary(f, "Distinct", inner, depth),
        AlgebraNode::Reduced(inner) => write_unary(f, "Reduced", inner, depth),
        AlgebraNode::Slice {
            inner,
            limit,
            offset,
        } => {
            writeln!(f, "Slice(")?;
            indent(f, depth + 1)?;
            write_node(inner, f, depth + 1)?;
            writeln!(f, " ,")?;
            indent(f, depth + 1)?;
            writeln!(f, "slice limit {limit} offset {offset}")?;
            indent(f, depth)?;
            write!(f, ")")
        }
        AlgebraNode::Graph { inner, origin } => {
            writeln!(f, "Graph(")?;
            indent(f, depth + 1)?;
            write_node(inner, f, depth + 1)?;
            writeln!(f, " ,")?;
            indent(f, depth + 1)?;
            writeln!(f, "origin {origin}")?;
            indent(f, depth)?;
            write!(f, ")")
        }
        AlgebraNode::Assign {
            inner,
            variable,
            expr,
        } => {
            writeln!(f, "Assignment(")?;
            indent(f, depth + 1)?;
            write_node(inner, f, depth + 1)?;
            writeln!(f, " ,")?;
            indent(f, depth + 1)?;
            writeln!(f, "{variable} = {expr}")?;
            indent(f, depth)?;
            write!(f, ")")
        }
        AlgebraNode::Group { inner, variables } => {
            writeln!(f, "Group(")?;
            indent(f, depth + 1)?;
            write_node(inner, f, depth + 1)?;
            writeln!(f, " ,")?;
            indent(f, depth + 1)?;
            write!(f, "Variables([ ")?;
            for v in variables {
                write!(f, "{v} ")?;
            }
            writeln!(f, "])")?;
            indent(f, depth)?;
            write!(f, ")")
        }
        AlgebraNode::Aggregation {
            inner,
            exprs,
            synth_vars,
        } => {
            writeln!(f, "Aggregate(")?;
            indent(f, depth + 1)?;
            write_node(inner, f, depth + 1)?;
            writeln!(f, " ,")?;
            for (expr, var) in exprs.iter().zip(synth_vars.iter()) {
                indent(f, depth + 1)?;
                writeln!(f, "{var} = {expr}")?;
            }
            indent(f, depth)?;
            write!(f, ")")
        }
        AlgebraNode::Having { inner, exprs } => {
            writeln!(f, "Having(")?;
            indent(f, depth + 1)?;
            write_node(inner, f, depth + 1)?;
            writeln!(f, " ,")?;
            for expr in exprs {
                indent(f, depth + 1)?;
                writeln!(f, "{expr}")?;
            }
            indent(f, depth)?;
            write!(f, ")")
        }
        AlgebraNode::Values(block) => {
            writeln!(f, "Values(")?;
            for row in block.rows() {
                indent(f, depth + 1)?;
                write!(f, "[ ")?;
                for cell in row.cells() {
                    match cell {
                        Some(lit) => write!(f, "{lit} ")?,
                        None => write!(f, "UNDEF ")?,
                    }
                }
                writeln!(f, "]")?;
            }
            indent(f, depth)?;
            write!(f, ")")
        }
        AlgebraNode::Path {
            subject,
            path,
            object,
            origin,
        } => {
            writeln!(f, "Path(")?;
            indent(f, depth + 1)?;
            write!(f, "{subject} {path} {object}")?;
            if let Some(origin) = origin {
                write!(f, " in {origin}")?;
            }
            writeln!(f)?;
            indent(f, depth)?;
            write!(f, ")")
        }
        AlgebraNode::Service {
            inner,
            uri,
            silent,
            ..
        } => {
            writeln!(f, "Service(")?;
            indent(f, depth + 1)?;
            write_node(inner, f, depth + 1)?;
            writeln!(f, " ,")?;
            indent(f, depth + 1)?;
            writeln!(f, "uri <{uri}> silent {silent}")?;
            indent(f, depth)?;
            write!(f, ")")
        }
    }
}

fn write_unary(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    inner: &AlgebraNode,
    depth: usize,
) -> fmt::Result {
    writeln!(f, "{label}(")?;
    indent(f, depth + 1)?;
    write_node(inner, f, depth + 1)?;
    writeln!(f)?;
    indent(f, depth)?;
    write!(f, ")")
}

fn write_binary(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    left: &AlgebraNode,
    right: &AlgebraNode,
    depth: usize,
) -> fmt::Result {
    writeln!(f, "{label}(")?;
    indent(f, depth + 1)?;
    write_node(left, f, depth + 1)?;
    writeln!(f, " ,")?;
    indent(f, depth + 1)?;
    write_node(right, f, depth + 1)?;
    writeln!(f)?;
    indent(f, depth)?;
    write!(f, ")")
}
