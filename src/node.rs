//! Table and enum nodes.

use tracing::debug;
use unicode_width::UnicodeWidthStr;

use crate::ast::{Enum, Table};
use crate::error::BuildError;
use crate::graph::{Edge, EdgeKind, Node, NodeKind, NodeRef};
use crate::label::{ColumnLabel, LabelContext, TableMarkup, escape_html, plain_row};
use crate::note;
use crate::tooltip::TooltipRegistry;

pub fn enum_node(e: &Enum) -> Node {
    let markup = TableMarkup {
        header: format!("<I>Enum</I><BR/><B>{}</B>", escape_html(&e.name)),
        header_color: None,
        header_key: None,
        rows: e.items.iter().map(|item| plain_row(item)).collect(),
    };

    Node {
        id: e.name.clone(),
        kind: NodeKind::Enum,
        label: markup.render(),
    }
}

/// Build a table's node and the invisible edges tying it to the enums its
/// columns use (one per such column).
pub fn table_node(
    table: &Table,
    ctx: &LabelContext<'_>,
    tooltips: &mut TooltipRegistry<'_>,
) -> Result<(Node, Vec<Edge>), BuildError> {
    debug!(table = %table.name, columns = table.columns.len(), "building table node");

    let annotation = note::parse(table.note.as_deref());
    let header_color = annotation
        .color_index
        .and_then(|i| ctx.options.header_palette.pick(i))
        .map(str::to_string)
        .or_else(|| table.header_color.clone());

    let header = format!("<B>{}</B>", escape_html(&table.name));
    let header_key = match &annotation.tooltip {
        // Same visual width as the name, so the node doesn't change size
        // once the key is substituted back.
        Some(tip) => {
            let width = UnicodeWidthStr::width(table.name.as_str());
            Some(tooltips.register_fixed(&header, tip, width)?)
        }
        None => None,
    };

    let mut rows = Vec::with_capacity(table.columns.len());
    let mut edges = Vec::new();
    for column in &table.columns {
        let label = ColumnLabel::build(&table.name, column, ctx, tooltips)?;
        if let Some(enum_name) = &label.enum_used {
            debug!(table = %table.name, column = %column.name, %enum_name, "column uses enum");
            edges.push(Edge::invisible(
                EdgeKind::EnumAlignment,
                NodeRef::node(enum_name.clone()),
                NodeRef::node(table.name.clone()),
            ));
        }
        rows.push(label.render());
    }

    let markup = TableMarkup {
        header,
        header_color,
        header_key,
        rows,
    };
    let node = Node {
        id: table.name.clone(),
        kind: NodeKind::Table,
        label: markup.render(),
    };

    Ok((node, edges))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RenderOptions;
    use crate::parser::Parser;
    use crate::resolve::{PortMap, ResolvedRefs};
    use crate::tooltip::SeededKeys;
    use std::collections::HashSet;

    fn build(input: &str, table: &str) -> (Node, Vec<Edge>, Vec<crate::tooltip::TooltipEntry>) {
        let schema = Parser::new(input).unwrap().parse().unwrap();
        let options = RenderOptions::default();
        let ports = PortMap::assign(&schema);
        let refs = ResolvedRefs::prepare(&schema, &ports, &options.edge_palette, "grey").unwrap();
        let enums: HashSet<String> = schema.enums.iter().map(|e| e.name.clone()).collect();
        let ctx = LabelContext {
            options: &options,
            ports: &ports,
            refs: &refs,
            enums: &enums,
        };
        let mut keys = SeededKeys::new(11);
        let mut tooltips = TooltipRegistry::new(&mut keys);
        let (node, edges) =
            table_node(schema.table(table).unwrap(), &ctx, &mut tooltips).unwrap();
        (node, edges, tooltips.into_entries())
    }

    #[test]
    fn test_enum_node() {
        let e = Enum {
            name: "status".into(),
            items: vec!["active".into(), "in <review>".into()],
        };
        let node = enum_node(&e);
        assert_eq!(node.kind, NodeKind::Enum);
        assert!(node.label.contains("<I>Enum</I><BR/><B>status</B>"));
        assert!(node.label.contains(r#"<TR><TD align="left">active</TD></TR>"#));
        assert!(node.label.contains("in &lt;review&gt;"));
    }

    #[test]
    fn test_rows_follow_declaration_order() {
        let (node, edges, _) = build("Table t { b int\n a int\n c int }", "t");
        let b = node.label.find("b? : int").unwrap();
        let a = node.label.find("a? : int").unwrap();
        let c = node.label.find("c? : int").unwrap();
        assert!(b < a && a < c);
        assert!(edges.is_empty());
    }

    #[test]
    fn test_header_color_and_tooltip() {
        let (node, _, tooltips) = build(
            "Table accounts { id int\n Note: 'COLOR: 2 Billing accounts' }",
            "accounts",
        );
        assert_eq!(tooltips.len(), 1);
        let entry = &tooltips[0];
        assert_eq!(entry.key.len(), "accounts".len());
        assert_eq!(entry.text, "<B>accounts</B>");
        assert_eq!(entry.tooltip, "Billing accounts");
        let color = RenderOptions::default().header_palette.pick(2).unwrap().to_string();
        assert!(node
            .label
            .contains(&format!(r#"<TD bgcolor="{}" ID="{}">{}</TD>"#, color, entry.key, entry.key)));
        assert!(!node.label.contains("<B>accounts</B>"));
    }

    #[test]
    fn test_headercolor_setting_is_fallback() {
        let (node, _, tooltips) = build("Table t [headercolor: #AABBCC] { id int }", "t");
        assert!(tooltips.is_empty());
        assert!(node.label.contains(r##"<TD bgcolor="#AABBCC"><B>t</B></TD>"##));
    }

    #[test]
    fn test_wide_name_key_width() {
        let (_, _, tooltips) = build("Table 顧客 { id int\n Note: 'COLOR: 0 customers' }", "顧客");
        assert_eq!(tooltips[0].key.len(), 4);
    }

    #[test]
    fn test_enum_alignment_edges() {
        let input = r#"
            Enum status { on off }
            Table jobs {
                id int
                state status
                previous status
                kind text
            }
        "#;
        let (_, edges, _) = build(input, "jobs");
        assert_eq!(edges.len(), 2);
        for edge in &edges {
            assert_eq!(edge.kind, EdgeKind::EnumAlignment);
            assert!(edge.is_invisible());
            assert_eq!(edge.from, NodeRef::node("status"));
            assert_eq!(edge.to, NodeRef::node("jobs"));
        }
    }
}
