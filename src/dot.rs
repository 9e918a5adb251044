use crate::assemble::Rendering;
use crate::graph::{Edge, Graph, NodeRef, port_name};
use crate::label::escape_html;
use crate::tooltip::{TooltipEntry, placeholder};
use std::fmt::Write;

pub struct DotWriter {
    indent: &'static str,
}

impl Default for DotWriter {
    fn default() -> Self {
        Self { indent: "\t" }
    }
}

impl DotWriter {
    /// Serialize the graph and substitute tooltip keys back in.
    pub fn render(&self, rendering: &Rendering) -> String {
        let dot = self.write_graph(&rendering.graph);
        apply_tooltips(&dot, &rendering.tooltips)
    }

    /// Serialize the graph with tooltip keys left in place.
    pub fn write_graph(&self, graph: &Graph) -> String {
        let mut out = String::new();
        let ind = self.indent;

        let kind = if graph.directed { "digraph" } else { "graph" };
        writeln!(&mut out, "{} {{", kind).unwrap();

        writeln!(&mut out, "{}graph [rankdir={}];", ind, quote(&graph.rankdir)).unwrap();
        let n = &graph.node_defaults;
        writeln!(
            &mut out,
            "{}node [fontname={}, fontsize={}, shape={}];",
            ind,
            quote(&n.fontname),
            n.fontsize,
            quote(&n.shape)
        )
        .unwrap();
        let e = &graph.edge_defaults;
        writeln!(
            &mut out,
            "{}edge [fontname={}, fontsize={}, labeldistance={}, color={}];",
            ind,
            quote(&e.fontname),
            e.fontsize,
            e.labeldistance,
            quote(&e.color)
        )
        .unwrap();

        for node in &graph.nodes {
            writeln!(&mut out, "{}{} [label=<{}>];", ind, quote(&node.id), node.label).unwrap();
        }

        for edge in &graph.edges {
            self.write_edge(&mut out, edge, graph.directed);
        }

        writeln!(&mut out, "}}").unwrap();
        out
    }

    fn write_edge(&self, out: &mut String, edge: &Edge, directed: bool) {
        let op = if directed { "->" } else { "--" };
        let mut attrs: Vec<String> = Vec::new();

        if edge.is_invisible() {
            attrs.push("style=invis".to_string());
        }
        if let Some(minlen) = edge.minlen {
            attrs.push(format!("minlen={}", minlen));
        }
        if edge.arrowhead.is_some() || edge.arrowtail.is_some() {
            attrs.push("dir=both".to_string());
        }
        if let Some(head) = edge.arrowhead {
            attrs.push(format!("arrowhead={}", head.as_str()));
        }
        if let Some(tail) = edge.arrowtail {
            attrs.push(format!("arrowtail={}", tail.as_str()));
        }
        if let Some(xlabel) = &edge.xlabel {
            attrs.push(format!("xlabel={}", quote(xlabel)));
        }
        if let Some(color) = &edge.color {
            attrs.push(format!("color={}", quote(color)));
        }
        if let Some(tooltip) = &edge.tooltip {
            attrs.push(format!("tooltip={}", quote(tooltip)));
        }

        write!(out, "{}{} {} {}", self.indent, endpoint(&edge.from), op, endpoint(&edge.to)).unwrap();
        if !attrs.is_empty() {
            write!(out, " [{}]", attrs.join(", ")).unwrap();
        }
        writeln!(out, ";").unwrap();
    }
}

fn endpoint(r: &NodeRef) -> String {
    match r.port {
        Some(port) => format!("{}:{}", quote(&r.node), port_name(port)),
        None => quote(&r.node),
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Replace each marked placeholder cell's content with a single-cell table
/// that carries the tooltip around the original text. The marker is dropped.
pub fn apply_tooltips(dot: &str, tooltips: &[TooltipEntry]) -> String {
    let mut out = dot.to_string();
    for entry in tooltips {
        let wrapped = format!(
            r##"><TABLE BORDER="0" CELLBORDER="0" CELLSPACING="0" CELLPADDING="0"><TR><TD TOOLTIP="{}" HREF="#">{}</TD></TR></TABLE></TD>"##,
            escape_tooltip(&entry.tooltip),
            entry.text
        );
        out = out.replace(&placeholder(&entry.key), &wrapped);
    }
    out
}

fn escape_tooltip(s: &str) -> String {
    escape_html(s).replace('\n', "&#10;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::assemble;
    use crate::options::RenderOptions;
    use crate::parser::Parser;
    use crate::tooltip::SeededKeys;

    fn rendering(input: &str) -> Rendering {
        let schema = Parser::new(input).unwrap().parse().unwrap();
        let mut keys = SeededKeys::new(17);
        assemble(&schema, &RenderOptions::default(), &mut keys).unwrap()
    }

    #[test]
    fn test_render_basic() {
        let r = rendering("Table users { id int [pk] }");
        let dot = DotWriter::default().render(&r);
        assert!(dot.starts_with("digraph {"));
        assert!(dot.contains(r#"graph [rankdir="LR"];"#));
        assert!(dot.contains(r#"node [fontname="Bitstream Vera Sans", fontsize=8, shape="none"];"#));
        assert!(dot.contains(r#""users" [label=<<TABLE"#));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn test_reference_edge_syntax() {
        let r = rendering(
            "Table a { x int }\nTable b { y int }\nRef: a.x < b.y",
        );
        let dot = DotWriter::default().write_graph(&r.graph);
        assert!(dot.contains(
            r##""a":p0 -> "b":p1 [minlen=1, dir=both, arrowhead=crow, arrowtail=none, xlabel="x : y", color="#1B9E77"];"##
        ));
    }

    #[test]
    fn test_invisible_edges() {
        let r = rendering("Enum e { one }\nTable t { v e }");
        let dot = DotWriter::default().render(&r);
        assert!(dot.contains(r#""e" -> "t" [style=invis];"#));
        assert!(!dot.contains("xlabel"));
    }

    #[test]
    fn test_tooltip_round_trip() {
        let r = rendering(
            "Table people { id int [pk, note: 'COLOR: 0 \"primary\" key'] \n Note: 'COLOR: 1 Everyone' }",
        );
        let raw = DotWriter::default().write_graph(&r.graph);
        for entry in &r.tooltips {
            assert_eq!(raw.matches(&placeholder(&entry.key)).count(), 1);
        }

        let dot = apply_tooltips(&raw, &r.tooltips);
        assert!(!dot.contains(" ID=\""));
        for entry in &r.tooltips {
            assert!(!dot.contains(entry.key.as_str()));
        }
        assert!(dot.contains(r##"<TD TOOLTIP="Everyone" HREF="#"><B>people</B></TD>"##));
        assert!(dot.contains(r##"<TD TOOLTIP="&quot;primary&quot; key" HREF="#"><B>id</B> : int</TD>"##));
    }

    #[test]
    fn test_enum_items_spelling_a_key_are_untouched() {
        let schema = Parser::new("Enum size { s m l }\nTable t { v size\n Note: 'COLOR: 0 tip' }")
            .unwrap()
            .parse()
            .unwrap();
        for seed in 0..200 {
            let mut keys = SeededKeys::new(seed);
            let r = assemble(&schema, &RenderOptions::default(), &mut keys).unwrap();
            let dot = DotWriter::default().render(&r);
            for item in ["s", "m", "l"] {
                assert!(
                    dot.contains(&format!(r#"<TR><TD align="left">{}</TD></TR>"#, item)),
                    "seed {}",
                    seed
                );
            }
            assert_eq!(dot.matches(r#"TOOLTIP="tip""#).count(), 1, "seed {}", seed);
        }
    }

    #[test]
    fn test_quoting() {
        assert_eq!(quote(r#"a"b\c"#), r#""a\"b\\c""#);
        assert_eq!(endpoint(&NodeRef::port("public.users", 3)), r#""public.users":p3"#);
    }

    #[test]
    fn test_edge_tooltip() {
        let r = rendering("Table a { x int }\nTable b { y int }\nRef: a.x - b.y [note: 'COLOR: 3 owns']");
        let dot = DotWriter::default().render(&r);
        assert!(dot.contains(r#"tooltip="owns""#));
        assert!(dot.contains("arrowhead=none, arrowtail=none"));
    }
}
