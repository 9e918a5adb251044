//! Reference edges.

use tracing::debug;

use crate::ast::RefKind;
use crate::graph::{Arrow, Edge, EdgeKind, NodeRef};
use crate::resolve::RefStyle;

/// `(arrowhead, arrowtail)` for a cardinality. The "many" marker sits at
/// the end of the reference that has many rows.
pub fn arrows(kind: RefKind) -> (Arrow, Arrow) {
    match kind {
        RefKind::OneToOne => (Arrow::None, Arrow::None),
        RefKind::OneToMany => (Arrow::Crow, Arrow::None),
        RefKind::ManyToOne => (Arrow::None, Arrow::Crow),
        RefKind::ManyToMany => (Arrow::Crow, Arrow::Crow),
    }
}

/// Longer column names push the two tables further apart.
pub fn min_len(origin: &str, dest: &str) -> u32 {
    let total = (origin.chars().count() + dest.chars().count()) as f64;
    (1.0 + total / 2.0).sqrt().floor() as u32
}

/// Invisible edges added next to a self-reference so the loop gets room.
pub fn self_padding(origin: &str, dest: &str) -> usize {
    (origin.chars().count() + dest.chars().count()) / 8
}

/// Edges for one reference: padding (self-references only) followed by the
/// visible edge between the two column ports.
pub fn reference_edges(kind: RefKind, style: &RefStyle) -> Vec<Edge> {
    let origin = style.from.column();
    let dest = style.to.column();
    let mut edges = Vec::new();

    if style.from.table == style.to.table {
        let padding = self_padding(origin, dest);
        debug!(table = %style.from.table, padding, "self reference");
        for _ in 0..padding {
            edges.push(Edge::invisible(
                EdgeKind::SelfPadding,
                NodeRef::node(style.from.table.clone()),
                NodeRef::node(style.to.table.clone()),
            ));
        }
    }

    let (head, tail) = arrows(kind);
    edges.push(Edge {
        kind: EdgeKind::Reference,
        from: NodeRef::port(style.from.table.clone(), style.from.port),
        to: NodeRef::port(style.to.table.clone(), style.to.port),
        arrowhead: Some(head),
        arrowtail: Some(tail),
        color: Some(style.color.clone()),
        minlen: Some(min_len(origin, dest)),
        xlabel: Some(format!("{} : {}", origin, dest)),
        tooltip: style.tooltip.clone(),
    });

    edges
}
