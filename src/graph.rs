//! Abstract directed graph handed to the DOT serializer.

use crate::resolve::Port;

#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    pub directed: bool,
    /// Layout direction hint (`LR`, `TB`, ...)
    pub rankdir: String,
    pub node_defaults: NodeDefaults,
    pub edge_defaults: EdgeDefaults,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeDefaults {
    pub fontname: String,
    pub fontsize: u32,
    pub shape: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeDefaults {
    pub fontname: String,
    pub fontsize: u32,
    pub color: String,
    pub labeldistance: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Table,
    Enum,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    /// HTML-like label body, without the enclosing `<` `>`
    pub label: String,
}

/// Edge endpoint: a node, optionally narrowed to one of its rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRef {
    pub node: String,
    pub port: Option<Port>,
}

impl NodeRef {
    pub fn node(node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            port: None,
        }
    }

    pub fn port(node: impl Into<String>, port: Port) -> Self {
        Self {
            node: node.into(),
            port: Some(port),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrow {
    None,
    /// "many" marker
    Crow,
}

impl Arrow {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Crow => "crow",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Reference,
    /// Invisible edge pulling an enum next to a table that uses it
    EnumAlignment,
    /// Invisible edge reserving room for a self-reference loop
    SelfPadding,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub kind: EdgeKind,
    pub from: NodeRef,
    pub to: NodeRef,
    pub arrowhead: Option<Arrow>,
    pub arrowtail: Option<Arrow>,
    pub color: Option<String>,
    pub minlen: Option<u32>,
    /// `origin : dest` column names, placed beside the edge
    pub xlabel: Option<String>,
    pub tooltip: Option<String>,
}

impl Edge {
    pub fn invisible(kind: EdgeKind, from: NodeRef, to: NodeRef) -> Self {
        Self {
            kind,
            from,
            to,
            arrowhead: None,
            arrowtail: None,
            color: None,
            minlen: None,
            xlabel: None,
            tooltip: None,
        }
    }

    pub fn is_invisible(&self) -> bool {
        self.kind != EdgeKind::Reference
    }
}

/// Name of a row port in label markup and edge endpoints.
pub fn port_name(port: Port) -> String {
    format!("p{}", port)
}
