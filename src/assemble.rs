//! Orchestrates the builders over a whole schema.

use std::collections::HashSet;

use tracing::debug;

use crate::ast::Schema;
use crate::edge::reference_edges;
use crate::error::BuildError;
use crate::graph::{EdgeDefaults, Graph, NodeDefaults};
use crate::label::LabelContext;
use crate::node::{enum_node, table_node};
use crate::options::RenderOptions;
use crate::resolve::{PortMap, ResolvedRefs};
use crate::tooltip::{KeySource, TooltipEntry, TooltipRegistry};

/// A built graph and the tooltips its labels refer to by key.
#[derive(Debug, Clone)]
pub struct Rendering {
    pub graph: Graph,
    pub tooltips: Vec<TooltipEntry>,
}

pub fn assemble(
    schema: &Schema,
    options: &RenderOptions,
    keys: &mut dyn KeySource,
) -> Result<Rendering, BuildError> {
    let mut graph = Graph {
        directed: true,
        rankdir: options.rankdir.clone(),
        node_defaults: NodeDefaults {
            fontname: options.font_name.clone(),
            fontsize: options.font_size,
            shape: options.node_shape.clone(),
        },
        edge_defaults: EdgeDefaults {
            fontname: options.font_name.clone(),
            fontsize: options.font_size,
            color: options.edge_color.clone(),
            labeldistance: options.label_distance,
        },
        nodes: Vec::new(),
        edges: Vec::new(),
    };

    // Enums first, so table columns can be matched against their names.
    let mut enums = HashSet::new();
    for e in &schema.enums {
        graph.nodes.push(enum_node(e));
        enums.insert(e.name.trim().to_string());
    }
    debug!(?enums, "enums");

    // Every port exists before any label or edge asks for one.
    let ports = PortMap::assign(schema);
    let refs = ResolvedRefs::prepare(schema, &ports, &options.edge_palette, &options.edge_color)?;

    let mut tooltips = TooltipRegistry::new(keys);
    let ctx = LabelContext {
        options,
        ports: &ports,
        refs: &refs,
        enums: &enums,
    };
    for table in &schema.tables {
        let (node, edges) = table_node(table, &ctx, &mut tooltips)?;
        graph.nodes.push(node);
        graph.edges.extend(edges);
    }

    for (r, style) in schema.refs.iter().zip(refs.iter()) {
        graph.edges.extend(reference_edges(r.kind, style));
    }

    debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        tooltips = tooltips.entries().len(),
        "graph assembled"
    );

    Ok(Rendering {
        graph,
        tooltips: tooltips.into_entries(),
    })
}
