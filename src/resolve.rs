//! Port assignment and reference styling, done once before any label is built.

use std::collections::HashMap;

use tracing::debug;

use crate::ast::{Endpoint, Schema};
use crate::error::BuildError;
use crate::note;
use crate::palette::Palette;

pub type Port = u32;

/// Schema-wide unique port per `(table, column)`.
#[derive(Debug, Clone, Default)]
pub struct PortMap {
    ports: HashMap<(String, String), Port>,
}

impl PortMap {
    /// Number ports in table declaration order, then column order.
    pub fn assign(schema: &Schema) -> Self {
        let mut ports = HashMap::new();
        let mut next: Port = 0;
        for table in &schema.tables {
            for column in &table.columns {
                ports.insert((table.name.clone(), column.name.clone()), next);
                next += 1;
            }
        }
        debug!(ports = next, "assigned column ports");
        Self { ports }
    }

    pub fn get(&self, table: &str, column: &str) -> Option<Port> {
        self.ports
            .get(&(table.to_string(), column.to_string()))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

/// A reference endpoint checked against the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    /// Canonical table name (never an alias)
    pub table: String,
    pub columns: Vec<String>,
    /// Port of the first column; the edge attaches here
    pub port: Port,
}

impl Anchor {
    pub fn column(&self) -> &str {
        self.columns.first().map(|s| s.as_str()).unwrap_or_default()
    }

    fn touches(&self, table: &str, column: &str) -> bool {
        self.table == table && self.names(column)
    }

    fn names(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// Everything a reference needs to be drawn consistently on both its
/// columns and its edge.
#[derive(Debug, Clone, PartialEq)]
pub struct RefStyle {
    pub color: String,
    pub tooltip: Option<String>,
    pub from: Anchor,
    pub to: Anchor,
}

#[derive(Debug, Clone)]
pub struct ResolvedRefs {
    styles: Vec<RefStyle>,
}

impl ResolvedRefs {
    /// Check every reference against the schema and give it a color and
    /// its two ports.
    ///
    /// The color comes from a `COLOR:<n>` note when present, otherwise the
    /// edge palette is cycled by reference position. `fallback` is used
    /// only when the palette is empty.
    pub fn prepare(
        schema: &Schema,
        ports: &PortMap,
        palette: &Palette,
        fallback: &str,
    ) -> Result<Self, BuildError> {
        let mut styles = Vec::with_capacity(schema.refs.len());

        for (index, r) in schema.refs.iter().enumerate() {
            let from = anchor(schema, ports, index, &r.from, "origin")?;
            let to = anchor(schema, ports, index, &r.to, "destination")?;

            let annotation = note::parse(r.note.as_deref());
            let color = palette
                .pick(annotation.color_index.unwrap_or(index))
                .unwrap_or(fallback)
                .to_string();

            styles.push(RefStyle {
                color,
                tooltip: annotation.tooltip,
                from,
                to,
            });
        }

        Ok(Self { styles })
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn style(&self, index: usize) -> Option<&RefStyle> {
        self.styles.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RefStyle> {
        self.styles.iter()
    }

    /// Indices of every reference with an endpoint on `table.column`, in
    /// schema order.
    pub fn candidates<'a>(
        &'a self,
        table: &'a str,
        column: &'a str,
    ) -> impl Iterator<Item = usize> + 'a {
        self.styles
            .iter()
            .enumerate()
            .filter(move |(_, s)| s.from.touches(table, column) || s.to.touches(table, column))
            .map(|(i, _)| i)
    }

    /// The reference that decorates a column named `column`: the first one,
    /// in schema order, with an endpoint column of that name on either side.
    /// The table is not compared, so every `id` column shares the color of
    /// the first reference that involves an `id`.
    pub fn resolve(&self, column: &str) -> Option<&RefStyle> {
        self.styles
            .iter()
            .find(|s| s.from.names(column) || s.to.names(column))
    }
}

fn anchor(
    schema: &Schema,
    ports: &PortMap,
    index: usize,
    end: &Endpoint,
    side: &'static str,
) -> Result<Anchor, BuildError> {
    let column = end
        .first_column()
        .ok_or(BuildError::MissingEndpoint { index, side })?;

    let table = schema
        .table(&end.table)
        .ok_or_else(|| BuildError::UnknownTable {
            index,
            table: end.table.clone(),
        })?;

    for c in &end.columns {
        if table.column(c).is_none() {
            return Err(BuildError::UnknownColumn {
                index,
                table: table.name.clone(),
                column: c.clone(),
            });
        }
    }

    let port = ports
        .get(&table.name, column)
        .ok_or_else(|| BuildError::UnknownColumn {
            index,
            table: table.name.clone(),
            column: column.to_string(),
        })?;

    Ok(Anchor {
        table: table.name.clone(),
        columns: end.columns.clone(),
        port,
    })
}
