//! Typed label records, rendered to Graphviz HTML-like markup once at the end.

use std::collections::HashSet;

use crate::ast::Column;
use crate::error::BuildError;
use crate::graph::port_name;
use crate::note;
use crate::options::RenderOptions;
use crate::resolve::{Port, PortMap, ResolvedRefs};
use crate::tooltip::{self, TooltipRegistry};

/// Shared, read-only inputs for building column labels.
pub struct LabelContext<'a> {
    pub options: &'a RenderOptions,
    pub ports: &'a PortMap,
    pub refs: &'a ResolvedRefs,
    pub enums: &'a HashSet<String>,
}

/// One table row, before rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLabel {
    /// Decorated markup, e.g. `<I><B>id</B></I> : int`
    pub text: String,
    pub color: Option<String>,
    pub port: Option<Port>,
    /// Placeholder replacing `text` when the column has a tooltip
    pub tooltip_key: Option<String>,
    /// Enum this column's type refers to
    pub enum_used: Option<String>,
}

impl ColumnLabel {
    pub fn build(
        table: &str,
        column: &Column,
        ctx: &LabelContext<'_>,
        tooltips: &mut TooltipRegistry<'_>,
    ) -> Result<Self, BuildError> {
        let suffix = if column.not_null || column.pk {
            ""
        } else {
            ctx.options.nullable_marker.as_str()
        };

        let mut name = escape_html(&format!("{}{}", column.name, suffix));
        if column.pk {
            name = format!("<B>{}</B>", name);
        }
        if column.unique {
            name = format!("<I>{}</I>", name);
        }
        let text = format!("{} : {}", name, escape_html(&column.typ));

        let annotation = note::parse(column.note.as_deref());

        // A column's own COLOR note wins over the reference color.
        let mut color = annotation
            .color_index
            .and_then(|i| ctx.options.header_palette.pick(i))
            .map(str::to_string);

        let mut port = None;
        if let Some(style) = ctx.refs.resolve(&column.name) {
            if color.is_none() {
                color = Some(style.color.clone());
            }
            port = ctx.ports.get(table, &column.name);
        }

        let tooltip_key = match &annotation.tooltip {
            Some(tip) => Some(tooltips.register(&text, tip)?),
            None => None,
        };

        let typ = column.typ.trim();
        let enum_used = ctx.enums.contains(typ).then(|| typ.to_string());

        Ok(Self {
            text,
            color,
            port,
            tooltip_key,
            enum_used,
        })
    }

    /// Cell content as it appears in the label.
    pub fn content(&self) -> &str {
        self.tooltip_key.as_deref().unwrap_or(&self.text)
    }

    pub fn render(&self) -> String {
        let mut attrs = String::from(r#" align="left""#);
        if let Some(port) = self.port {
            attrs.push_str(&format!(r#" port="{}""#, port_name(port)));
        }
        if let Some(color) = &self.color {
            attrs.push_str(&format!(r#" bgcolor="{}""#, escape_html(color)));
        }
        if let Some(key) = &self.tooltip_key {
            attrs.push_str(&tooltip::marker(key));
        }
        format!("<TR><TD{}>{}</TD></TR>", attrs, self.content())
    }
}

/// Header cell plus pre-rendered rows of a bordered node table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableMarkup {
    pub header: String,
    pub header_color: Option<String>,
    /// Placeholder shown instead of `header` when it has a tooltip
    pub header_key: Option<String>,
    pub rows: Vec<String>,
}

impl TableMarkup {
    pub fn render(&self) -> String {
        let mut header_attrs = match &self.header_color {
            Some(c) => format!(r#" bgcolor="{}""#, escape_html(c)),
            None => String::new(),
        };
        let header = match &self.header_key {
            Some(key) => {
                header_attrs.push_str(&tooltip::marker(key));
                key.as_str()
            }
            None => self.header.as_str(),
        };

        let mut out = String::from(r#"<TABLE BORDER="1" CELLBORDER="0" CELLSPACING="1">"#);
        out.push_str(&format!(
            "\n\t<TR><TD{}>{}</TD></TR><HR/>",
            header_attrs, header
        ));
        for row in &self.rows {
            out.push_str("\n\t");
            out.push_str(row);
        }
        out.push_str("\n\t</TABLE>");
        out
    }
}

/// Plain left-aligned row with no decoration.
pub fn plain_row(text: &str) -> String {
    format!(r#"<TR><TD align="left">{}</TD></TR>"#, escape_html(text))
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
