#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    pub enums: Vec<Enum>,
    /// Tables in declaration order; names are unique.
    pub tables: Vec<Table>,
    pub refs: Vec<Reference>,
}

impl Schema {
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| t.name == name || t.alias.as_deref() == Some(name))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub name: String,
    pub alias: Option<String>,
    pub columns: Vec<Column>,
    pub note: Option<String>,
    /// `headercolor` setting, e.g. `#3498DB`
    pub header_color: Option<String>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Column {
    pub name: String,
    pub typ: String,
    pub pk: bool,
    pub unique: bool,
    pub not_null: bool,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enum {
    pub name: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub name: Option<String>,
    pub from: Endpoint,
    pub to: Endpoint,
    pub kind: RefKind,
    pub note: Option<String>,
}

/// One side of a reference. Composite references list several columns;
/// only the first one anchors the rendered edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub table: String,
    pub columns: Vec<String>,
}

impl Endpoint {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: vec![column.into()],
        }
    }

    pub fn first_column(&self) -> Option<&str> {
        self.columns.first().map(|s| s.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    OneToOne,   // -
    OneToMany,  // <
    ManyToOne,  // >
    ManyToMany, // <>
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lookup_by_alias() {
        let schema = Schema {
            tables: vec![Table {
                name: "users".into(),
                alias: Some("U".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(schema.table("U").is_some());
        assert!(schema.table("users").is_some());
        assert!(schema.table("posts").is_none());
    }
}
