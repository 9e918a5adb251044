use crate::parser::ParseError;

/// Invalid input detected while building the graph.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Reference #{index} has no column on its {side} side")]
    MissingEndpoint { index: usize, side: &'static str },
    #[error("Reference #{index} points at unknown table '{table}'")]
    UnknownTable { index: usize, table: String },
    #[error("Reference #{index} points at unknown column '{table}.{column}'")]
    UnknownColumn {
        index: usize,
        table: String,
        column: String,
    },
    /// Every key of this width is already registered.
    #[error("Every {0}-character tooltip key is already in use")]
    KeyCollision(usize),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Build error: {0}")]
    Build(#[from] BuildError),
}
