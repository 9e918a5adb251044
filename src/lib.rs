pub mod assemble;
pub mod ast;
pub mod dot;
pub mod edge;
pub mod error;
pub mod graph;
pub mod label;
pub mod lexer;
pub mod node;
pub mod note;
pub mod options;
pub mod palette;
pub mod parser;
pub mod resolve;
pub mod tooltip;

use wasm_bindgen::prelude::*;

use assemble::assemble;
use dot::DotWriter;
pub use error::{BuildError, Error};
use options::RenderOptions;
use parser::Parser;
use tooltip::{KeySource, RandomKeys, SeededKeys};

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Parse DBML source and serialize it as a Graphviz DOT document.
pub fn convert(
    source: &str,
    options: &RenderOptions,
    keys: &mut dyn KeySource,
) -> Result<String, Error> {
    let schema = Parser::new(source)?.parse()?;
    let rendering = assemble(&schema, options, keys)?;
    Ok(DotWriter::default().render(&rendering))
}

/// Render DBML source to DOT. A seed makes tooltip keys reproducible.
#[wasm_bindgen(js_name = "dbmlToDot")]
pub fn render_dbml(source: &str, seed: Option<u64>) -> Result<String, String> {
    let options = RenderOptions::default();
    let result = match seed {
        Some(seed) => convert(source, &options, &mut SeededKeys::new(seed)),
        None => convert(source, &options, &mut RandomKeys),
    };
    result.map_err(|e| e.to_string())
}
