use anyhow::{Context, bail};
use clap::Parser;
use dbmldot::options::RenderOptions;
use dbmldot::tooltip::{KeySource, RandomKeys, SeededKeys};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{self, Command, Stdio};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dbmldot", version, about = "Render a DBML schema as a Graphviz graph")]
struct Cli {
    /// DBML schema file
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: `dot`, or any format the Graphviz `dot` executable accepts
    #[arg(short, long, default_value = "dot")]
    format: String,

    /// Seed tooltip keys for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Layout direction (LR, TB, RL, BT)
    #[arg(long, default_value = "LR")]
    rankdir: String,

    /// Font family for nodes and edges
    #[arg(long)]
    font: Option<String>,

    /// Font size for nodes and edges
    #[arg(long)]
    font_size: Option<u32>,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;

    let mut options = RenderOptions {
        rankdir: cli.rankdir.clone(),
        ..RenderOptions::default()
    };
    if let Some(font) = &cli.font {
        options.font_name = font.clone();
    }
    if let Some(size) = cli.font_size {
        options.font_size = size;
    }

    let mut keys: Box<dyn KeySource> = match cli.seed {
        Some(seed) => Box::new(SeededKeys::new(seed)),
        None => Box::new(RandomKeys),
    };
    let dot = dbmldot::convert(&source, &options, keys.as_mut())
        .with_context(|| format!("Failed to convert {}", cli.input.display()))?;
    info!(input = %cli.input.display(), bytes = dot.len(), "converted schema");

    let output = if cli.format == "dot" {
        dot.into_bytes()
    } else {
        run_graphviz(&dot, &cli.format)?
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, &output)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(output = %path.display(), format = %cli.format, "wrote graph");
        }
        None => std::io::stdout()
            .write_all(&output)
            .context("Failed to write to stdout")?,
    }

    Ok(())
}

/// Pipe DOT through the Graphviz `dot` executable.
fn run_graphviz(dot: &str, format: &str) -> anyhow::Result<Vec<u8>> {
    let mut child = Command::new("dot")
        .arg(format!("-T{}", format))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .context("Failed to run Graphviz `dot`; is it installed?")?;

    child
        .stdin
        .take()
        .context("Graphviz stdin unavailable")?
        .write_all(dot.as_bytes())
        .context("Failed to send graph to Graphviz")?;

    let result = child.wait_with_output().context("Graphviz did not finish")?;
    if !result.status.success() {
        bail!(
            "Graphviz exited with {}: {}",
            result.status,
            String::from_utf8_lossy(&result.stderr).trim()
        );
    }
    Ok(result.stdout)
}
