//! `fieldjson` CLI: check and reformat JSON with the fieldjson parser and
//! renderer.
//!
//! ## Usage
//!
//! ```sh
//! # Compact output with bare keys (stdin → stdout)
//! echo '{"name": "Alice", "age": 30}' | fieldjson fmt
//!
//! # Compact standard JSON, file to file
//! fieldjson fmt --quoted-keys -i data.json -o data.min.json
//!
//! # Validate only
//! fieldjson check -i data.json
//!
//! # Pretty-print as standard JSON (accepts bare-key input)
//! fieldjson pretty -i data.min.json
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::Verbosity;
use fieldjson::{KeyStyle, ReadOptions, Value, WriteOptions, DEFAULT_MAX_DEPTH};
use log::{debug, info};
use std::io::{self, Read};

#[derive(Parser)]
#[command(
    name = "fieldjson",
    version,
    about = "Check and reformat JSON, including bare-key output"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    verbose: Verbosity,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-render input as compact JSON
    Fmt {
        #[command(flatten)]
        source: Source,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Quote every key instead of emitting identifier keys bare
        #[arg(long)]
        quoted_keys: bool,
    },
    /// Parse input and report whether it is well-formed
    Check {
        #[command(flatten)]
        source: Source,
    },
    /// Pretty-print input as standard JSON
    Pretty {
        #[command(flatten)]
        source: Source,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Args)]
struct Source {
    /// Input file (reads from stdin if omitted)
    #[arg(short, long)]
    input: Option<String>,
    /// Maximum nesting depth accepted by the parser
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

impl Source {
    fn parse(&self) -> Result<Value> {
        let text = read_input(self.input.as_deref())?;
        let options = ReadOptions {
            max_depth: self.max_depth,
        };
        let value = fieldjson::parse_with(&text, &options)
            .with_context(|| format!("Failed to parse {}", self.name()))?;
        debug!("parsed {} ({} bytes)", self.name(), text.len());
        Ok(value)
    }

    fn name(&self) -> &str {
        self.input.as_deref().unwrap_or("stdin")
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();

    match cli.command {
        Commands::Fmt {
            source,
            output,
            quoted_keys,
        } => {
            let value = source.parse()?;
            let options = WriteOptions {
                key_style: if quoted_keys {
                    KeyStyle::Quoted
                } else {
                    KeyStyle::Bare
                },
            };
            write_output(output.as_deref(), &fieldjson::render(&value, &options))?;
        }
        Commands::Check { source } => {
            let value = source.parse()?;
            info!("{} is well-formed, root is {}", source.name(), value.kind());
            println!("ok");
        }
        Commands::Pretty { source, output } => {
            let value = source.parse()?;
            let pretty =
                serde_json::to_string_pretty(&value).context("Failed to pretty-print JSON")?;
            write_output(output.as_deref(), &pretty)?;
        }
    }

    Ok(())
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
            debug!("wrote {} bytes to {}", content.len(), path);
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
