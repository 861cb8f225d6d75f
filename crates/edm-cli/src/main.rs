//! # edm-cli
//!
//! CLI application for the EDM engine.
//!
//! Parses CSDL documents, validates them against a selectable
//! specification version, and round-trips them through the writer.

use anyhow::Context;
use clap::Parser;
use edm_validation::{validate, ValidationReporter};

#[derive(Parser)]
#[command(name = "edm")]
#[command(about = "EDM schema definition and validation engine CLI")]
#[command(version)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
enum Commands {
    /// Parse CSDL documents and report structural errors
    Parse {
        /// Input file paths
        files: Vec<String>,

        /// Emit errors as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse and validate CSDL documents
    Validate {
        /// Input file paths
        files: Vec<String>,

        /// Target specification version (4.0 or 4.01)
        #[arg(short, long, default_value = "4.0")]
        version: String,

        /// Emit errors as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a parsed model back to CSDL
    Roundtrip {
        /// Input file path
        file: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { files, json } => {
            tracing::info!("Parsing {} file(s)", files.len());
            let sources = read_sources(&files)?;
            let result = edm_csdl::parse(&as_refs(&sources));

            if json {
                println!("{}", serde_json::to_string_pretty(&result.errors)?);
            } else {
                for error in &result.errors {
                    println!("{error}");
                }
                println!(
                    "Parsed {} document(s): {}",
                    files.len(),
                    if result.success { "ok" } else { "failed" }
                );
            }
            if !result.success {
                std::process::exit(1);
            }
        }
        Commands::Validate {
            files,
            version,
            json,
        } => {
            let version = edm_validation::version_from_str(&version)?;
            tracing::info!("Validating {} file(s) against version {}", files.len(), version);
            let sources = read_sources(&files)?;
            let parsed = edm_csdl::parse(&as_refs(&sources));

            for error in &parsed.errors {
                println!("{error}");
            }

            let result = validate(&parsed.model, version);
            if json {
                println!("{}", serde_json::to_string_pretty(&result.errors)?);
            } else {
                print!("{}", ValidationReporter::new().render(version, &result));
            }
            if !parsed.success || !result.is_valid {
                std::process::exit(1);
            }
        }
        Commands::Roundtrip { file } => {
            let source =
                std::fs::read_to_string(&file).with_context(|| format!("reading {file}"))?;
            let parsed = edm_csdl::parse(&[source.as_str()]);
            if !parsed.success {
                for error in &parsed.errors {
                    eprintln!("{error}");
                }
                std::process::exit(1);
            }

            for output in edm_csdl::CsdlWriter::new().write_model(&parsed.model) {
                print!("{output}");
            }
        }
    }

    Ok(())
}

fn read_sources(files: &[String]) -> anyhow::Result<Vec<String>> {
    files
        .iter()
        .map(|f| std::fs::read_to_string(f).with_context(|| format!("reading {f}")))
        .collect()
}

fn as_refs(sources: &[String]) -> Vec<&str> {
    sources.iter().map(String::as_str).collect()
}
