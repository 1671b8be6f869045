//! Cypher Bridge CLI: inspect pattern compilation and adapter configuration
//!
//! Works offline: nothing here opens a database session.

use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use cypher_bridge::cypher::{compile, CompiledQuery, Pattern, QueryShape};
use cypher_bridge::AdapterConfig;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "cypher-bridge", version, about = "Cypher Bridge CLI")]
struct Cli {
    /// Adapter configuration file (YAML)
    #[arg(long, global = true, env = "CYPHER_BRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a path pattern to Cypher
    Compile {
        /// Alternating node and edge selectors, `*` for any
        #[arg(required = true)]
        tokens: Vec<String>,

        /// Result cap (defaults to the configured limit)
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,
    },
    /// Show how each token of a pattern compiles
    Explain {
        #[arg(required = true)]
        tokens: Vec<String>,
    },
    /// Print the effective configuration, password redacted
    Config,
}

fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    let result = load_config(cli.config.as_ref()).and_then(|config| match cli.command {
        Commands::Compile { tokens, limit } => {
            run_compile(&tokens, limit.unwrap_or(config.default_limit), &cli.format)
        }
        Commands::Explain { tokens } => run_explain(&tokens, &cli.format),
        Commands::Config => run_config(&config, &cli.format),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<AdapterConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "Loading configuration");
            Ok(AdapterConfig::from_file(path)?)
        }
        None => Ok(AdapterConfig::default()),
    }
}

fn run_compile(tokens: &[String], limit: i64, format: &OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let pattern = Pattern::parse(tokens)?;
    let query = compile(&pattern, limit)?;
    let shape = match query.shape {
        QueryShape::Nodes => "nodes",
        QueryShape::Paths => "paths",
    };

    match format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "query": query.text,
                "limit": query.limit,
                "shape": shape,
                "column": query.column(),
                "nodeSteps": query.node_steps,
                "edgeSteps": query.edge_steps,
                "exhausted": query.is_exhausted(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Csv => {
            println!("{}", compile_csv(&query, shape));
        }
        OutputFormat::Table => {
            println!("{}", query.text);
            if query.is_exhausted() {
                eprintln!("(limit {} returns nothing; the adapter will not run this query)", limit);
            }
        }
    }
    Ok(())
}

fn run_explain(tokens: &[String], format: &OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let pattern = Pattern::parse(tokens)?;
    let rows: Vec<(usize, String, String, String)> = pattern
        .steps()
        .enumerate()
        .map(|(i, (kind, selector))| (i, selector.to_string(), kind.to_string(), Pattern::fragment(kind, selector)))
        .collect();

    match format {
        OutputFormat::Json => {
            let out: Vec<serde_json::Value> = rows
                .iter()
                .map(|(i, token, role, fragment)| {
                    serde_json::json!({ "position": i, "token": token, "role": role, "fragment": fragment })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Csv => {
            println!("position,token,role,fragment");
            for (i, token, role, fragment) in &rows {
                println!("{},{},{},{}", i, csv_cell(token), role, csv_cell(fragment));
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["#", "Token", "Role", "Fragment"]);
            for (i, token, role, fragment) in &rows {
                table.add_row(vec![i.to_string(), token.clone(), role.clone(), fragment.clone()]);
            }
            println!("{}", table);
            println!("{} node step(s), {} edge step(s)", pattern.node_count(), pattern.edge_count());
        }
    }
    Ok(())
}

fn run_config(config: &AdapterConfig, format: &OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => {
            let mut out = serde_json::to_value(config)?;
            out["password"] = serde_json::Value::String("********".to_string());
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        _ => {
            print!("{}", config.to_redacted_yaml()?);
            println!("# uri: {}", config.connection_uri());
        }
    }
    Ok(())
}

fn compile_csv(query: &CompiledQuery, shape: &str) -> String {
    format!("query,limit,shape\n{},{},{}", csv_cell(&query.text), query.limit, shape)
}

fn csv_cell(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
