use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use flowgraph::prelude::*;
use flowgraph::resolver;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Define a CLI-specific enum for clap to parse.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum PortEncodingCli {
    Explicit,
    Inferred,
}

impl From<PortEncodingCli> for PortEncoding {
    fn from(value: PortEncodingCli) -> Self {
        match value {
            PortEncodingCli::Explicit => PortEncoding::Explicit,
            PortEncodingCli::Inferred => PortEncoding::Inferred,
        }
    }
}

/// Inspect, convert and activate automation flows
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// JSON file with a flow configuration; flags below override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// How condition branch ports are written into definitions
    #[arg(long, global = true, value_enum)]
    port_encoding: Option<PortEncodingCli>,

    /// Mint `node_N` / `edge_N` ids instead of UUIDs
    #[arg(long, global = true)]
    sequential_ids: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a flow definition and print every issue found
    Validate {
        definition: PathBuf,
        /// Run the activation checks instead of the save checks
        #[arg(long)]
        activation: bool,
    },
    /// Convert a flow definition into the editable graph form
    ToGraph { definition: PathBuf },
    /// Convert an editable graph back into a flow definition
    ToDefinition { graph: PathBuf },
    /// Show the fields, defaults and output ports of a node type
    Schema { node_type: String },
    /// Activate a stored flow if it passes the activation checks
    Activate {
        /// Directory holding one `<flow_id>.json` per flow
        #[arg(long)]
        store: PathBuf,
        flow_id: String,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<FlowConfig> {
    let mut config = match &cli.config {
        Some(path) => FlowConfig::from_json(&read(path)?)
            .with_context(|| format!("invalid configuration in {}", path.display()))?,
        None => FlowConfig::default(),
    };
    if let Some(encoding) = cli.port_encoding {
        config = config.with_port_encoding(encoding.into());
    }
    if cli.sequential_ids {
        config = config.with_id_strategy(IdStrategy::Sequential);
    }
    Ok(config)
}

/// Runs the command. `Ok(false)` means the command worked but the flow was rejected.
fn run(cli: Cli) -> Result<bool> {
    let config = load_config(&cli)?;
    let converter = Converter::from_config(&config);

    match cli.command {
        Command::Validate {
            definition,
            activation,
        } => {
            let definition = read_definition(&definition)?;
            let mode = if activation {
                ValidationMode::Activation
            } else {
                ValidationMode::Save
            };
            let report = validate(&definition, mode);
            println!("{}", report);
            Ok(report.is_ok())
        }
        Command::ToGraph { definition } => {
            let definition = read_definition(&definition)?;
            let graph = converter.to_graph(&definition)?;
            println!("{}", serde_json::to_string_pretty(&graph)?);
            Ok(true)
        }
        Command::ToDefinition { graph } => {
            let graph: FlowGraph = serde_json::from_str(&read(&graph)?)
                .with_context(|| format!("{} is not a flow graph", graph.display()))?;
            let definition = converter.to_definition(&graph)?;
            println!("{}", definition.to_json_pretty()?);
            Ok(true)
        }
        Command::Schema { node_type } => {
            let node_type: NodeType = node_type.parse()?;
            let schema = serde_json::json!({
                "config": resolver::resolve_config(node_type),
                "defaultName": resolver::default_name(node_type),
                "defaultPayload": resolver::default_payload(node_type),
            });
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(true)
        }
        Command::Activate { store, flow_id } => {
            let mut store = JsonFileStore::open(&store)
                .with_context(|| format!("cannot open store at {}", store.display()))?;
            let mut session = EditSession::open(&mut store, &flow_id, config)?;
            match session.request_activation()? {
                ActivationOutcome::Activated(report) => {
                    println!("Flow '{}' is active.", flow_id);
                    for warning in report.warnings() {
                        println!("{}", warning);
                    }
                    Ok(true)
                }
                ActivationOutcome::Rejected(report) => {
                    println!("Flow '{}' was not activated:\n{}", flow_id, report);
                    Ok(false)
                }
            }
        }
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

fn read_definition(path: &Path) -> Result<FlowDefinition> {
    let json = read(path)?;
    if json.trim().is_empty() {
        bail!("{} is empty", path.display());
    }
    FlowDefinition::from_json(&json)
        .with_context(|| format!("{} is not a flow definition", path.display()))
}
