use clap::{Parser, Subcommand};
use pephubgen::config::{self, GeneratorConfig};
use pephubgen::generate::{self, GenerateOptions};
use pephubgen::report::TracingReporter;
use pephubgen::scan::{self, PepTree};
use pephubgen::serve::{self, ServeOptions};
use pephubgen::{fetch, output};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "pephubgen")]
#[command(about = "Static JSON mirror generator for PEP data repositories")]
#[command(long_about = "\
Static JSON mirror generator for PEP data repositories

The data repository is a tree of namespaces holding projects. Each project
is a directory with a PEP config file and a sample table; the generated
tree exposes them as plain JSON files any static file server can host.

Data layout:

  data/
  ├── ns1/                          # Namespace
  │   ├── projA/                    # Project
  │   │   ├── project_config.yaml   # Default config file
  │   │   └── sample_table.csv
  │   └── projB/
  │       ├── .pephub.yaml          # Manifest (optional)
  │       └── pep.yaml              # Named by `config_file` in the manifest
  └── .drafts/                      # Dot-prefixed = never indexed

Output layout:

  out/ns1/info                      # {\"projects\": [...], \"num_projects\": N}
  out/ns1/projA/info                # Project metadata
  out/ns1/projA/samples/info        # {\"samples\": [...], \"num_samples\": N}
  out/ns1/projA/samples/S1.json     # One sample record

Run 'pephubgen gen-config' to generate a documented pephubgen.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (defaults to ./pephubgen.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data repository: git URL or local directory
    #[arg(short, long, global = true)]
    data: Option<String>,

    /// Output directory
    #[arg(short, long, global = true)]
    out: Option<String>,

    /// Log every created directory and written summary
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: fetch → scan → generate
    Build,
    /// Fetch and classify the data repository without writing output
    Scan {
        /// Print the index as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Serve a generated tree over HTTP
    Serve {
        /// Directory to serve (defaults to the output directory)
        #[arg(long)]
        files: Option<PathBuf>,
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print a stock pephubgen.toml with all options documented
    GenConfig,
}

/// Initialize tracing with output to stderr so stdout stays the CLI output.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "pephubgen=debug"
    } else {
        "pephubgen=info"
    };
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default.into()),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Command::Build => {
            let config = load_cli_config(&cli)?;
            let staging = tempfile::TempDir::new()?;
            let (tree, data_root) = fetch_and_scan(&config, staging.path())?;
            output::print_scan_output(&tree, &data_root);

            let out = PathBuf::from(&config.out);
            println!("==> Generating JSON \u{2192} {}", out.display());
            let options = GenerateOptions::from_config(&config, cli.verbose);
            let summary = generate::generate(&tree, &out, &options, &TracingReporter)?;
            output::print_generate_output(&summary);

            println!("==> Build complete: {}", out.display());
        }
        Command::Scan { json } => {
            let config = load_cli_config(&cli)?;
            let staging = tempfile::TempDir::new()?;
            let (tree, data_root) = fetch_and_scan(&config, staging.path())?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&tree)?);
            } else {
                output::print_scan_output(&tree, &data_root);
            }
        }
        Command::Serve { files, host, port } => {
            let mut config = load_cli_config(&cli)?;
            if let Some(host) = host {
                config.serve.host = host.clone();
            }
            if let Some(port) = port {
                config.serve.port = *port;
            }
            config.validate()?;
            let root = files.clone().unwrap_or_else(|| PathBuf::from(&config.out));
            let options = ServeOptions {
                address: config.serve.address(),
                info_file_name: config.info_file_name.clone(),
            };
            serve::serve(&root, &options, &TracingReporter)?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the config file and apply global CLI overrides.
///
/// An explicit `--config` must exist; the implicit `pephubgen.toml` is optional.
fn load_cli_config(cli: &Cli) -> Result<GeneratorConfig, Box<dyn std::error::Error>> {
    let overlay = match &cli.config {
        Some(path) if !path.exists() => {
            return Err(format!("Config file not found: {}", path.display()).into());
        }
        Some(path) => config::load_raw_config(path)?,
        None => config::load_raw_config(Path::new(config::CONFIG_FILE_NAME))?,
    };
    let mut config = config::resolve_config(overlay)?;
    if let Some(data) = &cli.data {
        config.data = data.clone();
    }
    if let Some(out) = &cli.out {
        config.out = out.clone();
    }
    Ok(config)
}

/// Make the data repository available and classify it.
///
/// The returned root may live under `staging`, which must outlive its use.
fn fetch_and_scan(
    config: &GeneratorConfig,
    staging: &Path,
) -> Result<(PepTree, PathBuf), Box<dyn std::error::Error>> {
    println!("==> Fetching {}", config.data);
    let data_root = fetch::fetch(&config.data, staging)?;

    println!("==> Scanning {}", data_root.display());
    let tree = scan::classify(&data_root, &TracingReporter)?;
    Ok((tree, data_root))
}
