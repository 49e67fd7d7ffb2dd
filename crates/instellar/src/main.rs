use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use instellar_provider::{
    ConfiguredProvider, Diagnostics, InstellarProvider, ProviderConfig, ProviderError,
};
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "instellar-provider", version)]
#[command(about = "Manage Instellar clusters, components and uplinks declaratively", long_about = None)]
struct Cli {
    /// URI for Instellar API (falls back to INSTELLAR_HOST, then https://web.instellar.app)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Auth token for Instellar API (falls back to INSTELLAR_AUTH_TOKEN)
    #[arg(long, global = true)]
    auth_token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the provider, resource and data source schemas as JSON
    Schema,
    /// Create a resource from a configuration document
    Create {
        /// Resource type, e.g. instellar_cluster
        resource_type: String,
        /// Configuration JSON file ("-" reads stdin)
        config: PathBuf,
    },
    /// Refresh a resource state
    Read {
        resource_type: String,
        /// State JSON file ("-" reads stdin)
        state: PathBuf,
    },
    /// Apply a new configuration to an existing resource
    Update {
        resource_type: String,
        /// Prior state JSON file
        state: PathBuf,
        /// New configuration JSON file
        config: PathBuf,
    },
    /// Delete a resource
    Delete {
        resource_type: String,
        /// State JSON file ("-" reads stdin)
        state: PathBuf,
    },
    /// Import an existing resource by its Instellar id
    Import { resource_type: String, id: String },
    /// Read a data source
    Data {
        /// Data source type, e.g. instellar_uplink
        data_source_type: String,
        /// Configuration JSON file ("-" reads stdin)
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // stdout carries state documents, logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(err) = run(cli).await {
        match err.downcast_ref::<ProviderError>() {
            Some(provider_error) => print_diagnostics(&provider_error.diagnostics()),
            None => eprintln!("{} {:#}", "Error:".red().bold(), err),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let Cli {
        host,
        auth_token,
        command,
    } = cli;
    let provider = move || configure(host, auth_token);

    match command {
        Commands::Schema => print_json(&serde_json::to_value(InstellarProvider::schemas())?),
        Commands::Create {
            resource_type,
            config,
        } => {
            let provider = provider()?;
            let state = provider
                .resource(&resource_type)?
                .create(read_document(&config)?)
                .await?;
            print_json(&state)
        }
        Commands::Read {
            resource_type,
            state,
        } => {
            let provider = provider()?;
            let state = provider
                .resource(&resource_type)?
                .read(read_document(&state)?)
                .await?;
            print_json(&state)
        }
        Commands::Update {
            resource_type,
            state,
            config,
        } => {
            let provider = provider()?;
            let state = provider
                .resource(&resource_type)?
                .update(read_document(&state)?, read_document(&config)?)
                .await?;
            print_json(&state)
        }
        Commands::Delete {
            resource_type,
            state,
        } => {
            let provider = provider()?;
            provider
                .resource(&resource_type)?
                .delete(read_document(&state)?)
                .await?;
            eprintln!("{} {} deleted", "✓".green(), resource_type);
            Ok(())
        }
        Commands::Import { resource_type, id } => {
            let provider = provider()?;
            let state = provider.resource(&resource_type)?.import_state(&id).await?;
            print_json(&state)
        }
        Commands::Data {
            data_source_type,
            config,
        } => {
            let provider = provider()?;
            let state = provider
                .data_source(&data_source_type)?
                .read(read_document(&config)?)
                .await?;
            print_json(&state)
        }
    }
}

fn configure(host: Option<String>, auth_token: Option<String>) -> Result<ConfiguredProvider> {
    let provider = InstellarProvider::default();
    tracing::debug!("{} provider {}", provider.type_name(), provider.version());
    Ok(provider.configure(&ProviderConfig::new(host, auth_token))?)
}

fn read_document(path: &Path) -> Result<Value> {
    let content = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };

    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_diagnostics(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        let severity = format!("{}:", diagnostic.severity);
        eprintln!("{} {}", severity.red().bold(), diagnostic.summary.bold());

        if let Some(attribute) = &diagnostic.attribute {
            eprintln!("  with {}", attribute.cyan());
        }

        if !diagnostic.detail.is_empty() {
            eprintln!();
            for line in diagnostic.detail.lines() {
                eprintln!("  {}", line);
            }
        }
        eprintln!();
    }
}
