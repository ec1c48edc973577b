//! dockrelay — chat front-end for a remote molecular docking service.
//! Entry point for the agent binary.

mod config;
mod repl;
mod tools;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use secrecy::{ExposeSecret, SecretString};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dockrelay_common::SandboxClient;
use dockrelay_molecules::{
    complex, parse_molecule_file, ChemblResolver, Dispatcher, DockingIntent, HttpDockingClient,
    HttpPreviewProbe, MoleculeInput, PreviewProbe,
};

#[derive(Parser, Debug)]
#[command(name = "dockrelay")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Dock molecules against protein targets from the terminal")]
struct Cli {
    /// Path to dockrelay.toml (defaults to DOCKRELAY_CONFIG, then ./dockrelay.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive chat loop (default)
    Repl,
    /// Dock molecules given as arguments or read from a file
    Dock {
        /// SMILES strings or compound names
        molecules: Vec<String>,
        /// Target protein (default from config, usually DRD2)
        #[arg(long)]
        target: Option<String>,
        /// File with one molecule per line
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },
    /// Check that a viewer link still resolves
    Preview { url: String },
    /// Merge a receptor PDB and a docked pose into one complex PDB
    Complex {
        #[arg(long)]
        protein: PathBuf,
        #[arg(long)]
        ligand: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print the tool manifest as JSON
    Manifest,
}

fn sandbox_for(config: &config::Config) -> Result<SandboxClient> {
    let mut client = SandboxClient::new(Duration::from_secs(config.docking.timeout_secs))?;
    client.allow_url(&config.docking.endpoint)?;
    for host in &config.preview.allowed_hosts {
        client.allow_domain(host);
    }
    if config.resolver.enabled {
        client.allow_url(&config.resolver.chembl_url)?;
    }
    Ok(client)
}

fn build_dispatcher(config: &config::Config) -> Result<Dispatcher> {
    let client = sandbox_for(config)?;

    let mut docking = HttpDockingClient::new(client.clone(), config.docking.endpoint.clone());
    match &config.docking.api_key {
        Some(key) => {
            docking = docking.with_api_key(SecretString::from(key.expose_secret().to_string()));
        }
        None => tracing::debug!("No DOCKRELAY_API_KEY set; calling the endpoint without auth"),
    }

    let mut dispatcher = Dispatcher::new(Box::new(docking), config.docking.dispatch_settings())
        .with_preview_probe(Box::new(HttpPreviewProbe::new(client.clone())));
    if config.resolver.enabled {
        dispatcher = dispatcher.with_resolver(Box::new(ChemblResolver::new(
            client,
            config.resolver.chembl_url.clone(),
        )));
    }

    info!(
        endpoint = %config.docking.endpoint,
        default_target = %config.docking.default_target,
        resolver = config.resolver.enabled,
        verify_previews = config.docking.verify_previews,
        "Dispatcher ready"
    );
    Ok(dispatcher)
}

async fn dock_command(
    dispatcher: &Dispatcher,
    molecules: Vec<String>,
    target: Option<String>,
    file: Option<PathBuf>,
) -> Result<()> {
    let reply = match file {
        Some(path) => {
            if !molecules.is_empty() {
                anyhow::bail!("Pass molecules either as arguments or with --file, not both");
            }
            let content = tokio::fs::read_to_string(&path).await?;
            let inputs = parse_molecule_file(&content);
            info!(file = %path.display(), count = inputs.len(), "Read molecule file");
            dispatcher.dispatch_file(&inputs, target.as_deref()).await
        }
        None => {
            let intent = DockingIntent {
                molecules: molecules.iter().filter_map(|m| MoleculeInput::classify(m)).collect(),
                target,
            };
            dispatcher.dispatch(&intent).await
        }
    };
    println!("{reply}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries replies only.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dockrelay=info,warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("dockrelay {}", env!("CARGO_PKG_VERSION"));
    let config_path = cli.config;
    let load_config = || config::Config::load(config_path.as_deref());

    match cli.command.unwrap_or(Command::Repl) {
        Command::Repl => {
            let dispatcher = build_dispatcher(&load_config()?)?;
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            repl::run(&dispatcher, stdin, tokio::io::stdout()).await?;
        }
        Command::Dock { molecules, target, file } => {
            let dispatcher = build_dispatcher(&load_config()?)?;
            dock_command(&dispatcher, molecules, target, file).await?;
        }
        Command::Preview { url } => {
            let probe = HttpPreviewProbe::new(sandbox_for(&load_config()?)?);
            match probe.check(&url).await {
                Ok(()) => println!("Preview is available: {url}"),
                Err(e) => println!("{}", e.user_message()),
            }
        }
        // Purely local; needs no config.
        Command::Complex { protein, ligand, out } => {
            let path = complex::write_complex(&protein, &ligand, &out).await?;
            println!("Wrote complex to {}", path.display());
        }
        Command::Manifest => {
            let dispatcher = Arc::new(build_dispatcher(&load_config()?)?);
            let registry = tools::build_default_registry(dispatcher);
            println!("{}", serde_json::to_string_pretty(&registry.manifest())?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_to_repl() {
        let cli = Cli::try_parse_from(["dockrelay"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_dock_args() {
        let cli = Cli::try_parse_from(["dockrelay", "dock", "CCO", "aspirin", "--target", "EGFR", "--config", "x.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        match cli.command {
            Some(Command::Dock { molecules, target, file }) => {
                assert_eq!(molecules, ["CCO", "aspirin"]);
                assert_eq!(target.as_deref(), Some("EGFR"));
                assert!(file.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_sandbox_allows_configured_hosts() {
        let config = config::Config::default();
        let client = sandbox_for(&config).unwrap();
        assert!(client.is_allowed(&config.docking.endpoint));
        assert!(client.is_allowed(&format!("https://{}/?molecule_id=x", config::DEFAULT_PREVIEW_HOST)));
        assert!(client.is_allowed("https://www.ebi.ac.uk/chembl/api/data/molecule/search.json"));
        assert!(!client.is_allowed("https://example.com/"));
    }

    #[tokio::test]
    async fn test_dock_command_rejects_args_with_file() {
        let dispatcher = build_dispatcher(&config::Config::default()).unwrap();
        let err = dock_command(&dispatcher, vec!["CCO".into()], None, Some(PathBuf::from("m.smi")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not both"));
    }
}
