//! Modsandbox CLI (modsandbox)

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use modsandbox::{
    BundleEvent, CacheStore, CdnClient, FileStore, FnSink, HtmlRenderer, Renderer, Sandbox,
    SandboxConfig,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "modsandbox")]
#[command(about = "Bundle a script with its npm dependencies for a sandboxed frame", long_about = None)]
#[command(version)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bundle an entry script and render it as an HTML page
    Bundle {
        /// Entry script
        entry: PathBuf,
        /// Config file (defaults to ./sandbox.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Bundling service base URL
        #[arg(long)]
        cdn: Option<String>,
        /// Cache directory
        #[arg(long)]
        cache_dir: Option<PathBuf>,
        /// Preferred version, as name=version (repeatable)
        #[arg(short, long = "prefer", value_name = "NAME=VERSION")]
        prefer: Vec<String>,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Print lifecycle events to stderr
        #[arg(long)]
        print_events: bool,
    },
    /// Inspect or clear the bundle cache
    Cache {
        /// Cache directory
        #[arg(long)]
        cache_dir: Option<PathBuf>,
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// List cached modules
    List,
    /// Remove every cached module
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Bundle {
            entry,
            config,
            cdn,
            cache_dir,
            prefer,
            out,
            print_events,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(cdn) = cdn {
                config.cdn = cdn;
            }
            if let Some(cache_dir) = cache_dir {
                config.cache_dir = Some(cache_dir);
            }
            for pair in &prefer {
                let (name, version) = parse_preference(pair)?;
                config.versions.insert(name, version);
            }
            config.validate()?;

            bundle(&config, &entry, out.as_deref(), print_events).await?;
        }
        Commands::Cache { cache_dir, action } => {
            let store = open_store(cache_dir)?;
            match action {
                CacheAction::List => {
                    let entries = store.get().await.context("Failed to read cache")?;
                    for (key, entry) in &entries {
                        println!("{}\t{}", key, entry.package.version);
                    }
                    eprintln!("{} cached module(s) in {}", entries.len(), store.root().display());
                }
                CacheAction::Clear => {
                    store.clear().await.context("Failed to clear cache")?;
                    eprintln!("Cleared {}", store.root().display());
                }
            }
        }
    }

    Ok(())
}

async fn bundle(
    config: &SandboxConfig,
    entry: &Path,
    out: Option<&Path>,
    print_events: bool,
) -> Result<()> {
    let source = std::fs::read_to_string(entry)
        .with_context(|| format!("Failed to read entry script {}", entry.display()))?;

    let store = open_store(config.cache_dir.clone())?;
    let client = CdnClient::with_url(&config.cdn)?;
    let sandbox = Sandbox::new(config, store, client);

    let mut sink = FnSink(|event: BundleEvent| {
        if print_events {
            match &event {
                BundleEvent::Modules(packages) => {
                    eprintln!("{} ({} module(s))", event.name(), packages.len())
                }
                BundleEvent::BundleError(text) => eprintln!("{}: {}", event.name(), text),
                _ => eprintln!("{}", event.name()),
            }
        }
    });

    let bundle = sandbox
        .bundle(&source, &config.versions, &mut sink)
        .await
        .with_context(|| format!("Failed to bundle {}", entry.display()))?;

    if let Some(err) = &bundle.cache_write_error {
        eprintln!("warning: fetched modules were not cached: {}", err);
    }

    match out {
        Some(path) => {
            HtmlRenderer::create(path)?.render(&bundle.payload)?;
            eprintln!(
                "Wrote {} ({} module(s), {} fetched)",
                path.display(),
                bundle.packages.len(),
                bundle.fetched
            );
        }
        None => HtmlRenderer::new(std::io::stdout().lock()).render(&bundle.payload)?,
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SandboxConfig> {
    match path {
        Some(path) => SandboxConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display())),
        None => {
            let cwd = std::env::current_dir()?;
            SandboxConfig::discover(&cwd).context("Failed to load sandbox.toml")
        }
    }
}

fn open_store(cache_dir: Option<PathBuf>) -> Result<FileStore> {
    match cache_dir {
        Some(dir) => Ok(FileStore::new(dir)),
        None => Ok(FileStore::default_store()?),
    }
}

fn parse_preference(pair: &str) -> Result<(String, String)> {
    // Split on the last '=' so scoped names stay intact
    match pair.rsplit_once('=') {
        Some((name, version)) if !name.is_empty() && !version.is_empty() => {
            Ok((name.to_string(), version.to_string()))
        }
        _ => bail!("Invalid preference '{}', expected NAME=VERSION", pair),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "modsandbox=debug" } else { "modsandbox=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
