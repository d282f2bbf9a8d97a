use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use semcheck_core::{Config, SpecResolver, create_provider};
use semcheck_docs::{DocumentCollection, DocumentSource};
use tokio_util::sync::CancellationToken;

/// Collect specification documents and reduce them to the passages each rule
/// is checked against.
#[derive(Debug, Parser)]
#[command(name = "semcheck", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "semcheck.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print a document, or the section named by its `#fragment`.
    Collect {
        /// Local path or URL.
        source: String,
        /// Print the sorted anchor names instead of content.
        #[arg(long)]
        anchors: bool,
    },
    /// Resolve the specs of every enabled rule into bounded excerpts.
    Resolve {
        /// Only resolve the rule with this name.
        #[arg(long)]
        rule: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_subscriber();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    let cancel = CancellationToken::new();
    spawn_ctrl_c(cancel.clone());

    match cli.command {
        Command::Collect { source, anchors } => collect(&config, &source, anchors, &cancel).await,
        Command::Resolve { rule } => resolve(&config, rule.as_deref(), &cancel).await,
    }
}

fn init_subscriber() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn spawn_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e:#}");
            return;
        }
        tracing::info!("received shutdown signal");
        cancel.cancel();
    });
}

async fn collect(
    config: &Config,
    raw: &str,
    anchors: bool,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let documents = DocumentCollection::new(&config.fetch);

    if anchors {
        let source = DocumentSource::parse(raw)?;
        let doc = documents
            .collect(&source, cancel)
            .await
            .with_context(|| format!("failed to collect {raw}"))?;
        let mut out = std::io::stdout().lock();
        for name in doc.anchor_names() {
            writeln!(out, "{name}")?;
        }
    } else {
        let content = documents
            .get_document(raw, cancel)
            .await
            .with_context(|| format!("failed to collect {raw}"))?;
        writeln!(std::io::stdout().lock(), "{content}")?;
    }
    Ok(())
}

async fn resolve(
    config: &Config,
    only: Option<&str>,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    config.validate()?;
    let rules: Vec<_> = config.enabled_rules(only).collect();
    if rules.is_empty() {
        match only {
            Some(name) => bail!("no enabled rule named {name}"),
            None => bail!("no enabled rules configured"),
        }
    }

    let provider = create_provider(&config.llm)?;
    let resolver = SpecResolver::from_config(config, provider);
    let results = resolver.resolve_all(rules, cancel).await;

    let mut out = std::io::stdout().lock();
    let mut failures = 0usize;
    for rule in results {
        writeln!(out, "== {} ==", rule.rule)?;
        for spec in rule.specs {
            match spec {
                Ok(resolved) => {
                    writeln!(out, "--- {} ---", resolved.path)?;
                    writeln!(out, "{}", resolved.content)?;
                }
                Err(e) => {
                    failures += 1;
                    eprintln!("error: {e}");
                }
            }
        }
    }

    if failures > 0 {
        bail!("{failures} specification(s) could not be resolved");
    }
    Ok(())
}
