//! ZettelWiki CLI

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;
use zettelwiki::{
    DocumentId, GraphDocument, LinkEngine, LinkedCorpus, LinkingConfig, PageDocument,
    load_snapshot, write_json,
};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    /// Human-readable lines (env_logger)
    Text,
    /// Structured JSON lines on stderr (tracing-subscriber)
    Json,
}

/// ZettelWiki - link an issue snapshot into backlinks and a knowledge graph
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Issue snapshot: a JSON array of issues, or an object with an `issues` array
    #[arg(short, long, env = "ZETTELWIKI_ISSUES")]
    issues: PathBuf,

    /// Linking configuration file (json, yaml or toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Issue number to center the graph on (pruned when the graph is large)
    #[arg(short, long)]
    focus: Option<u64>,

    /// Where to write the graph
    #[arg(short, long, default_value = "graph.json")]
    out: PathBuf,

    /// Write one `<number>.json` page file per issue into this directory
    #[arg(long)]
    pages_dir: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_logging(format: LogFormat, level: &str) -> Result<()> {
    match format {
        LogFormat::Text => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
                .format_timestamp_millis()
                .try_init()
                .context("Failed to initialize logger")?;
        }
        LogFormat::Json => {
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {}", e))?;
        }
    }
    Ok(())
}

/// Build and write every page concurrently; returns the number written
async fn write_pages(corpus: Arc<LinkedCorpus>, dir: &Path) -> Result<usize> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create pages directory {}", dir.display()))?;

    let mut tasks = JoinSet::new();
    for id in corpus.index().ids() {
        let corpus = Arc::clone(&corpus);
        let path = dir.join(format!("{}.json", id.get()));

        tasks.spawn(async move {
            // Graph building is CPU-bound
            let page = tokio::task::spawn_blocking(move || PageDocument::build(&corpus, id)).await?;
            match page {
                Some(page) => {
                    write_json(&path, &page).await?;
                    anyhow::Ok(true)
                }
                None => anyhow::Ok(false),
            }
        });
    }

    let mut written = 0;
    while let Some(result) = tasks.join_next().await {
        if result?? {
            written += 1;
        }
    }
    Ok(written)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_format, &args.log_level)?;

    log::info!("ZettelWiki v{}", env!("CARGO_PKG_VERSION"));

    let config = LinkingConfig::load(args.config.as_deref());
    log::debug!("Linking configuration: {:?}", config);

    let documents = load_snapshot(&args.issues)
        .await
        .with_context(|| format!("Failed to load issue snapshot {}", args.issues.display()))?;

    let engine = LinkEngine::new(config);
    let corpus = tokio::task::spawn_blocking(move || Arc::new(engine.link(&documents)))
        .await
        .context("Linking task failed")?;

    let focus = args.focus.map(DocumentId);
    if let Some(id) = focus
        && !corpus.index().contains(id)
    {
        log::warn!("Focus issue {} is not in the snapshot; writing the full graph", id);
    }

    let graph: GraphDocument = corpus.graph(focus).into();
    write_json(&args.out, &graph)
        .await
        .with_context(|| format!("Failed to write graph to {}", args.out.display()))?;
    log::info!(
        "Graph written to {}: {} nodes, {} edges, {} mutual pairs, {} orphans",
        args.out.display(),
        graph.stats.node_count,
        graph.stats.edge_count,
        graph.stats.bidirectional_pairs,
        graph.stats.orphan_count
    );

    if let Some(dir) = &args.pages_dir {
        let written = write_pages(Arc::clone(&corpus), dir).await?;
        log::info!("Wrote {} page files to {}", written, dir.display());
    }

    let unresolved = corpus.unresolved();
    if !unresolved.is_empty() {
        log::warn!("{} links did not match any issue", unresolved.len());
        for link in unresolved {
            log::debug!("Unlinked [[{}]] in {}", link.token, link.source);
        }
    }

    Ok(())
}
