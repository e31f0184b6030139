//! Offline index builder
//!
//! Run with: cargo run -p claim-verifier --features cli --bin claim-verifier-index -- <documents>

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use claim_verifier::{
    config::{LoadFailurePolicy, VerifierConfig},
    index::persist,
    pipeline::{BuildStage, IndexBuilder},
    providers::GeminiClient,
};

#[derive(Parser)]
#[command(name = "claim-verifier-index")]
#[command(
    author,
    version,
    about = "Translate, chunk and embed policy documents into a claim index"
)]
struct Cli {
    /// Source documents (PDF, .txt, .md); defaults to the configured documents
    documents: Vec<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, env = "CLAIM_VERIFIER_CONFIG")]
    config: Option<PathBuf>,

    /// Output index directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Language the documents are written in
    #[arg(long)]
    source_language: Option<String>,

    /// Skip documents that fail to load instead of aborting
    #[arg(long)]
    skip_failed: bool,

    /// Rebuild even if an index already exists
    #[arg(short, long)]
    force: bool,
}

fn stage_bar(stage: BuildStage, total: usize) -> ProgressBar {
    let label = match stage {
        BuildStage::Translating => "Translating",
        BuildStage::Embedding => "Embedding",
    };
    let bar = ProgressBar::new(total as u64);
    let template = format!(
        "{{spinner:.green}} {:<11} [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
        label
    );
    if let Ok(progress_style) = ProgressStyle::with_template(&template) {
        bar.set_style(progress_style.progress_chars("=> "));
    }
    bar
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "claim_verifier=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = VerifierConfig::load(cli.config.as_deref())?;
    if !cli.documents.is_empty() {
        config.ingestion.documents = cli.documents.clone();
    }
    if let Some(output) = cli.output {
        config.index.path = output;
    }
    if let Some(language) = cli.source_language {
        config.ingestion.source_language = language;
    }
    if cli.skip_failed {
        config.ingestion.on_load_error = LoadFailurePolicy::Skip;
    }
    config.validate()?;

    if config.ingestion.documents.is_empty() {
        anyhow::bail!("no source documents given (pass paths or set CLAIM_DOCUMENTS)");
    }
    if persist::exists(&config.index.path) && !cli.force {
        anyhow::bail!(
            "an index already exists at {} (use --force to rebuild)",
            config.index.path.display()
        );
    }

    println!(
        "{} {} documents from {} with {}",
        style("Indexing").bold().green(),
        config.ingestion.documents.len(),
        config.ingestion.source_language,
        config.gemini.embedding_model
    );

    let embedder = Arc::new(GeminiClient::embedding(&config.gemini)?);
    let translator = Arc::new(GeminiClient::translation(&config.gemini)?);

    let current: Arc<Mutex<Option<(BuildStage, ProgressBar)>>> = Arc::new(Mutex::new(None));
    let bars = current.clone();
    let builder = IndexBuilder::from_config(&config, embedder, translator)?.with_progress(Arc::new(
        move |stage: BuildStage, done: usize, total: usize| {
            let Ok(mut slot) = bars.lock() else { return };
            if slot.as_ref().map(|(s, _)| *s) != Some(stage) {
                if let Some((_, previous)) = slot.take() {
                    previous.finish();
                }
                *slot = Some((stage, stage_bar(stage, total)));
            }
            if let Some((_, bar)) = slot.as_ref() {
                bar.set_position(done as u64);
            }
        },
    ));

    let started = Instant::now();
    let index = builder
        .build_and_save(&config.ingestion.documents, &config.index.path)
        .await?;

    if let Ok(mut slot) = current.lock() {
        if let Some((_, bar)) = slot.take() {
            bar.finish();
        }
    }

    println!();
    println!("{}", style("Index built").bold().green());
    println!("  Chunks:     {}", style(index.len()).cyan());
    println!("  Model:      {}", index.meta().embedding_model);
    println!("  Dimensions: {}", index.meta().dimensions);
    println!("  Location:   {}", persist::index_file(&config.index.path).display());
    println!("  Elapsed:    {:.1}s", started.elapsed().as_secs_f64());

    Ok(())
}
