//! Claim verifier server binary
//!
//! Run with: cargo run -p claim-verifier --bin claim-verifier-server

use std::path::PathBuf;
use std::sync::Arc;

use claim_verifier::{
    config::VerifierConfig, providers::GeminiClient, server::VerifierServer, ClaimVerifier,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "claim_verifier=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                   Political Claim Verifier                ║
║        Fact-checking against party policy documents       ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    let config_path = std::env::var(VerifierConfig::ENV_CONFIG_PATH).ok().map(PathBuf::from);
    let config = VerifierConfig::load(config_path.as_deref())?;
    config.validate()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding model: {}", config.gemini.embedding_model);
    tracing::info!("  - Embedding dimensions: {}", config.gemini.embedding_dimensions);
    tracing::info!("  - LLM model: {}", config.gemini.generation_model);
    tracing::info!(
        "  - Chunk size: {} (overlap {})",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );
    tracing::info!("  - Index path: {}", config.index.path.display());
    tracing::info!("  - Top k: {}", config.index.top_k);

    let embedder = Arc::new(GeminiClient::embedding(&config.gemini)?);
    let llm = Arc::new(GeminiClient::generation(&config.gemini)?);
    let translator = Arc::new(GeminiClient::translation(&config.gemini)?);

    // Startup aborts here if the index can be neither loaded nor built
    let verifier = ClaimVerifier::initialize(&config, embedder, llm, translator).await?;
    tracing::info!("Verifier ready with {} indexed chunks", verifier.index().len());

    let server = VerifierServer::new(config, Arc::new(verifier));

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  GET  /               - Welcome message");
    println!("  POST /validate_claim - Verify a claim");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
