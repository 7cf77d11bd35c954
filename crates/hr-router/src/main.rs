//! Hybrid router demo — one utterance per stdin line, one JSON result per stdout line.
//!
//! Usage: `hybrid-router [config.toml] [tools.json]`. Without a config file
//! the defaults apply; without a tools file the built-in catalog is used.
//! Logs go to stderr so stdout stays machine-readable.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use hr_protocol::{Message, ToolSchema, check_tool_set};
use hr_router::backend::{EdgeBackend, GeminiCloud, OllamaEdge};
use hr_router::{EdgeSession, HybridRouter, RouterConfig, catalog};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "hybrid-router starting");

    // ── Load config ─────────────────────────────────────────────
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => RouterConfig::from_file(&path)
            .with_context(|| format!("failed to load config from {path}"))?,
        None => RouterConfig::default(),
    };
    let tools = match args.next() {
        Some(path) => load_tools(&path)?,
        None => catalog::default_tools(),
    };
    check_tool_set(&tools).context("invalid tool set")?;
    tracing::info!(tool_count = tools.len(), "tool set loaded");

    // ── Backends ────────────────────────────────────────────────
    let session = if config.edge.enabled {
        let edge_config = config.edge.clone();
        tracing::info!(host = %edge_config.host, model = %edge_config.model, "edge model enabled");
        Arc::new(EdgeSession::lazy(move || {
            Ok(Arc::new(OllamaEdge::new(edge_config)?) as Arc<dyn EdgeBackend>)
        }))
    } else {
        tracing::info!("edge model disabled");
        Arc::new(EdgeSession::disabled())
    };
    let cloud = Arc::new(GeminiCloud::new(config.cloud.clone())?);

    let router = HybridRouter::new(config, Arc::clone(&session), cloud);
    tracing::info!("hybrid-router ready");

    tokio::select! {
        result = serve(&router, &tools) => {
            if let Err(e) = &result {
                tracing::error!(error = %e, "request loop failed");
            }
            session.release();
            result?;
        }
        // Graceful shutdown on SIGINT
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
            session.release();
        }
    }

    tracing::info!("hybrid-router stopped");
    Ok(())
}

/// Route every stdin line until EOF.
async fn serve(router: &HybridRouter, tools: &[ToolSchema]) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        let result = router.route(&[Message::user(text)], tools, None).await;
        let mut out = serde_json::to_vec(&result)?;
        out.push(b'\n');
        stdout.write_all(&out).await?;
        stdout.flush().await?;
    }
    Ok(())
}

fn load_tools(path: &str) -> anyhow::Result<Vec<ToolSchema>> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("failed to read tools from {path}"))?;
    let tools: Vec<ToolSchema> = serde_json::from_str(&contents)?;
    Ok(tools)
}
