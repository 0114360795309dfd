//! ruleboard: backend for the rules analytics and architecture dashboard.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use futures_util::StreamExt;
use ruleboard::config::{Cli, Command};
use ruleboard::{create_router, logging};
use ruleboard_core::ingest;
use ruleboard_relay::{ChatMessage, ChatRequest, ChunkDecoder};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_json)?;

    match cli.command.clone().unwrap_or(Command::Serve) {
        Command::Serve => serve(&cli).await,
        Command::ImportRules { file, dry_run } => import_rules(&cli, &file, dry_run),
        Command::Chat { rule, question, model } => chat(&cli, &rule, question, model).await,
        Command::Status => status(&cli).await,
    }
}

async fn serve(cli: &Cli) -> anyhow::Result<()> {
    let state = Arc::new(cli.app_state());
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("failed to bind {}", cli.bind))?;
    info!(
        addr = %listener.local_addr()?,
        data_dir = %cli.data_dir.display(),
        ollama = %cli.ollama_base_url,
        "ruleboard listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("ruleboard stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

fn import_rules(cli: &Cli, file: &Path, dry_run: bool) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let rules = ingest::parse_rules_text(&raw);
    if rules.is_empty() {
        bail!("no rules found in {}", file.display());
    }

    if dry_run {
        println!("{}", serde_json::to_string_pretty(&rules)?);
        return Ok(());
    }

    let store = cli.store();
    store.save_rules(&rules)?;
    info!(count = rules.len(), path = %store.rules_path().display(), "rules imported");
    Ok(())
}

async fn chat(cli: &Cli, rule_id: &str, question: String, model: Option<String>) -> anyhow::Result<()> {
    let store = cli.store();
    let Some(rule) = store.load_rules().into_iter().find(|r| r.id == rule_id) else {
        bail!("no rule with id '{rule_id}'");
    };

    let request = ChatRequest {
        messages: vec![ChatMessage::user(question)],
        context: rule,
        model,
    };
    let mut stream = cli.relay().chat(&request).await?;
    let mut decoder = ChunkDecoder::new();
    let mut stdout = std::io::stdout().lock();

    while let Some(bytes) = stream.next().await {
        for piece in decoder.push(&bytes?) {
            stdout.write_all(piece.content.as_bytes())?;
        }
        stdout.flush()?;
    }
    if let Some(piece) = decoder.finish() {
        stdout.write_all(piece.content.as_bytes())?;
    }
    writeln!(stdout)?;
    Ok(())
}

async fn status(cli: &Cli) -> anyhow::Result<()> {
    let relay = cli.relay();
    let status = relay
        .status()
        .await
        .with_context(|| format!("Ollama at {}", relay.client().base_url()))?;
    println!("ok: {}", status.model);
    Ok(())
}
