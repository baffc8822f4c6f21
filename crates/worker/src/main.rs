//! Onboarding agent console worker
//!
//! Replays call events from a JSON-lines script (or stdin) through the stage
//! orchestrator and prints every reply request and frontend notification.

use anyhow::Context;
use clap::Parser;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::path::PathBuf;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use onboarding_agent_agent::OrchestratorFactory;
use onboarding_agent_config::{load_settings, Settings};
use onboarding_agent_worker::{run_script, OutboundEvent, SessionManager};

#[derive(Parser, Debug)]
#[command(name = "onboarding-agent", version, about = "Onboarding voice agent console worker")]
struct Args {
    /// JSON-lines event script; reads stdin when omitted
    #[arg(long)]
    script: Option<PathBuf>,

    /// Configuration environment (loads config/<env>.yaml)
    #[arg(long, env = "ONBOARDING_AGENT_ENV")]
    env: Option<String>,

    /// Session id for events that do not name one
    #[arg(long)]
    session: Option<String>,

    /// Print the realtime model's system instructions and exit
    #[arg(long)]
    print_instructions: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
    let config = match load_settings(args.env.as_deref()) {
        Ok(settings) => {
            // Tracing not yet initialized
            eprintln!(
                "Loaded configuration from files (env: {})",
                args.env.as_deref().unwrap_or("default")
            );
            settings
        },
        Err(e) => {
            eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
            Settings::default()
        },
    };

    init_tracing(&config);

    tracing::info!("Starting onboarding agent worker v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        environment = ?config.environment,
        agent = %config.persona.name,
        model = %config.realtime.model,
        voice = %config.realtime.voice,
        "Configuration loaded"
    );

    let metrics_handle = if config.observability.metrics_enabled {
        init_metrics()
    } else {
        None
    };

    let knowledge = onboarding_agent_rag::gateway_from_config(&config.knowledge)
        .context("failed to initialize knowledge gateway")?;
    let factory = OrchestratorFactory::from_settings(&config).with_knowledge(knowledge);

    if args.print_instructions {
        println!("{}", factory.prompts().system_instructions());
        return Ok(());
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_outbound(rx));
    let manager = SessionManager::new(factory, tx, config.sessions.max_sessions);

    let default_session = args
        .session
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let summary = match &args.script {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open script {}", path.display()))?;
            run_script(BufReader::new(file), &manager, &default_session).await?
        },
        None => run_script(BufReader::new(tokio::io::stdin()), &manager, &default_session).await?,
    };

    let open = manager.end_all();
    tracing::info!(
        events = summary.events,
        skipped = summary.skipped,
        failed = summary.failed,
        open_sessions = open,
        "Script finished"
    );

    // Closing the last sender lets the writer drain and exit
    drop(manager);
    writer.await.context("output writer panicked")??;

    if let Some(handle) = metrics_handle {
        tracing::debug!(snapshot = %handle.render(), "Metrics at shutdown");
    }

    Ok(())
}

async fn write_outbound(mut rx: mpsc::UnboundedReceiver<OutboundEvent>) -> anyhow::Result<()> {
    let mut stdout = tokio::io::stdout();
    while let Some(event) = rx.recv().await {
        let mut line = serde_json::to_vec(&event)?;
        line.push(b'\n');
        stdout.write_all(&line).await?;
        stdout.flush().await?;
    }
    Ok(())
}

fn init_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            tracing::info!("Initialized Prometheus metrics recorder");
            Some(handle)
        },
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install metrics recorder, continuing without");
            None
        },
    }
}

fn init_tracing(config: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.observability.log_level;
        format!("onboarding_agent={},warn", level).into()
    });

    // Logs go to stderr; stdout carries the event stream
    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };
    subscriber.with(fmt_layer).init();
}
