use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use email_triage::config::TriageConfig;
use email_triage::email::{EmailSource, EmlDirectorySource, SampleEmailSource};
use email_triage::llm::{CompletionService, create_provider};
use email_triage::pipeline::{Orchestrator, TriageStatus};
use email_triage::tools::{EffectLog, ToolRegistry};

#[tokio::main]
async fn main() -> email_triage::error::Result<()> {
    // Install rustls crypto provider before any TLS usage. A provider
    // installed earlier in the process is fine.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let config = TriageConfig::from_env()?;

    // Initialize tracing: stderr always, plus a daily audit file if requested.
    let (file_layer, _log_guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "email-triage.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(file_layer)
        .init();

    eprintln!("📬 Email Triage v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Backend: {} (model: {})", config.llm.backend, config.llm.model);
    eprintln!(
        "   Agent: max {} iterations, tool timeout {:?}",
        config.agent.max_iterations, config.agent.tool_timeout
    );
    if let Some(dir) = &config.log_dir {
        eprintln!("   Audit log: {}", dir.display());
    }

    let llm = create_provider(&config.llm)?;
    let completion = CompletionService::new(llm, config.completion.clone());

    // ── Tools ────────────────────────────────────────────────────────────
    let effects = EffectLog::new();
    let tools = Arc::new(ToolRegistry::with_builtin(Arc::clone(&effects)));
    eprintln!("   Tools: {}", tools.names().join(", "));

    // ── Email source ─────────────────────────────────────────────────────
    let source: Box<dyn EmailSource> = match &config.eml_dir {
        Some(dir) => Box::new(EmlDirectorySource::new(dir.clone())),
        None => Box::new(SampleEmailSource::new()),
    };
    eprintln!("   Source: {}\n", source.name());

    let orchestrator = Orchestrator::new(completion, tools, config.agent.clone());
    let report = orchestrator.run_source(source.as_ref()).await?;

    // ── Summary ──────────────────────────────────────────────────────────
    eprintln!("\n--- Triage complete ---");
    for entry in &report.emails {
        match &entry.status {
            TriageStatus::Completed(record) => eprintln!(
                "   [{}] {} → {}",
                record.classification.category, entry.subject, record.agent.final_answer
            ),
            TriageStatus::Failed { stage, error } => {
                eprintln!("   [failed:{}] {}: {}", stage, entry.subject, error)
            }
        }
    }
    eprintln!(
        "   {} completed, {} failed, {} tool effects, {} tokens, est. cost ${}",
        report.completed(),
        report.failed(),
        effects.len().await,
        report.total_usage().total(),
        report.total_cost().round_dp(4)
    );

    Ok(())
}
