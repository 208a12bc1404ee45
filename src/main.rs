use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use linagent::config::load_config;
use linagent::core::Orchestrator;
use linagent::llm::create_llm_from_config;
use linagent::memory::ThreadStore;
use linagent::observability;
use linagent::react::TaskAgent;
use linagent::server::{build_router, AppState};
use linagent::tools::{DocClient, LinuxDocTool, SearchInDocTool, ToolExecutor, ToolRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let cfg = load_config(config_path).context("failed to load configuration")?;
    tracing::info!(?cfg, "configuration loaded");

    let llm = create_llm_from_config(&cfg);

    let doc_client = Arc::new(
        DocClient::new(&cfg.tools.doc_base_url, cfg.tools.timeout_secs)
            .map_err(anyhow::Error::msg)?,
    );
    let mut registry = ToolRegistry::new();
    registry.register(LinuxDocTool::new(doc_client.clone(), cfg.tools.max_doc_chars));
    registry.register(SearchInDocTool::new(doc_client, cfg.tools.max_matches));
    let executor = Arc::new(ToolExecutor::new(
        Arc::new(registry),
        cfg.tools.tool_timeout_secs,
    ));

    let agent = Arc::new(TaskAgent::new(
        llm,
        executor,
        cfg.agent.max_cycles,
        cfg.agent.max_plan_steps,
    ));

    let store = Arc::new(ThreadStore::new());
    spawn_sweeper(
        store.clone(),
        Duration::from_secs(cfg.server.sweep_interval_secs),
        Duration::from_secs(cfg.server.thread_ttl_secs),
    );

    let orchestrator = Orchestrator::new(
        agent,
        store.clone(),
        cfg.server.workers,
        cfg.server.queue_capacity,
        Duration::from_secs(cfg.server.request_timeout_secs),
    );

    let state = Arc::new(AppState {
        orchestrator,
        store,
    });
    let app = build_router(state);

    let addr = format!("{}:{}", cfg.server.host, cfg.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

fn spawn_sweeper(store: Arc<ThreadStore>, interval: Duration, ttl: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let evicted = store.sweep_expired(ttl).await;
            if evicted > 0 {
                tracing::info!(evicted, "expired threads swept");
            }
        }
    });
}
