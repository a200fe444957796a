//! ct-server — serves simulated city traffic, congestion classes, anomalies
//! and congestion-aware routes over HTTP.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use ct_core::SimRng;
use ct_core::time::now_unix_secs;
use ct_server::{AppState, Cli, build_router, init_logging, spawn_refresh};
use ct_sim::{LiveSnapshots, TrafficSimulator, builtin_roads, load_roads_csv};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_format)?;
    cli.validate().context("invalid configuration")?;

    // ── Road catalog ──────────────────────────────────────────────────────
    let roads = match &cli.road_catalog {
        Some(path) => load_roads_csv(path)
            .with_context(|| format!("loading road catalog {}", path.display()))?,
        None => builtin_roads(cli.map_center()),
    };
    info!(roads = roads.len(), "road catalog ready");

    // ── Live snapshots ────────────────────────────────────────────────────
    let simulator = TrafficSimulator::new(roads, cli.simulation_params());
    let rng = cli.sim_seed.map_or_else(SimRng::from_entropy, SimRng::new);
    let live = Arc::new(LiveSnapshots::new(simulator, rng, cli.max_history, now_unix_secs()));

    if cli.refresh_interval_secs > 0 {
        spawn_refresh(Arc::clone(&live), Duration::from_secs(cli.refresh_interval_secs));
    } else {
        warn!("snapshot refresh disabled; serving a single snapshot");
    }

    // ── HTTP ──────────────────────────────────────────────────────────────
    let state = Arc::new(AppState::from_cli(&cli, live)?);
    let prefix = cli.api_prefix();
    let app = build_router(state, &prefix);

    let listener = tokio::net::TcpListener::bind((cli.host.as_str(), cli.port))
        .await
        .with_context(|| format!("binding {}:{}", cli.host, cli.port))?;
    info!(
        addr = %listener.local_addr()?,
        prefix = %prefix,
        debug = cli.debug,
        "listening"
    );

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
