// Auction engine entry point.
//
// Startup sequence:
// 1. Initialize tracing
// 2. Load config
// 3. Build the backend HTTP client
// 4. Fetch owners and the player catalog
// 5. Construct the draft session
// 6. Spawn the session event loop
// 7. Log surfaced events until Ctrl+C

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use auction_engine::api::{DraftApi, HttpApi};
use auction_engine::config;
use auction_engine::protocol::{SessionCommand, SessionEvent};
use auction_engine::session::{self, DraftSession};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    info!("Auction engine starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, ${} cap, {} roster slots",
        config.league.name, config.league.salary_cap, config.league.roster_size
    );

    let api: Arc<dyn DraftApi> = Arc::new(HttpApi::new(config.api.base_url.clone()));

    let owners = api
        .fetch_owners()
        .await
        .context("failed to fetch owners")?;
    let players = api
        .fetch_players()
        .await
        .context("failed to fetch player catalog")?;
    info!(
        "Fetched {} owners and {} catalog players",
        owners.len(),
        players.len()
    );

    let session_id = format!(
        "{}_{}",
        config.draft.session_prefix,
        Utc::now().format("%Y-%m-%d")
    );
    let session = DraftSession::new(
        config.league.rules(),
        session_id.clone(),
        config.draft.timer_seconds,
        owners,
        players,
    );
    info!("Draft session {session_id} ready");

    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (event_tx, mut event_rx) = mpsc::channel(256);

    let poll_interval = Duration::from_millis(config.draft.poll_interval_ms);
    let session_handle = tokio::spawn(async move {
        if let Err(e) = session::run(api, session, cmd_rx, event_tx, poll_interval).await {
            error!("Session loop error: {e}");
        }
    });

    // Headless consumer: log surfaced events until the user interrupts.
    loop {
        tokio::select! {
            event = event_rx.recv() => {
                match event {
                    Some(event) => log_event(&event),
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, shutting down");
                let _ = cmd_tx.send(SessionCommand::Quit).await;
                break;
            }
        }
    }

    let _ = tokio::time::timeout(Duration::from_secs(5), session_handle).await;
    info!("Auction engine shut down cleanly");
    Ok(())
}

fn log_event(event: &SessionEvent) {
    match event {
        SessionEvent::Board(board) => {
            info!(
                "Board r{}: {} picks, nominator={:?}",
                board.revision, board.pick_count, board.nominator_id
            );
        }
        SessionEvent::TimerTick { time_left, running } => {
            info!("Timer: {time_left}s (running={running})");
        }
        SessionEvent::SaleCommitted(pick) => {
            info!(
                "SOLD: player {} to owner {} for ${}",
                pick.player_id, pick.owner_id, pick.amount
            );
        }
        SessionEvent::SaleRejected(reason) => {
            warn!("Sale rejected: {reason}");
        }
        SessionEvent::Suggestions(players) => {
            info!("{} suggestions", players.len());
        }
        SessionEvent::FinalizeResult(outcome) => {
            info!("Finalize: {outcome:?}");
        }
    }
}

/// Initialize tracing to stderr, honoring `RUST_LOG` when set.
fn init_tracing() {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("auction_engine=info,gavel=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    // A subscriber may already be installed (e.g. by a test harness).
    let _ = tracing::subscriber::set_global_default(subscriber);
}
