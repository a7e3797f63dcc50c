//! Memory Match demo
//!
//! Plays one game headlessly through a session actor, persisting every
//! save, then checks the saved game restores to the same board.
//!
//! Usage: `memory-match [seed] [easy|medium|hard] [save.json]`

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use memory_match::{
    VERSION,
    game::{
        build_deck, default_catalog, Difficulty, GameConfig, GameEvent, GameManager,
        ManagerSettings, TimingConfig,
    },
    session::{
        format_elapsed, GameSession, JsonFileStore, MemoryStore, SessionOptions, SessionStart,
        SnapshotStore,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let mut args = std::env::args().skip(1);
    let seed = args.next().unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let difficulty = match args.next() {
        Some(name) => match Difficulty::parse(&name) {
            Some(d) => d,
            None => bail!("Unknown difficulty {:?} (expected easy, medium or hard)", name),
        },
        None => Difficulty::default(),
    };
    let store: Arc<dyn SnapshotStore> = match args.next() {
        Some(path) => Arc::new(JsonFileStore::new(path)?),
        None => Arc::new(MemoryStore::new()),
    };

    info!("Memory Match v{}", VERSION);
    let config = GameConfig::from_difficulty(difficulty, seed);
    let settings = ManagerSettings {
        timing: TimingConfig::from_env(),
        ..ManagerSettings::default()
    };
    info!(
        "Board {}x{} ({:?}), seed {:?}",
        config.cols, config.rows, difficulty, config.seed
    );

    play_demo(&config, settings, store.clone()).await?;
    verify_determinism(&config, settings, store.as_ref())?;

    Ok(())
}

/// Solve the board through the session: one deliberate miss, then every pair.
async fn play_demo(
    config: &GameConfig,
    settings: ManagerSettings,
    store: Arc<dyn SnapshotStore>,
) -> anyhow::Result<()> {
    info!("=== Playing ===");

    let session = GameSession::start(
        SessionStart::Fresh(config.clone()),
        SessionOptions {
            settings,
            store: Some(store),
            ..SessionOptions::default()
        },
    )
    .await?;

    let mut events = session.subscribe();
    let logger = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                GameEvent::MovesChanged { moves } => info!("Moves: {}", moves),
                GameEvent::PairMatched => info!("Pair matched"),
                GameEvent::GameSave => {}
                GameEvent::GameFinished { moves, elapsed } => {
                    info!("Finished in {} moves, {}", moves, format_elapsed(elapsed));
                }
            }
        }
    });

    // The seed fully determines the board, so it can be rebuilt here
    let slots = build_deck(&default_catalog(), config)?;
    let mut pairs: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (index, slot) in slots.iter().enumerate() {
        pairs.entry(slot.weapon.id.as_str()).or_default().push(index);
    }
    let pairs: Vec<(usize, usize)> = pairs
        .values()
        .flat_map(|indices| indices.chunks_exact(2).map(|c| (c[0], c[1])))
        .collect();

    if let [(a, _), (b, _), ..] = pairs.as_slice() {
        if slots[*a].weapon.id != slots[*b].weapon.id {
            turn(&session, *a, *b).await?;
        }
    }
    for &(a, b) in &pairs {
        turn(&session, a, b).await?;
    }

    let status = session.status().await?;
    if !status.is_finished {
        warn!("Board not cleared after {} moves", status.moves);
    }
    info!("Timer shows {}", format_elapsed(*session.elapsed().borrow()));

    session.shutdown().await?;
    // Every sender is gone now; the logger drains and exits
    let _ = logger.await;
    Ok(())
}

async fn turn(session: &GameSession, a: usize, b: usize) -> anyhow::Result<()> {
    for index in [a, b] {
        session.click(index).await?;
        session.wait_idle().await?;
    }
    Ok(())
}

/// Rebuild the saved game and compare it against a fresh board.
fn verify_determinism(
    config: &GameConfig,
    settings: ManagerSettings,
    store: &dyn SnapshotStore,
) -> anyhow::Result<()> {
    info!("=== Verifying Determinism ===");

    let snapshot = store.load()?.context("No snapshot was saved")?;
    info!(
        "Saved game: {} moves, {}/{} cards matched",
        snapshot.moves,
        snapshot.matched_count(),
        snapshot.cards.len()
    );

    let fresh = GameManager::new(config.clone(), default_catalog(), settings, 0)?;
    let restored =
        GameManager::from_snapshot(&snapshot, default_catalog(), settings, snapshot.start_ts)?;

    let fresh_hash = fresh.board_hash();
    let restored_hash = restored.board_hash();
    info!("Fresh board hash:    {}", hex::encode(fresh_hash));
    info!("Restored board hash: {}", hex::encode(restored_hash));

    if fresh_hash == restored_hash && restored.serialize() == snapshot {
        info!("DETERMINISM VERIFIED: Boards match!");
        Ok(())
    } else {
        bail!("DETERMINISM FAILURE: Boards differ!")
    }
}
