//! Two brawlers trade punches until one drops.
//!
//! ```text
//! RUST_LOG=combat=debug cargo run -p combat-runtime --example skirmish
//! ```
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;
use tokio::sync::broadcast::error::RecvError;

use combat_core::env::{CharacterSheet, InMemoryHost};
use combat_core::{CombatAction, LocationId, ParticipantId};
use combat_runtime::{CombatRuntime, RuntimeConfig, Topic};

const ARENA: LocationId = LocationId(1);
const GARRET: ParticipantId = ParticipantId(1);
const MIRA: ParticipantId = ParticipantId(2);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let host = InMemoryHost::new()
        .with_character(
            GARRET,
            CharacterSheet::new()
                .with_physicals(3, 2, 3, 2)
                .with_ability("brawl", 3),
        )
        .with_character(
            MIRA,
            CharacterSheet::new()
                .with_physicals(2, 4, 2, 3)
                .with_ability("brawl", 2)
                .with_ability("dodge", 2),
        );

    let runtime = CombatRuntime::builder()
        .config(RuntimeConfig {
            dice_seed: 2024,
            ..RuntimeConfig::default()
        })
        .host(Arc::new(Mutex::new(host)))
        .build()
        .await?;
    let handle = runtime.handle();

    let mut session_rx = handle.subscribe(Topic::Session);
    let announcer = tokio::spawn(async move {
        loop {
            match session_rx.recv().await {
                Ok(event) => tracing::info!("{}: {}", event.location, event.event),
                Err(RecvError::Lagged(skipped)) => tracing::warn!(skipped, "announcer lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    for event in handle.begin(ARENA, GARRET, &[MIRA]).await? {
        println!("{event}");
    }

    for _ in 0..50 {
        let Some(session) = handle.snapshot(ARENA).await? else {
            break;
        };
        let Some(actor) = session.current_actor() else {
            break;
        };
        let target = if actor == GARRET { MIRA } else { GARRET };

        // Whoever is not acting keeps a dodge ready.
        if let Err(error) = handle
            .process_action(ARENA, target, CombatAction::defense("dodge"))
            .await
        {
            tracing::debug!(%error, "could not queue dodge");
        }
        let outcome = handle
            .process_action(ARENA, actor, CombatAction::attack("punch", target))
            .await?;
        for event in outcome.events {
            println!("{event}");
        }
    }

    if handle.snapshot(ARENA).await?.is_some() {
        handle.end(ARENA).await?;
    }

    drop(handle);
    runtime.shutdown().await?;
    announcer.await?;
    Ok(())
}
