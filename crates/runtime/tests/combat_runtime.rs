use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use combat_core::env::{CharacterSheet, InMemoryHost, Message, RecordingSink, ScriptedDice};
use combat_core::{
    CombatAction, CombatErrorKind, CombatEvent, DamageType, LocationId, ManeuverCategory,
    ParticipantId, RemovalReason, ResourcePool,
};
use combat_runtime::{CombatRuntime, RuntimeConfig, RuntimeError, Topic};

const HALL: LocationId = LocationId(7);
const A: ParticipantId = ParticipantId(1);
const B: ParticipantId = ParticipantId(2);
const C: ParticipantId = ParticipantId(3);

fn host() -> Arc<Mutex<InMemoryHost>> {
    let host = InMemoryHost::new()
        .with_character(
            A,
            CharacterSheet::new()
                .with_physicals(2, 3, 2, 2)
                .with_ability("brawl", 2)
                .with_resource(ResourcePool::Rage, 4, 4),
        )
        .with_character(
            B,
            CharacterSheet::new()
                .with_physicals(2, 1, 2, 1)
                .with_ability("brawl", 1),
        )
        .with_character(C, CharacterSheet::new().with_physicals(1, 1, 1, 1));
    Arc::new(Mutex::new(host))
}

/// Initiative puts A ahead of B.
fn opening_dice() -> ScriptedDice {
    ScriptedDice::new([7, 2])
}

async fn runtime(host: Arc<Mutex<InMemoryHost>>, dice: ScriptedDice) -> CombatRuntime {
    CombatRuntime::builder()
        .host(host)
        .dice(dice)
        .build()
        .await
        .expect("runtime should build")
}

#[tokio::test]
async fn duel_runs_through_the_worker() {
    let host = host();
    let mut dice = opening_dice();
    dice.push([8, 9, 10, 3, 4, 6, 7, 2, 3]);
    let runtime = runtime(Arc::clone(&host), dice).await;
    let handle = runtime.handle();

    let mut session_rx = handle.subscribe(Topic::Session);
    let mut turn_rx = handle.subscribe(Topic::Turn);
    let mut resolution_rx = handle.subscribe(Topic::Resolution);

    let events = handle.begin(HALL, A, &[B]).await.unwrap();
    assert!(matches!(events[0], CombatEvent::CombatBegun { initiator: A, .. }));

    let begun = session_rx.recv().await.unwrap();
    assert_eq!(begun.location, HALL);
    assert!(matches!(begun.event, CombatEvent::CombatBegun { .. }));
    assert!(matches!(
        turn_rx.recv().await.unwrap().event,
        CombatEvent::InitiativeRolled { .. }
    ));

    let snapshot = handle.snapshot(HALL).await.unwrap().expect("session");
    assert_eq!(snapshot.current_actor(), Some(A));
    assert_eq!(handle.locate(B).await.unwrap(), Some(HALL));

    let outcome = handle
        .process_action(HALL, A, CombatAction::attack("punch", B))
        .await
        .unwrap();
    let resolution = outcome.resolution.expect("attack resolution");
    assert_eq!(resolution.net_successes, 3);

    let declared = resolution_rx.recv().await.unwrap();
    assert!(matches!(declared.event, CombatEvent::ManeuverDeclared { .. }));

    {
        let host = host.lock().await;
        let record = host.damage_log()[0];
        assert_eq!((record.participant, record.amount), (B, 2));
        assert_eq!(record.damage_type, DamageType::Bashing);
    }

    let snapshot = handle.snapshot(HALL).await.unwrap().expect("session");
    assert_eq!(snapshot.current_actor(), Some(B));

    handle.process_action(HALL, B, CombatAction::Pass).await.unwrap();
    let ended = handle.end(HALL).await.unwrap();
    assert!(matches!(ended.last(), Some(CombatEvent::CombatEnded { .. })));
    assert!(handle.snapshot(HALL).await.unwrap().is_none());
    assert_eq!(handle.locate(A).await.unwrap(), None);

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn rejected_actions_surface_combat_errors() {
    let runtime = runtime(host(), opening_dice()).await;
    let handle = runtime.handle();
    handle.begin(HALL, A, &[B]).await.unwrap();
    let before = handle.snapshot(HALL).await.unwrap();

    let err = handle
        .process_action(HALL, B, CombatAction::attack("punch", A))
        .await
        .unwrap_err();
    let combat = err.as_combat().expect("combat error");
    assert_eq!(combat.kind(), CombatErrorKind::NotYourTurn);

    let err = handle
        .process_action(HALL, A, CombatAction::attack("moonwalk", B))
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_combat().map(|e| e.kind()),
        Some(CombatErrorKind::UnknownManeuver)
    ));

    assert_eq!(handle.snapshot(HALL).await.unwrap(), before);

    let err = handle.begin(HALL, C, &[]).await.unwrap_err();
    assert!(matches!(
        err.as_combat().map(|e| e.kind()),
        Some(CombatErrorKind::SessionAlreadyActive)
    ));
}

#[tokio::test]
async fn combatants_join_and_leave() {
    let runtime = runtime(host(), opening_dice()).await;
    let handle = runtime.handle();
    handle.begin(HALL, A, &[B]).await.unwrap();

    let joined = handle.add(HALL, C).await.unwrap();
    assert!(joined.contains(&CombatEvent::CombatantJoined { participant: C }));
    assert_eq!(handle.locate(C).await.unwrap(), Some(HALL));

    handle.remove(HALL, B, RemovalReason::Fled).await.unwrap();
    let session = handle.snapshot(HALL).await.unwrap().expect("still two fighting");
    assert!(!session.contains(B));
    assert_eq!(session.len(), 2);

    let ended = handle.remove(HALL, C, RemovalReason::Removed).await.unwrap();
    assert!(matches!(ended.last(), Some(CombatEvent::CombatEnded { .. })));
    assert!(handle.snapshot(HALL).await.unwrap().is_none());
}

#[tokio::test]
async fn sink_receives_event_text() {
    let sink = Arc::new(RecordingSink::new());
    let runtime = CombatRuntime::builder()
        .host(host())
        .dice(opening_dice())
        .sink(sink.clone())
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();

    handle.begin(HALL, A, &[B]).await.unwrap();

    let messages = sink.messages();
    assert!(
        messages
            .iter()
            .any(|m| matches!(m, Message::Broadcast { location, .. } if *location == HALL))
    );
    assert!(
        messages
            .iter()
            .any(|m| matches!(m, Message::Notice { participant, .. } if *participant == A))
    );
}

#[tokio::test]
async fn catalog_queries_use_the_host() {
    let runtime = runtime(host(), ScriptedDice::new([])).await;
    let handle = runtime.handle();

    let available = handle.list_available(A, None).await;
    assert!(available.iter().any(|m| m.id.as_str() == "punch"));
    assert!(!available.iter().any(|m| m.id.as_str() == "flying_kick"));

    let weapons = handle.list_by_category(ManeuverCategory::Weapon);
    assert!(!weapons.is_empty());
    assert!(weapons.iter().all(|m| m.category == ManeuverCategory::Weapon));
}

#[tokio::test]
async fn lonely_sessions_are_swept() {
    let config = RuntimeConfig {
        sweep_interval: Some(Duration::from_millis(10)),
        ..RuntimeConfig::default()
    };
    let runtime = CombatRuntime::builder()
        .config(config)
        .host(host())
        .dice(ScriptedDice::new([]))
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    let mut session_rx = handle.subscribe(Topic::Session);

    handle.begin(HALL, A, &[]).await.unwrap();

    let ended = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let event = session_rx.recv().await.unwrap();
            if matches!(event.event, CombatEvent::CombatEnded { .. }) {
                return event;
            }
        }
    })
    .await
    .expect("sweep should end the session");
    assert_eq!(ended.location, HALL);
    assert!(handle.snapshot(HALL).await.unwrap().is_none());
}

#[tokio::test]
async fn manual_sweep_reports_ended_sessions() {
    let runtime = runtime(host(), ScriptedDice::new([])).await;
    let handle = runtime.handle();
    handle.begin(HALL, A, &[]).await.unwrap();

    let swept = handle.sweep().await.unwrap();
    assert_eq!(swept.len(), 1);
    assert_eq!(swept[0].0, HALL);
    assert!(handle.sweep().await.unwrap().is_empty());
}

#[tokio::test]
async fn content_dir_overrides_catalog_and_rules() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("maneuvers")).unwrap();
    std::fs::write(
        dir.path().join("maneuvers").join("house.ron"),
        r#"[(id: "headbutt", name: "Headbutt", attribute: "strength", ability: "brawl")]"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("combat.toml"), "base_difficulty = 7\n").unwrap();

    let runtime = CombatRuntime::builder()
        .host(host())
        .content_dir(dir.path())
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();

    assert_eq!(handle.catalog().len(), 1);
    assert!(handle.list_available(B, None).await[0].id.as_str() == "headbutt");
}

#[tokio::test]
async fn building_without_a_host_fails() {
    let err = CombatRuntime::builder().build().await.err().unwrap();
    assert!(matches!(err, RuntimeError::MissingHost));
}

#[tokio::test]
async fn seeded_runtimes_replay_identically() {
    async fn opening(seed: u64) -> Vec<CombatEvent> {
        let runtime = CombatRuntime::builder()
            .config(RuntimeConfig {
                dice_seed: seed,
                ..RuntimeConfig::default()
            })
            .host(host())
            .build()
            .await
            .unwrap();
        let handle = runtime.handle();
        let mut events = handle.begin(HALL, A, &[B]).await.unwrap();
        let actor = handle
            .snapshot(HALL)
            .await
            .unwrap()
            .and_then(|s| s.current_actor())
            .unwrap();
        let target = if actor == A { B } else { A };
        let outcome = handle
            .process_action(HALL, actor, CombatAction::attack("punch", target))
            .await
            .unwrap();
        events.extend(outcome.events);
        events
    }

    assert_eq!(opening(11).await, opening(11).await);
}
