//! Contract Test: Scheduler Lifecycle
//!
//! This test verifies the start/step/stop state machine under virtual time.
//!
//! Constraints verified:
//! - start() shows the first address before returning
//! - Empty lists are rejected and leave the scheduler idle
//! - Each step increments the page count by exactly one
//! - The countdown reports remaining seconds but never rotates
//! - stop() cancels both timers, clears the display, keeps the page count
//! - stop() is idempotent
//!
//! If this test fails, someone has:
//! - Let a timer fire after stop
//! - Tied rotation to the countdown
//! - Allowed an empty session to start

mod common;

use common::*;
use pagewheel_core::config::SchedulerConfig;
use pagewheel_core::{AddressList, Error, RotationScheduler, SchedulerEvent, SchedulerState};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

fn single(address: &str) -> AddressList {
    AddressList::new(vec![address.to_string()])
}

fn spawn(
    display: &RecordingDisplay,
    config: SchedulerConfig,
) -> (RotationScheduler, tokio::sync::mpsc::Receiver<SchedulerEvent>) {
    RotationScheduler::spawn_with_rng(
        Box::new(display.clone()),
        config,
        ChaCha8Rng::seed_from_u64(2024),
    )
    .expect("scheduler spawns")
}

#[tokio::test(start_paused = true)]
async fn start_performs_first_step_immediately() {
    let display = RecordingDisplay::new();
    let (scheduler, mut events) = spawn(&display, SchedulerConfig::default());

    scheduler.start(single("https://a.test")).await.unwrap();

    assert_eq!(display.shown(), ["https://a.test"]);
    let session = scheduler.snapshot().await.unwrap();
    assert_eq!(session.state(), SchedulerState::Running);
    assert_eq!(session.page_view_count, 1);
    assert_eq!(session.current_index, Some(0));
    assert!((5..=12).contains(&session.time_left_secs));

    assert_eq!(
        events.recv().await,
        Some(SchedulerEvent::Started { address_count: 1 })
    );
    match events.recv().await {
        Some(SchedulerEvent::Rotated {
            view_number,
            index,
            address,
            dwell,
        }) => {
            assert_eq!(view_number, 1);
            assert_eq!(index, 0);
            assert_eq!(address, "https://a.test");
            assert!(dwell >= Duration::from_secs(5) && dwell <= Duration::from_secs(12));
            assert_eq!(session.time_left_secs, dwell.as_secs_f64().ceil() as u64);
        }
        other => panic!("expected Rotated, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn empty_list_is_rejected_and_stays_idle() {
    let display = RecordingDisplay::new();
    let (scheduler, mut events) = spawn(&display, SchedulerConfig::default());

    let result = scheduler.start(AddressList::default()).await;

    assert!(matches!(result, Err(Error::InvalidInput(_))));
    assert_eq!(scheduler.snapshot().await.unwrap().state(), SchedulerState::Idle);
    assert!(display.calls().is_empty());
    assert!(events.try_recv().is_err(), "no events for a rejected start");
}

#[tokio::test(start_paused = true)]
async fn start_while_running_is_rejected() {
    let display = RecordingDisplay::new();
    let (scheduler, _events) = spawn(&display, SchedulerConfig::default());

    scheduler.start(single("https://a.test")).await.unwrap();
    let result = scheduler.start(single("https://b.test")).await;

    assert!(matches!(result, Err(Error::AlreadyRunning)));
    assert_eq!(display.shown(), ["https://a.test"]);
    assert_eq!(scheduler.snapshot().await.unwrap().page_view_count, 1);
}

#[tokio::test(start_paused = true)]
async fn single_address_every_step_selects_it() {
    let display = RecordingDisplay::new();
    let (scheduler, mut events) = spawn(&display, fixed_dwell_config(2.5));

    scheduler.start(single("https://only.test")).await.unwrap();
    events_until_rotation(&mut events).await;

    for expected_count in 2..=6u64 {
        let seen = events_until_rotation(&mut events).await;
        match seen.last() {
            Some(SchedulerEvent::Rotated {
                view_number,
                address,
                ..
            }) => {
                assert_eq!(*view_number, expected_count);
                assert_eq!(address, "https://only.test");
            }
            other => panic!("expected Rotated, got {:?}", other),
        }
    }

    assert_eq!(display.shown(), vec!["https://only.test".to_string(); 6]);
    assert_eq!(scheduler.snapshot().await.unwrap().page_view_count, 6);
}

#[tokio::test(start_paused = true)]
async fn countdown_ticks_between_rotations() {
    let display = RecordingDisplay::new();
    let (scheduler, mut events) = spawn(&display, fixed_dwell_config(2.5));

    scheduler.start(single("https://a.test")).await.unwrap();
    events_until_rotation(&mut events).await;

    // ceil(2.5) = 3: ticks at 1s and 2s report 2 and 1, the trigger at 2.5s rotates
    let seen = events_until_rotation(&mut events).await;
    assert_eq!(
        &seen[..2],
        [
            SchedulerEvent::Countdown { seconds_left: 2 },
            SchedulerEvent::Countdown { seconds_left: 1 },
        ]
    );
    assert!(matches!(
        seen[2],
        SchedulerEvent::Rotated { view_number: 2, .. }
    ));
    assert_eq!(seen.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn countdown_never_rotates_on_its_own() {
    let display = RecordingDisplay::new();
    let (scheduler, _events) = spawn(&display, fixed_dwell_config(10.0));

    scheduler.start(single("https://a.test")).await.unwrap();

    tokio::time::sleep(Duration::from_millis(9_500)).await;
    let session = scheduler.snapshot().await.unwrap();
    assert_eq!(session.page_view_count, 1);
    assert_eq!(session.time_left_secs, 1);

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert_eq!(scheduler.snapshot().await.unwrap().page_view_count, 2);
}

#[tokio::test(start_paused = true)]
async fn stop_cancels_timers_and_clears_display() {
    let display = RecordingDisplay::new();
    let (scheduler, mut events) = spawn(&display, fixed_dwell_config(3.0));

    scheduler.start(single("https://a.test")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1_500)).await;

    let pages = scheduler.stop().await.unwrap();
    assert_eq!(pages, 1);

    let session = scheduler.snapshot().await.unwrap();
    assert_eq!(session.state(), SchedulerState::Idle);
    assert_eq!(session.page_view_count, 1);
    assert_eq!(session.current_index, None);
    assert_eq!(session.time_left_secs, 0);
    assert_eq!(display.calls().last(), Some(&DisplayCall::Clear));

    // Drain everything emitted so far, then make sure nothing else arrives
    let mut emitted = Vec::new();
    while let Ok(event) = events.try_recv() {
        emitted.push(event);
    }
    assert_eq!(
        emitted.last(),
        Some(&SchedulerEvent::Stopped { pages_viewed: 1 })
    );

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(events.try_recv().is_err(), "timers must not fire after stop");
    assert_eq!(display.shown().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn stop_twice_is_a_no_op() {
    let display = RecordingDisplay::new();
    let (scheduler, mut events) = spawn(&display, fixed_dwell_config(2.0));

    scheduler.start(single("https://a.test")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(4_500)).await;

    let first = scheduler.stop().await.unwrap();
    let second = scheduler.stop().await.unwrap();

    assert_eq!(first, 3);
    assert_eq!(second, first);
    assert_eq!(display.clear_count(), 1);

    let stopped = std::iter::from_fn(|| events.try_recv().ok())
        .filter(|e| matches!(e, SchedulerEvent::Stopped { .. }))
        .count();
    assert_eq!(stopped, 1);
}

#[tokio::test(start_paused = true)]
async fn stop_on_idle_scheduler_is_safe() {
    let display = RecordingDisplay::new();
    let (scheduler, _events) = spawn(&display, SchedulerConfig::default());

    assert_eq!(scheduler.stop().await.unwrap(), 0);
    assert!(display.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn restart_resets_page_count() {
    let display = RecordingDisplay::new();
    let (scheduler, _events) = spawn(&display, fixed_dwell_config(2.0));

    scheduler.start(single("https://a.test")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(2_500)).await;
    assert_eq!(scheduler.stop().await.unwrap(), 2);

    scheduler.start(single("https://b.test")).await.unwrap();
    let session = scheduler.snapshot().await.unwrap();
    assert_eq!(session.page_view_count, 1);
    assert_eq!(display.shown().last().map(String::as_str), Some("https://b.test"));
}

#[tokio::test(start_paused = true)]
async fn rapid_start_stop_cycles_leave_no_stray_timers() {
    let display = RecordingDisplay::new();
    let (scheduler, _events) = spawn(&display, fixed_dwell_config(1.5));

    for _ in 0..20 {
        scheduler.start(single("https://a.test")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        scheduler.stop().await.unwrap();
    }
    let shows_before = display.shown().len();
    assert_eq!(shows_before, 20);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(display.shown().len(), shows_before);
}

#[tokio::test(start_paused = true)]
async fn selection_covers_all_addresses() {
    let display = RecordingDisplay::new();
    let (scheduler, mut events) = spawn(&display, fixed_dwell_config(1.0));
    let addresses = AddressList::new(vec![
        "https://a.test".into(),
        "https://b.test".into(),
        "https://c.test".into(),
    ]);

    scheduler.start(addresses.clone()).await.unwrap();
    for _ in 0..299 {
        events_until_rotation(&mut events).await;
    }
    scheduler.stop().await.unwrap();

    let shown = display.shown();
    assert_eq!(shown.len(), 300);
    for address in addresses.iter() {
        let hits = shown.iter().filter(|s| s.as_str() == address).count();
        assert!(
            (60..=140).contains(&hits),
            "{} shown {} times out of 300",
            address,
            hits
        );
    }
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_running_session() {
    let display = RecordingDisplay::new();
    let (scheduler, _events) = spawn(&display, SchedulerConfig::default());

    scheduler.start(single("https://a.test")).await.unwrap();
    scheduler.shutdown().await.unwrap();

    assert_eq!(display.calls().last(), Some(&DisplayCall::Clear));
}

#[tokio::test(start_paused = true)]
async fn invalid_config_is_rejected_at_spawn() {
    let result = RotationScheduler::spawn(
        Box::new(RecordingDisplay::new()),
        SchedulerConfig::default().with_dwell_range(8.0, 4.0),
    );
    assert!(matches!(result, Err(Error::Config(_))));
}

#[tokio::test(start_paused = true)]
async fn oversized_dwell_is_rejected_at_spawn() {
    let display = RecordingDisplay::new();
    let result = RotationScheduler::spawn(
        Box::new(display.clone()),
        SchedulerConfig::default().with_dwell_range(1e20, 1e20),
    );

    assert!(matches!(result, Err(Error::Config(_))));
    assert!(display.calls().is_empty());
}
