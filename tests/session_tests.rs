//! End-to-end session tests over mock devices and recognizers.

use golos::audio::source::MockDeviceFactory;
use golos::session::{Event, EventPoller, SessionConfig, SessionController, StatusStyle};
use golos::stt::recognizer::{MockEngine, ScriptedStep};
use golos::stt::{ModelHandle, ModelStore};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn test_config() -> SessionConfig {
    let mut config = SessionConfig::default();
    // Keep loop turnaround fast so tests finish quickly
    config.poll_timeout = Duration::from_millis(10);
    config
}

fn loaded_store() -> ModelStore {
    let mut store = ModelStore::new();
    store.install(ModelHandle::new("/models/vosk-model-small-ru-0.22"));
    store
}

fn frame() -> Vec<i16> {
    vec![0i16; 128]
}

/// Drain events until `done` says we collected enough, or the deadline hits.
fn collect_events<F>(poller: &EventPoller, timeout: Duration, mut done: F) -> Vec<Event>
where
    F: FnMut(&[Event]) -> bool,
{
    let deadline = Instant::now() + timeout;
    let mut events = Vec::new();
    loop {
        events.extend(poller.poll());
        if done(&events) || Instant::now() >= deadline {
            return events;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
}

fn log_messages(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Log { message } => Some(message.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_end_to_end_transcript_flow() {
    // Five identical partial hypotheses, then the completed utterance.
    let script = vec![
        ScriptedStep::Partial("привет".into()),
        ScriptedStep::Partial("привет".into()),
        ScriptedStep::Partial("привет".into()),
        ScriptedStep::Partial("привет".into()),
        ScriptedStep::Partial("привет".into()),
        ScriptedStep::Final("привет мир".into()),
    ];
    let devices = MockDeviceFactory::new().with_chunks(vec![frame(); 6]);
    let engine = MockEngine::new(script);

    let (mut controller, poller) =
        SessionController::new(Arc::new(devices), Arc::new(engine), test_config());
    controller.start(&loaded_store()).unwrap();

    let events = collect_events(&poller, Duration::from_secs(2), |events| {
        events
            .iter()
            .any(|e| matches!(e, Event::TranscriptAppended { .. }))
    });
    controller.shutdown();

    let transcripts: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            Event::TranscriptAppended { text } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(transcripts, vec!["привет мир"]);

    let logs = log_messages(&events);
    assert!(logs.iter().any(|m| m.contains("recognized: 'привет мир'")));

    // Repeated partials capped at three, each annotated with its ordinal
    let partials: Vec<_> = logs
        .iter()
        .filter(|m| m.contains("partial: 'привет'"))
        .collect();
    assert_eq!(partials.len(), 3);
    assert!(partials[0].contains("(1)"));
    assert!(partials[1].contains("(2)"));
    assert!(partials[2].contains("(3)"));
}

#[test]
fn test_start_emits_lifecycle_events_in_order() {
    let (mut controller, poller) = SessionController::new(
        Arc::new(MockDeviceFactory::new()),
        Arc::new(MockEngine::new(vec![])),
        test_config(),
    );
    controller.start(&loaded_store()).unwrap();
    let events = poller.poll();
    controller.shutdown();

    let status_pos = events
        .iter()
        .position(|e| matches!(e, Event::StatusChanged { style, .. } if *style == StatusStyle::Active))
        .expect("missing status event");
    let log_pos = events
        .iter()
        .position(
            |e| matches!(e, Event::Log { message } if message.contains("recording started")),
        )
        .expect("missing start log");
    let buttons_pos = events
        .iter()
        .position(|e| {
            matches!(
                e,
                Event::ButtonsUpdated {
                    start_enabled: false,
                    stop_enabled: true
                }
            )
        })
        .expect("missing buttons event");

    assert!(status_pos < log_pos);
    assert!(log_pos < buttons_pos);
}

#[test]
fn test_restart_uses_fresh_device_and_recognizer() {
    let devices = MockDeviceFactory::new();
    let engine = MockEngine::new(vec![]);
    let opens = devices.open_count();
    let closes = devices.close_count();
    let creations = engine.create_count();

    let (mut controller, _poller) =
        SessionController::new(Arc::new(devices), Arc::new(engine), test_config());
    let store = loaded_store();

    controller.start(&store).unwrap();
    controller.stop();
    controller.start(&store).unwrap();
    controller.shutdown();

    assert_eq!(opens.load(Ordering::SeqCst), 2);
    assert_eq!(creations.load(Ordering::SeqCst), 2);

    // First session's loops were detached on restart; give them a moment
    let deadline = Instant::now() + Duration::from_secs(1);
    while closes.load(Ordering::SeqCst) < 2 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(closes.load(Ordering::SeqCst), 2, "each session closes its device");
}

#[test]
fn test_session_recovers_after_device_failure() {
    // A controller whose factory always fails to open
    let (mut controller, poller) = SessionController::new(
        Arc::new(MockDeviceFactory::new().with_open_failure("device unplugged")),
        Arc::new(MockEngine::new(vec![])),
        test_config(),
    );
    let store = loaded_store();

    controller.start(&store).unwrap();
    let events = collect_events(&poller, Duration::from_secs(1), |events| {
        events
            .iter()
            .any(|e| matches!(e, Event::ErrorRaised { .. }))
    });
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::StatusChanged { style, .. } if *style == StatusStyle::Error)));
    assert!(!controller.is_recording());

    // The controller is reusable after the failure
    controller.start(&store).unwrap();
    assert!(controller.is_recording());
    controller.shutdown();
}

#[test]
fn test_shutdown_finishes_within_deadline() {
    let (mut controller, _poller) = SessionController::new(
        Arc::new(MockDeviceFactory::new()),
        Arc::new(MockEngine::new(vec![ScriptedStep::Partial("эхо".into())])),
        test_config(),
    );
    controller.start(&loaded_store()).unwrap();
    std::thread::sleep(Duration::from_millis(50));

    let start = Instant::now();
    controller.shutdown();
    assert!(
        start.elapsed() < Duration::from_secs(1),
        "loops must observe their stop signals promptly"
    );
}

#[test]
fn test_empty_final_produces_no_transcript() {
    let devices = MockDeviceFactory::new().with_chunks(vec![frame(); 2]);
    let engine = MockEngine::new(vec![
        ScriptedStep::Partial("шум".into()),
        ScriptedStep::EmptyFinal,
    ]);

    let (mut controller, poller) =
        SessionController::new(Arc::new(devices), Arc::new(engine), test_config());
    controller.start(&loaded_store()).unwrap();

    let events = collect_events(&poller, Duration::from_secs(1), |events| {
        log_messages(events)
            .iter()
            .any(|m| m.contains("empty recognition result"))
    });
    controller.shutdown();

    assert!(!events
        .iter()
        .any(|e| matches!(e, Event::TranscriptAppended { .. })));
    assert!(log_messages(&events)
        .iter()
        .any(|m| m.contains("empty recognition result")));
}

#[test]
fn test_stop_after_stop_stays_idle_and_silent() {
    let (mut controller, poller) = SessionController::new(
        Arc::new(MockDeviceFactory::new()),
        Arc::new(MockEngine::new(vec![])),
        test_config(),
    );
    controller.start(&loaded_store()).unwrap();
    controller.stop();

    // Joining the loops guarantees nothing more will be emitted
    controller.shutdown();
    let _ = poller.poll();

    controller.stop();
    assert!(poller.poll().is_empty());
}
