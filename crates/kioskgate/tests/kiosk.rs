//! End-to-end tests: simulated reader → user manager → scripted directory →
//! router → recording display.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use kioskgate::prelude::*;
use kioskgate_directory::LookupCompleter;
use kioskgate_session::VALIDATION_CEILING;

// =========================================================================
// Test helpers
// =========================================================================

enum Answer {
    Reply(LookupCompletion),
    Hang,
}

#[derive(Default)]
struct DirectoryInner {
    answers: Mutex<HashMap<String, Answer>>,
    held: Mutex<HashMap<String, LookupCompleter>>,
    lookups: AtomicUsize,
}

/// A directory answering from a per-tag script. Unknown tags match nobody.
#[derive(Clone, Default)]
struct ScriptedDirectory {
    inner: Arc<DirectoryInner>,
}

impl ScriptedDirectory {
    fn answer(&self, tag: &str, completion: LookupCompletion) -> &Self {
        self.inner
            .answers
            .lock()
            .unwrap()
            .insert(tag.into(), Answer::Reply(completion));
        self
    }

    fn hang(&self, tag: &str) -> &Self {
        self.inner
            .answers
            .lock()
            .unwrap()
            .insert(tag.into(), Answer::Hang);
        self
    }

    /// Completes a lookup previously left hanging.
    fn release(&self, tag: &str, completion: LookupCompletion) {
        let completer = self.inner.held.lock().unwrap().remove(tag);
        completer.expect("no hanging lookup for tag").complete(completion);
    }

    fn lookups(&self) -> usize {
        self.inner.lookups.load(Ordering::SeqCst)
    }
}

impl Directory for ScriptedDirectory {
    fn lookup(&self, rfid_tag: &str) -> PendingLookup {
        self.inner.lookups.fetch_add(1, Ordering::SeqCst);
        match self.inner.answers.lock().unwrap().get(rfid_tag) {
            Some(Answer::Reply(completion)) => PendingLookup::ready(completion.clone()),
            Some(Answer::Hang) => {
                let (completer, pending) = PendingLookup::channel();
                self.inner
                    .held
                    .lock()
                    .unwrap()
                    .insert(rfid_tag.into(), completer);
                pending
            }
            None => PendingLookup::ready(found(vec![])),
        }
    }
}

#[derive(Clone, Default)]
struct RecordingDisplay {
    calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingDisplay {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl KioskDisplay for RecordingDisplay {
    fn set_current_screen(&self, screen: ScreenSelector) {
        self.calls.lock().unwrap().push(format!("screen:{screen}"));
    }

    fn set_screen_tag(&self, tag: &str) {
        self.calls.lock().unwrap().push(format!("tag:{tag}"));
    }
}

fn employee(id: i64, tag: &str, roles: &[u32]) -> Employee {
    Employee {
        id,
        rfid_tag: tag.into(),
        employee_type: roles.iter().copied().collect(),
        status: Default::default(),
        first_name: None,
        last_name: None,
        email: None,
        phone: None,
    }
}

fn found(employees: Vec<Employee>) -> LookupCompletion {
    LookupCompletion::Success(DirectoryResponse {
        count: employees.len() as u64,
        results: employees,
    })
}

struct Harness {
    reader: SimulatedReader,
    display: RecordingDisplay,
    directory: ScriptedDirectory,
    handle: KioskHandle,
}

impl Harness {
    async fn start(directory: ScriptedDirectory) -> Self {
        Self::start_with(KioskBuilder::new(), directory).await
    }

    async fn start_with(builder: KioskBuilder, directory: ScriptedDirectory) -> Self {
        let reader = SimulatedReader::new();
        let display = RecordingDisplay::default();
        let handle = builder
            .build(reader.clone(), directory.clone(), display.clone())
            .start()
            .await
            .expect("kiosk should start");
        // The attach event is the first one the manager sees.
        handle.wait_for(|s| s.events >= 1).await.unwrap();
        Self {
            reader,
            display,
            directory,
            handle,
        }
    }

    async fn events(&self, count: u64) -> KioskStatus {
        self.handle.wait_for(|s| s.events >= count).await.unwrap()
    }

    async fn resolved(&self, count: u64) -> KioskStatus {
        self.handle.wait_for(|s| s.resolved >= count).await.unwrap()
    }
}

// =========================================================================
// Startup
// =========================================================================

#[tokio::test]
async fn test_start_switches_antenna_on() {
    let kiosk = Harness::start(ScriptedDirectory::default()).await;

    assert!(kiosk.reader.is_attached());
    assert!(kiosk.reader.antenna_on());
    assert_eq!(kiosk.handle.status().session.phase(), Phase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_start_reader_never_attaches_is_hardware_fatal() {
    let result = KioskBuilder::new()
        .attach_timeout(Duration::from_millis(500))
        .build(
            SimulatedReader::never_attaches(),
            ScriptedDirectory::default(),
            RecordingDisplay::default(),
        )
        .start()
        .await;

    let error = result.err().expect("startup should fail");
    assert!(matches!(
        error,
        KioskError::HardwareFatal(ReaderError::AttachTimeout(_))
    ));
    assert_eq!(error.exit_code(), 2);
}

#[tokio::test]
async fn test_start_reader_open_failure_is_hardware_fatal() {
    let result = KioskBuilder::new()
        .build(
            SimulatedReader::failing_open(),
            ScriptedDirectory::default(),
            RecordingDisplay::default(),
        )
        .start()
        .await;

    let error = result.err().expect("startup should fail");
    assert!(matches!(
        error,
        KioskError::HardwareFatal(ReaderError::OpenFailed(_))
    ));
    assert_eq!(error.exit_code(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_settle_then_shutdown_never_loses_a_tapped_card() {
    for _ in 0..50 {
        let directory = ScriptedDirectory::default();
        directory.answer("023af76c", found(vec![employee(12, "023af76c", &[1])]));
        let kiosk = Harness::start(directory).await;

        // Tap from a plain thread, like the stdin feeder.
        let feeder = kiosk.reader.clone();
        std::thread::spawn(move || {
            feeder.present("023af76c");
            feeder.remove("023af76c");
        })
        .join()
        .unwrap();

        let status = kiosk
            .handle
            .settle(kiosk.reader.delivered())
            .await
            .expect("manager still running");
        assert_eq!(status.resolved, 1);
        assert_eq!(status.session.phase(), Phase::Authenticated);

        kiosk.handle.shutdown().await;
        assert_eq!(kiosk.directory.lookups(), 1);
    }
}

#[tokio::test]
async fn test_shutdown_closes_reader() {
    let kiosk = Harness::start(ScriptedDirectory::default()).await;
    let reader = kiosk.reader.clone();

    kiosk.handle.shutdown().await;

    assert!(!reader.is_attached());
    assert!(!reader.present("023af76c"));
}

// =========================================================================
// Card scenarios
// =========================================================================

#[tokio::test]
async fn test_known_card_routes_to_screen0_and_shows_tag() {
    let directory = ScriptedDirectory::default();
    directory.answer("023af76c", found(vec![employee(12, "023af76c", &[1])]));
    let kiosk = Harness::start(directory).await;

    kiosk.reader.present("023af76c");
    let status = kiosk.resolved(1).await;

    assert_eq!(status.session.phase(), Phase::Authenticated);
    assert_eq!(status.session.current_tag.as_deref(), Some("023af76c"));
    assert_eq!(
        status.session.current_employee.map(|e| e.rfid_tag),
        Some("023af76c".to_string())
    );
    assert_eq!(kiosk.display.calls(), ["screen:screen0", "tag:023af76c"]);
    assert!(kiosk.reader.led_on());
}

#[tokio::test]
async fn test_unknown_card_stays_idle_without_screen_change() {
    let kiosk = Harness::start(ScriptedDirectory::default()).await;
    // Prove the antenna is re-asserted, not just left on.
    kiosk.reader.set_antenna_on(false).unwrap();

    kiosk.reader.present("badcard");
    let status = kiosk.resolved(1).await;

    assert_eq!(
        status.last_outcome,
        Some(ValidationOutcome::Invalid(Rejection::NoMatch))
    );
    assert_eq!(status.session.phase(), Phase::Idle);
    assert!(kiosk.display.calls().is_empty());
    assert!(kiosk.reader.antenna_on());
}

#[tokio::test]
async fn test_unreachable_directory_is_error_and_led_tracks_presence() {
    let directory = ScriptedDirectory::default();
    directory.answer(
        "023af76c",
        LookupCompletion::TransportError("connection refused".into()),
    );
    let kiosk = Harness::start(directory).await;

    kiosk.reader.present("023af76c");
    let status = kiosk.resolved(1).await;

    assert_eq!(
        status.last_outcome,
        Some(ValidationOutcome::Error(ValidationError::Transport(
            "connection refused".into()
        )))
    );
    assert_eq!(status.session.phase(), Phase::Idle);
    assert!(kiosk.reader.antenna_on());
    assert!(kiosk.reader.led_on(), "card is still in the field");
    assert!(kiosk.display.calls().is_empty());

    kiosk.reader.remove("023af76c");
    kiosk.events(3).await;

    assert!(!kiosk.reader.led_on());
}

#[tokio::test]
async fn test_multiple_roles_apply_rules_in_order_last_wins() {
    let directory = ScriptedDirectory::default();
    directory.answer("023af76c", found(vec![employee(12, "023af76c", &[1, 3])]));
    let kiosk = Harness::start(directory).await;

    kiosk.reader.present("023af76c");
    kiosk.resolved(1).await;

    assert_eq!(
        kiosk.display.calls(),
        ["screen:screen0", "screen:screen2", "tag:023af76c"]
    );
}

#[tokio::test]
async fn test_custom_routes_replace_defaults() {
    let directory = ScriptedDirectory::default();
    directory.answer("023af76c", found(vec![employee(12, "023af76c", &[3])]));
    let builder =
        KioskBuilder::new().routes(vec![RouteRule::new(3, ScreenSelector::Screen1)]);
    let kiosk = Harness::start_with(builder, directory).await;

    kiosk.reader.present("023af76c");
    kiosk.resolved(1).await;

    assert_eq!(kiosk.display.calls(), ["screen:screen1", "tag:023af76c"]);
}

#[tokio::test]
async fn test_ambiguous_card_is_rejected() {
    let directory = ScriptedDirectory::default();
    directory.answer(
        "023af76c",
        found(vec![
            employee(12, "023af76c", &[1]),
            employee(13, "023af76c", &[2]),
        ]),
    );
    let kiosk = Harness::start(directory).await;

    kiosk.reader.present("023af76c");
    let status = kiosk.resolved(1).await;

    assert_eq!(
        status.last_outcome,
        Some(ValidationOutcome::Invalid(Rejection::Ambiguous { count: 2 }))
    );
    assert!(kiosk.display.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_silent_directory_times_out_and_rearms_antenna() {
    let directory = ScriptedDirectory::default();
    directory.hang("023af76c");
    let kiosk = Harness::start(directory).await;
    kiosk.reader.set_antenna_on(false).unwrap();

    kiosk.reader.present("023af76c");
    let status = kiosk.resolved(1).await;

    assert_eq!(
        status.last_outcome,
        Some(ValidationOutcome::Error(ValidationError::Timeout(
            VALIDATION_CEILING
        )))
    );
    assert_eq!(status.session.phase(), Phase::Idle);
    assert!(!status.session.in_flight);
    assert!(kiosk.reader.antenna_on());
}

// =========================================================================
// Gating
// =========================================================================

#[tokio::test]
async fn test_card_during_validation_is_dropped() {
    let directory = ScriptedDirectory::default();
    directory.hang("023af76c");
    directory.answer("ffff0000", found(vec![employee(13, "ffff0000", &[2])]));
    let kiosk = Harness::start(directory).await;

    kiosk.reader.present("023af76c");
    kiosk.reader.present("ffff0000");
    let status = kiosk.events(3).await;

    assert_eq!(status.session.phase(), Phase::Validating);
    assert_eq!(kiosk.directory.lookups(), 1);

    kiosk
        .directory
        .release("023af76c", found(vec![employee(12, "023af76c", &[1])]));
    let status = kiosk.resolved(1).await;

    assert_eq!(status.session.current_tag.as_deref(), Some("023af76c"));
    assert_eq!(kiosk.directory.lookups(), 1);
    assert_eq!(kiosk.display.calls(), ["screen:screen0", "tag:023af76c"]);
}

#[tokio::test]
async fn test_same_card_again_is_not_revalidated() {
    let directory = ScriptedDirectory::default();
    directory.answer("023af76c", found(vec![employee(12, "023af76c", &[1])]));
    let kiosk = Harness::start(directory).await;

    kiosk.reader.present("023af76c");
    kiosk.resolved(1).await;
    kiosk.reader.remove("023af76c");
    kiosk.reader.present("023af76c");
    let status = kiosk.events(4).await;

    assert_eq!(kiosk.directory.lookups(), 1);
    assert_eq!(status.resolved, 1);
    assert_eq!(status.session.phase(), Phase::Authenticated);
    assert_eq!(kiosk.display.calls(), ["screen:screen0", "tag:023af76c"]);
}

#[tokio::test]
async fn test_new_card_replaces_employee_and_invalid_card_logs_off() {
    let directory = ScriptedDirectory::default();
    directory
        .answer("023af76c", found(vec![employee(12, "023af76c", &[1])]))
        .answer("ffff0000", found(vec![employee(13, "ffff0000", &[2])]));
    let kiosk = Harness::start(directory).await;

    kiosk.reader.present("023af76c");
    kiosk.resolved(1).await;
    kiosk.reader.present("ffff0000");
    let status = kiosk.resolved(2).await;

    assert_eq!(status.session.current_employee.map(|e| e.id), Some(13));
    assert_eq!(
        kiosk.display.calls(),
        [
            "screen:screen0",
            "tag:023af76c",
            "screen:screen1",
            "tag:ffff0000"
        ]
    );

    kiosk.reader.present("badcard");
    let status = kiosk.resolved(3).await;

    assert_eq!(status.session.phase(), Phase::Idle);
    assert!(status.session.current_employee.is_none());
}

#[tokio::test]
async fn test_reader_noise_does_not_touch_session() {
    let kiosk = Harness::start(ScriptedDirectory::default()).await;

    kiosk.reader.emit(ReaderEvent::OutputChanged {
        index: 0,
        state: true,
    });
    kiosk.reader.emit(ReaderEvent::Error {
        code: 7,
        message: "antenna fault".into(),
    });
    kiosk.reader.remove("023af76c");
    let status = kiosk.events(4).await;

    assert_eq!(status.session.phase(), Phase::Idle);
    assert_eq!(status.resolved, 0);
    assert_eq!(kiosk.directory.lookups(), 0);
}
