//! OtaService tick scheduling.

use cellota::app::events::OtaEvent;
use cellota::app::service::OtaService;
use cellota::drivers::led_patterns::Pattern;
use cellota::ota::lifecycle::CycleOutcome;

use super::mock_modem::{
    test_updater, FakeModem, FakeTime, MemoryStore, RecordingIndicator, RecordingSink, RecordingSystem, Reply,
    UP_TO_DATE,
};

type TestService = OtaService<FakeModem, FakeTime, MemoryStore, RecordingIndicator, RecordingSystem>;

fn service() -> TestService {
    OtaService::new(test_updater(
        FakeModem::new(Reply::Body(UP_TO_DATE.into()), Reply::Silent),
        MemoryStore::with_boot("old"),
    ))
}

#[test]
fn start_announces_identity() {
    let mut svc = service();
    let mut sink = RecordingSink::default();
    svc.start(&mut sink);
    assert_eq!(
        sink.events,
        [OtaEvent::Started {
            device_id: "OTA-EFCAFE".into(),
            firmware_version: "1.0.0".into(),
        }]
    );
}

#[test]
fn cycle_runs_every_tenth_tick() {
    let mut svc = service();
    let mut sink = RecordingSink::default();

    for _ in 0..9 {
        assert_eq!(svc.tick(&mut sink), None);
    }
    assert!(svc.updater().channel().link().commands.is_empty());

    assert_eq!(svc.tick(&mut sink), Some(CycleOutcome::NoUpdate));
    assert_eq!(svc.updater().channel().link().count("CHTTPCREATE"), 1);
    assert!(sink.contains(|e| *e == OtaEvent::CycleFinished(CycleOutcome::NoUpdate)));

    for _ in 0..9 {
        assert_eq!(svc.tick(&mut sink), None);
    }
    assert_eq!(svc.tick(&mut sink), Some(CycleOutcome::NoUpdate));
    assert_eq!(svc.tick_count(), 20);
}

#[test]
fn heartbeat_every_tick() {
    let mut svc = service();
    let mut sink = RecordingSink::default();
    for _ in 0..3 {
        svc.tick(&mut sink);
    }
    assert_eq!(svc.updater().indicator().patterns, [Pattern::Heartbeat; 3]);
}

#[test]
fn failing_modem_never_stops_the_loop() {
    let mut modem = FakeModem::new(Reply::Silent, Reply::Silent);
    modem.fail_writes = true;
    let mut svc = OtaService::new(test_updater(modem, MemoryStore::default()));
    let mut sink = RecordingSink::default();
    for _ in 0..30 {
        svc.tick(&mut sink);
    }
    let cycles = sink
        .events
        .iter()
        .filter(|e| matches!(e, OtaEvent::CycleFinished(_)))
        .count();
    assert_eq!(cycles, 3);
}
