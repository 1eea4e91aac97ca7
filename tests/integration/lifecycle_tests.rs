//! Check and fetch against the scripted modem: what counts as "no update",
//! what the server is sent, and when apply must never run.

use cellota::app::events::OtaEvent;
use cellota::app::ports::Slot;
use cellota::drivers::led_patterns::Pattern;
use cellota::error::OtaError;
use cellota::modem::codec;
use cellota::ota::image;
use cellota::ota::lifecycle::CycleOutcome;

use super::mock_modem::{
    fetch_body, test_updater, FakeModem, MemoryStore, RecordingSink, Reply, StoreOp, UPDATE_2_0_0, UP_TO_DATE,
};

fn check_with(reply: Reply) -> (Option<cellota::ota::messages::UpdateCheckResponse>, RecordingSink) {
    let mut updater = test_updater(FakeModem::new(reply, Reply::Silent), MemoryStore::with_boot("old"));
    let mut sink = RecordingSink::default();
    (updater.check_for_update(&mut sink), sink)
}

// ── check_for_update ──────────────────────────────────────────

#[test]
fn check_request_identifies_device_and_version() {
    let mut updater = test_updater(FakeModem::new(Reply::Body(UP_TO_DATE.into()), Reply::Silent), MemoryStore::default());
    let _ = updater.check_for_update(&mut RecordingSink::default());

    let posted: serde_json::Value = serde_json::from_str(&updater.channel().link().posted[0]).unwrap();
    assert_eq!(posted["device_id"], "OTA-EFCAFE");
    assert_eq!(posted["current_version"], "1.0.0");
    assert_eq!(posted["action"], "check_update");
}

#[test]
fn available_update_is_returned() {
    let (resp, sink) = check_with(Reply::Body(UPDATE_2_0_0.into()));
    assert_eq!(resp.unwrap().new_version.as_deref(), Some("2.0.0"));
    assert!(sink.contains(|e| matches!(e, OtaEvent::UpdateAvailable { .. })));
}

#[test]
fn nmic_chunked_body_is_decoded() {
    let (resp, _) = check_with(Reply::Nmic(UPDATE_2_0_0.into()));
    assert!(resp.unwrap().update_available);
}

#[test]
fn up_to_date_is_none_with_reason() {
    let (resp, sink) = check_with(Reply::Body(UP_TO_DATE.into()));
    assert!(resp.is_none());
    assert!(sink.contains(|e| *e == OtaEvent::UpToDate { message: Some("up to date".into()) }));
}

#[test]
fn binary_response_is_none() {
    let (resp, sink) = check_with(Reply::Raw(vec![0x80, 0x81, 0xFF]));
    assert!(resp.is_none());
    assert!(sink.contains(|e| *e == OtaEvent::CheckFailed(OtaError::Decode)));
}

#[test]
fn empty_response_is_none() {
    let (resp, sink) = check_with(Reply::Silent);
    assert!(resp.is_none());
    assert!(sink.contains(|e| *e == OtaEvent::CheckFailed(OtaError::Timeout)));
}

#[test]
fn text_without_json_is_none() {
    let (resp, sink) = check_with(Reply::Body(String::from("+CHTTPERR: 0,-2")));
    assert!(resp.is_none());
    assert!(sink.contains(|e| *e == OtaEvent::CheckFailed(OtaError::Schema)));
}

#[test]
fn json_of_wrong_shape_is_none() {
    let (resp, _) = check_with(Reply::Body(String::from(r#"{"status":"maintenance"}"#)));
    assert!(resp.is_none());
}

#[test]
fn error_reply_wrapping_an_offer_is_none() {
    let body = r#"{"error":"device unknown","last_known":{"update_available":true,"new_version":"9.9.9"}}"#;
    let (resp, sink) = check_with(Reply::Body(String::from(body)));
    assert!(resp.is_none());
    assert!(sink.contains(|e| *e == OtaEvent::CheckFailed(OtaError::Schema)));
    assert!(!sink.contains(|e| matches!(e, OtaEvent::UpdateAvailable { .. })));
}

#[test]
fn truncated_json_is_none() {
    let (resp, _) = check_with(Reply::Body(String::from(r#"{"update_available": tr"#)));
    assert!(resp.is_none());
}

// ── fetch_update ──────────────────────────────────────────────

#[test]
fn fetch_decodes_program_and_sends_download_action() {
    let mut updater = test_updater(
        FakeModem::new(Reply::Silent, Reply::Body(fetch_body("print(1)"))),
        MemoryStore::default(),
    );
    let mut sink = RecordingSink::default();
    assert_eq!(updater.fetch_update(&mut sink).as_deref(), Some("print(1)"));
    let posted = &updater.channel().link().posted[0];
    assert!(posted.contains(r#""action":"download_update""#));
    assert!(sink.contains(|e| *e == OtaEvent::Downloaded { bytes: 8 }));
}

#[test]
fn fetch_uses_longer_read_window() {
    let mut updater = test_updater(
        FakeModem::new(Reply::Silent, Reply::Body(fetch_body("x"))),
        MemoryStore::default(),
    );
    let before = updater.channel().timer().slept_ms;
    let _ = updater.fetch_update(&mut RecordingSink::default());
    let fetch_time = updater.channel().timer().slept_ms - before;

    let mut checker = test_updater(FakeModem::new(Reply::Body(UP_TO_DATE.into()), Reply::Silent), MemoryStore::default());
    let _ = checker.check_for_update(&mut RecordingSink::default());
    assert!(fetch_time > checker.channel().timer().slept_ms);
}

#[test]
fn fetch_with_matching_checksum() {
    let digest = hex::encode(image::digest(b"print(1)"));
    let body = format!(r#"{{"success":true,"version":"2.0.0","new_code":"{}","sha256":"{}"}}"#, codec::encode("print(1)"), digest);
    let mut updater = test_updater(FakeModem::new(Reply::Silent, Reply::Body(body)), MemoryStore::default());
    assert_eq!(updater.fetch_update(&mut RecordingSink::default()).as_deref(), Some("print(1)"));
}

#[test]
fn fetch_with_wrong_checksum_fails() {
    let body = format!(r#"{{"new_code":"{}","sha256":"{}"}}"#, codec::encode("print(1)"), "00".repeat(32));
    let mut updater = test_updater(FakeModem::new(Reply::Silent, Reply::Body(body)), MemoryStore::default());
    let mut sink = RecordingSink::default();
    assert!(updater.fetch_update(&mut sink).is_none());
    assert!(sink.contains(|e| *e == OtaEvent::FetchFailed(OtaError::Decode)));
}

#[test]
fn server_refusal_is_schema_failure() {
    let body = String::from(r#"{"success":false,"error":"No update available"}"#);
    let mut updater = test_updater(FakeModem::new(Reply::Silent, Reply::Body(body)), MemoryStore::default());
    let mut sink = RecordingSink::default();
    assert!(updater.fetch_update(&mut sink).is_none());
    assert!(sink.contains(|e| *e == OtaEvent::FetchFailed(OtaError::Schema)));
}

#[test]
fn non_hex_new_code_fails() {
    let body = String::from(r#"{"new_code":"print(1)"}"#);
    let mut updater = test_updater(FakeModem::new(Reply::Silent, Reply::Body(body)), MemoryStore::default());
    assert!(updater.fetch_update(&mut RecordingSink::default()).is_none());
}

#[test]
fn empty_program_fails() {
    let body = String::from(r#"{"new_code":""}"#);
    let mut updater = test_updater(FakeModem::new(Reply::Silent, Reply::Body(body)), MemoryStore::default());
    assert!(updater.fetch_update(&mut RecordingSink::default()).is_none());
}

// ── perform_ota_update ────────────────────────────────────────

#[test]
fn failed_fetch_never_applies() {
    for fetch_reply in [
        Reply::Silent,
        Reply::Raw(vec![0xFF]),
        Reply::Body(String::from("{}")),
        Reply::Body(String::from(r#"{"success":false}"#)),
    ] {
        let mut updater = test_updater(
            FakeModem::new(Reply::Body(UPDATE_2_0_0.into()), fetch_reply),
            MemoryStore::with_boot("old"),
        );
        let mut sink = RecordingSink::default();
        let outcome = updater.perform_ota_update(&mut sink);

        assert!(matches!(outcome, CycleOutcome::Failed(_)));
        assert!(updater.store().ops().iter().all(|op| !matches!(op, StoreOp::Write(_) | StoreOp::Promote)));
        assert_eq!(updater.store().text(Slot::Boot).as_deref(), Some("old"));
        assert_eq!(updater.system().restarts, 0);
        assert!(!updater.indicator().shown(Pattern::Error));
    }
}

#[test]
fn check_failure_reports_no_update_and_skips_fetch() {
    let mut updater = test_updater(
        FakeModem::new(Reply::Raw(vec![0xFF]), Reply::Body(fetch_body("x"))),
        MemoryStore::with_boot("old"),
    );
    let outcome = updater.perform_ota_update(&mut RecordingSink::default());
    assert_eq!(outcome, CycleOutcome::NoUpdate);
    assert_eq!(updater.channel().link().count("CHTTPCREATE"), 1);
}
