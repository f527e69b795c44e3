use serde_json::Value;

use crate::catalog::Phase;
use crate::transcript::TranscriptKind;

use super::Fixture;

#[test]
fn transcript_records_meta_first_and_every_packet() {
    let mut f = Fixture::new();
    f.probe.lock().expect("probe lock").fail_connects = 1;
    f.world.enable_transcript();
    f.world.start(&mut f.sched);
    f.sched.run(&mut f.world);

    let t = f.world.take_transcript().expect("transcript enabled");
    assert!(matches!(t.events[0].kind, TranscriptKind::Meta { .. }));
    assert_eq!(t.events[0].t_ns, 0);

    let sent: Vec<&str> = t
        .events
        .iter()
        .filter_map(|e| match &e.kind {
            TranscriptKind::PacketSent { bytes_hex, .. } => Some(bytes_hex.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(sent.len(), 7);
    assert_eq!(sent[0], "24 24 24");
    assert!(sent[2].starts_with("b5 62 06 00 14 00"));
    assert!(sent[2].ends_with("93 90"));
    assert!(sent[6].ends_with("1d ab"));

    let failed = t
        .events
        .iter()
        .filter(|e| matches!(e.kind, TranscriptKind::ConnectFailed { retry_in_ms: Some(5_000), .. }))
        .count();
    assert_eq!(failed, 1);

    let entered: Vec<Phase> = t
        .events
        .iter()
        .filter_map(|e| match e.kind {
            TranscriptKind::PhaseEnter { phase, .. } => Some(phase),
            _ => None,
        })
        .collect();
    assert_eq!(entered, Phase::ALL[1..].to_vec());

    let last = t.events.last().expect("events");
    assert!(matches!(last.kind, TranscriptKind::Done { session: 1 }));
    assert!(t.events.windows(2).all(|w| w[0].t_ns <= w[1].t_ns));
}

#[test]
fn transcript_serializes_with_kind_tags() {
    let mut f = Fixture::new();
    f.world.enable_transcript();
    f.world.start(&mut f.sched);
    f.sched.run(&mut f.world);

    let json = f
        .world
        .take_transcript()
        .expect("transcript")
        .to_json_pretty()
        .expect("serialize");
    let v: Value = serde_json::from_str(&json).expect("parse");
    let arr = v.as_array().expect("array");
    assert_eq!(arr[0].get("kind").and_then(|k| k.as_str()), Some("meta"));
    assert!(arr.iter().any(|e| {
        e.get("kind").and_then(|k| k.as_str()) == Some("phase_enter")
            && e.get("phase").and_then(|p| p.as_str()) == Some("receiver_save_config")
    }));
    assert!(arr.iter().any(|e| e.get("kind").and_then(|k| k.as_str()) == Some("closed")));
}

#[test]
fn transcript_is_off_by_default() {
    let mut f = Fixture::new();
    f.world.start(&mut f.sched);
    f.sched.run(&mut f.world);
    assert!(f.world.take_transcript().is_none());
}
