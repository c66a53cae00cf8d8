use beacon_core::{ClientEvent, RoomId, ServerEvent, UserId};
use serde_json::json;

use crate::{create_test_relay, init_tracing, join};

#[test]
fn offer_is_relayed_to_the_other_member_only() {
    init_tracing();
    let (router, sink) = create_test_relay();

    let a = join(&router, "r1", "u1");
    let b = join(&router, "r1", "u2");
    sink.clear();

    router.handle_event(
        a,
        ClientEvent::Offer {
            offer: json!("sdp1"),
            to: Some(UserId::from("u2")),
            from: Some(UserId::from("u1")),
            room_id: RoomId::from("r1"),
        },
    );

    let received = sink.events_for(b);
    assert_eq!(
        received,
        vec![ServerEvent::Offer {
            offer: json!("sdp1"),
            to: Some(UserId::from("u2")),
            from: UserId::from("u1"),
            room_id: RoomId::from("r1"),
        }]
    );

    // The sender gets nothing back.
    assert!(sink.events_for(a).is_empty());
}

#[test]
fn relayed_from_is_the_registered_identity() {
    init_tracing();
    let (router, sink) = create_test_relay();

    let a = join(&router, "r1", "u1");
    let b = join(&router, "r1", "u2");
    sink.clear();

    // The client lies about who it is; the relay stamps the truth.
    router.handle_event(
        a,
        ClientEvent::Candidate {
            candidate: json!({"candidate": "candidate:1 1 udp ..."}),
            to: None,
            from: Some(UserId::from("someone-else")),
            room_id: RoomId::from("r1"),
        },
    );

    match sink.events_for(b).as_slice() {
        [ServerEvent::Candidate { from, .. }] => assert_eq!(*from, UserId::from("u1")),
        other => panic!("expected one candidate, got {:?}", other),
    }
}

#[test]
fn answer_relay_is_verbatim() {
    init_tracing();
    let (router, sink) = create_test_relay();

    let a = join(&router, "r1", "u1");
    let b = join(&router, "r1", "u2");
    sink.clear();

    let sdp = json!({"type": "answer", "sdp": "v=0\r\no=- 46117 2 IN IP4 127.0.0.1..."});
    router.handle_event(
        b,
        ClientEvent::Answer {
            answer: sdp.clone(),
            to: Some(UserId::from("u1")),
            from: Some(UserId::from("u2")),
            room_id: RoomId::from("r1"),
        },
    );

    match sink.events_for(a).as_slice() {
        [ServerEvent::Answer { answer, .. }] => assert_eq!(*answer, sdp),
        other => panic!("expected one answer, got {:?}", other),
    }
}
