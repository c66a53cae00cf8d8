use beacon_core::{ClientEvent, RoomId, ServerEvent, UserId};
use serde_json::json;

use crate::{create_test_relay, init_tracing, join};

#[test]
fn chat_message_reaches_everyone_but_the_sender() {
    init_tracing();
    let (router, sink) = create_test_relay();

    let a = join(&router, "r2", "u1");
    let b = join(&router, "r2", "u2");
    let c = join(&router, "r2", "u3");
    sink.clear();

    router.handle_event(
        b,
        ClientEvent::Message {
            message: json!("hi"),
            to: None,
            from: Some(UserId::from("u2")),
            room_id: RoomId::from("r2"),
        },
    );

    for receiver in [a, c] {
        match sink.events_for(receiver).as_slice() {
            [ServerEvent::Message { message, from, .. }] => {
                assert_eq!(*message, json!("hi"));
                assert_eq!(*from, UserId::from("u2"));
            }
            other => panic!("expected one message, got {:?}", other),
        }
    }
    assert!(sink.events_for(b).is_empty());
}

#[test]
fn broadcast_ignores_the_advisory_to_field() {
    init_tracing();
    let (router, sink) = create_test_relay();

    let a = join(&router, "r2", "u1");
    let b = join(&router, "r2", "u2");
    let c = join(&router, "r2", "u3");
    sink.clear();

    // Addressed to u2 only, but routing is room-broadcast: u3 gets it too
    // and is expected to discard it client-side.
    router.handle_event(
        a,
        ClientEvent::Offer {
            offer: json!("sdp"),
            to: Some(UserId::from("u2")),
            from: None,
            room_id: RoomId::from("r2"),
        },
    );

    assert_eq!(sink.events_for(b).len(), 1);
    assert_eq!(sink.events_for(c).len(), 1);
    assert!(sink.events_for(a).is_empty());
}

#[test]
fn relay_does_not_reach_other_rooms() {
    init_tracing();
    let (router, sink) = create_test_relay();

    let a = join(&router, "r1", "u1");
    let _b = join(&router, "r1", "u2");
    let outsider = join(&router, "elsewhere", "u9");
    sink.clear();

    router.handle_event(
        a,
        ClientEvent::Message {
            message: json!("room-local"),
            to: None,
            from: None,
            room_id: RoomId::from("r1"),
        },
    );

    assert!(sink.events_for(outsider).is_empty());
}
