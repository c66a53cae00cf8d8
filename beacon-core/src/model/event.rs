use crate::model::ids::{RoomId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound signaling frame, decoded by the transport adapter.
///
/// SDP blobs, ICE candidates and chat text travel as opaque JSON values;
/// the relay never inspects them. `to` is advisory only: relayed events are
/// room broadcasts and receivers filter on their side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEvent {
    #[serde(rename_all = "camelCase")]
    Join { room_id: RoomId, user_id: UserId },

    #[serde(rename_all = "camelCase")]
    Leave { room_id: RoomId, user_id: UserId },

    #[serde(rename_all = "camelCase")]
    Offer {
        offer: Value,
        to: Option<UserId>,
        from: Option<UserId>,
        room_id: RoomId,
    },

    #[serde(rename_all = "camelCase")]
    Answer {
        answer: Value,
        to: Option<UserId>,
        from: Option<UserId>,
        room_id: RoomId,
    },

    #[serde(rename_all = "camelCase")]
    Candidate {
        candidate: Value,
        to: Option<UserId>,
        from: Option<UserId>,
        room_id: RoomId,
    },

    #[serde(rename_all = "camelCase")]
    Message {
        message: Value,
        to: Option<UserId>,
        from: Option<UserId>,
        room_id: RoomId,
    },
}

impl ClientEvent {
    /// Room the event refers to. Every event kind carries one.
    pub fn room_id(&self) -> &RoomId {
        match self {
            ClientEvent::Join { room_id, .. }
            | ClientEvent::Leave { room_id, .. }
            | ClientEvent::Offer { room_id, .. }
            | ClientEvent::Answer { room_id, .. }
            | ClientEvent::Candidate { room_id, .. }
            | ClientEvent::Message { room_id, .. } => room_id,
        }
    }

    /// Turn a relayable event into its outbound form, stamping `from` with
    /// the sender's registered identity. `None` for join/leave, which have
    /// dedicated outbound notifications instead.
    pub fn into_relay(self, from: UserId) -> Option<ServerEvent> {
        match self {
            ClientEvent::Offer {
                offer, to, room_id, ..
            } => Some(ServerEvent::Offer {
                offer,
                to,
                from,
                room_id,
            }),
            ClientEvent::Answer {
                answer, to, room_id, ..
            } => Some(ServerEvent::Answer {
                answer,
                to,
                from,
                room_id,
            }),
            ClientEvent::Candidate {
                candidate,
                to,
                room_id,
                ..
            } => Some(ServerEvent::Candidate {
                candidate,
                to,
                from,
                room_id,
            }),
            ClientEvent::Message {
                message, to, room_id, ..
            } => Some(ServerEvent::Message {
                message,
                to,
                from,
                room_id,
            }),
            ClientEvent::Join { .. } | ClientEvent::Leave { .. } => None,
        }
    }
}

/// Outbound signaling frame, encoded by the transport adapter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Acknowledgement to the joining connection itself.
    #[serde(rename_all = "camelCase")]
    Joined { room_id: RoomId },

    /// Broadcast to the other members of the joined room.
    #[serde(rename_all = "camelCase")]
    UserJoined { user_id: UserId },

    /// Broadcast to the remaining members on leave or disconnect.
    #[serde(rename_all = "camelCase")]
    UserLeft { user_id: UserId },

    #[serde(rename_all = "camelCase")]
    Offer {
        offer: Value,
        to: Option<UserId>,
        from: UserId,
        room_id: RoomId,
    },

    #[serde(rename_all = "camelCase")]
    Answer {
        answer: Value,
        to: Option<UserId>,
        from: UserId,
        room_id: RoomId,
    },

    #[serde(rename_all = "camelCase")]
    Candidate {
        candidate: Value,
        to: Option<UserId>,
        from: UserId,
        room_id: RoomId,
    },

    #[serde(rename_all = "camelCase")]
    Message {
        message: Value,
        to: Option<UserId>,
        from: UserId,
        room_id: RoomId,
    },
}
