// The message value handed to every subscriber, plus the JSON shape used
// when a script-side collaborator needs it serialized.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::Result;

/// Tag distinguishing the four message kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Request,
    Response,
    Event,
    Stream,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Request => "request",
            MessageKind::Response => "response",
            MessageKind::Event => "event",
            MessageKind::Stream => "stream",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable message produced by the bus.
///
/// Fields are only settable at construction time. Subscribers receive a
/// `&Message` that cannot outlive their callback; anything that needs the
/// payload afterwards must copy it (or clone the message).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "WireMessage", from = "WireMessage")]
pub struct Message {
    id: u64,
    kind: MessageKind,
    channel: String,
    payload: Vec<u8>,
    timestamp: i64,
    sender: Option<String>,
}

impl Message {
    /// Build a message stamped with the current wall-clock time.
    pub fn new(
        id: u64,
        kind: MessageKind,
        channel: impl Into<String>,
        payload: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            id,
            kind,
            channel: channel.into(),
            payload: payload.into(),
            timestamp: now_millis(),
            sender: None,
        }
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The payload as text, if it is valid UTF-8.
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// Epoch milliseconds at construction.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    /// A zero-length stream message closes the stream; it is never a data chunk.
    pub fn is_end_of_stream(&self) -> bool {
        self.kind == MessageKind::Stream && self.payload.is_empty()
    }

    /// Encode as `{id, type, channel, data, timestamp, sender?}`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

// `data` is text when the payload is UTF-8 and a byte array otherwise;
// both forms are accepted on decode.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum WireData {
    Text(String),
    Bytes(Vec<u8>),
}

#[derive(Serialize, Deserialize)]
struct WireMessage {
    id: u64,
    #[serde(rename = "type")]
    kind: MessageKind,
    channel: String,
    data: WireData,
    timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sender: Option<String>,
}

impl From<Message> for WireMessage {
    fn from(message: Message) -> Self {
        let data = match String::from_utf8(message.payload) {
            Ok(text) => WireData::Text(text),
            Err(err) => WireData::Bytes(err.into_bytes()),
        };
        Self {
            id: message.id,
            kind: message.kind,
            channel: message.channel,
            data,
            timestamp: message.timestamp,
            sender: message.sender,
        }
    }
}

impl From<WireMessage> for Message {
    fn from(wire: WireMessage) -> Self {
        let payload = match wire.data {
            WireData::Text(text) => text.into_bytes(),
            WireData::Bytes(bytes) => bytes,
        };
        Self {
            id: wire.id,
            kind: wire.kind,
            channel: wire.channel,
            payload,
            timestamp: wire.timestamp,
            sender: wire.sender,
        }
    }
}
