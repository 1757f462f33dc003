//! RoomTransport port - room 単位のブロードキャスト（socket.io の `io.to(room).emit` 相当）

use serde::Serialize;

use crate::domain::ClientId;
use crate::error::DeliveryError;

/// A single event pushed to a socket client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundFrame {
    pub event: String,
    pub payload: serde_json::Value,
}

impl OutboundFrame {
    pub fn new(event: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            payload,
        }
    }
}

/// `{ "message": ..., "data": ... }` body used for every socket event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WsEnvelope<T: Serialize> {
    pub message: String,
    pub data: T,
}

impl<T: Serialize> WsEnvelope<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }

    pub fn into_frame(self, event: &str) -> Result<OutboundFrame, DeliveryError> {
        Ok(OutboundFrame::new(event, serde_json::to_value(self)?))
    }
}

pub trait RoomTransport: Send + Sync {
    /// Broadcast to every client joined to `room`.
    ///
    /// Returns how many clients the frame reached. An empty room is not an
    /// error: alerts for an offline dashboard are simply dropped.
    fn emit(&self, room: &str, frame: OutboundFrame) -> Result<usize, DeliveryError>;

    /// Send to a single client.
    fn send_to(&self, client: ClientId, frame: OutboundFrame) -> Result<(), DeliveryError>;

    fn join(&self, client: ClientId, room: &str) -> Result<(), DeliveryError>;

    fn disconnect(&self, client: ClientId);
}
