//! AlertGateway - ダッシュボードのソケット接続を扱う
//!
//! 接続時に stream key を検証し、ストリーマーのアドレス名の room に参加させる。
//! 結果は `auth` イベントでクライアントに返す。

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::{ClientId, RecipientKey, StreamKey};
use crate::error::{AuthError, DeliveryError};
use crate::ports::{OutboundFrame, RoomTransport, StreamerDirectory, WsEnvelope};

#[derive(Debug, Serialize)]
struct AuthReply {
    success: bool,
    message: String,
}

pub struct AlertGateway {
    transport: Arc<dyn RoomTransport>,
    streamers: Arc<dyn StreamerDirectory>,
}

impl AlertGateway {
    pub fn new(transport: Arc<dyn RoomTransport>, streamers: Arc<dyn StreamerDirectory>) -> Self {
        Self {
            transport,
            streamers,
        }
    }

    /// Handshake for a freshly connected client.
    ///
    /// On success the client joins the streamer's room and receives every
    /// alert relayed to it. On failure the client gets a negative `auth`
    /// frame and is disconnected.
    pub async fn authenticate(
        &self,
        client: ClientId,
        stream_key: Option<&str>,
    ) -> Result<RecipientKey, AuthError> {
        let result = match stream_key.filter(|k| !k.is_empty()) {
            None => Err(AuthError::MissingStreamKey),
            Some(key) => self
                .streamers
                .address_for(&StreamKey::from(key))
                .await
                .ok_or(AuthError::InvalidStreamKey),
        };

        match result {
            Ok(address) => {
                self.reply(client, true, "Authenticated");
                if let Err(e) = self.transport.join(client, address.as_str()) {
                    warn!(client = %client, error = %e, "join failed");
                }
                info!(client = %client, room = %address, "client authenticated");
                Ok(address)
            }
            Err(e) => {
                self.reply(client, false, &e.to_string());
                self.transport.disconnect(client);
                info!(client = %client, reason = %e, "client rejected");
                Err(e)
            }
        }
    }

    /// Ask every dashboard in `room` to reload.
    pub fn reload(&self, room: &str) -> Result<usize, DeliveryError> {
        let frame = WsEnvelope::new("Requesting to reload", serde_json::json!({}))
            .into_frame("reload")?;
        self.transport.emit(room, frame)
    }

    fn reply(&self, client: ClientId, success: bool, message: &str) {
        let reply = AuthReply {
            success,
            message: message.to_string(),
        };
        let sent = serde_json::to_value(reply)
            .map_err(DeliveryError::from)
            .and_then(|payload| {
                self.transport
                    .send_to(client, OutboundFrame::new("auth", payload))
            });
        if let Err(e) = sent {
            warn!(client = %client, error = %e, "auth reply not sent");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::{InMemoryRooms, InMemoryStreamerDirectory};

    async fn setup() -> (Arc<InMemoryRooms>, AlertGateway, StreamKey) {
        let rooms = Arc::new(InMemoryRooms::new());
        let streamers = Arc::new(InMemoryStreamerDirectory::new());
        let record = streamers.register(RecipientKey::new("0xstreamer")).await;
        let gateway = AlertGateway::new(rooms.clone(), streamers);
        (rooms, gateway, record.stream_key)
    }

    #[tokio::test]
    async fn valid_key_joins_streamer_room() {
        let (rooms, gateway, key) = setup().await;
        let (client, mut rx) = rooms.connect();

        let room = gateway.authenticate(client, Some(key.as_str())).await.unwrap();
        assert_eq!(room.as_str(), "0xstreamer");
        assert_eq!(rooms.members("0xstreamer"), 1);

        let frame = rx.try_recv().unwrap();
        assert_eq!(frame.event, "auth");
        assert_eq!(frame.payload["success"], true);
    }

    #[tokio::test]
    async fn missing_key_is_rejected_and_disconnected() {
        let (rooms, gateway, _) = setup().await;
        let (client, mut rx) = rooms.connect();

        let err = gateway.authenticate(client, None).await.unwrap_err();
        assert_eq!(err, AuthError::MissingStreamKey);

        let frame = rx.try_recv().unwrap();
        assert_eq!(frame.payload["success"], false);
        assert_eq!(frame.payload["message"], "No stream key provided");
        assert!(!rooms.is_connected(client));
    }

    #[tokio::test]
    async fn unknown_key_is_rejected() {
        let (rooms, gateway, _) = setup().await;
        let (client, _rx) = rooms.connect();

        let err = gateway.authenticate(client, Some("wrong")).await.unwrap_err();
        assert_eq!(err, AuthError::InvalidStreamKey);
        assert_eq!(rooms.members("0xstreamer"), 0);
    }

    #[tokio::test]
    async fn reload_reaches_room() {
        let (rooms, gateway, key) = setup().await;
        let (client, mut rx) = rooms.connect();
        gateway.authenticate(client, Some(key.as_str())).await.unwrap();
        let _auth = rx.try_recv().unwrap();

        assert_eq!(gateway.reload("0xstreamer").unwrap(), 1);
        assert_eq!(rx.try_recv().unwrap().event, "reload");
    }
}
