//! InMemoryRooms - 開発用の room トランスポート
//!
//! # 実装詳細
//! - client ごとに unbounded mpsc を持つ（emit はブロックしない）
//! - room -> client 集合、client -> room 集合の両方向を Mutex 1 つで管理
//! - 送信に失敗した client（受信側 drop 済み）は emit 時に掃除する

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::ClientId;
use crate::error::DeliveryError;
use crate::ports::{OutboundFrame, RoomTransport};

struct ClientEntry {
    tx: mpsc::UnboundedSender<OutboundFrame>,
    rooms: HashSet<String>,
}

#[derive(Default)]
struct Rooms {
    clients: HashMap<ClientId, ClientEntry>,
    rooms: HashMap<String, HashSet<ClientId>>,
}

impl Rooms {
    fn drop_client(&mut self, client: ClientId) {
        let Some(entry) = self.clients.remove(&client) else {
            return;
        };
        for room in entry.rooms {
            if let Some(members) = self.rooms.get_mut(&room) {
                members.remove(&client);
                if members.is_empty() {
                    self.rooms.remove(&room);
                }
            }
        }
    }
}

#[derive(Default)]
pub struct InMemoryRooms {
    inner: Mutex<Rooms>,
}

impl InMemoryRooms {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Rooms> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new client and return the receiving end of its socket.
    pub fn connect(&self) -> (ClientId, mpsc::UnboundedReceiver<OutboundFrame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = ClientId::generate();
        self.lock().clients.insert(
            id,
            ClientEntry {
                tx,
                rooms: HashSet::new(),
            },
        );
        debug!(client = %id, "client connected");
        (id, rx)
    }

    pub fn leave(&self, client: ClientId, room: &str) {
        let mut rooms = self.lock();
        if let Some(entry) = rooms.clients.get_mut(&client) {
            entry.rooms.remove(room);
        }
        if let Some(members) = rooms.rooms.get_mut(room) {
            members.remove(&client);
            if members.is_empty() {
                rooms.rooms.remove(room);
            }
        }
    }

    pub fn members(&self, room: &str) -> usize {
        self.lock().rooms.get(room).map_or(0, HashSet::len)
    }

    pub fn is_connected(&self, client: ClientId) -> bool {
        self.lock().clients.contains_key(&client)
    }
}

impl RoomTransport for InMemoryRooms {
    fn emit(&self, room: &str, frame: OutboundFrame) -> Result<usize, DeliveryError> {
        let mut rooms = self.lock();
        let Some(members) = rooms.rooms.get(room) else {
            return Ok(0);
        };

        let mut reached = 0;
        let mut gone = Vec::new();
        for client in members {
            match rooms.clients.get(client) {
                Some(entry) if entry.tx.send(frame.clone()).is_ok() => reached += 1,
                _ => gone.push(*client),
            }
        }
        for client in gone {
            rooms.drop_client(client);
        }
        Ok(reached)
    }

    fn send_to(&self, client: ClientId, frame: OutboundFrame) -> Result<(), DeliveryError> {
        let mut rooms = self.lock();
        let Some(entry) = rooms.clients.get(&client) else {
            return Err(DeliveryError::ClientGone(client.to_string()));
        };
        if entry.tx.send(frame).is_err() {
            rooms.drop_client(client);
            return Err(DeliveryError::ClientGone(client.to_string()));
        }
        Ok(())
    }

    fn join(&self, client: ClientId, room: &str) -> Result<(), DeliveryError> {
        let mut rooms = self.lock();
        let entry = rooms
            .clients
            .get_mut(&client)
            .ok_or_else(|| DeliveryError::ClientGone(client.to_string()))?;
        entry.rooms.insert(room.to_string());
        rooms
            .rooms
            .entry(room.to_string())
            .or_default()
            .insert(client);
        Ok(())
    }

    fn disconnect(&self, client: ClientId) {
        self.lock().drop_client(client);
        debug!(client = %client, "client disconnected");
    }
}
