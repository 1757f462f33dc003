//! In-memory token and streamer directories.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{RecipientKey, StreamKey, StreamerRecord, TokenInfo};
use crate::ports::{StreamerDirectory, TokenDirectory};

#[derive(Default)]
pub struct InMemoryTokenDirectory {
    tokens: RwLock<HashMap<String, TokenInfo>>,
}

impl InMemoryTokenDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenDirectory for InMemoryTokenDirectory {
    async fn add(&self, info: TokenInfo) {
        self.tokens.write().await.insert(info.address.clone(), info);
    }

    async fn remove(&self, address: &str) -> Option<TokenInfo> {
        self.tokens.write().await.remove(address)
    }

    async fn get(&self, address: &str) -> Option<TokenInfo> {
        self.tokens.read().await.get(address).cloned()
    }
}

#[derive(Default)]
struct Streamers {
    by_address: HashMap<RecipientKey, StreamerRecord>,
    by_key: HashMap<StreamKey, RecipientKey>,
}

#[derive(Default)]
pub struct InMemoryStreamerDirectory {
    inner: RwLock<Streamers>,
}

impl InMemoryStreamerDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StreamerDirectory for InMemoryStreamerDirectory {
    async fn register(&self, address: RecipientKey) -> StreamerRecord {
        let mut inner = self.inner.write().await;
        if let Some(existing) = inner.by_address.get(&address) {
            return existing.clone();
        }
        let record = StreamerRecord::register(address.clone());
        inner
            .by_key
            .insert(record.stream_key.clone(), address.clone());
        inner.by_address.insert(address, record.clone());
        record
    }

    async fn address_for(&self, stream_key: &StreamKey) -> Option<RecipientKey> {
        self.inner.read().await.by_key.get(stream_key).cloned()
    }
}
