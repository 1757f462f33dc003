//! Directory ports - トークンとストリーマーの参照先
//!
//! 本番では DB（元々は MongoDB）を想定。開発・テストでは impls の in-memory 版を使う。

use async_trait::async_trait;

use crate::domain::{RecipientKey, StreamKey, StreamerRecord, TokenInfo};

#[async_trait]
pub trait TokenDirectory: Send + Sync {
    /// Insert or replace the token registered at `info.address`.
    async fn add(&self, info: TokenInfo);

    /// Returns the removed token, if it was known.
    async fn remove(&self, address: &str) -> Option<TokenInfo>;

    async fn get(&self, address: &str) -> Option<TokenInfo>;
}

#[async_trait]
pub trait StreamerDirectory: Send + Sync {
    /// Register a streamer and issue their stream key.
    ///
    /// Registering an address twice keeps the existing key.
    async fn register(&self, address: RecipientKey) -> StreamerRecord;

    async fn address_for(&self, stream_key: &StreamKey) -> Option<RecipientKey>;
}
