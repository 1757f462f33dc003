//! Directory records for tokens and streamers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{RecipientKey, StreamKey};

/// An ERC-20 token accepted for support payments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub address: String,
    pub price_feed: String,
    pub decimals: u8,
    pub symbol: String,
    pub created_at: DateTime<Utc>,
}

impl TokenInfo {
    pub fn new(
        address: impl Into<String>,
        price_feed: impl Into<String>,
        decimals: u8,
        symbol: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            price_feed: price_feed.into(),
            decimals,
            symbol: symbol.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamerRecord {
    pub address: RecipientKey,
    pub stream_key: StreamKey,
    pub created_at: DateTime<Utc>,
}

impl StreamerRecord {
    /// New registration with a freshly generated stream key.
    pub fn register(address: RecipientKey) -> Self {
        Self {
            address,
            stream_key: StreamKey::generate(),
            created_at: Utc::now(),
        }
    }
}
