//! ChainEvent - コントラクトから届くイベント
//!
//! ログの購読（RPC）はこのクレートの外側。ここではデコード済みのイベントを
//! `event` タグ付き JSON として受け取る。

use serde::{Deserialize, Serialize};

/// Decoded contract log.
///
/// ```json
/// {"event":"SupportReceived","streamer":"0x..","from":"0x..","token":"0x..","amount":"100","message":"gg","hash":"0x.."}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all_fields = "camelCase")]
pub enum ChainEvent {
    SupportReceived {
        streamer: String,
        from: String,
        token: String,
        /// uint256 as a decimal string.
        amount: String,
        message: String,
        hash: String,
    },
    StreamerRegistered {
        streamer: String,
    },
    TokenAdded {
        token_address: String,
        price_feed: String,
        decimal: u8,
        symbol: String,
    },
    TokenRemoved {
        token_address: String,
    },
}

impl ChainEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SupportReceived { .. } => "SupportReceived",
            Self::StreamerRegistered { .. } => "StreamerRegistered",
            Self::TokenAdded { .. } => "TokenAdded",
            Self::TokenRemoved { .. } => "TokenRemoved",
        }
    }
}
