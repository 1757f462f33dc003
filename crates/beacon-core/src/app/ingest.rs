//! EventIngestor - チェーンイベントを通知キューへ流す上流側
//!
//! # フロー
//! 1. TokenAdded / TokenRemoved → TokenDirectory を更新
//! 2. StreamerRegistered → StreamerDirectory に登録（stream key 発行）
//! 3. SupportReceived → トークンを引いて Notification を組み立て、enqueue

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{ChainEvent, Notification, RecipientKey, SupportKind, TokenInfo};
use crate::error::IngestError;
use crate::ports::{StreamerDirectory, TokenDirectory};
use crate::queue::SupportNotificationQueue;

pub struct EventIngestor {
    queue: SupportNotificationQueue,
    tokens: Arc<dyn TokenDirectory>,
    streamers: Arc<dyn StreamerDirectory>,
    network: String,
}

impl EventIngestor {
    pub fn new(
        queue: SupportNotificationQueue,
        tokens: Arc<dyn TokenDirectory>,
        streamers: Arc<dyn StreamerDirectory>,
        network: impl Into<String>,
    ) -> Self {
        Self {
            queue,
            tokens,
            streamers,
            network: network.into(),
        }
    }

    pub async fn handle(&self, event: ChainEvent) -> Result<(), IngestError> {
        match event {
            ChainEvent::TokenAdded {
                token_address,
                price_feed,
                decimal,
                symbol,
            } => {
                info!(token = %token_address, %symbol, decimal, "token added");
                self.tokens
                    .add(TokenInfo::new(token_address, price_feed, decimal, symbol))
                    .await;
            }
            ChainEvent::TokenRemoved { token_address } => {
                if self.tokens.remove(&token_address).await.is_none() {
                    warn!(token = %token_address, "removed token was not registered");
                } else {
                    info!(token = %token_address, "token removed");
                }
            }
            ChainEvent::StreamerRegistered { streamer } => {
                let record = self.streamers.register(RecipientKey::new(streamer)).await;
                info!(streamer = %record.address, "streamer registered");
            }
            ChainEvent::SupportReceived {
                streamer,
                from,
                token,
                amount,
                message,
                hash,
            } => {
                let amount = amount
                    .parse::<u128>()
                    .map_err(|_| IngestError::InvalidAmount(amount.clone()))?;
                let info = self
                    .tokens
                    .get(&token)
                    .await
                    .ok_or_else(|| IngestError::UnknownToken(token.clone()))?;

                info!(%streamer, %from, %amount, symbol = %info.symbol, %hash, "support received");
                self.queue.enqueue(
                    streamer,
                    Notification {
                        from,
                        kind: SupportKind::Normal,
                        amount,
                        decimals: info.decimals,
                        symbol: info.symbol,
                        message,
                        network: self.network.clone(),
                        ref_id: None,
                    },
                );
            }
        }
        Ok(())
    }

    /// Handle one batch of logs. A failing event is logged and skipped so
    /// the rest of the batch still goes through.
    ///
    /// Returns the number of events handled successfully.
    pub async fn handle_batch(&self, events: impl IntoIterator<Item = ChainEvent>) -> usize {
        let mut handled = 0;
        for event in events {
            let name = event.name();
            match self.handle(event).await {
                Ok(()) => handled += 1,
                Err(e) => warn!(event = name, error = %e, "event skipped"),
            }
        }
        handled
    }

    /// Parse and handle one JSON-encoded event.
    pub async fn handle_json(&self, raw: &str) -> Result<(), IngestError> {
        let event: ChainEvent = serde_json::from_str(raw)?;
        self.handle(event).await
    }

    /// Queue a canned alert on the recipient's test lane.
    pub fn queue_test_alert(
        &self,
        recipient: impl Into<RecipientKey>,
        kind: SupportKind,
        ref_id: Option<String>,
    ) {
        self.queue
            .enqueue_test(recipient, Notification::sample(kind, ref_id));
    }
}
