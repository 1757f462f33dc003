//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! - トランスポートは必須（未設定なら build() が BuildError を返す）
//! - ディレクトリ類は未設定なら in-memory 実装
//! - build() 時に SocketRelay をスケジューラの配信コールバックとして登録する

use std::sync::Arc;

use crate::app::{AlertGateway, EventIngestor, SocketRelay};
use crate::impls::{InMemoryStreamerDirectory, InMemoryTokenDirectory};
use crate::ports::{RoomTransport, StreamerDirectory, TokenDirectory};
use crate::queue::{QueueOptions, QueueTiming, SupportNotificationQueue};

/// # 使用例
/// ```ignore
/// let rooms = Arc::new(InMemoryRooms::new());
/// let app = AppBuilder::new()
///     .options(QueueOptions::from_env()?)
///     .transport(rooms.clone())
///     .network("BASE")
///     .build()?;
/// app.ingestor.handle(event).await?;
/// ```
pub struct AppBuilder {
    timing: QueueTiming,
    transport: Option<Arc<dyn RoomTransport>>,
    tokens: Option<Arc<dyn TokenDirectory>>,
    streamers: Option<Arc<dyn StreamerDirectory>>,
    network: String,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("no room transport configured; alerts would have nowhere to go")]
    MissingTransport,
}

impl AppBuilder {
    pub const DEFAULT_NETWORK: &'static str = "BASE";

    pub fn new() -> Self {
        Self {
            timing: QueueTiming::default(),
            transport: None,
            tokens: None,
            streamers: None,
            network: Self::DEFAULT_NETWORK.to_string(),
        }
    }

    pub fn options(mut self, options: QueueOptions) -> Self {
        self.timing = QueueTiming::from_options(&options);
        self
    }

    pub fn timing(mut self, timing: QueueTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn transport(mut self, transport: Arc<dyn RoomTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn tokens(mut self, tokens: Arc<dyn TokenDirectory>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn streamers(mut self, streamers: Arc<dyn StreamerDirectory>) -> Self {
        self.streamers = Some(streamers);
        self
    }

    /// Network label stamped on notifications built from chain events.
    pub fn network(mut self, network: impl Into<String>) -> Self {
        self.network = network.into();
        self
    }

    pub fn build(self) -> Result<App, BuildError> {
        let transport = self.transport.ok_or(BuildError::MissingTransport)?;
        let tokens: Arc<dyn TokenDirectory> = match self.tokens {
            Some(tokens) => tokens,
            None => Arc::new(InMemoryTokenDirectory::new()),
        };
        let streamers: Arc<dyn StreamerDirectory> = match self.streamers {
            Some(streamers) => streamers,
            None => Arc::new(InMemoryStreamerDirectory::new()),
        };

        let queue = SupportNotificationQueue::new(self.timing);
        queue.set_delivery_sink(Arc::new(SocketRelay::new(Arc::clone(&transport))));

        Ok(App {
            ingestor: EventIngestor::new(
                queue.clone(),
                Arc::clone(&tokens),
                Arc::clone(&streamers),
                self.network,
            ),
            gateway: AlertGateway::new(transport, Arc::clone(&streamers)),
            queue,
            tokens,
            streamers,
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct App {
    pub queue: SupportNotificationQueue,
    pub ingestor: EventIngestor,
    pub gateway: AlertGateway,
    pub tokens: Arc<dyn TokenDirectory>,
    pub streamers: Arc<dyn StreamerDirectory>,
}
