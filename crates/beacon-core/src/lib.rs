//! beacon-core
//!
//! Core building blocks for the donation-alert backend.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（RecipientKey, Notification, SupportKind, ChainEvent）
//! - **queue**: 受取人ごとの通知スケジューラ（SupportNotificationQueue）
//! - **ports**: 抽象化レイヤー（DeliverySink, RoomTransport, TokenDirectory, StreamerDirectory）
//! - **impls**: 実装（InMemoryRooms, InMemoryTokenDirectory, InMemoryStreamerDirectory）
//! - **app**: アプリケーションロジック（AppBuilder, EventIngestor, SocketRelay, AlertGateway）
//! - **observability**: キューの状態ビュー
//! - **error**: エラー型

pub mod app;
pub mod domain;
pub mod error;
pub mod impls;
pub mod observability;
pub mod ports;
pub mod queue;

pub use app::{App, AppBuilder};
pub use domain::{ChainEvent, Notification, RecipientKey, SupportKind};
pub use queue::{QueueOptions, QueueTiming, SupportNotificationQueue};
