//! App - アプリケーション層
//!
//! ports とスケジューラを組み合わせる。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: ワイヤリング（起動時に必須の依存をチェック）
//! - **EventIngestor**: チェーンイベント → 通知キュー（上流の producer）
//! - **SocketRelay**: 配信コールバック → room ブロードキャスト（下流）
//! - **AlertGateway**: ソケット接続時の stream key 認証と room 参加

pub mod builder;
pub mod gateway;
pub mod ingest;
pub mod relay;

pub use self::builder::{App, AppBuilder, BuildError};
pub use self::gateway::AlertGateway;
pub use self::ingest::EventIngestor;
pub use self::relay::SocketRelay;
