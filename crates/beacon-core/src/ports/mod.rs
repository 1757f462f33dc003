//! Ports - 抽象化レイヤー
//!
//! スケジューラの外側にいる協力者（配信先トランスポート、トークン/ストリーマーの保存先）
//! へのインターフェース。永続化や socket.io 相当の実装はこのクレートの外に置ける。

pub mod delivery;
pub mod directory;
pub mod transport;

pub use self::delivery::DeliverySink;
pub use self::directory::{StreamerDirectory, TokenDirectory};
pub use self::transport::{OutboundFrame, RoomTransport, WsEnvelope};
