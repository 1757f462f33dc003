//! Queue module: per-recipient store, processor state, timing, and the scheduler.
//!
//! 受取人（ストリーマー）ごとに 1 つだけ processor が走り、test レーン → main レーンの順で
//! 通知を 1 件ずつ取り出して表示時間 + 通知間隔だけ待つ。両レーンが空になったら
//! エントリを消して processor も終了する。

mod config;
mod scheduler;
mod state;
mod store;

pub use config::{QueueOptions, QueueTiming};
pub use scheduler::SupportNotificationQueue;
pub use state::{Lane, ProcessorState};
pub use store::NotificationStore;
