//! Impls - ports の実装（開発用・テスト用）
//!
//! # 含まれる実装
//! - **InMemoryRooms**: room ブロードキャスト（socket.io の代わり）
//! - **InMemoryTokenDirectory** / **InMemoryStreamerDirectory**: DB の代わり

pub mod directory;
pub mod inmem_rooms;

pub use self::directory::{InMemoryStreamerDirectory, InMemoryTokenDirectory};
pub use self::inmem_rooms::InMemoryRooms;
