//! Domain model (keys, notifications, chain events, directory records).

pub mod events;
pub mod ids;
pub mod notification;
pub mod records;

pub use events::ChainEvent;
pub use ids::{ClientId, RecipientKey, StreamKey};
pub use notification::{Notification, SupportKind};
pub use records::{StreamerRecord, TokenInfo};
