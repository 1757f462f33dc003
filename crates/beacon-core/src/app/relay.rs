//! SocketRelay - 配信コールバックの実体
//!
//! 通知を `{ message: "Incoming support", data: <notification> }` に包んで、
//! recipient key と同名の room に `support` イベントとして流す。

use std::sync::Arc;

use tracing::debug;

use crate::domain::{Notification, RecipientKey};
use crate::error::DeliveryError;
use crate::ports::{DeliverySink, RoomTransport, WsEnvelope};

pub struct SocketRelay {
    transport: Arc<dyn RoomTransport>,
}

impl SocketRelay {
    pub const EVENT: &'static str = "support";
    pub const MESSAGE: &'static str = "Incoming support";

    pub fn new(transport: Arc<dyn RoomTransport>) -> Self {
        Self { transport }
    }
}

impl DeliverySink for SocketRelay {
    fn deliver(
        &self,
        recipient: &RecipientKey,
        notification: &Notification,
    ) -> Result<(), DeliveryError> {
        let frame = WsEnvelope::new(Self::MESSAGE, notification).into_frame(Self::EVENT)?;
        let reached = self.transport.emit(recipient.as_str(), frame)?;
        debug!(recipient = %recipient, reached, "support alert relayed");
        Ok(())
    }
}
