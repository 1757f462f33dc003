//! DeliverySink port - 「通知をどう届けるか」の差し替え口

use crate::domain::{Notification, RecipientKey};
use crate::error::DeliveryError;

/// Receives each notification at the moment the scheduler shows it.
///
/// Called synchronously from the recipient's processor, so implementations
/// should hand the payload off and return quickly. Errors are logged by the
/// scheduler and never stop the drain loop.
pub trait DeliverySink: Send + Sync {
    fn deliver(
        &self,
        recipient: &RecipientKey,
        notification: &Notification,
    ) -> Result<(), DeliveryError>;
}

impl<F> DeliverySink for F
where
    F: Fn(&RecipientKey, &Notification) -> Result<(), DeliveryError> + Send + Sync,
{
    fn deliver(
        &self,
        recipient: &RecipientKey,
        notification: &Notification,
    ) -> Result<(), DeliveryError> {
        self(recipient, notification)
    }
}
