//! Processor state machine for a recipient.

use serde::{Deserialize, Serialize};

/// Lifecycle of a recipient's processor.
///
/// State transitions:
/// - NotRunning -> Running (first enqueue for the key spawns the processor)
/// - Running -> Draining (settle delay elapsed)
/// - Draining -> NotRunning (both lanes empty, entry removed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessorState {
    /// No entry in the store for this key.
    NotRunning,

    /// Spawned, waiting out the settle delay.
    Running,

    /// Delivering notifications.
    Draining,
}

impl ProcessorState {
    pub fn is_active(self) -> bool {
        !matches!(self, ProcessorState::NotRunning)
    }
}

/// Which list a notification is appended to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lane {
    /// Dashboard test alerts; always popped before `Main`.
    Test,
    Main,
}
