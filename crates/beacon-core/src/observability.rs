use serde::{Deserialize, Serialize};

/// Point-in-time view of the scheduler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    /// Recipients that currently own a processor.
    pub active_recipients: usize,
    pub pending_test: usize,
    pub pending_main: usize,
    /// Processors spawned since the scheduler was created.
    pub processors_started: u64,
}

impl QueueSnapshot {
    pub fn pending(&self) -> usize {
        self.pending_test + self.pending_main
    }

    pub fn is_idle(&self) -> bool {
        self.active_recipients == 0
    }
}
