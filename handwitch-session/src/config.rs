use std::time::Duration;

/// Tuning for the session engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Messages that may wait in one session's inbox before delivery applies backpressure.
    pub queue_capacity: usize,
    /// How long a session waits for the next reply before it expires. `None` waits forever.
    pub idle_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 8,
            idle_timeout: Some(Duration::from_secs(600)),
        }
    }
}
