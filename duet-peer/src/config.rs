use crate::media::MediaConstraints;
use std::time::Duration;

pub const DEFAULT_NEGOTIATION_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// What to ask the media source for on join.
    pub media: MediaConstraints,
    /// Upper bound for one offer/answer cycle.
    pub negotiation_timeout: Duration,
    /// Pause between releasing resources and reporting `CallEnded`.
    pub hangup_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            media: MediaConstraints::default(),
            negotiation_timeout: DEFAULT_NEGOTIATION_TIMEOUT,
            hangup_delay: Duration::ZERO,
        }
    }
}
