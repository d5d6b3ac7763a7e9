use crate::scheduler::MeetingAgent;

/// Shared across requests. Nothing in here is mutated after startup.
pub struct AppState {
    pub agent: MeetingAgent,
}

impl AppState {
    pub fn new(agent: MeetingAgent) -> Self {
        Self { agent }
    }
}
