use crate::domain::interaction::InteractionEvent;

/// Append-only record of user actions for one browsing session. Events are
/// never mutated after recording; the whole log is discarded with the
/// session.
#[derive(Clone, Debug, Default)]
pub struct InteractionLog {
    events: Vec<InteractionEvent>,
}

impl InteractionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: InteractionEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[InteractionEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
