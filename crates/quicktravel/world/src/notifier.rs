//! Notifier that keeps every message

use crate::traits::Notifier;
use parking_lot::Mutex;
use quicktravel_types::ActorId;
use tracing::trace;

/// Stores delivered messages for later inspection.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(ActorId, String)>>,
}

impl RecordingNotifier {
    /// Create an empty notifier
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages delivered to `actor`, oldest first
    pub fn messages_for(&self, actor: &ActorId) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .filter(|(to, _)| to == actor)
            .map(|(_, message)| message.clone())
            .collect()
    }

    /// Every delivered message, oldest first
    pub fn all(&self) -> Vec<(ActorId, String)> {
        self.messages.lock().clone()
    }

    /// Forget every message
    pub fn clear(&self) {
        self.messages.lock().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, actor: &ActorId, message: &str) {
        trace!(actor = %actor, message, "Notify");
        self.messages.lock().push((*actor, message.to_string()));
    }
}
