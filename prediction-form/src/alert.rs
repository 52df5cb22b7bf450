use std::sync::Mutex;

/// Blocking, user-facing message channel
pub trait AlertSink: Send + Sync {
    fn alert(&self, message: &str);
}

/// Keeps every alert in memory, in the order raised
#[derive(Debug, Default)]
pub struct RecordingAlerts {
    messages: Mutex<Vec<String>>,
}

impl RecordingAlerts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl AlertSink for RecordingAlerts {
    fn alert(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.to_string());
    }
}
