use std::sync::Mutex;
use std::sync::PoisonError;

/// Where user-facing failure notices go.
///
/// The dashboard raises exactly one alert per failed action.
pub trait Alert: Send + Sync {
    fn alert(&self, message: &str);
}

/// Prints alerts to stderr, keeping stdout for tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrAlert;

impl Alert for StderrAlert {
    fn alert(&self, message: &str) {
        eprintln!("! {}", message);
    }
}

/// Keeps alerts in memory.
#[derive(Debug, Default)]
pub struct AlertLog {
    messages: Mutex<Vec<String>>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Alert for AlertLog {
    fn alert(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}
