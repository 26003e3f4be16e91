//! Host lifecycle port: the unload listener and the "work in flight" warning.
//!
//! A browser host registers a `beforeunload` handler; a desktop or test host
//! can record the calls or ignore them.

use std::sync::{Arc, Mutex};

pub trait LifecyclePort: Send + Sync {
    /// Attach or detach the host's unload listener.
    fn set_unload_listener(&self, active: bool);

    /// Ask the host to warn the user that a save is still running.
    fn warn_before_unload(&self, message: &str);
}

/// Ignores every lifecycle call.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLifecycle;

impl LifecyclePort for NoopLifecycle {
    fn set_unload_listener(&self, _active: bool) {}

    fn warn_before_unload(&self, _message: &str) {}
}

#[derive(Debug, Default)]
struct LifecycleLog {
    listener_active: bool,
    attach_count: usize,
    warnings: Vec<String>,
}

/// Records lifecycle calls. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingLifecycle {
    log: Arc<Mutex<LifecycleLog>>,
}

impl RecordingLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener_active(&self) -> bool {
        self.log.lock().map(|l| l.listener_active).unwrap_or(false)
    }

    /// How many times the listener was attached.
    pub fn attach_count(&self) -> usize {
        self.log.lock().map(|l| l.attach_count).unwrap_or(0)
    }

    pub fn warnings(&self) -> Vec<String> {
        self.log
            .lock()
            .map(|l| l.warnings.clone())
            .unwrap_or_default()
    }
}

impl LifecyclePort for RecordingLifecycle {
    fn set_unload_listener(&self, active: bool) {
        if let Ok(mut log) = self.log.lock() {
            if active && !log.listener_active {
                log.attach_count += 1;
            }
            log.listener_active = active;
        }
    }

    fn warn_before_unload(&self, message: &str) {
        if let Ok(mut log) = self.log.lock() {
            log.warnings.push(message.to_string());
        }
    }
}
