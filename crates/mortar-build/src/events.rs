//! Build lifecycle notifications
//!
//! An [`EventBus`] belongs to one coordinator run. Listeners are registered
//! before the run starts; firing is one-way and return values are ignored.
//! There is no process-wide observer state.

use crate::buildable::TargetKind;
use std::path::{Path, PathBuf};

/// A lifecycle event fired during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    /// An artifact was (re)written.
    FileCreated {
        target: String,
        kind: TargetKind,
        profile: String,
        path: PathBuf,
    },
    /// An artifact was current (or its profile disabled); nothing was touched.
    FileNotChanged {
        target: String,
        kind: TargetKind,
        profile: String,
        path: PathBuf,
    },
    /// The run finished; fired exactly once, after all targets.
    BuildComplete,
}

impl BuildEvent {
    pub fn file_created(target: &str, kind: TargetKind, profile: &str, path: &Path) -> Self {
        Self::FileCreated {
            target: target.to_string(),
            kind,
            profile: profile.to_string(),
            path: path.to_path_buf(),
        }
    }

    pub fn file_not_changed(target: &str, kind: TargetKind, profile: &str, path: &Path) -> Self {
        Self::FileNotChanged {
            target: target.to_string(),
            kind,
            profile: profile.to_string(),
            path: path.to_path_buf(),
        }
    }
}

type Listener = Box<dyn Fn(&BuildEvent)>;

/// One run's notification channel.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for every subsequent event.
    pub fn subscribe(&mut self, listener: impl Fn(&BuildEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Notify every listener, in registration order.
    pub fn fire(&self, event: &BuildEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}
