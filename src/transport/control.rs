//! The submit control's label/enablement state machine.
//!
//! ```text
//! Idle { count } --begin--> Submitting --succeed--> Success --(delay)--> Idle { current count }
//!                               |
//!                               +------fail------> Failure ------------> Idle { current count }
//! ```
//!
//! The idle count always reflects the selection at the moment the control
//! returns to idle, not the count at submission time.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

use crate::selection::{SelectionView, submit_label};

/// State of the submit control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitState {
    /// Waiting for the user; enabled when `count > 0`.
    Idle { count: usize },
    /// A request is in flight.
    Submitting,
    /// The last request succeeded.
    Success,
    /// The last request failed.
    Failure { message: String },
}

impl SubmitState {
    /// Text shown on the control.
    pub fn label(&self) -> String {
        match self {
            Self::Idle { count } => submit_label(*count),
            Self::Submitting => "Processing…".to_string(),
            Self::Success => "Success!".to_string(),
            Self::Failure { .. } => "Failed".to_string(),
        }
    }

    /// Whether the control accepts a click.
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Idle { count } if *count > 0)
    }
}

/// Drives [`SubmitState`] and publishes every transition.
#[derive(Debug)]
pub struct SubmitControl {
    state: Arc<watch::Sender<SubmitState>>,
    selection: watch::Receiver<SelectionView>,
    reset_delay: Duration,
    generation: Arc<AtomicU64>,
}

impl SubmitControl {
    /// Create a control that follows `selection` while idle.
    pub fn new(selection: watch::Receiver<SelectionView>, reset_delay: Duration) -> Self {
        let count = selection.borrow().len;
        let (state, _) = watch::channel(SubmitState::Idle { count });
        Self {
            state: Arc::new(state),
            selection,
            reset_delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current state.
    pub fn state(&self) -> SubmitState {
        self.state.borrow().clone()
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<SubmitState> {
        self.state.subscribe()
    }

    /// Refresh the idle count from the selection.
    ///
    /// Has no effect outside [`SubmitState::Idle`].
    pub fn sync(&self) {
        let count = self.selection.borrow().len;
        self.state.send_if_modified(|state| match state {
            SubmitState::Idle { count: current } if *current != count => {
                *current = count;
                true
            }
            _ => false,
        });
    }

    /// Enter [`SubmitState::Submitting`].
    ///
    /// Returns `false`, leaving the state alone, unless the control is idle
    /// with a non-empty selection.
    pub fn begin(&self) -> bool {
        self.sync();
        let started = self.state.send_if_modified(|state| {
            if state.is_enabled() {
                *state = SubmitState::Submitting;
                true
            } else {
                false
            }
        });
        if started {
            // Invalidate any reset still pending from an earlier success.
            self.generation.fetch_add(1, Ordering::SeqCst);
        }
        started
    }

    /// Enter [`SubmitState::Success`] and schedule the return to idle.
    ///
    /// Must be called from within a tokio runtime.
    pub fn succeed(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(SubmitState::Success);

        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);
        let selection = self.selection.clone();
        let delay = self.reset_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if current.load(Ordering::SeqCst) != generation {
                return;
            }
            let count = selection.borrow().len;
            debug!(count, "submit control reset after success");
            state.send_replace(SubmitState::Idle { count });
        });
    }

    /// Pass through [`SubmitState::Failure`] straight back to idle.
    pub fn fail(&self, message: impl Into<String>) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(SubmitState::Failure {
            message: message.into(),
        });
        let count = self.selection.borrow().len;
        self.state.send_replace(SubmitState::Idle { count });
    }
}
