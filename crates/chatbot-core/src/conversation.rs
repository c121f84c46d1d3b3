//! The conversation controller
//!
//! [`Conversation`] owns the transcript, the input buffer and the busy flag.
//! `submit` and `reset` are the only operations that change the transcript;
//! everything else is a read or an edit of the input buffer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info};

use crate::completion::CompletionService;
use crate::input::InputBuffer;
use crate::state::Message;

/// What a call to [`Conversation::submit`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Text was blank after trimming; nothing happened
    Empty,
    /// Another request was already in flight; nothing happened
    Busy,
    /// The service answered and the turn was appended
    Replied,
    /// The service failed and the turn was dropped
    Failed,
}

#[derive(Default)]
struct State {
    transcript: Vec<Message>,
    input: InputBuffer,
    last_error: Option<String>,
}

/// Clears the busy flag when the request ends, however it ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Conversation {
    service: Arc<dyn CompletionService>,
    state: Mutex<State>,
    busy: AtomicBool,
}

impl Conversation {
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        Self {
            service,
            state: Mutex::new(State::default()),
            busy: AtomicBool::new(false),
        }
    }

    pub fn model(&self) -> &str {
        self.service.model()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Send `text` to the completion service as one turn.
    ///
    /// Blank text and calls made while a request is in flight are no-ops.
    /// Otherwise the user message and the reply are appended together, or
    /// not at all if the service fails. Either way the input buffer is empty
    /// and the busy flag is down by the time this returns.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        if text.trim().is_empty() {
            return SubmitOutcome::Empty;
        }

        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Ignoring submit while a request is in flight");
            return SubmitOutcome::Busy;
        }
        let _busy = BusyGuard(&self.busy);

        self.state().last_error = None;
        debug!(
            model = self.service.model(),
            chars = text.chars().count(),
            "Requesting completion"
        );

        let result = self.service.complete(text).await;

        let mut state = self.state();
        let outcome = match result {
            Ok(reply) => {
                state.transcript.push(Message::user(text));
                state.transcript.push(Message::bot(reply));
                info!(messages = state.transcript.len(), "Turn completed");
                SubmitOutcome::Replied
            }
            Err(err) => {
                error!(error = %err, "Error sending message, dropping turn");
                state.last_error = Some(err.to_string());
                SubmitOutcome::Failed
            }
        };
        state.input.clear();
        outcome
    }

    /// Submit whatever is currently in the input buffer
    pub async fn submit_input(&self) -> SubmitOutcome {
        let text = self.state().input.text().to_string();
        self.submit(&text).await
    }

    /// Empty the transcript. A request already in flight still lands when it completes.
    pub fn reset(&self) {
        let mut state = self.state();
        state.transcript.clear();
        state.last_error = None;
        info!("Transcript cleared");
    }

    pub fn transcript(&self) -> Vec<Message> {
        self.state().transcript.clone()
    }

    pub fn len(&self) -> usize {
        self.state().transcript.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().transcript.is_empty()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Snapshot of the input buffer
    pub fn input(&self) -> InputBuffer {
        self.state().input.clone()
    }

    pub fn edit_input<R>(&self, f: impl FnOnce(&mut InputBuffer) -> R) -> R {
        f(&mut self.state().input)
    }

    /// Message of the most recent failed turn, until the next submission or reset
    pub fn last_error(&self) -> Option<String> {
        self.state().last_error.clone()
    }
}
