//! Form state for one user: idle → submitting → rendered | errored.

use std::time::Duration;

use tokio::time::Instant;
use tracing::warn;

use crate::client::api::{ClientError, ExtractApi, Received};

/// How long "Copied!" stays up after a copy.
pub const COPY_FEEDBACK: Duration = Duration::from_millis(1200);

#[derive(Debug, Clone, PartialEq)]
pub enum FormState {
    Idle,
    Submitting,
    Rendered(Received),
    Errored(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Pretty,
    Json,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Pretty => ViewMode::Json,
            ViewMode::Json => ViewMode::Pretty,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Pretty => "Pretty",
            ViewMode::Json => "JSON",
        }
    }
}

/// Copy-button feedback that reverts on its own once `COPY_FEEDBACK` has elapsed.
#[derive(Debug, Default, Clone, Copy)]
pub struct CopyFeedback {
    copied_at: Option<Instant>,
}

impl CopyFeedback {
    pub fn mark(&mut self, now: Instant) {
        self.copied_at = Some(now);
    }

    pub fn clear(&mut self) {
        self.copied_at = None;
    }

    pub fn is_active(&self, now: Instant) -> bool {
        self.copied_at
            .is_some_and(|at| now.saturating_duration_since(at) < COPY_FEEDBACK)
    }

    pub fn label(&self, now: Instant) -> &'static str {
        if self.is_active(now) {
            "Copied!"
        } else {
            "Copy JSON"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input or a submission already in flight; nothing was sent.
    Ignored,
    Rendered,
    Errored,
}

pub struct ClientSession<A> {
    api: A,
    state: FormState,
    view: ViewMode,
    copy: CopyFeedback,
}

impl<A: ExtractApi> ClientSession<A> {
    pub fn new(api: A, view: ViewMode) -> Self {
        Self {
            api,
            state: FormState::Idle,
            view,
            copy: CopyFeedback::default(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn copy_feedback(&self) -> &CopyFeedback {
        &self.copy
    }

    /// The submit control is disabled while a request is in flight.
    pub fn is_busy(&self) -> bool {
        self.state == FormState::Submitting
    }

    /// Switches between the formatted and raw views without re-fetching.
    pub fn toggle_view(&mut self) -> ViewMode {
        self.view = self.view.toggled();
        self.view
    }

    /// Starts a submission. Returns `false` (state untouched) for blank input or while busy.
    pub fn begin_submit(&mut self, description: &str) -> bool {
        if description.trim().is_empty() || self.is_busy() {
            return false;
        }
        self.state = FormState::Submitting;
        self.copy.clear();
        true
    }

    pub fn finish_submit(&mut self, outcome: Result<Received, ClientError>) -> SubmitOutcome {
        match outcome {
            Ok(received) => {
                self.state = FormState::Rendered(received);
                SubmitOutcome::Rendered
            }
            Err(e) => {
                warn!("extract request failed: {e}");
                self.state = FormState::Errored(e.user_message());
                SubmitOutcome::Errored
            }
        }
    }

    pub async fn submit(&mut self, description: &str) -> SubmitOutcome {
        if !self.begin_submit(description) {
            return SubmitOutcome::Ignored;
        }
        let outcome = self.api.extract(description).await;
        self.finish_submit(outcome)
    }

    /// View toggle and copy control for the current result, evaluated at `now` so the
    /// copy label reads "Copy JSON" again once the feedback window has passed.
    pub fn controls_line(&self, now: Instant) -> Option<String> {
        if !matches!(self.state, FormState::Rendered(_)) {
            return None;
        }
        Some(format!("[{}] [{}]", self.view.label(), self.copy.label(now)))
    }

    /// Pretty-printed raw result for the clipboard; `None` when nothing is rendered.
    pub fn copy_json(&mut self, now: Instant) -> Option<String> {
        let FormState::Rendered(received) = &self.state else {
            return None;
        };
        let text = serde_json::to_string_pretty(&received.raw).ok()?;
        self.copy.mark(now);
        Some(text)
    }
}
