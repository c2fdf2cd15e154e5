//! State machine for one modal dialog
//!
//! `Closed → Opening → Open → Submitting → Open | Closed`
//!
//! Every path into `Closed` drops the content, the error, the active button
//! and any operation still in flight, then runs the close callback once.

use super::async_action::{AsyncAction, Settled, Trigger};
use super::descriptor::{
    ButtonAction, ButtonRole, ButtonSpec, CloseCallback, ContentSource, DialogDescriptor,
};
use crate::error::DialogError;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogPhase {
    Closed,
    Opening,
    Open,
    Submitting,
}

/// Something the caller has to act on after a dialog transition
#[derive(Debug, PartialEq)]
pub enum DialogEvent<M> {
    /// A successful operation's value, or the close callback's message
    Message(M),
    /// A preparation or submission failure to show to the user
    Failed(DialogError),
}

/// Render-time view of one button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonView {
    pub name: String,
    pub role: ButtonRole,
    pub enabled: bool,
    /// This button's operation is in flight
    pub active: bool,
    pub highlighted: bool,
}

pub struct DialogController<C, M> {
    phase: DialogPhase,
    /// Incremented on every `open`, used to tag log lines
    lifetime: u64,
    title: String,
    content: Option<C>,
    buttons: Vec<ButtonSpec<C, M>>,
    on_close: Option<CloseCallback<M>>,
    closable: bool,
    active_button: Option<String>,
    error_message: Option<String>,
    highlighted: usize,
    preparing: Option<AsyncAction<C>>,
    submitting: Option<AsyncAction<M>>,
    events: Vec<DialogEvent<M>>,
}

impl<C: Send + 'static, M: Send + 'static> Default for DialogController<C, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Send + 'static, M: Send + 'static> DialogController<C, M> {
    pub fn new() -> Self {
        Self {
            phase: DialogPhase::Closed,
            lifetime: 0,
            title: String::new(),
            content: None,
            buttons: Vec::new(),
            on_close: None,
            closable: true,
            active_button: None,
            error_message: None,
            highlighted: 0,
            preparing: None,
            submitting: None,
            events: Vec::new(),
        }
    }

    /// Create a controller that is already opening `descriptor`
    pub fn opened(descriptor: DialogDescriptor<C, M>) -> Self {
        let mut controller = Self::new();
        controller.open(descriptor);
        controller
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    pub fn phase(&self) -> DialogPhase {
        self.phase
    }

    pub fn is_visible(&self) -> bool {
        self.phase != DialogPhase::Closed
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> Option<&C> {
        self.content.as_ref()
    }

    /// Mutable content, only while the user may edit it
    pub fn content_mut(&mut self) -> Option<&mut C> {
        if self.phase == DialogPhase::Open {
            self.content.as_mut()
        } else {
            None
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn active_button(&self) -> Option<&str> {
        self.active_button.as_deref()
    }

    pub fn is_closable(&self) -> bool {
        self.closable
    }

    /// A button can be activated only while the dialog is open and its
    /// predicate does not disable it
    pub fn is_button_enabled(&self, name: &str) -> bool {
        self.phase == DialogPhase::Open
            && self
                .buttons
                .iter()
                .find(|b| b.name == name)
                .is_some_and(|b| self.enabled(b))
    }

    /// Target of the Enter key: first enabled button in declared order
    pub fn default_button(&self) -> Option<&str> {
        if self.phase != DialogPhase::Open {
            return None;
        }
        self.buttons
            .iter()
            .find(|b| self.enabled(b))
            .map(|b| b.name.as_str())
    }

    pub fn buttons(&self) -> Vec<ButtonView> {
        self.buttons
            .iter()
            .enumerate()
            .map(|(i, b)| ButtonView {
                name: b.name.clone(),
                role: b.role,
                enabled: self.phase == DialogPhase::Open && self.enabled(b),
                active: self.active_button.as_deref() == Some(b.name.as_str()),
                highlighted: i == self.highlighted,
            })
            .collect()
    }

    fn enabled(&self, button: &ButtonSpec<C, M>) -> bool {
        self.content
            .as_ref()
            .is_some_and(|content| !button.is_disabled(content))
    }

    /// Drain the events produced since the last call
    pub fn take_events(&mut self) -> Vec<DialogEvent<M>> {
        std::mem::take(&mut self.events)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Start a new dialog lifetime.
    ///
    /// A dialog that is still visible is closed first.
    pub fn open(&mut self, descriptor: DialogDescriptor<C, M>) {
        if self.is_visible() {
            warn!(dialog = %self.title, "reopened while visible, closing previous");
            self.close();
        }

        self.lifetime += 1;
        self.title = descriptor.title;
        self.buttons = descriptor.buttons;
        self.on_close = descriptor.on_close;
        self.closable = descriptor.closable;
        self.highlighted = 0;
        self.phase = DialogPhase::Opening;
        debug!(dialog = %self.title, lifetime = self.lifetime, "opening");

        match descriptor.source {
            ContentSource::Ready(content) => {
                self.content = Some(content);
                self.enter_open();
            }
            ContentSource::Prepare(prepare) => {
                let mut action = AsyncAction::new();
                action.trigger(prepare);
                self.preparing = Some(action);
            }
        }
    }

    fn enter_open(&mut self) {
        self.phase = DialogPhase::Open;
        self.active_button = None;
        self.error_message = None;
        debug!(dialog = %self.title, lifetime = self.lifetime, "open");
    }

    /// Activate a button by name. Returns false when nothing happened.
    pub fn activate(&mut self, name: &str) -> bool {
        if !self.is_button_enabled(name) {
            debug!(dialog = %self.title, button = name, phase = ?self.phase, "activation ignored");
            return false;
        }
        let Some(index) = self.buttons.iter().position(|b| b.name == name) else {
            return false;
        };

        let operation = match &self.buttons[index].action {
            ButtonAction::Close => None,
            ButtonAction::Submit(factory) => match self.content.as_ref() {
                Some(content) => Some(factory(content)),
                None => return false,
            },
        };
        let Some(operation) = operation else {
            self.close();
            return true;
        };

        let mut action = AsyncAction::new();
        if action.trigger(operation) == Trigger::Rejected {
            return false;
        }

        info!(dialog = %self.title, button = name, "submitting");
        self.submitting = Some(action);
        self.active_button = Some(name.to_string());
        self.error_message = None;
        self.phase = DialogPhase::Submitting;
        true
    }

    /// Activate the default button, as the Enter key does
    pub fn submit_default(&mut self) -> bool {
        match self.default_button().map(str::to_string) {
            Some(name) => self.activate(&name),
            None => false,
        }
    }

    pub fn activate_highlighted(&mut self) -> bool {
        match self.buttons.get(self.highlighted).map(|b| b.name.clone()) {
            Some(name) => self.activate(&name),
            None => false,
        }
    }

    pub fn highlight_next(&mut self) {
        if !self.buttons.is_empty() {
            self.highlighted = (self.highlighted + 1) % self.buttons.len();
        }
    }

    pub fn highlight_prev(&mut self) {
        if !self.buttons.is_empty() {
            self.highlighted = (self.highlighted + self.buttons.len() - 1) % self.buttons.len();
        }
    }

    /// Pick up the outcome of a pending preparation or submission.
    ///
    /// Returns true when the phase changed.
    pub fn poll(&mut self) -> bool {
        match self.phase {
            DialogPhase::Opening => self.poll_preparation(),
            DialogPhase::Submitting => self.poll_submission(),
            DialogPhase::Closed | DialogPhase::Open => false,
        }
    }

    fn poll_preparation(&mut self) -> bool {
        let Some(settled) = self.preparing.as_mut().and_then(AsyncAction::poll) else {
            return false;
        };
        self.preparing = None;

        match settled {
            Settled::Succeeded(content) => {
                self.content = Some(content);
                self.enter_open();
            }
            Settled::Failed(source) => {
                warn!(dialog = %self.title, error = %source, "preparation failed");
                self.events.push(DialogEvent::Failed(DialogError::Preparation {
                    title: self.title.clone(),
                    source,
                }));
                self.close();
            }
        }
        true
    }

    fn poll_submission(&mut self) -> bool {
        let Some(settled) = self.submitting.as_mut().and_then(AsyncAction::poll) else {
            return false;
        };
        self.submitting = None;
        let button = self.active_button.take().unwrap_or_default();

        match settled {
            Settled::Succeeded(message) => {
                info!(dialog = %self.title, button = %button, "submitted");
                self.events.push(DialogEvent::Message(message));
                self.close();
            }
            Settled::Failed(source) => {
                warn!(dialog = %self.title, button = %button, error = %source, "submission failed");
                self.enter_open();
                self.error_message = Some(source.message.clone());
                self.events
                    .push(DialogEvent::Failed(DialogError::Submission { button, source }));
            }
        }
        true
    }

    /// Close the dialog from any visible phase.
    ///
    /// Returns false if it was already closed.
    pub fn close(&mut self) -> bool {
        if self.phase == DialogPhase::Closed {
            return false;
        }
        if self.submitting.is_some() {
            debug!(dialog = %self.title, "closed while submitting, result will be ignored");
        }

        self.phase = DialogPhase::Closed;
        self.content = None;
        self.error_message = None;
        self.active_button = None;
        self.preparing = None;
        self.submitting = None;
        self.buttons.clear();
        self.highlighted = 0;
        debug!(dialog = %self.title, lifetime = self.lifetime, "closed");

        if let Some(callback) = self.on_close.take() {
            if let Some(message) = callback() {
                self.events.push(DialogEvent::Message(message));
            }
        }
        true
    }
}
