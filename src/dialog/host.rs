//! Single mount point for modal dialogs
//!
//! The host owns the one controller that may be visible. Opening another
//! dialog closes the current one first, so at most one dialog is ever open
//! or submitting. All keys go to the visible dialog; the screen underneath
//! only sees keys when nothing is mounted.

use super::controller::{ButtonView, DialogController, DialogEvent, DialogPhase};
use super::descriptor::DialogDescriptor;
use super::{DialogContent, Focus};
use crossterm::event::{KeyCode, KeyEvent};
use tracing::debug;

pub struct DialogHost<C, M> {
    active: Option<DialogController<C, M>>,
    events: Vec<DialogEvent<M>>,
}

impl<C: Send + 'static, M: Send + 'static> Default for DialogHost<C, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Send + 'static, M: Send + 'static> DialogHost<C, M> {
    pub fn new() -> Self {
        Self {
            active: None,
            events: Vec::new(),
        }
    }

    /// Open a dialog in the host's controller, displacing whatever is visible
    pub fn open(&mut self, descriptor: DialogDescriptor<C, M>) {
        self.displace();
        let controller = self.active.get_or_insert_with(DialogController::new);
        controller.open(descriptor);
        self.collect();
    }

    /// Mount a controller that was opened elsewhere
    pub fn open_controller(&mut self, controller: DialogController<C, M>) {
        self.displace();
        self.active = Some(controller);
        self.collect();
    }

    fn displace(&mut self) {
        if let Some(previous) = self.active.as_mut().filter(|c| c.is_visible()) {
            debug!(dialog = %previous.title(), "displaced by a new dialog");
            previous.close();
        }
        self.collect();
    }

    /// Unmount the visible dialog without closing it.
    ///
    /// Its content and inline error are kept, so it can be mounted again
    /// later with `open_controller`. Dialogs with an operation in flight
    /// stay mounted.
    pub fn detach_active(&mut self) -> Option<DialogController<C, M>> {
        self.collect();
        if self.phase() != DialogPhase::Open {
            return None;
        }
        let controller = self.active.take();
        if let Some(detached) = &controller {
            debug!(dialog = %detached.title(), "detached");
        }
        controller
    }

    /// Close the visible dialog regardless of `closable`
    pub fn close_active(&mut self) -> bool {
        let closed = self.active.as_mut().is_some_and(DialogController::close);
        self.collect();
        closed
    }

    /// The visible dialog, if any
    pub fn current(&self) -> Option<&DialogController<C, M>> {
        self.active.as_ref().filter(|c| c.is_visible())
    }

    pub fn current_mut(&mut self) -> Option<&mut DialogController<C, M>> {
        self.active.as_mut().filter(|c| c.is_visible())
    }

    pub fn is_open(&self) -> bool {
        self.current().is_some()
    }

    pub fn phase(&self) -> DialogPhase {
        self.current()
            .map_or(DialogPhase::Closed, DialogController::phase)
    }

    /// Buttons of the visible dialog, in declared order
    pub fn buttons(&self) -> Vec<ButtonView> {
        self.current()
            .map(DialogController::buttons)
            .unwrap_or_default()
    }

    /// Activate a button of the visible dialog, as a click would
    pub fn activate(&mut self, name: &str) -> bool {
        let activated = self
            .current_mut()
            .is_some_and(|controller| controller.activate(name));
        self.collect();
        activated
    }

    /// Deliver settled operations to the visible dialog.
    ///
    /// Returns true when its phase changed.
    pub fn poll(&mut self) -> bool {
        let changed = self
            .current_mut()
            .is_some_and(DialogController::poll);
        self.collect();
        changed
    }

    /// Drain everything the caller has to handle, in the order it happened
    pub fn take_events(&mut self) -> Vec<DialogEvent<M>> {
        self.collect();
        std::mem::take(&mut self.events)
    }

    fn collect(&mut self) {
        if let Some(controller) = self.active.as_mut() {
            self.events.extend(controller.take_events());
        }
    }
}

impl<C: DialogContent + Send + 'static, M: Send + 'static> DialogHost<C, M> {
    /// Route a key to the visible dialog.
    ///
    /// Returns false only when no dialog is visible.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let Some(controller) = self.current_mut() else {
            return false;
        };
        let phase = controller.phase();

        match key.code {
            KeyCode::Esc => {
                if controller.is_closable() {
                    controller.close();
                } else {
                    debug!(dialog = %controller.title(), "escape ignored, dialog is not closable");
                }
            }
            KeyCode::Enter
                if phase == DialogPhase::Open && !Self::enter_belongs_to_content(controller) =>
            {
                controller.submit_default();
            }
            _ if phase != DialogPhase::Open => {}
            _ => {
                let consumed = controller
                    .content_mut()
                    .is_some_and(|content| content.handle_key(key));
                if !consumed {
                    match key.code {
                        KeyCode::Left => controller.highlight_prev(),
                        KeyCode::Right => controller.highlight_next(),
                        KeyCode::Char(' ') => {
                            controller.activate_highlighted();
                        }
                        _ => {}
                    }
                }
            }
        }

        self.collect();
        true
    }

    fn enter_belongs_to_content(controller: &DialogController<C, M>) -> bool {
        controller
            .content()
            .is_some_and(|content| content.focus() == Focus::MultiLine)
    }
}
