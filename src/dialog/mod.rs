//! Modal dialog orchestration
//!
//! - `AsyncAction` - one tracked background operation
//! - `DialogDescriptor` / `ButtonSpec` - what a dialog shows and does
//! - `DialogController` - the state machine of one dialog
//! - `DialogHost` - the single mount point routing keys to the active dialog

pub mod async_action;
pub mod controller;
pub mod descriptor;
pub mod host;

pub use async_action::{AsyncAction, Operation, Settled};
pub use controller::{ButtonView, DialogController, DialogEvent, DialogPhase};
pub use descriptor::{ButtonRole, ButtonSpec, DialogDescriptor};
pub use host::DialogHost;

use crossterm::event::KeyEvent;

/// Kind of input the dialog content currently has focused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    SingleLine,
    /// Enter belongs to the field instead of submitting the dialog
    MultiLine,
    #[default]
    Other,
}

/// Interactive content of a dialog
///
/// The host asks the content only where its focus is and lets it consume
/// keys first; it never looks at anything else.
pub trait DialogContent {
    fn focus(&self) -> Focus {
        Focus::Other
    }

    /// Handle a key, returning true if it was consumed
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let _ = key;
        false
    }
}
