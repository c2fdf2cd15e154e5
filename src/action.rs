//! Action enum - All possible application actions
//!
//! Components emit Actions in response to events, dialogs resolve to them
//! when their operations succeed, and the App processes them to update
//! state.

use std::fmt;

/// All possible actions in the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ─────────────────────────────────────────────────────────────────────────
    // App Lifecycle
    // ─────────────────────────────────────────────────────────────────────────
    /// Regular tick, drives polling of background operations
    Tick,
    /// Terminal was resized
    Resize(u16, u16),
    /// Quit without confirmation
    ForceQuit,

    // ─────────────────────────────────────────────────────────────────────────
    // Group Tree
    // ─────────────────────────────────────────────────────────────────────────
    NextItem,
    PrevItem,
    FirstItem,
    LastItem,
    /// Expand or collapse the selected folder
    ToggleFolder,
    ExpandFolder,
    CollapseFolder,

    // ─────────────────────────────────────────────────────────────────────────
    // Dialogs
    // ─────────────────────────────────────────────────────────────────────────
    OpenQuitDialog,
    OpenAddGroup,
    OpenEditGroup,
    OpenDeleteGroup,
    /// Block the screen until the user reconnects
    OpenSessionExpired,
    /// Reconnected; reload and bring back the dialog the expiry interrupted
    SessionRestored,

    // ─────────────────────────────────────────────────────────────────────────
    // Inventory
    // ─────────────────────────────────────────────────────────────────────────
    /// Reload the group list; emitted by every successful mutation
    RefreshGroups,
    /// Clear the status bar message
    DismissStatus,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Tick => write!(f, "Tick"),
            Action::Resize(w, h) => write!(f, "Resize({}, {})", w, h),
            Action::ForceQuit => write!(f, "ForceQuit"),
            Action::NextItem => write!(f, "NextItem"),
            Action::PrevItem => write!(f, "PrevItem"),
            Action::FirstItem => write!(f, "FirstItem"),
            Action::LastItem => write!(f, "LastItem"),
            Action::ToggleFolder => write!(f, "ToggleFolder"),
            Action::ExpandFolder => write!(f, "ExpandFolder"),
            Action::CollapseFolder => write!(f, "CollapseFolder"),
            Action::OpenQuitDialog => write!(f, "OpenQuitDialog"),
            Action::OpenAddGroup => write!(f, "OpenAddGroup"),
            Action::OpenEditGroup => write!(f, "OpenEditGroup"),
            Action::OpenDeleteGroup => write!(f, "OpenDeleteGroup"),
            Action::OpenSessionExpired => write!(f, "OpenSessionExpired"),
            Action::SessionRestored => write!(f, "SessionRestored"),
            Action::RefreshGroups => write!(f, "RefreshGroups"),
            Action::DismissStatus => write!(f, "DismissStatus"),
        }
    }
}
