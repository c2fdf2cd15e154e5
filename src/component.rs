//! Component trait - Interface for screen components
//!
//! A component owns its presentation state, turns keys into Actions and
//! draws itself. Dialogs are not components: they are mounted in the
//! `DialogHost`, which sees keys before any component does.

use crate::action::Action;
use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

pub trait Component {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// Map a key to an Action without changing state
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let _ = key;
        Ok(None)
    }

    /// Apply an Action, optionally producing a follow-up one
    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let _ = action;
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()>;
}
